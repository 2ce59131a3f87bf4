//! Flavor text shown on the stumble screen
//!
//! Fetching is fire-and-forget relative to the engine: the race has already
//! ended when the request goes out, and whatever comes back lands in a
//! [`WisdomSlot`] owned by the caller. Results that arrive after the player
//! has left the stumble screen are dropped.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Shown whenever a source fails or takes too long
pub const FALLBACK_WISDOM: &str = "Even the swiftest horse stumbles. Saddle up and ride again.";

/// Shown while a fetch is in flight
pub const LOADING_TEXT: &str = "Consulting the stable...";

/// How long a source gets before the fallback is used
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum WisdomError {
    #[error("wisdom source unavailable: {0}")]
    Unavailable(String),
    #[error("wisdom source returned nothing")]
    Empty,
}

/// Asynchronous text generator keyed by final score
pub trait WisdomSource: Send + Sync + 'static {
    fn fetch(&self, final_score: u64) -> impl Future<Output = Result<String, WisdomError>> + Send;
}

/// Offline source with canned proverbs by score band
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticWisdom;

impl StaticWisdom {
    pub fn proverb(final_score: u64) -> &'static str {
        match final_score {
            0 => "A horse that never leaves the stable never loses its way, nor finds the meadow.",
            1..=999 => "Every great gallop begins with a single hoofbeat.",
            1_000..=9_999 => "The wind remembers the horse that ran against it.",
            10_000..=99_999 => "Long is the trail behind you; longer still the one ahead.",
            _ => "Ten thousand horses gallop, yet the meadow bows to you alone.",
        }
    }
}

impl WisdomSource for StaticWisdom {
    async fn fetch(&self, final_score: u64) -> Result<String, WisdomError> {
        Ok(Self::proverb(final_score).to_string())
    }
}

/// Ask `source` for text, degrading to [`FALLBACK_WISDOM`]
pub async fn fetch_or_fallback<W: WisdomSource>(source: &W, final_score: u64) -> String {
    match tokio::time::timeout(FETCH_TIMEOUT, source.fetch(final_score)).await {
        Ok(Ok(text)) if !text.trim().is_empty() => text,
        Ok(Ok(_)) => {
            log::warn!("Wisdom fetch failed: {}", WisdomError::Empty);
            FALLBACK_WISDOM.to_string()
        }
        Ok(Err(err)) => {
            log::warn!("Wisdom fetch failed: {}", err);
            FALLBACK_WISDOM.to_string()
        }
        Err(_) => {
            log::warn!("Wisdom fetch timed out after {:?}", FETCH_TIMEOUT);
            FALLBACK_WISDOM.to_string()
        }
    }
}

/// Display slot for the stumble screen
#[derive(Debug, Clone, Default)]
pub struct WisdomSlot {
    generation: u64,
    loading: bool,
    text: Option<String>,
}

impl WisdomSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a fetch as in flight; the returned ticket must accompany the result
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.text = None;
        self.generation
    }

    /// Store a result if it belongs to the current fetch
    ///
    /// Returns false when the result is stale and was discarded.
    pub fn accept(&mut self, ticket: u64, text: String) -> bool {
        if ticket != self.generation || !self.loading {
            log::debug!("Discarding stale wisdom (ticket {})", ticket);
            return false;
        }
        self.loading = false;
        self.text = Some(text);
        true
    }

    /// Forget everything, invalidating any fetch still in flight
    pub fn clear(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.text = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// What the stumble screen should show right now
    pub fn display(&self) -> &str {
        if self.loading {
            LOADING_TEXT
        } else {
            self.text.as_deref().unwrap_or("")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl WisdomSource for Broken {
        async fn fetch(&self, _final_score: u64) -> Result<String, WisdomError> {
            Err(WisdomError::Unavailable("no network".into()))
        }
    }

    struct Slow;

    impl WisdomSource for Slow {
        async fn fetch(&self, _final_score: u64) -> Result<String, WisdomError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".into())
        }
    }

    struct Blank;

    impl WisdomSource for Blank {
        async fn fetch(&self, _final_score: u64) -> Result<String, WisdomError> {
            Ok("   ".into())
        }
    }

    #[tokio::test]
    async fn test_static_source() {
        let text = fetch_or_fallback(&StaticWisdom, 1_500).await;
        assert_eq!(text, StaticWisdom::proverb(1_500));
    }

    #[tokio::test]
    async fn test_failure_degrades_to_fallback() {
        assert_eq!(fetch_or_fallback(&Broken, 100).await, FALLBACK_WISDOM);
        assert_eq!(fetch_or_fallback(&Blank, 100).await, FALLBACK_WISDOM);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_fallback() {
        assert_eq!(fetch_or_fallback(&Slow, 100).await, FALLBACK_WISDOM);
    }

    #[test]
    fn test_slot_lifecycle() {
        let mut slot = WisdomSlot::new();
        assert_eq!(slot.display(), "");

        let ticket = slot.begin();
        assert!(slot.is_loading());
        assert_eq!(slot.display(), LOADING_TEXT);

        assert!(slot.accept(ticket, "Gallop on".into()));
        assert_eq!(slot.text(), Some("Gallop on"));
        assert_eq!(slot.display(), "Gallop on");
    }

    #[test]
    fn test_late_result_discarded() {
        let mut slot = WisdomSlot::new();
        let ticket = slot.begin();
        slot.clear();
        assert!(!slot.accept(ticket, "late".into()));
        assert_eq!(slot.text(), None);

        let old = slot.begin();
        let new = slot.begin();
        assert!(!slot.accept(old, "old".into()));
        assert!(slot.accept(new, "new".into()));
        assert_eq!(slot.display(), "new");
    }
}
