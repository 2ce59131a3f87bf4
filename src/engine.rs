//! Simulation engine
//!
//! Sole owner of the [`GameState`]. Wraps the pure transitions in `sim` and
//! mirrors new high scores into the injected store. Every operation records
//! [`GameEvent`]s; the caller drains them to restart timers or fetch flavor
//! text.

use thiserror::Error;

use crate::highscores::HighScoreStore;
use crate::sim::{self, Difficulty, Direction, GameEvent, GameState, Placement, PlacementError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("could not lay out the grid: {0}")]
    Placement(#[from] PlacementError),
}

pub struct Engine {
    state: GameState,
    placement: Placement,
    store: Box<dyn HighScoreStore>,
    events: Vec<GameEvent>,
}

impl Engine {
    /// Create an engine on the menu, reading the stored high score once
    pub fn new(store: Box<dyn HighScoreStore>, placement: Placement) -> Self {
        let state = GameState::new(store.load());
        log::debug!("Engine ready (placement seed {})", placement.seed());
        Self {
            state,
            placement,
            store,
            events: Vec::new(),
        }
    }

    /// Read-only snapshot for renderers
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn seed(&self) -> u64 {
        self.placement.seed()
    }

    pub fn start(&mut self, difficulty: Difficulty) -> Result<(), EngineError> {
        if self.state.status == sim::GameStatus::Idle {
            self.state.high_score = self.store.load();
        }
        let mark = self.events.len();
        let result = sim::start(
            &mut self.state,
            difficulty,
            &mut self.placement,
            &mut self.events,
        );
        self.persist_from(mark);
        result.map_err(EngineError::from)
    }

    pub fn tick(&mut self) -> Result<(), EngineError> {
        let mark = self.events.len();
        let result = sim::tick(&mut self.state, &mut self.placement, &mut self.events);
        self.persist_from(mark);
        result.map_err(EngineError::from)
    }

    pub fn apply_direction(&mut self, direction: Direction) {
        sim::apply_direction(&mut self.state, direction);
    }

    pub fn toggle_pause(&mut self) {
        sim::toggle_pause(&mut self.state, &mut self.events);
    }

    pub fn advance_level(&mut self) -> Result<(), EngineError> {
        sim::advance_level(&mut self.state, &mut self.placement, &mut self.events)?;
        Ok(())
    }

    pub fn acknowledge_game_over(&mut self) {
        sim::acknowledge_game_over(&mut self.state, &mut self.events);
    }

    /// Take everything that happened since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn persist_from(&mut self, mark: usize) {
        let best = self.events[mark..]
            .iter()
            .filter_map(|event| match event {
                GameEvent::NewHighScore { score } => Some(*score),
                _ => None,
            })
            .max();

        if let Some(score) = best {
            if let Err(err) = self.store.save(score) {
                log::warn!("Could not save high score {}: {}", score, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryHighScoreStore;
    use crate::sim::{GameStatus, Point};

    fn engine_with(store: MemoryHighScoreStore) -> Engine {
        Engine::new(Box::new(store), Placement::new(31))
    }

    #[test]
    fn test_reads_high_score_at_startup() {
        let engine = engine_with(MemoryHighScoreStore::with_value(1_200));
        assert_eq!(engine.state().high_score, 1_200);
        assert_eq!(engine.state().status, GameStatus::Idle);
        assert_eq!(engine.seed(), 31);
    }

    #[test]
    fn test_new_high_score_is_persisted() {
        let store = MemoryHighScoreStore::new();
        let mut engine = engine_with(store.clone());
        engine.start(Difficulty::Easy).unwrap();
        engine.state.level = 4;
        engine.state.food = Point::new(10, 9);

        engine.tick().unwrap();
        assert_eq!(engine.state().score, 100);
        assert_eq!(store.stored(), Some(100));
    }

    #[test]
    fn test_storage_failure_does_not_stop_play() {
        let mut engine = engine_with(MemoryHighScoreStore::unavailable());
        engine.start(Difficulty::Easy).unwrap();
        engine.state.level = 4;
        engine.state.food = Point::new(10, 9);

        engine.tick().unwrap();
        assert_eq!(engine.state().high_score, 100);
        assert_eq!(engine.state().status, GameStatus::Playing);
    }

    #[test]
    fn test_start_rereads_store() {
        let store = MemoryHighScoreStore::with_value(10);
        let mut engine = engine_with(store.clone());
        let mut other = store.clone();
        other.save(5_000).unwrap();

        engine.start(Difficulty::Medium).unwrap();
        assert_eq!(engine.state().high_score, 5_000);
    }

    #[test]
    fn test_events_drained_once() {
        let mut engine = engine_with(MemoryHighScoreStore::new());
        engine.start(Difficulty::Medium).unwrap();
        engine.toggle_pause();

        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::StatusChanged {
            from: GameStatus::Playing,
            to: GameStatus::Paused
        }));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_full_race_cycle() {
        let mut engine = engine_with(MemoryHighScoreStore::new());
        engine.start(Difficulty::Easy).unwrap();
        engine.apply_direction(Direction::Left);

        // Easy has no obstacles, so heading left ends at the wall.
        for _ in 0..20 {
            engine.tick().unwrap();
        }
        assert!(matches!(
            engine.state().status,
            GameStatus::GameOver | GameStatus::LevelUp
        ));

        if engine.state().status == GameStatus::LevelUp {
            engine.advance_level().unwrap();
            assert_eq!(engine.state().level, 2);
        } else {
            engine.acknowledge_game_over();
            assert_eq!(engine.state().status, GameStatus::Idle);
            engine.start(Difficulty::Hard).unwrap();
            assert_eq!(engine.state().obstacles.len(), 30);
        }
    }
}
