//! Fixed-period scheduler around the engine
//!
//! The driver is the only caller of the engine. Input arrives over a channel
//! and is applied between ticks. The tick timer is rebuilt on every speed or
//! status change, so exactly one tick stream exists at any time, and none
//! while the race is not in play. A stumble kicks off the wisdom fetch on a
//! separate task; its result comes back tagged and is dropped if the player
//! has moved on.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::engine::{Engine, EngineError};
use crate::input::InputCommand;
use crate::render::FrameSink;
use crate::settings::Settings;
use crate::sim::{Difficulty, GameEvent, GameStatus, autopilot};
use crate::wisdom::{WisdomSlot, WisdomSource, fetch_or_fallback};

/// Requests delivered to the driver between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    Input(InputCommand),
    Start(Difficulty),
    AdvanceLevel,
    Acknowledge,
    Shutdown,
}

impl From<InputCommand> for DriverCommand {
    fn from(input: InputCommand) -> Self {
        DriverCommand::Input(input)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DriverOptions {
    /// Steer with the built-in pilot before every tick
    pub autopilot: bool,
    /// Move on from a cleared level without waiting for a command
    pub auto_advance: bool,
    /// Return once the stumble screen has its wisdom
    pub exit_after_wisdom: bool,
    /// Return after this many ticks
    pub max_ticks: Option<u64>,
}

impl DriverOptions {
    /// Unattended run as used by the native binary
    pub fn headless(settings: &Settings) -> Self {
        Self {
            autopilot: settings.autopilot,
            auto_advance: true,
            exit_after_wisdom: true,
            max_ticks: Some(settings.max_ticks),
        }
    }
}

enum Step {
    Tick,
    Command(Option<DriverCommand>),
    Wisdom(u64, String),
}

pub struct Driver<W: WisdomSource, F: FrameSink> {
    engine: Engine,
    source: Arc<W>,
    wisdom: WisdomSlot,
    sink: F,
    options: DriverOptions,
    ticks: u64,
}

impl<W: WisdomSource, F: FrameSink> Driver<W, F> {
    pub fn new(engine: Engine, source: W, sink: F, options: DriverOptions) -> Self {
        Self {
            engine,
            source: Arc::new(source),
            wisdom: WisdomSlot::new(),
            sink,
            options,
            ticks: 0,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn wisdom(&self) -> &WisdomSlot {
        &self.wisdom
    }

    pub fn sink(&self) -> &F {
        &self.sink
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Drive the engine until shutdown, channel close, or an exit condition
    pub async fn run(
        &mut self,
        mut commands: mpsc::UnboundedReceiver<DriverCommand>,
    ) -> Result<(), EngineError> {
        let (wisdom_tx, mut wisdom_rx) = mpsc::unbounded_channel::<(u64, String)>();
        let mut timer = self.make_timer();

        loop {
            let step = tokio::select! {
                biased;
                command = commands.recv() => Step::Command(command),
                Some((ticket, text)) = wisdom_rx.recv() => Step::Wisdom(ticket, text),
                _ = next_tick(&mut timer) => Step::Tick,
            };

            match step {
                Step::Tick => {
                    if self.options.autopilot
                        && let Some(direction) = autopilot::steer(self.engine.state())
                    {
                        self.engine.apply_direction(direction);
                    }
                    self.engine.tick()?;
                    self.ticks += 1;
                    self.sink.present(self.engine.state());
                }
                Step::Command(None) | Step::Command(Some(DriverCommand::Shutdown)) => {
                    log::info!("Driver shutting down after {} ticks", self.ticks);
                    break;
                }
                Step::Command(Some(command)) => {
                    self.apply(command)?;
                    self.sink.present(self.engine.state());
                }
                Step::Wisdom(ticket, text) => {
                    if self.wisdom.accept(ticket, text) && self.options.exit_after_wisdom {
                        log::info!("Wisdom: {}", self.wisdom.display());
                        break;
                    }
                }
            }

            if self.handle_events(&wisdom_tx)? {
                timer = self.make_timer();
            }

            if let Some(max) = self.options.max_ticks
                && self.ticks >= max
            {
                log::info!("Tick budget of {} reached", max);
                break;
            }
        }
        Ok(())
    }

    fn apply(&mut self, command: DriverCommand) -> Result<(), EngineError> {
        match command {
            DriverCommand::Input(InputCommand::Turn(direction)) => {
                self.engine.apply_direction(direction)
            }
            DriverCommand::Input(InputCommand::TogglePause) => self.engine.toggle_pause(),
            DriverCommand::Start(difficulty) => self.engine.start(difficulty)?,
            DriverCommand::AdvanceLevel => self.engine.advance_level()?,
            DriverCommand::Acknowledge => self.engine.acknowledge_game_over(),
            DriverCommand::Shutdown => {}
        }
        Ok(())
    }

    /// React to engine events; true when the timer must be rebuilt
    fn handle_events(
        &mut self,
        wisdom_tx: &mpsc::UnboundedSender<(u64, String)>,
    ) -> Result<bool, EngineError> {
        let mut restart = false;
        loop {
            let events = self.engine.drain_events();
            if events.is_empty() {
                return Ok(restart);
            }

            for event in events {
                log::debug!("{:?}", event);
                match event {
                    GameEvent::SpeedChanged { .. } => restart = true,
                    GameEvent::StatusChanged { from, to } => {
                        restart = true;
                        if from == GameStatus::GameOver {
                            self.wisdom.clear();
                        }
                        if to == GameStatus::LevelUp && self.options.auto_advance {
                            self.engine.advance_level()?;
                        }
                    }
                    GameEvent::GameOver { final_score } => {
                        self.spawn_wisdom(final_score, wisdom_tx.clone());
                    }
                    GameEvent::NewHighScore { score } => {
                        log::info!("New high score: {}", score);
                    }
                    GameEvent::FoodEaten { .. } | GameEvent::LevelCleared { .. } => {}
                }
            }
        }
    }

    fn spawn_wisdom(&mut self, final_score: u64, tx: mpsc::UnboundedSender<(u64, String)>) {
        let ticket = self.wisdom.begin();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let text = fetch_or_fallback(source.as_ref(), final_score).await;
            // The receiver is gone once the driver stops; nothing to do then.
            let _ = tx.send((ticket, text));
        });
    }

    fn make_timer(&self) -> Option<Interval> {
        let state = self.engine.state();
        if state.status != GameStatus::Playing {
            return None;
        }
        let period = Duration::from_millis(state.speed_ms);
        let mut timer = tokio::time::interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::trace!("Tick timer set to {:?}", period);
        Some(timer)
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
