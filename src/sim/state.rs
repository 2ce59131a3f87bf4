//! Game state and core simulation types
//!
//! Everything the engine mutates lives in [`GameState`]. Renderers get a
//! shared reference and never write to it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A grid cell coordinate
///
/// Signed so a step off the edge is representable before the bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `direction`
    #[inline]
    pub fn step(self, direction: Direction) -> Point {
        let (dx, dy) = direction.delta();
        Point::new(self.x + dx, self.y + dy)
    }

    /// Whether the point lies on the grid
    #[inline]
    pub fn in_bounds(self) -> bool {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }

    pub fn manhattan(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Heading of the snake head. Up is toward y = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Current phase of a race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting on the menu for a race to start
    Idle,
    /// Tick loop active
    Playing,
    /// Tick loop suspended, state frozen
    Paused,
    /// Collision happened, waiting for acknowledge
    GameOver,
    /// Level goal reached, waiting for the player to advance
    LevelUp,
}

impl GameStatus {
    /// Whether the chain invariants must hold (no overlap, disjoint food)
    pub fn is_active(self) -> bool {
        matches!(self, GameStatus::Playing | GameStatus::Paused)
    }
}

/// Difficulty tiers
///
/// Deserialized through [`Difficulty::from_str`], so any casing and `med`
/// are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Difficulty::from_str(&s).ok_or_else(|| format!("unknown difficulty `{}`", s))
    }
}

/// Tuning bundle for one difficulty tier
///
/// Precondition: `obstacle_count + snake length + 1 < GRID_CELLS`, with a
/// large margin, or placement may run out of free cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub initial_speed_ms: u64,
    pub min_speed_ms: u64,
    pub obstacle_count: usize,
    pub speed_increment_ms: u64,
}

impl DifficultyConfig {
    /// Whether a chain of `snake_len` cells, the obstacles and one food fit
    /// on the grid with at least half of it left free
    pub fn fits_grid(&self, snake_len: usize) -> bool {
        (self.obstacle_count + snake_len + 1) * 2 < GRID_CELLS
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn config(&self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => DifficultyConfig {
                initial_speed_ms: 180,
                min_speed_ms: 100,
                obstacle_count: 0,
                speed_increment_ms: 1,
            },
            Difficulty::Medium => DifficultyConfig {
                initial_speed_ms: 140,
                min_speed_ms: 70,
                obstacle_count: 15,
                speed_increment_ms: 2,
            },
            Difficulty::Hard => DifficultyConfig {
                initial_speed_ms: 100,
                min_speed_ms: 50,
                obstacle_count: 30,
                speed_increment_ms: 3,
            },
        }
    }
}

/// Score needed to clear `level`
///
/// Fixed table for the first three levels, then a flat 100k per level.
pub fn level_goal(level: u32) -> u64 {
    match level {
        0 | 1 => 10,
        2 => 30,
        3 => 100,
        n => 100_000 + u64::from(n - 4) * 100_000,
    }
}

/// Chain length a given score entitles the snake to
pub fn target_length(score: u64) -> usize {
    INITIAL_SNAKE_LENGTH + (score / SCORE_PER_SEGMENT) as usize
}

/// Fixed vertical starting chain, head first
pub fn initial_snake() -> VecDeque<Point> {
    VecDeque::from([Point::new(10, 10), Point::new(10, 11), Point::new(10, 12)])
}

/// Things the engine reports as they happen
///
/// Drivers subscribe to these instead of diffing snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    StatusChanged { from: GameStatus, to: GameStatus },
    SpeedChanged { speed_ms: u64 },
    FoodEaten { at: Point, score: u64 },
    NewHighScore { score: u64 },
    GameOver { final_score: u64 },
    LevelCleared { level: u32 },
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Segment chain, head first
    pub snake: VecDeque<Point>,
    pub food: Point,
    /// Fixed for the duration of a level
    pub obstacles: Vec<Point>,
    pub direction: Direction,
    pub status: GameStatus,
    pub difficulty: Difficulty,
    pub score: u64,
    pub high_score: u64,
    /// Current tick interval in milliseconds
    pub speed_ms: u64,
    /// Current level (1-based)
    pub level: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameState {
    /// Fresh pre-game state on the menu
    pub fn new(high_score: u64) -> Self {
        let difficulty = Difficulty::default();
        Self {
            snake: initial_snake(),
            food: Point::new(5, 5),
            obstacles: Vec::new(),
            direction: Direction::Up,
            status: GameStatus::Idle,
            difficulty,
            score: 0,
            high_score,
            speed_ms: difficulty.config().initial_speed_ms,
            level: 1,
        }
    }

    pub fn head(&self) -> Point {
        // The chain is never empty: it starts at three and only the tail
        // beyond the target length is ever dropped.
        self.snake[0]
    }

    pub fn goal(&self) -> u64 {
        level_goal(self.level)
    }

    pub fn config(&self) -> DifficultyConfig {
        self.difficulty.config()
    }

    pub fn is_on_snake(&self, p: Point) -> bool {
        self.snake.contains(&p)
    }

    pub fn is_obstacle(&self, p: Point) -> bool {
        self.obstacles.contains(&p)
    }

    /// Whether a head arriving at `p` this tick would die
    ///
    /// Checks against the full pre-move chain, tail included.
    pub fn is_fatal(&self, p: Point) -> bool {
        !p.in_bounds() || self.is_on_snake(p) || self.is_obstacle(p)
    }

    /// Cells food must avoid
    pub fn occupied(&self) -> impl Iterator<Item = &Point> {
        self.snake.iter().chain(self.obstacles.iter())
    }
}
