//! Discrete simulation tick and the status transitions around it
//!
//! Every function here is a plain state transition over [`GameState`].
//! Operations that do not apply in the current status are silent no-ops:
//! player input is never validated upstream and must never end a session.

use super::placement::{Placement, PlacementError};
use super::state::{
    Difficulty, Direction, GameEvent, GameState, GameStatus, initial_snake, target_length,
};
use crate::consts::*;

/// Begin a fresh race from the menu
///
/// Obstacles avoid the starting chain; food avoids both. Nothing is touched
/// if placement fails.
pub fn start(
    state: &mut GameState,
    difficulty: Difficulty,
    placement: &mut Placement,
    events: &mut Vec<GameEvent>,
) -> Result<(), PlacementError> {
    if state.status != GameStatus::Idle {
        log::debug!("Ignoring start while {:?}", state.status);
        return Ok(());
    }

    let config = difficulty.config();
    let snake = initial_snake();
    debug_assert!(
        config.fits_grid(snake.len()),
        "{} tier too dense",
        difficulty.as_str()
    );
    let obstacles = placement.obstacles(config.obstacle_count, &snake)?;
    let food = placement.food(snake.iter().chain(obstacles.iter()))?;

    state.snake = snake;
    state.obstacles = obstacles;
    state.food = food;
    state.direction = Direction::Up;
    state.difficulty = difficulty;
    state.score = 0;
    state.level = 1;
    set_speed(state, config.initial_speed_ms, events);
    set_status(state, GameStatus::Playing, events);

    log::info!(
        "Race started on {} ({} obstacles, {} ms/tick)",
        difficulty.as_str(),
        state.obstacles.len(),
        state.speed_ms
    );
    Ok(())
}

/// Advance the race by one cell
pub fn tick(
    state: &mut GameState,
    placement: &mut Placement,
    events: &mut Vec<GameEvent>,
) -> Result<(), PlacementError> {
    if state.status != GameStatus::Playing {
        return Ok(());
    }

    let new_head = state.head().step(state.direction);

    // The tail still counts here even though it is about to move.
    if state.is_fatal(new_head) {
        let cause = if !new_head.in_bounds() {
            "wall"
        } else if state.is_on_snake(new_head) {
            "own trail"
        } else {
            "obstacle"
        };
        log::info!(
            "Stumbled into {} at ({}, {}) with score {}",
            cause,
            new_head.x,
            new_head.y,
            state.score
        );
        set_status(state, GameStatus::GameOver, events);
        events.push(GameEvent::GameOver {
            final_score: state.score,
        });
        return Ok(());
    }

    let ate = new_head == state.food;
    let score = if ate {
        state.score + FOOD_SCORE
    } else {
        state.score
    };
    let cleared = ate && score >= state.goal();

    // Place before mutating so a failed draw leaves the state untouched.
    let food = if ate && !cleared {
        placement.food(std::iter::once(&new_head).chain(state.occupied()))?
    } else {
        state.food
    };

    state.snake.push_front(new_head);
    state.snake.truncate(target_length(score));

    if !ate {
        log::trace!("Moved to ({}, {})", new_head.x, new_head.y);
        return Ok(());
    }

    state.score = score;
    state.food = food;
    events.push(GameEvent::FoodEaten {
        at: new_head,
        score,
    });

    if score > state.high_score {
        state.high_score = score;
        events.push(GameEvent::NewHighScore { score });
    }

    let config = state.config();
    let speed = state
        .speed_ms
        .saturating_sub(config.speed_increment_ms)
        .max(config.min_speed_ms);
    set_speed(state, speed, events);

    if cleared {
        log::info!("Level {} cleared with score {}", state.level, score);
        events.push(GameEvent::LevelCleared { level: state.level });
        set_status(state, GameStatus::LevelUp, events);
    }

    Ok(())
}

/// Steer the head; takes effect on the next tick
///
/// Reversal onto the neck is ignored, as is steering outside a race.
pub fn apply_direction(state: &mut GameState, direction: Direction) {
    if state.status != GameStatus::Playing || direction.is_opposite(state.direction) {
        return;
    }
    state.direction = direction;
}

/// Pause or resume
pub fn toggle_pause(state: &mut GameState, events: &mut Vec<GameEvent>) {
    match state.status {
        GameStatus::Playing => set_status(state, GameStatus::Paused, events),
        GameStatus::Paused => set_status(state, GameStatus::Playing, events),
        _ => {}
    }
}

/// Move on from a cleared level
///
/// Score and chain carry over; obstacles and food are laid out again.
pub fn advance_level(
    state: &mut GameState,
    placement: &mut Placement,
    events: &mut Vec<GameEvent>,
) -> Result<(), PlacementError> {
    if state.status != GameStatus::LevelUp {
        return Ok(());
    }

    let config = state.config();
    let obstacles = placement.obstacles(config.obstacle_count, &state.snake)?;
    let food = placement.food(state.snake.iter().chain(obstacles.iter()))?;

    state.level += 1;
    state.obstacles = obstacles;
    state.food = food;
    let speed = state
        .speed_ms
        .saturating_sub(LEVEL_SPEED_STEP_MS)
        .max(config.min_speed_ms);
    set_speed(state, speed, events);
    set_status(state, GameStatus::Playing, events);

    log::info!(
        "Level {} begins (goal {}, {} ms/tick)",
        state.level,
        state.goal(),
        state.speed_ms
    );
    Ok(())
}

/// Return to the menu after a stumble
pub fn acknowledge_game_over(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.status == GameStatus::GameOver {
        set_status(state, GameStatus::Idle, events);
    }
}

fn set_status(state: &mut GameState, to: GameStatus, events: &mut Vec<GameEvent>) {
    let from = state.status;
    if from != to {
        state.status = to;
        events.push(GameEvent::StatusChanged { from, to });
    }
}

fn set_speed(state: &mut GameState, speed_ms: u64, events: &mut Vec<GameEvent>) {
    if state.speed_ms != speed_ms {
        state.speed_ms = speed_ms;
        events.push(GameEvent::SpeedChanged { speed_ms });
    }
}
