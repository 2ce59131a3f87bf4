//! Built-in pilot for demo and headless runs
//!
//! Greedy: among the steps that do not end the race, take the one closest
//! to the food, breaking ties by how much room the landing cell leaves.

use super::state::{Direction, GameState, GameStatus, Point};

/// Pick a heading for the next tick, `None` when nothing is safe
pub fn steer(state: &GameState) -> Option<Direction> {
    if state.status != GameStatus::Playing {
        return None;
    }

    let head = state.head();
    Direction::ALL
        .into_iter()
        .filter(|dir| !dir.is_opposite(state.direction))
        .map(|dir| (dir, head.step(dir)))
        .filter(|(_, cell)| !state.is_fatal(*cell))
        .min_by_key(|(dir, cell)| {
            (
                cell.manhattan(state.food),
                std::cmp::Reverse(room(state, *cell)),
                // Prefer holding course when everything else is equal
                *dir != state.direction,
            )
        })
        .map(|(dir, _)| dir)
}

fn room(state: &GameState, cell: Point) -> usize {
    Direction::ALL
        .into_iter()
        .filter(|dir| !state.is_fatal(cell.step(*dir)))
        .count()
}
