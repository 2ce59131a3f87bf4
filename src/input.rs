//! Key to command mapping

use crate::sim::Direction;

/// A discrete request from the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Turn(Direction),
    TogglePause,
}

/// Map a key name (browser `KeyboardEvent.key` style) to a command
pub fn map_key(key: &str) -> Option<InputCommand> {
    let command = match key {
        "ArrowUp" | "w" => InputCommand::Turn(Direction::Up),
        "ArrowDown" | "s" => InputCommand::Turn(Direction::Down),
        "ArrowLeft" | "a" => InputCommand::Turn(Direction::Left),
        "ArrowRight" | "d" => InputCommand::Turn(Direction::Right),
        " " => InputCommand::TogglePause,
        _ => return None,
    };
    Some(command)
}
