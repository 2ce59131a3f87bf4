//! Read-only frame consumers
//!
//! The driver hands every sink a shared reference after each tick or state
//! change. Sinks never mutate the game.

use std::io::Write;

use crate::consts::GRID_SIZE;
use crate::sim::{GameState, GameStatus, Point};

pub trait FrameSink {
    fn present(&mut self, state: &GameState);
}

impl<T: FrameSink + ?Sized> FrameSink for Box<T> {
    fn present(&mut self, state: &GameState) {
        (**self).present(state);
    }
}

/// Ignores every frame
#[derive(Debug, Default)]
pub struct NullFrameSink;

impl FrameSink for NullFrameSink {
    fn present(&mut self, _state: &GameState) {}
}

/// Draw the grid as text, one row per line
///
/// `H` head, `o` body, `*` food, `#` obstacle, `.` empty.
pub fn ascii_frame(state: &GameState) -> String {
    let mut out = String::with_capacity(((GRID_SIZE + 1) * GRID_SIZE) as usize + 64);
    out.push_str(&format!(
        "LEVEL {}  SCORE {}  GOAL {}  BEST {}  [{:?}]\n",
        state.level,
        state.score,
        state.goal(),
        state.high_score,
        state.status
    ));

    let head = state.head();
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            let p = Point::new(x, y);
            let glyph = if p == head {
                'H'
            } else if state.is_on_snake(p) {
                'o'
            } else if state.is_obstacle(p) {
                '#'
            } else if p == state.food && state.status != GameStatus::Idle {
                '*'
            } else {
                '.'
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// Writes [`ascii_frame`] output to any writer
pub struct AsciiFrameSink<W: Write> {
    out: W,
}

impl<W: Write> AsciiFrameSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for AsciiFrameSink<W> {
    fn present(&mut self, state: &GameState) {
        if let Err(err) = self.out.write_all(ascii_frame(state).as_bytes()) {
            log::warn!("Frame dropped: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        let mut state = GameState::new(0);
        state.status = GameStatus::Playing;
        state.obstacles = vec![Point::new(0, 0)];
        let frame = ascii_frame(&state);
        let rows: Vec<&str> = frame.lines().skip(1).collect();

        assert_eq!(rows.len(), GRID_SIZE as usize);
        assert!(rows.iter().all(|r| r.len() == GRID_SIZE as usize));
        assert_eq!(rows[0].chars().next(), Some('#'));
        assert_eq!(rows[5].chars().nth(5), Some('*'));
        assert_eq!(rows[10].chars().nth(10), Some('H'));
        assert_eq!(rows[12].chars().nth(10), Some('o'));
    }

    #[test]
    fn test_ascii_sink_writes() {
        let mut sink = AsciiFrameSink::new(Vec::new());
        sink.present(&GameState::new(0));
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert!(written.starts_with("LEVEL 1"));
    }
}
