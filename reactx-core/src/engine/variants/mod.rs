//! The six mini-games, each a parameterization of the trial engine.

pub mod auditory_simple;
pub mod number_order;
pub mod simon;
pub mod stroop;
pub mod visual_choice;
pub mod visual_simple;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use auditory_simple::{AuditorySimple, Beep, Press};
pub use number_order::{NumberGrid, NumberOrder};
pub use simon::{Simon, SimonSequence};
pub use stroop::{Stroop, StroopCard};
pub use visual_choice::VisualChoice;
pub use visual_simple::{PointerInput, Target, VisualSimple};

pub(crate) const GET_READY_MS: u64 = 1000;
pub(crate) const FEEDBACK_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    White,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::White => "white",
        }
    }

    /// Single-key shortcut: r, g, b, y, w.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'r' => Some(Color::Red),
            'g' => Some(Color::Green),
            'b' => Some(Color::Blue),
            'y' => Some(Color::Yellow),
            'w' => Some(Color::White),
            _ => None,
        }
    }

    pub(crate) fn pick<R: Rng>(palette: &[Color], rng: &mut R) -> Color {
        palette[rng.random_range(0..palette.len())]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let mut chars = s.chars();
        let found = match (chars.next(), chars.next()) {
            (Some(c), None) => Color::from_key(c),
            _ => [Color::Red, Color::Green, Color::Blue, Color::Yellow, Color::White]
                .into_iter()
                .find(|c| c.as_str() == s),
        };
        found.ok_or_else(|| format!("unknown color '{}'", s))
    }
}
