use rand::Rng;

use super::{Color, FEEDBACK_MS, GET_READY_MS};
use crate::engine::trial::FalseStart;
use crate::engine::variant::{
    Difficulty, GameType, GameVariant, ScoringRule, StimulusKind, TrialParams, Verdict,
};

pub const PALETTE: [Color; 5] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::White,
];
pub const FALSE_START_PENALTY_MS: u64 = 5000;

/// A color word printed in a different ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StroopCard {
    pub word: Color,
    pub ink: Color,
}

/// Name the ink, not the word.
#[derive(Debug, Clone)]
pub struct Stroop {
    params: TrialParams,
}

impl Stroop {
    pub fn new(_difficulty: Difficulty) -> Self {
        Self {
            params: TrialParams {
                delay_range_ms: (1000, 1000),
                false_start: FalseStart::Penalize {
                    penalty_ms: FALSE_START_PENALTY_MS,
                    correct: Some(false),
                },
                stimulus_kind: StimulusKind::Word,
                scoring_rule: ScoringRule::Categorical,
                lead_in_ms: GET_READY_MS,
                inter_round_ms: FEEDBACK_MS,
            },
        }
    }
}

impl GameVariant for Stroop {
    type Stimulus = StroopCard;
    type Input = Color;

    fn game_type(&self) -> GameType {
        GameType::Stroop
    }

    fn params(&self) -> &TrialParams {
        &self.params
    }

    fn present_stimulus<R: Rng>(&mut self, rng: &mut R) -> StroopCard {
        let word = Color::pick(&PALETTE, rng);
        let mut ink = Color::pick(&PALETTE, rng);
        while ink == word {
            ink = Color::pick(&PALETTE, rng);
        }
        StroopCard { word, ink }
    }

    fn classify_input(&mut self, stimulus: &StroopCard, input: &Color) -> Verdict {
        Verdict::Conclude {
            correct: Some(*input == stimulus.ink),
        }
    }
}
