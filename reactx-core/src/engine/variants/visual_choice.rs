use rand::Rng;

use super::{Color, FEEDBACK_MS, GET_READY_MS};
use crate::engine::trial::FalseStart;
use crate::engine::variant::{
    Difficulty, GameType, GameVariant, ScoringRule, StimulusKind, TrialParams, Verdict,
};

pub const PALETTE: [Color; 3] = [Color::Red, Color::Green, Color::Blue];
pub const FALSE_START_PENALTY_MS: u64 = 5000;

/// A color swatch appears; press its key (R, G or B).
#[derive(Debug, Clone)]
pub struct VisualChoice {
    params: TrialParams,
}

impl VisualChoice {
    pub fn new(_difficulty: Difficulty) -> Self {
        Self {
            params: TrialParams {
                delay_range_ms: (1000, 1000),
                false_start: FalseStart::Penalize {
                    penalty_ms: FALSE_START_PENALTY_MS,
                    correct: Some(false),
                },
                stimulus_kind: StimulusKind::Color,
                scoring_rule: ScoringRule::Categorical,
                lead_in_ms: GET_READY_MS,
                inter_round_ms: FEEDBACK_MS,
            },
        }
    }
}

impl GameVariant for VisualChoice {
    type Stimulus = Color;
    type Input = char;

    fn game_type(&self) -> GameType {
        GameType::VisualChoice
    }

    fn params(&self) -> &TrialParams {
        &self.params
    }

    fn present_stimulus<R: Rng>(&mut self, rng: &mut R) -> Color {
        Color::pick(&PALETTE, rng)
    }

    fn classify_input(&mut self, stimulus: &Color, input: &char) -> Verdict {
        match Color::from_key(*input) {
            Some(pressed) if PALETTE.contains(&pressed) => Verdict::Conclude {
                correct: Some(pressed == *stimulus),
            },
            _ => Verdict::Ignored,
        }
    }

    fn is_qualifying(&self, input: &char) -> bool {
        Color::from_key(*input).is_some_and(|c| PALETTE.contains(&c))
    }
}
