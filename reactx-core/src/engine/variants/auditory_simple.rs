use rand::Rng;

use super::GET_READY_MS;
use crate::engine::trial::FalseStart;
use crate::engine::variant::{
    Difficulty, GameType, GameVariant, ScoringRule, StimulusKind, TrialParams, Verdict,
};

pub const FALSE_START_PENALTY_MS: u64 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beep {
    pub frequency_hz: u32,
    pub duration_ms: u64,
}

/// Any press counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Press;

/// React to a short tone played after 2 to 5 seconds of silence.
#[derive(Debug, Clone)]
pub struct AuditorySimple {
    params: TrialParams,
}

impl AuditorySimple {
    pub fn new(_difficulty: Difficulty) -> Self {
        Self {
            params: TrialParams {
                delay_range_ms: (2000, 5000),
                false_start: FalseStart::Penalize {
                    penalty_ms: FALSE_START_PENALTY_MS,
                    correct: None,
                },
                stimulus_kind: StimulusKind::Auditory,
                scoring_rule: ScoringRule::ElapsedOnly,
                lead_in_ms: GET_READY_MS,
                inter_round_ms: 2000,
            },
        }
    }
}

impl GameVariant for AuditorySimple {
    type Stimulus = Beep;
    type Input = Press;

    fn game_type(&self) -> GameType {
        GameType::AuditorySimple
    }

    fn params(&self) -> &TrialParams {
        &self.params
    }

    fn present_stimulus<R: Rng>(&mut self, _rng: &mut R) -> Beep {
        Beep {
            frequency_hz: 880,
            duration_ms: 100,
        }
    }

    fn classify_input(&mut self, _stimulus: &Beep, _input: &Press) -> Verdict {
        Verdict::Conclude { correct: None }
    }
}
