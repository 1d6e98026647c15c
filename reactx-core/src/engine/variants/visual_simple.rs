use rand::Rng;

use super::{FEEDBACK_MS, GET_READY_MS};
use crate::engine::trial::FalseStart;
use crate::engine::variant::{
    Difficulty, GameType, GameVariant, ScoringRule, StimulusKind, TrialParams, Verdict,
};

pub const FALSE_START_PENALTY_MS: u64 = 5000;

/// A round target placed somewhere in the play area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Offset from the top-left corner, in percent of the play area.
    pub x_pct: f32,
    pub y_pct: f32,
    pub size_px: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerInput {
    Target,
    Background,
}

/// Click the target as soon as it appears. Clicking anywhere before it
/// shows up is a false start.
#[derive(Debug, Clone)]
pub struct VisualSimple {
    difficulty: Difficulty,
    params: TrialParams,
}

impl VisualSimple {
    pub fn new(difficulty: Difficulty) -> Self {
        let delay_range_ms = match difficulty {
            Difficulty::Easy => (1000, 4000),
            Difficulty::Medium => (1000, 3500),
            Difficulty::Hard => (750, 3000),
        };
        Self {
            difficulty,
            params: TrialParams {
                delay_range_ms,
                false_start: FalseStart::Penalize {
                    penalty_ms: FALSE_START_PENALTY_MS,
                    correct: None,
                },
                stimulus_kind: StimulusKind::Visual,
                scoring_rule: ScoringRule::ElapsedOnly,
                lead_in_ms: GET_READY_MS,
                inter_round_ms: FEEDBACK_MS,
            },
        }
    }

    pub fn target_size_px(&self) -> u32 {
        match self.difficulty {
            Difficulty::Easy => 70,
            Difficulty::Medium => 50,
            Difficulty::Hard => 30,
        }
    }
}

impl GameVariant for VisualSimple {
    type Stimulus = Target;
    type Input = PointerInput;

    fn game_type(&self) -> GameType {
        GameType::VisualSimple
    }

    fn params(&self) -> &TrialParams {
        &self.params
    }

    fn present_stimulus<R: Rng>(&mut self, rng: &mut R) -> Target {
        Target {
            x_pct: rng.random_range(0.0..80.0),
            y_pct: rng.random_range(0.0..80.0),
            size_px: self.target_size_px(),
        }
    }

    fn classify_input(&mut self, _stimulus: &Target, input: &PointerInput) -> Verdict {
        match input {
            PointerInput::Target => Verdict::Conclude { correct: None },
            PointerInput::Background => Verdict::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_target_size_shrinks_with_difficulty() {
        let sizes: Vec<u32> = Difficulty::ALL
            .iter()
            .map(|d| VisualSimple::new(*d).target_size_px())
            .collect();
        assert_eq!(sizes, vec![70, 50, 30]);
    }

    #[test]
    fn test_targets_stay_in_play_area() {
        let mut game = VisualSimple::new(Difficulty::Medium);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let t = game.present_stimulus(&mut rng);
            assert!((0.0..80.0).contains(&t.x_pct));
            assert!((0.0..80.0).contains(&t.y_pct));
            assert_eq!(t.size_px, 50);
        }
    }

    #[test]
    fn test_only_target_click_concludes() {
        let mut game = VisualSimple::new(Difficulty::Easy);
        let target = Target {
            x_pct: 10.0,
            y_pct: 10.0,
            size_px: 70,
        };
        assert_eq!(
            game.classify_input(&target, &PointerInput::Target),
            Verdict::Conclude { correct: None }
        );
        assert_eq!(
            game.classify_input(&target, &PointerInput::Background),
            Verdict::Ignored
        );
    }
}
