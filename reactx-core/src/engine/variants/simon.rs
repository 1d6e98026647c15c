use std::time::Duration;

use rand::Rng;

use super::{Color, FEEDBACK_MS};
use crate::engine::trial::FalseStart;
use crate::engine::variant::{
    Difficulty, GameType, GameVariant, ScoringRule, StimulusKind, TrialParams, Verdict,
};

pub const PALETTE: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];

pub const PLAYBACK_LEAD_MS: u64 = 500;
pub const FLASH_GAP_MS: u64 = 100;

/// The whole sequence to replay this round; one color longer than the last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimonSequence {
    pub colors: Vec<Color>,
    pub flash_ms: u64,
}

impl SimonSequence {
    /// Time from round start until the last flash has faded.
    pub fn playback_duration(&self) -> Duration {
        let per_flash = self.flash_ms + FLASH_GAP_MS;
        Duration::from_millis(PLAYBACK_LEAD_MS + per_flash * self.colors.len() as u64)
    }
}

/// Watch a growing color sequence, then repeat it. Timing starts when the
/// playback ends; a wrong press ends the round as incorrect.
#[derive(Debug, Clone)]
pub struct Simon {
    params: TrialParams,
    flash_ms: u64,
    sequence: Vec<Color>,
    progress: usize,
}

impl Simon {
    pub fn new(difficulty: Difficulty) -> Self {
        let flash_ms = match difficulty {
            Difficulty::Easy => 800,
            Difficulty::Medium => 600,
            Difficulty::Hard => 400,
        };
        Self {
            params: TrialParams {
                delay_range_ms: (PLAYBACK_LEAD_MS, PLAYBACK_LEAD_MS),
                false_start: FalseStart::Ignore,
                stimulus_kind: StimulusKind::Sequence,
                scoring_rule: ScoringRule::Categorical,
                lead_in_ms: 0,
                inter_round_ms: FEEDBACK_MS,
            },
            flash_ms,
            sequence: Vec::new(),
            progress: 0,
        }
    }

    pub fn flash_ms(&self) -> u64 {
        self.flash_ms
    }
}

impl GameVariant for Simon {
    type Stimulus = SimonSequence;
    type Input = Color;

    fn game_type(&self) -> GameType {
        GameType::Simon
    }

    fn params(&self) -> &TrialParams {
        &self.params
    }

    fn present_stimulus<R: Rng>(&mut self, rng: &mut R) -> SimonSequence {
        self.sequence.push(Color::pick(&PALETTE, rng));
        self.progress = 0;
        SimonSequence {
            colors: self.sequence.clone(),
            flash_ms: self.flash_ms,
        }
    }

    fn classify_input(&mut self, stimulus: &SimonSequence, input: &Color) -> Verdict {
        match stimulus.colors.get(self.progress) {
            Some(expected) if expected == input => {
                self.progress += 1;
                if self.progress == stimulus.colors.len() {
                    Verdict::Conclude { correct: Some(true) }
                } else {
                    Verdict::Pending
                }
            }
            Some(_) => Verdict::Conclude { correct: Some(false) },
            None => Verdict::Ignored,
        }
    }

    fn is_qualifying(&self, input: &Color) -> bool {
        PALETTE.contains(input)
    }

    fn onset_delay<R: Rng>(&self, stimulus: &SimonSequence, _rng: &mut R) -> Duration {
        stimulus.playback_duration()
    }

    fn cues_during_delay(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sequence_grows_each_round() {
        let mut game = Simon::new(Difficulty::Medium);
        let mut rng = StdRng::seed_from_u64(5);
        let first = game.present_stimulus(&mut rng);
        let second = game.present_stimulus(&mut rng);
        let third = game.present_stimulus(&mut rng);
        assert_eq!(first.colors.len(), 1);
        assert_eq!(second.colors.len(), 2);
        assert_eq!(third.colors.len(), 3);
        assert_eq!(&third.colors[..2], &second.colors[..]);
    }

    #[test]
    fn test_onset_waits_for_playback() {
        let game = Simon::new(Difficulty::Hard);
        let seq = SimonSequence {
            colors: vec![Color::Red, Color::Blue, Color::Green],
            flash_ms: 400,
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            game.onset_delay(&seq, &mut rng),
            Duration::from_millis(500 + 3 * 500)
        );
    }

    #[test]
    fn test_correct_replay_concludes_after_last_color() {
        let mut game = Simon::new(Difficulty::Easy);
        let seq = SimonSequence {
            colors: vec![Color::Red, Color::Yellow],
            flash_ms: 800,
        };
        assert_eq!(game.classify_input(&seq, &Color::Red), Verdict::Pending);
        assert_eq!(
            game.classify_input(&seq, &Color::Yellow),
            Verdict::Conclude { correct: Some(true) }
        );
    }

    #[test]
    fn test_wrong_press_fails_the_round() {
        let mut game = Simon::new(Difficulty::Easy);
        let seq = SimonSequence {
            colors: vec![Color::Green, Color::Green],
            flash_ms: 800,
        };
        assert_eq!(game.classify_input(&seq, &Color::Green), Verdict::Pending);
        assert_eq!(
            game.classify_input(&seq, &Color::Blue),
            Verdict::Conclude { correct: Some(false) }
        );
    }

    #[test]
    fn test_white_is_not_a_simon_pad() {
        let game = Simon::new(Difficulty::Medium);
        assert!(!game.is_qualifying(&Color::White));
        assert!(game.is_qualifying(&Color::Yellow));
    }
}
