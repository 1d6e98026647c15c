//! Game-variant capability interface and session configuration.
//!
//! Every mini-game is a [`GameVariant`]: it generates stimuli, classifies
//! input against the stimulus on screen, and carries the [`TrialParams`] the
//! engine needs (delay range, false-start policy, pacing).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::trial::FalseStart;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    VisualSimple,
    AuditorySimple,
    VisualChoice,
    Stroop,
    Simon,
    NumberOrder,
}

impl GameType {
    pub const ALL: [GameType; 6] = [
        GameType::VisualSimple,
        GameType::AuditorySimple,
        GameType::VisualChoice,
        GameType::Stroop,
        GameType::Simon,
        GameType::NumberOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::VisualSimple => "visual_simple",
            GameType::AuditorySimple => "auditory_simple",
            GameType::VisualChoice => "visual_choice",
            GameType::Stroop => "stroop",
            GameType::Simon => "simon",
            GameType::NumberOrder => "number_order",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameType::VisualSimple => "Visual Reaction",
            GameType::AuditorySimple => "Auditory Reaction",
            GameType::VisualChoice => "Choice Reaction",
            GameType::Stroop => "Stroop Effect",
            GameType::Simon => "Simon Memory",
            GameType::NumberOrder => "Number Order",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = String;

    /// Accepts the wire name (`visual_simple`) and the kebab-case CLI
    /// spelling (`visual-simple`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        GameType::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| format!("unknown game type '{}'", s.trim()))
    }
}

pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundLimits {
    pub min: u32,
    pub max: u32,
}

impl Default for RoundLimits {
    fn default() -> Self {
        Self {
            min: MIN_ROUNDS,
            max: MAX_ROUNDS,
        }
    }
}

/// Player-chosen session settings. Fixed for the life of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    round_count: u32,
    difficulty: Difficulty,
}

impl SessionConfig {
    pub fn new(round_count: u32, difficulty: Difficulty) -> Result<Self, EngineError> {
        Self::with_limits(round_count, difficulty, RoundLimits::default())
    }

    pub fn with_limits(
        round_count: u32,
        difficulty: Difficulty,
        limits: RoundLimits,
    ) -> Result<Self, EngineError> {
        let min = limits.min.max(MIN_ROUNDS);
        if round_count < min || round_count > limits.max {
            return Err(EngineError::InvalidRoundCount {
                got: round_count,
                min,
                max: limits.max,
            });
        }
        Ok(Self {
            round_count,
            difficulty,
        })
    }

    pub fn round_count(&self) -> u32 {
        self.round_count
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StimulusKind {
    Visual,
    Auditory,
    Color,
    Word,
    Sequence,
    NumberGrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringRule {
    /// Only elapsed time counts; results carry no correctness.
    ElapsedOnly,
    /// Each round is right or wrong against the stimulus category.
    Categorical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialParams {
    /// Inclusive bounds of the uniform onset delay.
    pub delay_range_ms: (u64, u64),
    pub false_start: FalseStart,
    pub stimulus_kind: StimulusKind,
    pub scoring_rule: ScoringRule,
    /// "Get ready" pause before the first round.
    pub lead_in_ms: u64,
    /// Feedback pause between a concluded round and the next one.
    pub inter_round_ms: u64,
}

impl TrialParams {
    pub fn draw_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let (lo, hi) = self.delay_range_ms;
        let ms = if lo >= hi { lo } else { rng.random_range(lo..=hi) };
        Duration::from_millis(ms)
    }
}

/// How a variant judges one input against the stimulus on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not meaningful for this round; nothing changes.
    Ignored,
    /// Accepted, but the round needs more input (sequence tasks).
    Pending,
    /// The round is over.
    Conclude { correct: Option<bool> },
}

pub trait GameVariant: Send {
    type Stimulus: Clone + fmt::Debug + Send + 'static;
    type Input: fmt::Debug + Send + 'static;

    fn game_type(&self) -> GameType;

    fn params(&self) -> &TrialParams;

    /// Produce the stimulus for the next round.
    fn present_stimulus<R: Rng>(&mut self, rng: &mut R) -> Self::Stimulus;

    /// Judge an input received while the stimulus is shown.
    fn classify_input(&mut self, stimulus: &Self::Stimulus, input: &Self::Input) -> Verdict;

    /// Inputs that do not qualify are dropped before any state check, so
    /// they can never count as a false start.
    fn is_qualifying(&self, _input: &Self::Input) -> bool {
        true
    }

    fn onset_delay<R: Rng>(&self, _stimulus: &Self::Stimulus, rng: &mut R) -> Duration {
        self.params().draw_delay(rng)
    }

    /// Whether the host should play the stimulus as a cue while the round
    /// is armed (a sequence to memorise before responding).
    fn cues_during_delay(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_session_config_validates_round_count() {
        assert!(SessionConfig::new(1, Difficulty::Easy).is_ok());
        assert!(SessionConfig::new(50, Difficulty::Hard).is_ok());
        assert_eq!(
            SessionConfig::new(0, Difficulty::Medium),
            Err(EngineError::InvalidRoundCount { got: 0, min: 1, max: 50 })
        );
        assert!(SessionConfig::new(51, Difficulty::Medium).is_err());
    }

    #[test]
    fn test_session_config_custom_limits() {
        let limits = RoundLimits { min: 5, max: 50 };
        assert!(SessionConfig::with_limits(4, Difficulty::Medium, limits).is_err());
        let cfg = SessionConfig::with_limits(5, Difficulty::Hard, limits).unwrap();
        assert_eq!(cfg.round_count(), 5);
        assert_eq!(cfg.difficulty(), Difficulty::Hard);

        // a zero minimum still rejects empty sessions
        let lax = RoundLimits { min: 0, max: 3 };
        assert!(SessionConfig::with_limits(0, Difficulty::Easy, lax).is_err());
    }

    #[test]
    fn test_game_type_parsing() {
        assert_eq!("visual_simple".parse::<GameType>(), Ok(GameType::VisualSimple));
        assert_eq!("number-order".parse::<GameType>(), Ok(GameType::NumberOrder));
        assert_eq!(" Stroop ".parse::<GameType>(), Ok(GameType::Stroop));
        assert!("tetris".parse::<GameType>().is_err());
        for g in GameType::ALL {
            assert_eq!(g.as_str().parse::<GameType>(), Ok(g));
        }
    }

    #[test]
    fn test_game_type_wire_names() {
        let json = serde_json::to_string(&GameType::AuditorySimple).unwrap();
        assert_eq!(json, "\"auditory_simple\"");
        let d: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_draw_delay_stays_in_bounds() {
        let params = TrialParams {
            delay_range_ms: (1000, 4000),
            false_start: FalseStart::Ignore,
            stimulus_kind: StimulusKind::Visual,
            scoring_rule: ScoringRule::ElapsedOnly,
            lead_in_ms: 0,
            inter_round_ms: 0,
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let d = params.draw_delay(&mut rng).as_millis();
            assert!((1000..=4000).contains(&d));
        }

        let fixed = TrialParams {
            delay_range_ms: (600, 600),
            ..params
        };
        assert_eq!(fixed.draw_delay(&mut rng), Duration::from_millis(600));
    }
}
