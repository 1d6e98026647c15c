//! Request and response bodies shared by the server and the HTTP client.
//!
//! Incoming bodies keep every field optional so handlers can answer a
//! missing field with a 400 and a message instead of a body rejection.

use serde::{Deserialize, Serialize};

use crate::engine::{Difficulty, GameType, SessionSummary};
use crate::error::ReactxError;
use crate::models::User;

pub const MIN_PASSWORD_LEN: usize = 6;

/// A validated score ready to store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub game_type: GameType,
    pub difficulty: Difficulty,
    pub avg_score_time_ms: i64,
    pub avg_accuracy: Option<f64>,
}

impl ScoreSubmission {
    pub fn from_summary(game_type: GameType, difficulty: Difficulty, summary: &SessionSummary) -> Self {
        Self {
            game_type,
            difficulty,
            avg_score_time_ms: summary.score_time_ms(),
            avg_accuracy: summary.average_accuracy,
        }
    }

    pub fn validate(&self) -> Result<(), ReactxError> {
        if self.avg_score_time_ms <= 0 {
            return Err(ReactxError::Validation(
                "avg_score_time_ms must be a positive integer".to_string(),
            ));
        }
        if let Some(acc) = self.avg_accuracy {
            if !(0.0..=1.0).contains(&acc) {
                return Err(ReactxError::Validation(
                    "avg_accuracy must be between 0 and 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Raw `POST /api/scores` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreRequest {
    pub game_type: Option<String>,
    pub difficulty: Option<String>,
    pub avg_score_time_ms: Option<i64>,
    pub avg_accuracy: Option<f64>,
}

impl ScoreRequest {
    pub fn parse(self) -> Result<ScoreSubmission, ReactxError> {
        let game_type = match self.game_type.as_deref() {
            Some(g) if !g.trim().is_empty() => g.parse::<GameType>().map_err(ReactxError::Validation)?,
            _ => return Err(ReactxError::Validation("game_type is required".to_string())),
        };
        let difficulty = match self.difficulty.as_deref() {
            Some(d) if !d.trim().is_empty() => d.parse::<Difficulty>().map_err(ReactxError::Validation)?,
            _ => return Err(ReactxError::Validation("difficulty is required".to_string())),
        };
        let avg_score_time_ms = self
            .avg_score_time_ms
            .ok_or_else(|| ReactxError::Validation("avg_score_time_ms is required".to_string()))?;

        let submission = ScoreSubmission {
            game_type,
            difficulty,
            avg_score_time_ms,
            avg_accuracy: self.avg_accuracy,
        };
        submission.validate()?;
        Ok(submission)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub avatar_key: Option<String>,
}

/// Register fields after presence and length checks.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar_key: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, ReactxError> {
        let (Some(email), Some(username), Some(password), Some(avatar_key)) = (
            non_empty(self.email),
            non_empty(self.username),
            self.password.filter(|p| !p.is_empty()),
            non_empty(self.avatar_key),
        ) else {
            return Err(ReactxError::Validation("All fields are required.".to_string()));
        };
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ReactxError::Validation(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(Registration {
            email,
            username,
            password,
            avatar_key,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(self) -> Result<(String, String), ReactxError> {
        match (non_empty(self.email), self.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(ReactxError::Validation(
                "Email and password are required.".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

/// `PATCH /api/users/me` body. At least one field must be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_key: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(self) -> Result<Self, ReactxError> {
        let update = Self {
            username: non_empty(self.username),
            avatar_key: non_empty(self.avatar_key),
        };
        if update.username.is_none() && update.avatar_key.is_none() {
            return Err(ReactxError::Validation("No fields to update.".to_string()));
        }
        Ok(update)
    }
}

/// `GET /api/leaderboard` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub game: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaderboardFilter {
    pub game_type: Option<GameType>,
    pub difficulty: Option<Difficulty>,
}

impl LeaderboardQuery {
    pub fn parse(self) -> Result<LeaderboardFilter, ReactxError> {
        let game_type = non_empty(self.game)
            .map(|g| g.parse::<GameType>())
            .transpose()
            .map_err(ReactxError::Validation)?;
        let difficulty = non_empty(self.difficulty)
            .map(|d| d.parse::<Difficulty>())
            .transpose()
            .map_err(ReactxError::Validation)?;
        Ok(LeaderboardFilter {
            game_type,
            difficulty,
        })
    }
}

impl From<LeaderboardFilter> for LeaderboardQuery {
    fn from(filter: LeaderboardFilter) -> Self {
        Self {
            game: filter.game_type.map(|g| g.as_str().to_string()),
            difficulty: filter.difficulty.map(|d| d.as_str().to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(game: &str, difficulty: &str, ms: Option<i64>, acc: Option<f64>) -> ScoreRequest {
        ScoreRequest {
            game_type: Some(game.to_string()),
            difficulty: Some(difficulty.to_string()),
            avg_score_time_ms: ms,
            avg_accuracy: acc,
        }
    }

    #[test]
    fn test_score_request_accepts_valid_body() {
        let s = score("visual_choice", "hard", Some(216), Some(2.0 / 3.0))
            .parse()
            .unwrap();
        assert_eq!(s.game_type, GameType::VisualChoice);
        assert_eq!(s.difficulty, Difficulty::Hard);
        assert_eq!(s.avg_score_time_ms, 216);
    }

    #[test]
    fn test_score_request_rejections() {
        assert!(score("tetris", "easy", Some(200), None).parse().is_err());
        assert!(score("stroop", "insane", Some(200), None).parse().is_err());
        assert!(score("stroop", "easy", None, None).parse().is_err());
        assert!(score("stroop", "easy", Some(0), None).parse().is_err());
        assert!(score("stroop", "easy", Some(300), Some(1.5)).parse().is_err());
        assert!(score("stroop", "easy", Some(300), Some(-0.1)).parse().is_err());
        assert!(ScoreRequest::default().parse().is_err());
    }

    #[test]
    fn test_submission_from_summary_floors_time() {
        let summary = SessionSummary {
            average_time_ms: 216.67,
            average_accuracy: Some(0.667),
        };
        let s = ScoreSubmission::from_summary(GameType::Stroop, Difficulty::Easy, &summary);
        assert_eq!(s.avg_score_time_ms, 216);
        assert_eq!(s.avg_accuracy, Some(0.667));

        let json = serde_json::to_value(s).unwrap();
        assert_eq!(json["game_type"], "stroop");
        assert_eq!(json["difficulty"], "easy");
        assert_eq!(json["avg_score_time_ms"], 216);
    }

    #[test]
    fn test_register_validation() {
        let ok = RegisterRequest {
            email: Some("a@b.c".into()),
            username: Some("ann".into()),
            password: Some("secret".into()),
            avatar_key: Some("avatar2".into()),
        };
        assert!(ok.clone().validate().is_ok());

        let short = RegisterRequest {
            password: Some("12345".into()),
            ..ok.clone()
        };
        assert!(short.validate().is_err());

        let missing = RegisterRequest {
            username: Some("  ".into()),
            ..ok
        };
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_profile_update_needs_a_field() {
        assert!(ProfileUpdate::default().validate().is_err());
        let u = ProfileUpdate {
            username: None,
            avatar_key: Some("avatar3".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(u.avatar_key.as_deref(), Some("avatar3"));
    }

    #[test]
    fn test_leaderboard_query_parsing() {
        let f = LeaderboardQuery {
            game: Some("simon".into()),
            difficulty: None,
        }
        .parse()
        .unwrap();
        assert_eq!(f.game_type, Some(GameType::Simon));
        assert_eq!(f.difficulty, None);

        assert_eq!(LeaderboardQuery::default().parse().unwrap(), LeaderboardFilter::default());
        assert!(LeaderboardQuery {
            game: Some("pong".into()),
            difficulty: None
        }
        .parse()
        .is_err());
    }
}
