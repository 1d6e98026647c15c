use reactx_core::api::ScoreRequest;
use reactx_core::models::GameScore;
use reactx_core::Store;
use uuid::Uuid;

use crate::error::ApiError;

/// Validate and store one finished session for `user_id`.
pub async fn submit(store: &dyn Store, user_id: Uuid, req: ScoreRequest) -> Result<GameScore, ApiError> {
    let submission = req.parse()?;
    let row = store.create_score(user_id, &submission).await?;
    tracing::info!(
        user_id = %user_id,
        game = %submission.game_type,
        difficulty = %submission.difficulty,
        avg_score_time_ms = submission.avg_score_time_ms,
        "score stored"
    );
    Ok(row)
}

pub async fn history(store: &dyn Store, user_id: Uuid) -> Result<Vec<GameScore>, ApiError> {
    Ok(store.scores_for_user(user_id).await?)
}
