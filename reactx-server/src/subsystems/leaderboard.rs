use reactx_core::api::LeaderboardQuery;
use reactx_core::models::LeaderboardEntry;
use reactx_core::Store;

use crate::error::ApiError;

pub async fn top_scores(
    store: &dyn Store,
    query: LeaderboardQuery,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, ApiError> {
    let filter = query.parse()?;
    Ok(store.leaderboard(filter, limit).await?)
}
