pub mod leaderboard;
pub mod score;
pub mod user;

pub use leaderboard::LeaderboardEntry;
pub use score::GameScore;
pub use user::{NewUser, StoredUser, User};
