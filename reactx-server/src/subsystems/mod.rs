pub mod accounts;
pub mod leaderboard;
pub mod scores;
