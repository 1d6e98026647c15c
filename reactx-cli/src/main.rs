//! reactx: play reactX reaction-time games in the terminal
//!
//! # Subcommands
//! - `play <game> [-d <difficulty>] [-r <rounds>] [--no-submit]`: run a session, then submit it
//! - `leaderboard [--game <g>] [--difficulty <d>] [--json]`: top scores
//! - `register <email> <username> --password <pw>`: create an account, print the token
//! - `login <email> --password <pw>`: print a fresh token
//! - `scores [--json]`: your score history
//! - `status`: server health
//!
//! Round bounds come from the `[game]` section of `--config` (default `reactx.toml`).

mod play;

use clap::{Parser, Subcommand};
use reactx_core::api::{LeaderboardFilter, RegisterRequest, ScoreSubmission};
use reactx_core::config::GameConfig;
use reactx_core::models::{GameScore, LeaderboardEntry};
use reactx_core::{ApiClient, Difficulty, GameType, SessionConfig, SessionOutcome, SessionSummary};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "reactx", version, about = "reactX reaction-time games and leaderboard")]
struct Cli {
    /// reactX API URL (overrides REACTX_HTTP_URL env var)
    #[arg(long, env = "REACTX_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Bearer token from `register` or `login`
    #[arg(long, env = "REACTX_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Config file; only its `[game]` section is read
    #[arg(short, long, env = "REACTX_CONFIG", default_value = "reactx.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play one session of a game
    Play {
        /// visual-simple, auditory-simple, visual-choice, stroop, simon, number-order
        game: GameType,

        #[arg(short, long, default_value_t = Difficulty::Medium)]
        difficulty: Difficulty,

        /// Number of rounds
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Keep the result local
        #[arg(long)]
        no_submit: bool,
    },

    /// Show the leaderboard
    Leaderboard {
        #[arg(long)]
        game: Option<GameType>,

        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account
    Register {
        email: String,
        username: String,

        #[arg(long, env = "REACTX_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long, default_value = "avatar1")]
        avatar: String,
    },

    /// Log in and print a token
    Login {
        email: String,

        #[arg(long, env = "REACTX_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show your score history
    Scores {
        #[arg(long)]
        json: bool,
    },

    /// Show reactX server status
    Status,
}

// ============================================================================
// Output helpers
// ============================================================================

pub fn format_summary(summary: &SessionSummary) -> String {
    match summary.average_accuracy {
        Some(acc) => format!(
            "Average: {} ms, accuracy {:.0}%",
            summary.score_time_ms(),
            acc * 100.0
        ),
        None => format!("Average: {} ms", summary.score_time_ms()),
    }
}

fn accuracy_cell(acc: Option<f64>) -> String {
    acc.map(|a| format!("{:.0}%", a * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_leaderboard(rows: &[LeaderboardEntry]) -> String {
    if rows.is_empty() {
        return "No scores yet.".to_string();
    }
    rows.iter()
        .map(|r| {
            format!(
                "{:>3}. {:<20} {:>6} ms  {:>4}  {} ({})",
                r.rank,
                r.username,
                r.avg_score_time_ms,
                accuracy_cell(r.avg_accuracy),
                r.game_type,
                r.difficulty
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_scores(rows: &[GameScore]) -> String {
    if rows.is_empty() {
        return "No scores yet.".to_string();
    }
    rows.iter()
        .map(|s| {
            format!(
                "{}  {:<16} {:<7} {:>6} ms  {:>4}",
                s.created_at.format("%Y-%m-%d %H:%M"),
                s.game_type,
                s.difficulty,
                s.avg_score_time_ms,
                accuracy_cell(s.avg_accuracy)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Commands
// ============================================================================

async fn do_play(
    client: &ApiClient,
    game_config: &GameConfig,
    game: GameType,
    difficulty: Difficulty,
    rounds: Option<u32>,
    submit: bool,
) -> anyhow::Result<()> {
    let rounds = rounds.unwrap_or(game_config.default_rounds);
    let config = SessionConfig::with_limits(rounds, difficulty, game_config.limits())?;

    let summary = match play::play_game(game, config).await? {
        SessionOutcome::Completed { summary, .. } => summary,
        SessionOutcome::Cancelled { rounds_completed } => {
            println!("Session cancelled after {} rounds; nothing submitted.", rounds_completed);
            return Ok(());
        }
    };

    println!("{}", format_summary(&summary));
    if !submit {
        return Ok(());
    }

    let submission = ScoreSubmission::from_summary(game, difficulty, &summary);
    match client.submit_score(&submission).await {
        Ok(row) => println!("Score saved ({}).", row.id),
        Err(e) => {
            tracing::warn!(error = %e, game = %game, "score submission failed");
            eprintln!("reactx: could not save score: {}", e);
        }
    }
    Ok(())
}

async fn do_leaderboard(
    client: &ApiClient,
    game: Option<GameType>,
    difficulty: Option<Difficulty>,
    json: bool,
) -> anyhow::Result<()> {
    let rows = client
        .leaderboard(LeaderboardFilter {
            game_type: game,
            difficulty,
        })
        .await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{}", format_leaderboard(&rows));
    }
    Ok(())
}

async fn do_status(client: &ApiClient) -> anyhow::Result<()> {
    let body = client.health().await?;
    println!("reactX server: {}", body["status"].as_str().unwrap_or("unknown"));
    println!("Version:       {}", body["version"].as_str().unwrap_or("?"));
    println!("Store:         {}", body["store"].as_str().unwrap_or("?"));
    if let Some(detail) = body["detail"].as_str() {
        println!("Detail:        {}", detail);
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // warnings only, so game output stays readable
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let cli = Cli::parse();

    let client = match ApiClient::new(cli.server.as_str()) {
        Ok(c) => c.with_token(cli.token),
        Err(e) => {
            eprintln!("reactx: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Play {
            game,
            difficulty,
            rounds,
            no_submit,
        } => match GameConfig::load(&cli.config) {
            Ok(game_config) => do_play(&client, &game_config, game, difficulty, rounds, !no_submit).await,
            Err(e) => Err(anyhow::anyhow!("failed to load config from {}: {}", cli.config, e)),
        },
        Commands::Leaderboard {
            game,
            difficulty,
            json,
        } => do_leaderboard(&client, game, difficulty, json).await,
        Commands::Register {
            email,
            username,
            password,
            avatar,
        } => {
            let req = RegisterRequest {
                email: Some(email),
                username: Some(username),
                password: Some(password),
                avatar_key: Some(avatar),
            };
            client.register(&req).await.map(|r| {
                eprintln!("{}", r.message);
                println!("{}", r.token);
            }).map_err(Into::into)
        }
        Commands::Login { email, password } => client
            .login(&email, &password)
            .await
            .map(|r| {
                eprintln!("{} Welcome, {}.", r.message, r.user.username);
                println!("{}", r.token);
            })
            .map_err(Into::into),
        Commands::Scores { json } => match client.my_scores().await {
            Ok(rows) if json => serde_json::to_string_pretty(&rows)
                .map(|s| println!("{}", s))
                .map_err(Into::into),
            Ok(rows) => {
                println!("{}", format_scores(&rows));
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
        Commands::Status => do_status(&client).await,
    };

    if let Err(e) = result {
        eprintln!("reactx: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
