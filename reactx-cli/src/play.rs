//! Terminal host for a game session.
//!
//! Stimuli are printed to stdout; each line typed on stdin is parsed into
//! zero or more inputs for the running session. Ctrl+C cancels the session.

use std::future::Future;
use std::io::BufRead;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use reactx_core::engine::variants::{
    AuditorySimple, Beep, Color, NumberGrid, NumberOrder, PointerInput, Press, Simon,
    SimonSequence, Stroop, StroopCard, Target, VisualChoice, VisualSimple,
};
use reactx_core::engine::variants::simon::{FLASH_GAP_MS, PLAYBACK_LEAD_MS};
use reactx_core::{
    spawn_session, GameType, GameVariant, Session, SessionConfig, SessionEvent, SessionOutcome,
};
use tokio::sync::mpsc;

/// How a stimulus looks in the terminal.
pub trait Render {
    fn render(&self) -> String;

    /// Frames played while the round is armed, each held for its duration.
    fn cue_frames(&self) -> Vec<(String, Duration)> {
        Vec::new()
    }
}

/// How one stdin line becomes session inputs.
pub trait ParseInput: Sized {
    fn parse_line(line: &str) -> Vec<Self>;
}

fn paint(color: Color, text: &str) -> String {
    let code = match color {
        Color::Red => 31,
        Color::Green => 32,
        Color::Yellow => 33,
        Color::Blue => 34,
        Color::White => 37,
    };
    format!("\x1b[1;{}m{}\x1b[0m", code, text)
}

impl Render for Target {
    fn render(&self) -> String {
        format!(
            "● TARGET at ({:.0}%, {:.0}%), {}px. Press Enter!",
            self.x_pct, self.y_pct, self.size_px
        )
    }
}

impl ParseInput for PointerInput {
    /// `-` is a click on the background; any other line hits the target.
    fn parse_line(line: &str) -> Vec<Self> {
        match line.trim() {
            "-" => vec![PointerInput::Background],
            _ => vec![PointerInput::Target],
        }
    }
}

impl Render for Beep {
    fn render(&self) -> String {
        format!("\x07♪ BEEP ({} Hz). Press Enter!", self.frequency_hz)
    }
}

impl ParseInput for Press {
    fn parse_line(_line: &str) -> Vec<Self> {
        vec![Press]
    }
}

impl Render for Color {
    fn render(&self) -> String {
        format!("{}  [r]ed / [g]reen / [b]lue", paint(*self, "■■■■"))
    }
}

impl ParseInput for char {
    fn parse_line(line: &str) -> Vec<Self> {
        line.trim().chars().next().into_iter().collect()
    }
}

impl ParseInput for Color {
    /// A full color name, or a run of single-letter keys (`rgby`).
    fn parse_line(line: &str) -> Vec<Self> {
        let line = line.trim();
        if let Ok(color) = line.parse::<Color>() {
            return vec![color];
        }
        line.chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .filter_map(Color::from_key)
            .collect()
    }
}

impl Render for StroopCard {
    fn render(&self) -> String {
        format!(
            "{}  name the INK: r / g / b / y / w",
            paint(self.ink, &self.word.as_str().to_uppercase())
        )
    }
}

impl Render for SimonSequence {
    fn render(&self) -> String {
        format!("Your turn: repeat {} colors (r/g/b/y)", self.colors.len())
    }

    fn cue_frames(&self) -> Vec<(String, Duration)> {
        let mut frames = vec![("Watch...".to_string(), Duration::from_millis(PLAYBACK_LEAD_MS))];
        for color in &self.colors {
            frames.push((
                format!("  {}", paint(*color, &color.as_str().to_uppercase())),
                Duration::from_millis(self.flash_ms),
            ));
            frames.push((String::new(), Duration::from_millis(FLASH_GAP_MS)));
        }
        frames
    }
}

impl Render for NumberGrid {
    fn render(&self) -> String {
        let tiles: Vec<String> = self.tiles.iter().map(|n| format!("[{}]", n)).collect();
        format!("{}  type them in ascending order", tiles.join(" "))
    }
}

impl ParseInput for u32 {
    fn parse_line(line: &str) -> Vec<Self> {
        line.split(|c: char| c.is_whitespace() || c == ',')
            .filter_map(|t| t.parse().ok())
            .collect()
    }
}

/// One-line text for an event, or `None` when nothing should be printed.
pub fn describe<S: Render>(event: &SessionEvent<S>, total_rounds: u32) -> Option<String> {
    match event {
        SessionEvent::RoundArmed { round, cue: None, .. } => {
            Some(format!("Round {}/{}: get ready...", round, total_rounds))
        }
        SessionEvent::RoundArmed { round, cue: Some(_), .. } => {
            Some(format!("Round {}/{}", round, total_rounds))
        }
        SessionEvent::StimulusShown { stimulus, .. } => Some(stimulus.render()),
        SessionEvent::InputProgress { .. } => None,
        SessionEvent::RoundConcluded {
            result, false_start, ..
        } => {
            let verdict = match result.correct {
                Some(true) => " ✓",
                Some(false) => " ✗",
                None => "",
            };
            if *false_start {
                Some(format!("Too soon! Penalty {} ms{}", result.elapsed_time_ms, verdict))
            } else {
                Some(format!("{} ms{}", result.elapsed_time_ms, verdict))
            }
        }
        SessionEvent::Completed(_) => None,
    }
}

/// Parse each line of `reader` into session inputs until EOF or until the
/// session stops listening.
fn forward_lines<I: ParseInput, B: BufRead>(reader: B, inputs: &mpsc::UnboundedSender<I>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                return;
            }
        };
        for input in I::parse_line(&line) {
            if inputs.send(input).is_err() {
                return;
            }
        }
    }
}

/// Stdin is read on a plain thread: a blocked read there never holds up
/// runtime shutdown once the session is over.
fn spawn_stdin_reader<I>(inputs: mpsc::UnboundedSender<I>) -> std::io::Result<()>
where
    I: ParseInput + Send + 'static,
{
    std::thread::Builder::new()
        .name("reactx-stdin".to_string())
        .spawn(move || forward_lines(std::io::stdin().lock(), &inputs))
        .map(|_| ())
}

/// Resolves on Ctrl+C. If the handler cannot be installed it never resolves.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Print cue frames, each held for its duration. Returns `false` when
/// `interrupt` resolves before the last frame has been held.
async fn play_cue<F>(frames: Vec<(String, Duration)>, interrupt: F) -> bool
where
    F: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    for (frame, hold) in frames {
        if !frame.is_empty() {
            println!("{}", frame);
        }
        tokio::select! {
            _ = &mut interrupt => return false,
            _ = tokio::time::sleep(hold) => {}
        }
    }
    true
}

/// Run one session of `variant` against the terminal.
pub async fn play<G>(variant: G, config: SessionConfig) -> anyhow::Result<SessionOutcome>
where
    G: GameVariant + 'static,
    G::Stimulus: Render,
    G::Input: ParseInput,
{
    let total = config.round_count();
    let session = Session::new(variant, config, StdRng::from_os_rng());
    let (handle, mut events) = spawn_session(session);
    spawn_stdin_reader::<G::Input>(handle.input_sender())?;

    loop {
        tokio::select! {
            _ = interrupted(), if !handle.is_cancelled() => {
                println!("\nCancelled.");
                handle.cancel();
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                if let Some(line) = describe(&event, total) {
                    println!("{}", line);
                }
                if let SessionEvent::RoundArmed { cue: Some(cue), .. } = &event {
                    if !handle.is_cancelled() && !play_cue(cue.cue_frames(), interrupted()).await {
                        println!("\nCancelled.");
                        handle.cancel();
                    }
                }
            }
        }
    }

    Ok(handle.join().await?)
}

/// Dispatch on the game type.
pub async fn play_game(game: GameType, config: SessionConfig) -> anyhow::Result<SessionOutcome> {
    let difficulty = config.difficulty();
    println!("{} ({}, {} rounds)", game.title(), difficulty, config.round_count());
    match game {
        GameType::VisualSimple => play(VisualSimple::new(difficulty), config).await,
        GameType::AuditorySimple => play(AuditorySimple::new(difficulty), config).await,
        GameType::VisualChoice => play(VisualChoice::new(difficulty), config).await,
        GameType::Stroop => play(Stroop::new(difficulty), config).await,
        GameType::Simon => play(Simon::new(difficulty), config).await,
        GameType::NumberOrder => play(NumberOrder::new(difficulty), config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactx_core::TrialResult;

    #[test]
    fn test_color_lines() {
        assert_eq!(Color::parse_line("red"), vec![Color::Red]);
        assert_eq!(Color::parse_line("r g b"), vec![Color::Red, Color::Green, Color::Blue]);
        assert_eq!(Color::parse_line("ry"), vec![Color::Red, Color::Yellow]);
        assert!(Color::parse_line("xyzzy").contains(&Color::Yellow));
        assert!(Color::parse_line("").is_empty());
    }

    #[test]
    fn test_number_lines() {
        assert_eq!(u32::parse_line("12 13,14"), vec![12, 13, 14]);
        assert!(u32::parse_line("abc").is_empty());
    }

    #[test]
    fn test_pointer_and_key_lines() {
        assert_eq!(PointerInput::parse_line(""), vec![PointerInput::Target]);
        assert_eq!(PointerInput::parse_line(" - "), vec![PointerInput::Background]);
        assert_eq!(char::parse_line("  g"), vec!['g']);
        assert!(char::parse_line("").is_empty());
    }

    #[test]
    fn test_simon_cue_matches_playback_time() {
        let seq = SimonSequence {
            colors: vec![Color::Red, Color::Blue],
            flash_ms: 600,
        };
        let total: Duration = seq.cue_frames().iter().map(|(_, d)| *d).sum();
        assert_eq!(total, seq.playback_duration());
    }

    #[test]
    fn test_describe_events() {
        let armed: SessionEvent<Color> = SessionEvent::RoundArmed {
            round: 2,
            delay: Duration::from_millis(1000),
            cue: None,
        };
        assert_eq!(describe(&armed, 5).unwrap(), "Round 2/5: get ready...");

        let early: SessionEvent<Color> = SessionEvent::RoundConcluded {
            round: 1,
            result: TrialResult::new(5000, Some(false)),
            false_start: true,
        };
        assert_eq!(describe(&early, 5).unwrap(), "Too soon! Penalty 5000 ms ✗");

        let hit: SessionEvent<Color> = SessionEvent::RoundConcluded {
            round: 1,
            result: TrialResult::new(231, None),
            false_start: false,
        };
        assert_eq!(describe(&hit, 5).unwrap(), "231 ms");

        let progress: SessionEvent<Color> = SessionEvent::InputProgress { round: 1 };
        assert!(describe(&progress, 5).is_none());
    }

    #[test]
    fn test_stroop_card_names_the_word() {
        let card = StroopCard {
            word: Color::Red,
            ink: Color::Blue,
        };
        assert!(card.render().contains("RED"));
    }

    #[test]
    fn test_forward_lines_until_eof() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();
        forward_lines(std::io::Cursor::new("1 2\nxx\n3\n"), &tx);
        let mut got = Vec::new();
        while let Ok(n) = rx.try_recv() {
            got.push(n);
        }
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn test_forward_lines_stops_when_session_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel::<u32>();
        drop(rx);
        // returns on the first failed send instead of reading on
        forward_lines(std::io::Cursor::new("1\n2\n3\n"), &tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cue_stops_at_interrupt() {
        let frames = vec![
            ("one".to_string(), Duration::from_millis(1000)),
            ("two".to_string(), Duration::from_millis(1000)),
            ("three".to_string(), Duration::from_millis(1000)),
        ];
        let start = tokio::time::Instant::now();
        let finished = play_cue(frames, tokio::time::sleep(Duration::from_millis(1500))).await;
        assert!(!finished);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1500) && elapsed < Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cue_plays_through_without_interrupt() {
        let seq = SimonSequence {
            colors: vec![Color::Green],
            flash_ms: 400,
        };
        let start = tokio::time::Instant::now();
        assert!(play_cue(seq.cue_frames(), std::future::pending()).await);
        let elapsed = start.elapsed();
        assert!(elapsed >= seq.playback_duration());
        assert!(elapsed < seq.playback_duration() + Duration::from_millis(50));
    }
}
