use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Parser;
use colored::*;

use rusty_rps::args::Args;
use rusty_rps::config::EngineConfig;
use rusty_rps::game::{GameEvent, GameMachine, GameSettings};
use rusty_rps::recorder::JsonScoreBook;
use rusty_rps::source::{LandmarkSource, ScriptedSource};
use rusty_rps::types::{GamePhase, Gesture, Handedness, RoundOutcome};

/// Hard stop for the demo loop if the scripted match never converges.
const MAX_TICKS: u64 = 100_000;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = EngineConfig::load(&args.config)?;

    let book = JsonScoreBook::open(&config.scores_path)?;
    let stats = book.stats();
    if args.stats {
        println!("Stored matches: {}", stats.total_matches);
        println!("Player wins:    {}", stats.player_wins);
        println!("Opponent wins:  {}", stats.opponent_wins);
        println!("Win rate:       {}%", stats.win_rate_pct);
        return Ok(());
    }
    if stats.total_matches > 0 {
        println!(
            "{}",
            format!(
                "History: {} matches played, player win rate {}%",
                stats.total_matches, stats.win_rate_pct
            )
            .cyan()
        );
    }

    let settings = GameSettings::from_config(&config);
    let hand = config.player_side().unwrap_or(Handedness::Right);
    let script = parse_script(args.script.as_deref())?;
    println!(
        "First to {} points. Scripted player: {}",
        settings.points_to_win,
        script
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    );

    let mut machine = GameMachine::new(settings, Box::new(book), args.seed);
    let mut source = ScriptedSource::holding(&script, args.hold_frames, hand);

    let mut ticks = 0u64;
    loop {
        if source.is_exhausted() {
            source = ScriptedSource::holding(&script, args.hold_frames, hand);
        }
        let frame = source.next_frame();
        for event in machine.tick(Instant::now(), frame) {
            print_event(&event, &machine);
        }
        if machine.phase() == GamePhase::MatchOver {
            break;
        }
        ticks += 1;
        if ticks >= MAX_TICKS {
            println!("{}", "Tick limit reached without a winner, stopping.".yellow());
            break;
        }
        std::thread::sleep(Duration::from_millis(args.frame_ms));
    }

    let snapshot = machine.snapshot();
    println!(
        "Final score: {} {} - {} {}",
        "player".green(),
        snapshot.player_score,
        snapshot.opponent_score,
        "opponent".red(),
    );
    Ok(())
}

fn parse_script(raw: Option<&str>) -> Result<Vec<Gesture>> {
    let raw = raw.unwrap_or("rock,paper,scissors");
    raw.split(',')
        .map(|part| {
            let label = part.trim();
            if label.eq_ignore_ascii_case("none") {
                Ok(Gesture::None)
            } else {
                Gesture::parse(label).ok_or_else(|| anyhow!("unknown gesture in script: {:?}", label))
            }
        })
        .collect()
}

fn print_event(event: &GameEvent, machine: &GameMachine) {
    match event {
        GameEvent::RoundStarted => {
            println!("{}", "Hand detected, countdown running...".yellow());
        }
        GameEvent::CountdownAborted => {
            println!("{}", "Hand lost, back to waiting.".dimmed());
        }
        GameEvent::RoundResolved {
            player,
            opponent,
            outcome,
        } => {
            let snapshot = machine.snapshot();
            let verdict = match outcome {
                RoundOutcome::PlayerWin => "you win the round".green(),
                RoundOutcome::OpponentWin => "opponent wins the round".red(),
                RoundOutcome::Draw => "draw".white(),
            };
            println!(
                "Round {}: {} vs {} -> {} ({}-{})",
                snapshot.rounds_played,
                player.as_str().bold(),
                opponent.as_str().bold(),
                verdict,
                snapshot.player_score,
                snapshot.opponent_score,
            );
        }
        GameEvent::MatchOver { winner } => {
            println!("{}", format!("Match over: {} wins!", winner.as_str()).bold().green());
        }
        GameEvent::SourceUnavailable => {
            println!("{}", "Landmark source unavailable, waiting...".red());
        }
        GameEvent::SourceRestored => {
            println!("{}", "Landmark source restored.".green());
        }
        GameEvent::Reset => {
            println!("{}", "Match reset.".cyan());
        }
    }
}
