use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the engine configuration file
    #[arg(long, default_value = "config.json")]
    pub config: String,

    /// Seed for the opponent's gesture choice (default: entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Comma-separated gesture script for the demo session
    /// (e.g. "rock,none,scissors"; "none" simulates lost tracking)
    #[arg(long)]
    pub script: Option<String>,

    /// Frames each scripted gesture is held for
    #[arg(long, default_value_t = 45)]
    pub hold_frames: u32,

    /// Milliseconds between simulated frames
    #[arg(long, default_value_t = 33)]
    pub frame_ms: u64,

    /// Print stored match statistics and exit
    #[arg(long)]
    pub stats: bool,
}
