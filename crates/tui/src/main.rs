mod feed;
mod renderer;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use barrage_core::OverlayOptions;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "barrage.log";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: barrage <comments.json|comments.txt> [options.json]");
        std::process::exit(1);
    }

    init_logging()?;

    let path = PathBuf::from(&args[1]);
    let data = std::fs::read(&path)?;
    let comments = feed::parse_feed(&data)?;

    let options = match args.get(2) {
        Some(options_path) => OverlayOptions::from_json(&std::fs::read_to_string(options_path)?)?,
        None => OverlayOptions::new(renderer::SCREEN_CONTAINER),
    };

    tracing::info!(path = %path.display(), comments = comments.len(), "loaded feed");
    renderer::run_tui(&comments, options)
}

/// Log to a file when `RUST_LOG` is set; stderr would tear the terminal UI.
fn init_logging() -> Result<()> {
    let Ok(filter) = EnvFilter::try_from_default_env() else {
        return Ok(());
    };
    let file = File::create(LOG_FILE)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))
}
