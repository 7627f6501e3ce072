#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use pipeboard_core::{BoardStore, DragConfig, DragSessionController};
use serde_json::json;
use web_time::Instant;

use crate::error::Result;
use crate::fixture::BoardFixture;
use crate::gesture_trace::GestureTrace;
use crate::replay::replay;

#[derive(Debug, Parser)]
#[command(
    name = "pipeboard-replay",
    about = "Replay a recorded drag gesture trace against a board fixture",
    version
)]
pub struct Cli {
    /// Board fixture (JSON).
    pub board: PathBuf,

    /// Gesture trace (JSONL).
    pub trace: PathBuf,

    /// Drag configuration (TOML, or JSON by extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Default log filter when PIPEBOARD_LOG is unset.
    #[arg(long, default_value = "warn")]
    pub log_filter: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long)]
    pub json_logs: bool,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let installed = if cli.json_logs {
        pipeboard_core::logging::init_json(&cli.log_filter)
    } else {
        pipeboard_core::logging::init_pretty(&cli.log_filter)
    };
    if let Err(error) = installed {
        eprintln!("logging disabled: {error}");
    }
    run(&cli, &mut io::stdout().lock())
}

/// Replay and write a JSONL report: config, one line per event, summary.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => DragConfig::from_file(path)?,
        None => DragConfig::default(),
    };
    let fixture = BoardFixture::load(&cli.board)?;
    let trace = GestureTrace::open(&cli.trace)?;
    let store = fixture.to_store()?;

    let mut ctl = DragSessionController::new(&store, config.clone());
    let report = replay(&mut ctl, &trace.gestures(), Instant::now());
    tracing::info!(
        target: "pipeboard::replay",
        board = %fixture.name,
        events = report.steps.len(),
        commits = ctl.commits(),
        "replay finished"
    );

    writeln!(out, "{}", config.to_jsonl())?;
    out.write_all(report.to_jsonl()?.as_bytes())?;
    let summary = json!({
        "event": "replay_summary",
        "board": fixture.name,
        "trace_board": trace.board_name(),
        "summary": report.summary(),
        "store": {
            "applied": store.applied(),
            "rejected": store.rejected(),
        },
        "final_board": *store.snapshot(),
    });
    writeln!(out, "{summary}")?;
    out.flush()?;
    Ok(())
}
