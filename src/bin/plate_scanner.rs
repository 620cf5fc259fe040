//! plate_scanner - licence plate scanner daemon
//!
//! This daemon:
//! 1. Opens the configured video source (synthetic, still images, V4L2)
//! 2. Every tick, detects a plate, reads it, and checks the allowlist
//! 3. Keeps the last few recognitions and renders them through the sinks
//! 4. Stops on Ctrl-C (or after `--ticks`), releasing the capture device

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use plate_scanner::{CaptureScheduler, ScannerConfig};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON config file (overrides PLATE_SCANNER_CONFIG).
    #[arg(long, env = "PLATE_SCANNER_CONFIG")]
    config: Option<PathBuf>,

    /// Video source: stub://name, a directory of stills, or /dev/videoN.
    #[arg(long)]
    source: Option<String>,

    /// Delay between ticks in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Stop after this many ticks (default: run until Ctrl-C).
    #[arg(long)]
    ticks: Option<u64>,

    /// Directory receiving rendered frames and history thumbnails.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// UI mode for stderr progress (auto|plain|pretty).
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let is_tty = std::io::stderr().is_terminal();
    let stdout_is_tty = std::io::stdout().is_terminal();
    let ui = ui::Ui::from_args(Some(&args.ui), is_tty, !stdout_is_tty);

    let cfg = {
        let _stage = ui.stage("Load configuration");
        let mut cfg = ScannerConfig::load_from(args.config.as_deref())
            .context("load scanner configuration")?;
        if let Some(source) = args.source.clone() {
            cfg.source = source;
        }
        if let Some(millis) = args.tick_ms {
            cfg.tick_delay = Duration::from_millis(millis);
        }
        if let Some(dir) = args.output_dir.clone() {
            cfg.render.output_dir = Some(dir);
        }
        cfg
    };
    log::info!(
        "source={} detector={} ocr={} tick={}ms history={}",
        cfg.source,
        cfg.detector.backend,
        cfg.ocr.backend,
        cfg.tick_delay.as_millis(),
        cfg.max_history
    );

    let mut scheduler = {
        let _stage = ui.stage("Build capture pipeline");
        CaptureScheduler::from_config(&cfg)?
    };

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("install Ctrl-C handler")?;

    let mut status = ui.scan_status();
    let summary = scheduler.run_with(&rx, args.ticks, |outcome| {
        if let Some(status) = status.as_mut() {
            status.observe(outcome);
        }
    })?;
    if let Some(status) = status {
        status.finish();
    }

    let history = scheduler.snapshot();
    log::info!(
        "scan stopped after {} ticks: {} recognized, {} skipped, {} failed",
        summary.ticks,
        summary.recognized,
        summary.skipped,
        summary.failures
    );
    for record in history.iter() {
        log::info!("  {}", plate_scanner::render::history_label(record));
    }
    Ok(())
}
