use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

use plate_scanner::{RunSummary, TickOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
    disable_pretty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool, disable_pretty: bool) -> Self {
        Self {
            mode,
            is_tty,
            disable_pretty,
        }
    }

    pub fn from_args(ui_flag: Option<&str>, is_tty: bool, disable_pretty: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty, disable_pretty)
    }

    fn pretty(&self) -> bool {
        self.is_tty
            && match self.mode {
                UiMode::Pretty => true,
                UiMode::Auto => !self.disable_pretty,
                UiMode::Plain => false,
            }
    }

    fn spinner(template: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_draw_target(ProgressDrawTarget::stderr());
        spinner.enable_steady_tick(Duration::from_millis(120));
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner
    }

    /// Timed setup step, reported when the guard drops.
    pub fn stage(&self, name: &str) -> StageGuard {
        if self.pretty() {
            let spinner = Self::spinner("{spinner} {msg}");
            spinner.set_message(format!("{name}…"));
            StageGuard::new(name.to_string(), Some(spinner))
        } else {
            eprintln!("==> {}", name);
            StageGuard::new(name.to_string(), None)
        }
    }

    /// Live status line for the capture loop. `None` in plain mode, where the
    /// log output already carries every tick.
    pub fn scan_status(&self) -> Option<ScanStatus> {
        self.pretty().then(|| ScanStatus {
            spinner: Self::spinner("{spinner} [{elapsed}] {msg}"),
            summary: RunSummary::default(),
            last_plate: None,
        })
    }
}

pub struct StageGuard {
    name: String,
    start: Instant,
    spinner: Option<ProgressBar>,
}

impl StageGuard {
    fn new(name: String, spinner: Option<ProgressBar>) -> Self {
        Self {
            name,
            start: Instant::now(),
            spinner,
        }
    }
}

impl Drop for StageGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let message = format!("✔ {} ({})", self.name, format_duration(elapsed));
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(message);
        } else {
            eprintln!("{message}");
        }
    }
}

/// Spinner showing tick counters and the most recent plate.
pub struct ScanStatus {
    spinner: ProgressBar,
    summary: RunSummary,
    last_plate: Option<String>,
}

impl ScanStatus {
    pub fn observe(&mut self, outcome: &TickOutcome) {
        self.summary.observe(outcome);
        if let Some(record) = outcome.record() {
            self.last_plate = Some(format!(
                "{} ({})",
                record.plate_text(),
                record.authorization()
            ));
        }
        self.spinner
            .set_message(status_line(&self.summary, self.last_plate.as_deref()));
    }

    pub fn finish(self) {
        self.spinner.finish_with_message(format!(
            "✔ scan stopped: {}",
            status_line(&self.summary, self.last_plate.as_deref())
        ));
    }
}

fn status_line(summary: &RunSummary, last_plate: Option<&str>) -> String {
    format!(
        "ticks {} | plates {} | skipped {} | failed {} | last {}",
        summary.ticks,
        summary.recognized,
        summary.skipped,
        summary.failures,
        last_plate.unwrap_or("-")
    )
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
