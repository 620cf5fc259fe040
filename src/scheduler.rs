//! Capture scheduler.
//!
//! Drives the tick loop: read one frame, run it through the recognition
//! pipeline, record the result, render. Scheduling is fixed-delay: the next
//! tick is armed only after the current tick body has returned, so ticks never
//! overlap and slow collaborators stretch the period instead of queueing work.

use anyhow::Result;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ScannerConfig;
use crate::error::{ScanError, Stage};
use crate::history::{HistoryCache, HistorySnapshot, RecognitionRecord};
use crate::ingest::{source_from_url, CaptureSession, VideoSource};
use crate::pipeline::RecognitionPipeline;
use crate::render::{build_sink, RenderSink};
use crate::validate::PlateValidator;
use crate::TICK_DELAY_MILLIS;

// ----------------------------------------------------------------------------
// FixedDelay: single-shot, cancellable timer
// ----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// The delay elapsed; run the next tick.
    Fired,
    /// Shutdown was signalled (or its sender dropped) while waiting.
    Cancelled,
}

/// Single-shot timer re-armed after every tick body completes.
#[derive(Clone, Copy, Debug)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Block for one delay period, returning early on shutdown.
    pub fn wait(&self, shutdown: &Receiver<()>) -> TimerEvent {
        match shutdown.recv_timeout(self.delay) {
            Err(RecvTimeoutError::Timeout) => TimerEvent::Fired,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => TimerEvent::Cancelled,
        }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_DELAY_MILLIS))
    }
}

// ----------------------------------------------------------------------------
// Tick outcomes
// ----------------------------------------------------------------------------

/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// No active capture session; nothing was read.
    Stopped,
    /// A plate was read and appended to the history.
    Recognized(Arc<RecognitionRecord>),
    /// The tick completed without a new record.
    Skipped(ScanError),
}

impl TickOutcome {
    pub fn record(&self) -> Option<&RecognitionRecord> {
        match self {
            TickOutcome::Recognized(record) => Some(record.as_ref()),
            _ => None,
        }
    }
}

/// Counters for one `run` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub recognized: u64,
    pub skipped: u64,
    pub failures: u64,
}

impl RunSummary {
    pub fn observe(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        match outcome {
            TickOutcome::Recognized(_) => self.recognized += 1,
            TickOutcome::Skipped(ScanError::DelegateFailure { .. }) => self.failures += 1,
            TickOutcome::Skipped(_) | TickOutcome::Stopped => self.skipped += 1,
        }
    }
}

// ----------------------------------------------------------------------------
// CaptureScheduler
// ----------------------------------------------------------------------------

pub struct CaptureScheduler {
    source: Box<dyn VideoSource>,
    session: Option<Box<dyn CaptureSession>>,
    pipeline: RecognitionPipeline,
    history: HistoryCache,
    sink: Box<dyn RenderSink>,
    timer: FixedDelay,
}

impl CaptureScheduler {
    pub fn new(
        source: Box<dyn VideoSource>,
        pipeline: RecognitionPipeline,
        sink: Box<dyn RenderSink>,
    ) -> Self {
        Self {
            source,
            session: None,
            pipeline,
            history: HistoryCache::new(),
            sink,
            timer: FixedDelay::default(),
        }
    }

    pub fn with_tick_delay(mut self, delay: Duration) -> Self {
        self.timer = FixedDelay::new(delay);
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = HistoryCache::with_capacity(capacity);
        self
    }

    /// Wire source, collaborators and sinks from configuration.
    pub fn from_config(cfg: &ScannerConfig) -> Result<Self> {
        let validator = PlateValidator::new(Arc::new(cfg.allowlist()));
        log::info!("allowlist: {} plates", validator.allowlist().len());
        let pipeline = RecognitionPipeline::from_config(cfg, validator)?;
        let source = source_from_url(&cfg.source)?;
        let sink = build_sink(&cfg.render)?;
        Ok(Self::new(source, pipeline, sink)
            .with_tick_delay(cfg.tick_delay)
            .with_history_capacity(cfg.max_history))
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn tick_delay(&self) -> Duration {
        self.timer.delay()
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        self.history.snapshot()
    }

    /// Open a capture session unless one is already active.
    pub fn start(&mut self) -> Result<(), ScanError> {
        if self.session.is_some() {
            return Ok(());
        }
        let session = self
            .source
            .open()
            .map_err(|e| ScanError::DeviceUnavailable {
                source_name: self.source.describe(),
                message: format!("{e:#}"),
            })?;
        log::info!("capture session opened: {}", self.source.describe());
        self.session = Some(session);
        Ok(())
    }

    /// Release the capture session. Idempotent; the history is kept.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.release();
            log::info!(
                "capture session released: {} ({} frames read)",
                self.source.describe(),
                session.frames_read()
            );
        }
    }

    /// Run one capture/recognize/render cycle.
    ///
    /// Never fails: per-tick problems come back as `TickOutcome::Skipped`.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Stopped;
        };
        let frame = match session.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::debug!("tick: no frame available");
                return TickOutcome::Skipped(ScanError::NoFrameAvailable);
            }
            Err(e) => {
                let err = ScanError::delegate(Stage::Capture, e);
                log::warn!("tick: {}", err);
                return TickOutcome::Skipped(err);
            }
        };

        let outcome = match self.pipeline.process(&frame) {
            Ok(record) => {
                log::info!(
                    "frame {}: plate {} {}",
                    frame.index(),
                    record.plate_text(),
                    record.authorization()
                );
                TickOutcome::Recognized(self.history.append(record))
            }
            Err(err @ ScanError::DelegateFailure { .. }) => {
                log::warn!("frame {}: {}", frame.index(), err);
                TickOutcome::Skipped(err)
            }
            Err(err) => {
                log::debug!("frame {}: {}", frame.index(), err);
                TickOutcome::Skipped(err)
            }
        };

        if let Err(e) = self.sink.display_current_frame(&frame) {
            log::warn!("render frame {}: {:#}", frame.index(), e);
        }
        if let Err(e) = self.sink.display_history(&self.history.snapshot()) {
            log::warn!("render history: {:#}", e);
        }
        outcome
    }

    /// Start (if needed) and tick until shutdown.
    ///
    /// The first tick runs immediately; each following tick is armed
    /// `tick_delay` after the previous one finished. Stops when `shutdown`
    /// receives a message or its sender is dropped, or after `max_ticks`.
    /// The capture session is released on return.
    pub fn run(
        &mut self,
        shutdown: &Receiver<()>,
        max_ticks: Option<u64>,
    ) -> Result<RunSummary, ScanError> {
        self.run_with(shutdown, max_ticks, |_| {})
    }

    /// `run`, calling `on_tick` after every tick.
    pub fn run_with<F>(
        &mut self,
        shutdown: &Receiver<()>,
        max_ticks: Option<u64>,
        mut on_tick: F,
    ) -> Result<RunSummary, ScanError>
    where
        F: FnMut(&TickOutcome),
    {
        self.start()?;
        let mut summary = RunSummary::default();
        loop {
            let outcome = self.tick();
            summary.observe(&outcome);
            on_tick(&outcome);
            if !self.is_running() || max_ticks.is_some_and(|max| summary.ticks >= max) {
                break;
            }
            if self.timer.wait(shutdown) == TimerEvent::Cancelled {
                log::info!("shutdown requested");
                break;
            }
        }
        self.stop();
        Ok(summary)
    }
}

impl Drop for CaptureScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Instant;

    #[test]
    fn timer_fires_after_delay() {
        let (_tx, rx) = mpsc::channel();
        let timer = FixedDelay::new(Duration::from_millis(20));
        let start = Instant::now();
        assert_eq!(timer.wait(&rx), TimerEvent::Fired);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn timer_is_cancelled_by_signal() {
        let (tx, rx) = mpsc::channel();
        tx.send(()).unwrap();
        let timer = FixedDelay::new(Duration::from_secs(60));
        assert_eq!(timer.wait(&rx), TimerEvent::Cancelled);
    }

    #[test]
    fn timer_is_cancelled_when_sender_dropped() {
        let (tx, rx) = mpsc::channel::<()>();
        drop(tx);
        let timer = FixedDelay::new(Duration::from_secs(60));
        assert_eq!(timer.wait(&rx), TimerEvent::Cancelled);
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = RunSummary::default();
        summary.observe(&TickOutcome::Skipped(ScanError::NoFrameAvailable));
        summary.observe(&TickOutcome::Skipped(ScanError::delegate(
            Stage::Ocr,
            anyhow::anyhow!("boom"),
        )));
        assert_eq!(
            summary,
            RunSummary {
                ticks: 2,
                recognized: 0,
                skipped: 1,
                failures: 1,
            }
        );
    }
}
