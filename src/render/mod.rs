//! Rendering sinks.
//!
//! The scheduler owns no view state. After every tick it hands the current
//! frame and an immutable history snapshot to a `RenderSink`, which decides
//! how (and whether) to present them.

mod directory;

use anyhow::Result;
use std::sync::{Arc, Weak};

use crate::config::RenderSettings;
use crate::frame::Frame;
use crate::history::{HistorySnapshot, RecognitionRecord};

pub use directory::{DirectorySink, FRAME_VIEW_SIZE, THUMBNAIL_SIZE};

/// Display collaborator for the capture loop.
pub trait RenderSink {
    fn display_current_frame(&mut self, frame: &Frame) -> Result<()>;

    fn display_history(&mut self, history: &HistorySnapshot) -> Result<()>;
}

/// Caption shown next to a history entry.
pub fn history_label(record: &RecognitionRecord) -> String {
    format!(
        "Plate number: {} | Access status: {}",
        record.plate_text(),
        record.authorization()
    )
}

/// Sink that writes history changes to the log.
///
/// Only logs when the newest entry changes, so an idle camera stays quiet.
/// Entries are compared by identity; frame numbering restarts with every
/// capture session.
#[derive(Debug, Default)]
pub struct LogSink {
    last_seen: Option<Weak<RecognitionRecord>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_changed(&mut self, history: &HistorySnapshot) -> bool {
        let latest = history.records().last();
        let unchanged = match (&self.last_seen, latest) {
            (Some(seen), Some(latest)) => Weak::ptr_eq(seen, &Arc::downgrade(latest)),
            (None, None) => true,
            _ => false,
        };
        self.last_seen = latest.map(Arc::downgrade);
        !unchanged
    }
}

impl RenderSink for LogSink {
    fn display_current_frame(&mut self, frame: &Frame) -> Result<()> {
        log::trace!("frame {} ({}x{})", frame.index(), frame.width(), frame.height());
        Ok(())
    }

    fn display_history(&mut self, history: &HistorySnapshot) -> Result<()> {
        if !self.newest_changed(history) {
            return Ok(());
        }
        for (slot, record) in history.iter().enumerate() {
            log::info!("history[{}] {}", slot, history_label(record));
        }
        Ok(())
    }
}

/// Forwards to several sinks; the first failure is reported after all ran.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn RenderSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn RenderSink>>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl RenderSink for MultiSink {
    fn display_current_frame(&mut self, frame: &Frame) -> Result<()> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(err) = sink.display_current_frame(frame) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn display_history(&mut self, history: &HistorySnapshot) -> Result<()> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(err) = sink.display_history(history) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Log sink, plus a directory sink when an output directory is configured.
pub fn build_sink(settings: &RenderSettings) -> Result<Box<dyn RenderSink>> {
    let mut sinks: Vec<Box<dyn RenderSink>> = vec![Box::new(LogSink::new())];
    if let Some(dir) = &settings.output_dir {
        sinks.push(Box::new(DirectorySink::new(dir)?));
    }
    Ok(Box::new(MultiSink::new(sinks)))
}
