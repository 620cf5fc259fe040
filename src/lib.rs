//! License plate scanner
//!
//! Periodically captures a frame from a video source, locates a licence plate,
//! reads its text, checks it against an allowlist, and keeps a short history
//! of recognized plates for display.
//!
//! # Architecture
//!
//! One tick of the capture loop runs:
//!
//! 1. **Capture**: read one frame from the open `CaptureSession`.
//! 2. **Detect**: the `PlateDetector` reports candidate regions; the last wins.
//! 3. **Preprocess**: inset the region, crop, and enlarge it (300%).
//! 4. **Read**: the `PlateReader` returns raw text for the enlarged crop.
//! 5. **Validate**: trim the text and look it up in the `Allowlist`.
//! 6. **Record**: append to the bounded `HistoryCache` (newest last).
//! 7. **Render**: hand the frame and a history snapshot to the `RenderSink`.
//!
//! Ticks never overlap: the next one is armed a fixed delay after the
//! previous one finished.
//!
//! # Module Structure
//!
//! - `frame`: frames, regions, plate candidate crops
//! - `ingest`: video sources (synthetic, still images, V4L2)
//! - `detect`: plate detector backends
//! - `preprocess`: inset/crop/enlarge
//! - `ocr`: plate reader backends
//! - `validate`: normalization and allowlist check
//! - `history`: bounded recognition history
//! - `render`: render sinks (log, image directory)
//! - `pipeline`, `scheduler`: per-frame processing and the tick loop
//! - `config`: JSON file + environment configuration

pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod history;
pub mod ingest;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod render;
pub mod scheduler;
pub mod validate;

/// Records kept by the history cache.
pub const MAX_HISTORY_ENTRIES: usize = 7;

/// Delay between the end of one tick and the start of the next.
pub const TICK_DELAY_MILLIS: u64 = 3000;

/// Enlargement applied to the plate crop before OCR.
pub const UPSCALE_PERCENT: u32 = 300;

pub use config::{DetectorSettings, OcrSettings, RenderSettings, ScannerConfig};
pub use detect::{build_detector, DetectParams, PlateDetector, StubDetector};
pub use error::{ScanError, Stage};
pub use frame::{Frame, Inset, PlateCandidateImage, Region};
pub use history::{HistoryCache, HistorySnapshot, RecognitionRecord};
pub use ingest::{source_from_url, CaptureSession, StillsSource, SyntheticSource, VideoSource};
#[cfg(feature = "ingest-v4l2")]
pub use ingest::{V4l2Config, V4l2Source};
pub use ocr::{build_reader, OcrParams, PlateReader, ScriptedReader};
pub use pipeline::RecognitionPipeline;
pub use preprocess::{enlarge, PlatePreprocessor};
pub use render::{build_sink, DirectorySink, LogSink, MultiSink, RenderSink};
pub use scheduler::{CaptureScheduler, FixedDelay, RunSummary, TickOutcome, TimerEvent};
pub use validate::{normalize, Allowlist, AuthorizationStatus, PlateValidator};
