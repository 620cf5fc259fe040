//! Frame ingestion sources.
//!
//! This module provides the video sources the capture scheduler pulls from:
//! - Synthetic camera (`stub://…`, testing and demos)
//! - Directory of still images (PNG/JPEG, read in name order)
//! - USB/V4L2 devices (feature: ingest-v4l2)
//!
//! A source is opened into a `CaptureSession`; the session yields at most one
//! `Frame` per read and is released when the scheduler stops. Sessions MUST NOT:
//! - Retain frames after handing them to the scheduler
//! - Log frame pixel content

mod stills;
mod synthetic;
#[cfg(feature = "ingest-v4l2")]
mod normalize;
#[cfg(feature = "ingest-v4l2")]
pub mod v4l2;

use anyhow::Result;
use std::path::Path;

use crate::frame::Frame;

pub use stills::StillsSource;
pub use synthetic::{SyntheticConfig, SyntheticSource};
#[cfg(feature = "ingest-v4l2")]
pub use v4l2::{V4l2Config, V4l2Source};

/// A video source that can be opened into a capture session.
pub trait VideoSource {
    /// Source identifier for logs (URL, path or device node).
    fn describe(&self) -> String;

    /// Open a new capture session. Fails when the device is unavailable.
    fn open(&mut self) -> Result<Box<dyn CaptureSession>>;
}

/// An open capture session.
pub trait CaptureSession {
    /// Read the next frame. `Ok(None)` means nothing is available right now.
    fn read(&mut self) -> Result<Option<Frame>>;

    /// Release the underlying device. Further reads yield no frame.
    fn release(&mut self);

    /// Frames delivered so far.
    fn frames_read(&self) -> u64;
}

/// Pick a source implementation from a configured location.
///
/// - `stub://name[?frames=N]` → synthetic camera
/// - `/dev/video*` → V4L2 device (needs ingest-v4l2)
/// - anything else → directory (or single file) of still images
pub fn source_from_url(url: &str) -> Result<Box<dyn VideoSource>> {
    let url = url.trim();
    if url.is_empty() {
        anyhow::bail!("video source must not be empty");
    }
    if url.starts_with("stub://") {
        return Ok(Box::new(SyntheticSource::new(SyntheticConfig::from_url(
            url,
        )?)));
    }
    if url.starts_with("/dev/video") {
        #[cfg(feature = "ingest-v4l2")]
        {
            return Ok(Box::new(V4l2Source::new(V4l2Config {
                device: url.to_string(),
                ..V4l2Config::default()
            })));
        }
        #[cfg(not(feature = "ingest-v4l2"))]
        {
            anyhow::bail!("V4L2 capture requires the ingest-v4l2 feature");
        }
    }
    if url.contains("://") {
        anyhow::bail!("unsupported video source scheme: {}", url);
    }
    Ok(Box::new(StillsSource::new(Path::new(url))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_urls_select_synthetic_source() -> Result<()> {
        let mut source = source_from_url("stub://gate?frames=2")?;
        assert_eq!(source.describe(), "stub://gate?frames=2");
        let mut session = source.open()?;
        assert!(session.read()?.is_some());
        assert!(session.read()?.is_some());
        assert!(session.read()?.is_none());
        Ok(())
    }

    #[test]
    fn network_schemes_are_rejected() {
        assert!(source_from_url("rtsp://camera/stream").is_err());
        assert!(source_from_url("  ").is_err());
    }

    #[test]
    fn plain_paths_select_stills_source() -> Result<()> {
        let source = source_from_url("/tmp/plates")?;
        assert_eq!(source.describe(), "/tmp/plates");
        Ok(())
    }
}
