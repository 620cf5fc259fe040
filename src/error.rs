//! Error taxonomy for the recognition pipeline.
//!
//! Every per-tick variant is recoverable: the scheduler records it in the tick
//! outcome and carries on with the next tick. Only `DeviceUnavailable` is ever
//! returned to the caller of `CaptureScheduler::start`.

use thiserror::Error;

/// Pipeline stage a delegate failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Capture,
    Detect,
    Preprocess,
    Ocr,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Capture => "capture",
            Stage::Detect => "detect",
            Stage::Preprocess => "preprocess",
            Stage::Ocr => "ocr",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no frame available from capture session")]
    NoFrameAvailable,

    #[error("detector reported no candidate region")]
    NoCandidateRegion,

    #[error("recognized text is empty after trimming")]
    EmptyRecognizedText,

    #[error("{stage} delegate failed: {message}")]
    DelegateFailure { stage: Stage, message: String },

    #[error("capture device {source_name} unavailable: {message}")]
    DeviceUnavailable {
        source_name: String,
        message: String,
    },
}

impl ScanError {
    /// Wrap a collaborator error, keeping the whole context chain in the message.
    pub fn delegate(stage: Stage, err: anyhow::Error) -> Self {
        ScanError::DelegateFailure {
            stage,
            message: format!("{err:#}"),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ScanError::DeviceUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn delegate_failure_keeps_context_chain() {
        let err: anyhow::Result<()> = Err(anyhow!("engine crashed")).context("run tesseract");
        let scan = ScanError::delegate(Stage::Ocr, err.unwrap_err());
        assert_eq!(
            scan.to_string(),
            "ocr delegate failed: run tesseract: engine crashed"
        );
        assert!(scan.is_recoverable());
    }

    #[test]
    fn device_unavailable_is_not_recoverable() {
        let err = ScanError::DeviceUnavailable {
            source_name: "/dev/video9".to_string(),
            message: "no such device".to_string(),
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("/dev/video9"));
    }
}
