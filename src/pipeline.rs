//! Per-frame recognition: detect → preprocess → OCR → normalize/validate.

use anyhow::Result;

use crate::config::ScannerConfig;
use crate::detect::{build_detector, DetectParams, PlateDetector};
use crate::error::{ScanError, Stage};
use crate::frame::Frame;
use crate::history::RecognitionRecord;
use crate::ocr::{build_reader, OcrParams, PlateReader};
use crate::preprocess::PlatePreprocessor;
use crate::validate::PlateValidator;

/// The collaborators one tick runs a frame through.
pub struct RecognitionPipeline {
    detector: Box<dyn PlateDetector>,
    detect_params: DetectParams,
    preprocessor: PlatePreprocessor,
    reader: Box<dyn PlateReader>,
    ocr_params: OcrParams,
    validator: PlateValidator,
}

impl RecognitionPipeline {
    pub fn new(
        detector: Box<dyn PlateDetector>,
        preprocessor: PlatePreprocessor,
        reader: Box<dyn PlateReader>,
        validator: PlateValidator,
    ) -> Self {
        Self {
            detector,
            detect_params: DetectParams::default(),
            preprocessor,
            reader,
            ocr_params: OcrParams::default(),
            validator,
        }
    }

    pub fn with_detect_params(mut self, params: DetectParams) -> Self {
        self.detect_params = params;
        self
    }

    pub fn with_ocr_params(mut self, params: OcrParams) -> Self {
        self.ocr_params = params;
        self
    }

    /// Build every collaborator named by the configuration.
    pub fn from_config(cfg: &ScannerConfig, validator: PlateValidator) -> Result<Self> {
        let detector = build_detector(&cfg.detector)?;
        let reader = build_reader(&cfg.ocr)?;
        Ok(Self::new(
            detector,
            PlatePreprocessor::new(cfg.inset, cfg.upscale_percent),
            reader,
            validator,
        )
        .with_detect_params(cfg.detector.params())
        .with_ocr_params(cfg.ocr.params()))
    }

    /// Run one frame through the pipeline.
    ///
    /// Every error is recoverable at tick level: `NoCandidateRegion`,
    /// `EmptyRecognizedText`, or `DelegateFailure` naming the failing stage.
    pub fn process(&mut self, frame: &Frame) -> Result<RecognitionRecord, ScanError> {
        let regions = self
            .detector
            .detect(frame, &self.detect_params)
            .map_err(|e| ScanError::delegate(Stage::Detect, e))?;
        log::debug!("frame {}: {} candidate regions", frame.index(), regions.len());

        let candidate = self
            .preprocessor
            .extract(frame, &regions)
            .map_err(|e| ScanError::delegate(Stage::Preprocess, e))?
            .ok_or(ScanError::NoCandidateRegion)?;

        let raw = self
            .reader
            .recognize(&candidate, &self.ocr_params)
            .map_err(|e| ScanError::delegate(Stage::Ocr, e))?;

        let (text, status) = self
            .validator
            .classify(&raw)
            .ok_or(ScanError::EmptyRecognizedText)?;

        Ok(RecognitionRecord::new(
            text,
            candidate.into_image(),
            status,
            frame.index(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::StubDetector;
    use crate::frame::Region;
    use crate::ocr::ScriptedReader;
    use crate::validate::{Allowlist, AuthorizationStatus};
    use image::RgbImage;
    use std::sync::Arc;

    fn pipeline(detector: StubDetector, reader: ScriptedReader) -> RecognitionPipeline {
        RecognitionPipeline::new(
            Box::new(detector),
            PlatePreprocessor::default(),
            Box::new(reader),
            PlateValidator::new(Arc::new(Allowlist::new(["ABC123"]))),
        )
    }

    fn frame() -> Frame {
        Frame::new(RgbImage::new(320, 240), 4)
    }

    #[test]
    fn recognizes_allowlisted_plate() {
        let mut p = pipeline(
            StubDetector::with_regions(vec![Region::new(50, 50, 120, 60)]),
            ScriptedReader::cycle([" ABC123\n"]),
        );
        let record = p.process(&frame()).unwrap();
        assert_eq!(record.plate_text(), "ABC123");
        assert_eq!(record.authorization(), AuthorizationStatus::Authorized);
        assert_eq!(record.frame_index(), 4);
        // (120 - 35) * 3 x (60 - 25) * 3
        assert_eq!(record.cropped_image().dimensions(), (255, 105));
    }

    #[test]
    fn no_region_skips_ocr() {
        let mut p = pipeline(StubDetector::empty(), ScriptedReader::once(["ABC123"]));
        assert!(matches!(
            p.process(&frame()),
            Err(ScanError::NoCandidateRegion)
        ));
    }

    #[test]
    fn blank_text_is_not_a_record() {
        let mut p = pipeline(
            StubDetector::with_regions(vec![Region::new(50, 50, 120, 60)]),
            ScriptedReader::cycle(["   "]),
        );
        assert!(matches!(
            p.process(&frame()),
            Err(ScanError::EmptyRecognizedText)
        ));
    }

    #[test]
    fn ocr_failure_names_stage() {
        let mut p = pipeline(
            StubDetector::with_regions(vec![Region::new(50, 50, 120, 60)]),
            ScriptedReader::once(Vec::<String>::new()),
        );
        // An empty `once` script reads blank rather than failing.
        assert!(matches!(
            p.process(&frame()),
            Err(ScanError::EmptyRecognizedText)
        ));

        let mut p = pipeline(
            StubDetector::with_regions(vec![Region::new(50, 50, 120, 60)]),
            ScriptedReader::once(["ABC123"]),
        );
        assert!(p.process(&frame()).is_ok());
        assert!(matches!(
            p.process(&frame()),
            Err(ScanError::DelegateFailure {
                stage: Stage::Ocr,
                ..
            })
        ));
    }

    #[test]
    fn overflowing_region_is_a_preprocess_failure() {
        let mut p = pipeline(
            StubDetector::with_regions(vec![Region::new(i32::MAX - 5, 10, 40, 40)]),
            ScriptedReader::cycle(["ABC123"]),
        );
        assert!(matches!(
            p.process(&frame()),
            Err(ScanError::DelegateFailure {
                stage: Stage::Preprocess,
                ..
            })
        ));
    }

    #[test]
    fn degenerate_region_is_a_preprocess_failure() {
        let mut p = pipeline(
            StubDetector::with_regions(vec![Region::new(50, 50, 20, 20)]),
            ScriptedReader::cycle(["ABC123"]),
        );
        assert!(matches!(
            p.process(&frame()),
            Err(ScanError::DelegateFailure {
                stage: Stage::Preprocess,
                ..
            })
        ));
    }
}
