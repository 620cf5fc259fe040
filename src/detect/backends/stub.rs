use anyhow::Result;

use crate::detect::backend::{DetectParams, PlateDetector};
use crate::frame::{Frame, Region};

/// Detector stub for demos and tests.
///
/// Reports a fixed list of regions for every frame. When no regions are
/// configured it reports one box over the middle of the frame, which is where
/// the synthetic camera paints its plate.
#[derive(Clone, Debug, Default)]
pub struct StubDetector {
    regions: Option<Vec<Region>>,
}

impl StubDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_regions(regions: Vec<Region>) -> Self {
        Self {
            regions: Some(regions),
        }
    }

    /// Detector that never finds anything.
    pub fn empty() -> Self {
        Self::with_regions(Vec::new())
    }
}

/// Middle third of the frame horizontally, middle fifth vertically.
pub(crate) fn centered_region(width: u32, height: u32) -> Region {
    let w = (width / 3) as i32;
    let h = (height / 5) as i32;
    Region::new((width as i32 - w) / 2, (height as i32 - h) / 2, w, h)
}

impl PlateDetector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, frame: &Frame, _params: &DetectParams) -> Result<Vec<Region>> {
        match &self.regions {
            Some(regions) => Ok(regions.clone()),
            None => Ok(vec![centered_region(frame.width(), frame.height())]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn default_stub_reports_centered_region() {
        let frame = Frame::new(RgbImage::new(640, 480), 1);
        let mut detector = StubDetector::new();
        let regions = detector.detect(&frame, &DetectParams::default()).unwrap();
        assert_eq!(regions, vec![Region::new(213, 192, 213, 96)]);
    }

    #[test]
    fn configured_regions_are_reported_in_order() {
        let frame = Frame::new(RgbImage::new(64, 64), 1);
        let regions = vec![Region::new(1, 2, 3, 4), Region::new(5, 6, 7, 8)];
        let mut detector = StubDetector::with_regions(regions.clone());
        assert_eq!(
            detector.detect(&frame, &DetectParams::default()).unwrap(),
            regions
        );
        assert!(StubDetector::empty()
            .detect(&frame, &DetectParams::default())
            .unwrap()
            .is_empty());
    }
}
