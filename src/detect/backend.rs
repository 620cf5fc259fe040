use anyhow::Result;

use crate::frame::{Frame, Region};

pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
pub const DEFAULT_MIN_NEIGHBORS: i32 = 5;

/// Tuning passed through to the detector unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectParams {
    /// Image pyramid step between detection scales.
    pub scale_factor: f64,
    /// Neighbouring hits a candidate needs to be kept.
    pub min_neighbors: i32,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
        }
    }
}

/// Plate-region detector backend.
///
/// Implementations receive the frame by shared reference and must not keep
/// it past the `detect` call. The returned regions are used in the order
/// given; an empty list means no plate in this frame.
pub trait PlateDetector {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Candidate plate regions in frame pixel coordinates.
    fn detect(&mut self, frame: &Frame, params: &DetectParams) -> Result<Vec<Region>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
