//! Plate-region detection.
//!
//! The detector is an external collaborator: this module only defines the
//! contract the pipeline needs and the backends that satisfy it.
//! - `stub`: fixed regions (always available)
//! - `cascade`: OpenCV Haar cascade (feature: detector-opencv)

mod backend;
mod backends;
mod registry;

pub use backend::{DetectParams, PlateDetector, DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR};
pub use backends::StubDetector;
#[cfg(feature = "detector-opencv")]
pub use backends::CascadeDetector;
pub use registry::{available_detectors, build_detector};

pub(crate) use backends::stub::centered_region;
