pub mod stub;

#[cfg(feature = "detector-opencv")]
pub mod cascade;

pub use stub::StubDetector;

#[cfg(feature = "detector-opencv")]
pub use cascade::CascadeDetector;
