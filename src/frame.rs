//! Frame and plate-candidate image types.
//!
//! - `Frame`: one captured RGB raster, owned by the scheduler for a single tick.
//! - `Region`: a rectangle reported by the plate detector, in frame pixels.
//! - `PlateCandidateImage`: the inset, cropped and upscaled plate area handed to OCR.
//!
//! None of these are retained past the tick that produced them, except the
//! candidate crop once it is promoted into a `RecognitionRecord`.

use anyhow::{anyhow, Result};
use image::{GrayImage, RgbImage};

// ----------------------------------------------------------------------------
// Frame: immutable capture raster
// ----------------------------------------------------------------------------

/// Immutable RGB frame for one capture tick.
///
/// The pixel buffer is only reachable through a shared reference, so
/// collaborators can read but never mutate the frame they are handed.
pub struct Frame {
    image: RgbImage,
    /// Sequence number assigned by the capture session (1-based).
    index: u64,
}

impl Frame {
    pub fn new(image: RgbImage, index: u64) -> Self {
        Self { image, index }
    }

    /// Build a frame from packed RGB24 bytes.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>, index: u64) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("RGB frame dimensions overflow"))? as usize;
        let actual = pixels.len();
        let image = RgbImage::from_raw(width, height, pixels).ok_or_else(|| {
            anyhow!(
                "RGB frame length mismatch: expected {}, got {}",
                expected,
                actual
            )
        })?;
        Ok(Self::new(image, index))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Pixel data is deliberately left out of debug output.
        f.debug_struct("Frame")
            .field("index", &self.index)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Region: detector output
// ----------------------------------------------------------------------------

/// Candidate plate rectangle `(x, y, w, h)` in frame pixel coordinates.
///
/// Signed, because detectors may report boxes that start outside the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Shrink the region by a fixed margin on every side.
    ///
    /// Fails when the result does not fit the `i32` coordinate space.
    pub fn inset(&self, inset: &Inset) -> Result<Region> {
        let overflow = || anyhow!("inset {:?} overflows region {:?}", inset, self);
        Ok(Region {
            x: self.x.checked_add(inset.left).ok_or_else(overflow)?,
            y: self.y.checked_add(inset.top).ok_or_else(overflow)?,
            w: self
                .w
                .checked_sub(inset.left)
                .and_then(|w| w.checked_sub(inset.right))
                .ok_or_else(overflow)?,
            h: self
                .h
                .checked_sub(inset.top)
                .and_then(|h| h.checked_sub(inset.bottom))
                .ok_or_else(overflow)?,
        })
    }

    /// Intersect with a `width` x `height` frame.
    ///
    /// Returns `(x, y, w, h)` in unsigned pixels, or `None` when nothing of the
    /// region lies inside the frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.x) + i64::from(self.w)).min(i64::from(width));
        let y1 = (i64::from(self.y) + i64::from(self.h)).min(i64::from(height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
    }
}

/// Inward margin applied to detector regions before cropping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct Inset {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Inset {
    /// Largest margin accepted from configuration.
    pub const MAX_MARGIN: i32 = 10_000;

    /// Every margin within `0..=MAX_MARGIN`.
    pub fn is_valid(&self) -> bool {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .all(|m| (0..=Self::MAX_MARGIN).contains(m))
    }
}

impl Default for Inset {
    fn default() -> Self {
        Self {
            left: 15,
            top: 15,
            right: 20,
            bottom: 10,
        }
    }
}

// ----------------------------------------------------------------------------
// PlateCandidateImage: OCR input
// ----------------------------------------------------------------------------

/// Cropped and upscaled plate area derived from one frame.
#[derive(Clone, Debug)]
pub struct PlateCandidateImage {
    image: RgbImage,
    /// The inset region the crop was taken from, before upscaling.
    source_region: Region,
}

impl PlateCandidateImage {
    pub(crate) fn new(image: RgbImage, source_region: Region) -> Self {
        Self {
            image,
            source_region,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn source_region(&self) -> Region {
        self.source_region
    }

    /// Grayscale copy for text recognition.
    pub fn luma(&self) -> GrayImage {
        image::imageops::grayscale(&self.image)
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgb_validates_length() {
        assert!(Frame::from_rgb(2, 2, vec![0u8; 12], 1).is_ok());
        let err = Frame::from_rgb(2, 2, vec![0u8; 11], 1).unwrap_err();
        assert!(err.to_string().contains("expected 12, got 11"));
    }

    #[test]
    fn inset_applies_fixed_margins() {
        let region = Region::new(100, 50, 200, 60);
        let inset = region.inset(&Inset::default()).unwrap();
        assert_eq!(inset, Region::new(115, 65, 165, 35));
    }

    #[test]
    fn inset_overflow_is_an_error() {
        let region = Region::new(i32::MAX - 5, 10, 40, 40);
        assert!(region.inset(&Inset::default()).is_err());

        let huge = Inset {
            left: i32::MAX,
            ..Inset::default()
        };
        assert!(Region::new(-10, 0, -10, 40).inset(&huge).is_err());
        assert!(!huge.is_valid());
        assert!(Inset::default().is_valid());
    }

    #[test]
    fn clamp_trims_to_frame_bounds() {
        let region = Region::new(-10, 5, 50, 100);
        assert_eq!(region.clamp_to(30, 40), Some((0, 5, 30, 35)));
    }

    #[test]
    fn clamp_rejects_degenerate_regions() {
        assert_eq!(Region::new(10, 10, 0, 5).clamp_to(100, 100), None);
        assert_eq!(Region::new(10, 10, -5, 5).clamp_to(100, 100), None);
        assert_eq!(Region::new(200, 10, 5, 5).clamp_to(100, 100), None);
    }

    #[test]
    fn frame_debug_omits_pixels() {
        let frame = Frame::from_rgb(1, 1, vec![1, 2, 3], 7).unwrap();
        let debug = format!("{:?}", frame);
        assert!(debug.contains("index: 7"));
        assert!(!debug.contains("image"));
    }
}
