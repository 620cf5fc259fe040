//! Plate candidate preprocessing.
//!
//! Turns a frame plus the detector's region list into a single image ready for
//! OCR: pick the region, pull its borders in, crop, then upscale uniformly.

use anyhow::{anyhow, bail, Result};
use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::frame::{Frame, Inset, PlateCandidateImage, Region};
use crate::UPSCALE_PERCENT;

#[derive(Clone, Debug)]
pub struct PlatePreprocessor {
    inset: Inset,
    upscale_percent: u32,
}

impl PlatePreprocessor {
    pub fn new(inset: Inset, upscale_percent: u32) -> Self {
        Self {
            inset,
            upscale_percent,
        }
    }

    /// Region used for recognition when the detector reports several.
    ///
    /// The last region in detector order wins; there is no confidence ranking.
    pub fn select_region(regions: &[Region]) -> Option<Region> {
        regions.last().copied()
    }

    /// Produce the OCR candidate for this frame.
    ///
    /// `Ok(None)` means the detector found nothing; errors mean the selected
    /// region could not be turned into an image.
    pub fn extract(
        &self,
        frame: &Frame,
        regions: &[Region],
    ) -> Result<Option<PlateCandidateImage>> {
        let Some(region) = Self::select_region(regions) else {
            return Ok(None);
        };
        let inset = region.inset(&self.inset)?;
        let cropped = self.crop(frame, region)?;
        let enlarged = enlarge(&cropped, self.upscale_percent)?;
        Ok(Some(PlateCandidateImage::new(enlarged, inset)))
    }

    /// Crop the inset region out of the frame, clipped to the frame bounds.
    pub fn crop(&self, frame: &Frame, region: Region) -> Result<RgbImage> {
        let inset = region.inset(&self.inset)?;
        let (x, y, w, h) = inset
            .clamp_to(frame.width(), frame.height())
            .ok_or_else(|| {
                anyhow!(
                    "inset region {:?} (from {:?}) is empty within {}x{} frame",
                    inset,
                    region,
                    frame.width(),
                    frame.height()
                )
            })?;
        Ok(imageops::crop_imm(frame.image(), x, y, w, h).to_image())
    }
}

impl Default for PlatePreprocessor {
    fn default() -> Self {
        Self::new(Inset::default(), UPSCALE_PERCENT)
    }
}

/// Scale an image uniformly by `percent` (300 = three times larger).
///
/// Target dimensions truncate toward zero. Upscaling uses linear filtering,
/// which is what area interpolation reduces to when enlarging.
pub fn enlarge(image: &RgbImage, percent: u32) -> Result<RgbImage> {
    let scaled = |side: u32| {
        u32::try_from(u64::from(side) * u64::from(percent) / 100).map_err(|_| {
            anyhow!(
                "scaling {}x{} image by {}% exceeds the maximum image size",
                image.width(),
                image.height(),
                percent
            )
        })
    };
    let width = scaled(image.width())?;
    let height = scaled(image.height())?;
    if width == 0 || height == 0 {
        bail!(
            "cannot scale {}x{} image by {}%",
            image.width(),
            image.height(),
            percent
        );
    }
    if width == image.width() && height == image.height() {
        return Ok(image.clone());
    }
    let filter = if percent >= 100 {
        FilterType::Triangle
    } else {
        FilterType::CatmullRom
    };
    Ok(imageops::resize(image, width, height, filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]));
        Frame::new(image, 1)
    }

    #[test]
    fn no_regions_means_no_candidate() {
        let frame = gradient_frame(64, 48);
        let pre = PlatePreprocessor::default();
        assert!(pre.extract(&frame, &[]).unwrap().is_none());
    }

    #[test]
    fn last_region_is_selected() {
        let regions = [
            Region::new(0, 0, 100, 50),
            Region::new(10, 10, 80, 40),
            Region::new(5, 5, 60, 30),
        ];
        assert_eq!(
            PlatePreprocessor::select_region(&regions),
            Some(Region::new(5, 5, 60, 30))
        );
    }

    #[test]
    fn crop_applies_inset_before_cutting() {
        let frame = gradient_frame(200, 100);
        let pre = PlatePreprocessor::default();
        let crop = pre.crop(&frame, Region::new(20, 10, 100, 50)).unwrap();
        // x: 20+15 .. 20+100-20, y: 10+15 .. 10+50-10
        assert_eq!(crop.dimensions(), (65, 25));
        assert_eq!(crop.get_pixel(0, 0), &Rgb([35, 25, 0]));
    }

    #[test]
    fn extract_upscales_by_configured_percent() {
        let frame = gradient_frame(200, 100);
        let pre = PlatePreprocessor::default();
        let candidate = pre
            .extract(&frame, &[Region::new(20, 10, 100, 50)])
            .unwrap()
            .expect("candidate");
        assert_eq!((candidate.width(), candidate.height()), (195, 75));
        assert_eq!(candidate.source_region(), Region::new(35, 25, 65, 25));
    }

    #[test]
    fn region_smaller_than_inset_is_an_error() {
        let frame = gradient_frame(200, 100);
        let pre = PlatePreprocessor::default();
        assert!(pre.extract(&frame, &[Region::new(10, 10, 30, 20)]).is_err());
    }

    #[test]
    fn enlarge_truncates_dimensions() {
        let image = RgbImage::new(7, 3);
        let out = enlarge(&image, 150).unwrap();
        assert_eq!(out.dimensions(), (10, 4));
        assert!(enlarge(&image, 10).is_err());
    }

    #[test]
    fn enlarge_rejects_oversized_targets() {
        let image = RgbImage::new(200, 1);
        let err = enlarge(&image, u32::MAX).unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum image size"));
    }

    #[test]
    fn region_at_coordinate_limit_is_an_error() {
        let frame = gradient_frame(64, 64);
        let pre = PlatePreprocessor::default();
        assert!(pre
            .extract(&frame, &[Region::new(i32::MAX - 5, 10, 40, 40)])
            .is_err());
    }
}
