//! Haar cascade plate detector (OpenCV).

use anyhow::{anyhow, Context, Result};
use opencv::core::{Mat, Rect, Scalar, Size, Vector, CV_8UC1};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;

use crate::detect::backend::{DetectParams, PlateDetector};
use crate::frame::{Frame, Region};

pub struct CascadeDetector {
    classifier: CascadeClassifier,
}

impl CascadeDetector {
    /// Load a cascade definition (e.g. `haarcascade_russian_plate_number.xml`).
    pub fn new(path: &str) -> Result<Self> {
        let classifier = CascadeClassifier::new(path)
            .with_context(|| format!("load cascade classifier {}", path))?;
        if classifier.empty().context("query cascade classifier")? {
            return Err(anyhow!("cascade classifier {} is empty", path));
        }
        log::info!("CascadeDetector: loaded {}", path);
        Ok(Self { classifier })
    }
}

/// Copy the frame's luma plane into a single-channel `Mat`.
fn luma_mat(frame: &Frame) -> Result<Mat> {
    let gray = image::imageops::grayscale(frame.image());
    let mut mat = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        CV_8UC1,
        Scalar::all(0.0),
    )
    .context("allocate detection buffer")?;
    mat.data_bytes_mut()
        .context("access detection buffer")?
        .copy_from_slice(gray.as_raw());
    Ok(mat)
}

impl PlateDetector for CascadeDetector {
    fn name(&self) -> &'static str {
        "cascade"
    }

    fn detect(&mut self, frame: &Frame, params: &DetectParams) -> Result<Vec<Region>> {
        let image = luma_mat(frame)?;
        let mut rects = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                &image,
                &mut rects,
                params.scale_factor,
                params.min_neighbors,
                0,
                Size::default(),
                Size::default(),
            )
            .context("cascade detect_multi_scale")?;
        Ok(rects
            .iter()
            .map(|r| Region::new(r.x, r.y, r.width, r.height))
            .collect())
    }
}
