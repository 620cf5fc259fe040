use anyhow::{bail, Result};

use crate::config::DetectorSettings;
use crate::frame::Region;

use super::backend::PlateDetector;
use super::backends::StubDetector;

/// Detector backends compiled into this build.
pub fn available_detectors() -> Vec<&'static str> {
    let mut names = vec!["stub"];
    if cfg!(feature = "detector-opencv") {
        names.push("cascade");
    }
    names
}

/// Construct the detector named by `settings.backend`.
pub fn build_detector(settings: &DetectorSettings) -> Result<Box<dyn PlateDetector>> {
    let mut detector: Box<dyn PlateDetector> = match settings.backend.as_str() {
        "stub" => match &settings.regions {
            Some(regions) => Box::new(StubDetector::with_regions(
                regions
                    .iter()
                    .map(|[x, y, w, h]| Region::new(*x, *y, *w, *h))
                    .collect(),
            )),
            None => Box::new(StubDetector::new()),
        },
        "cascade" => {
            #[cfg(feature = "detector-opencv")]
            {
                Box::new(super::backends::CascadeDetector::new(&settings.cascade_path)?)
            }
            #[cfg(not(feature = "detector-opencv"))]
            {
                bail!("cascade detector requires the detector-opencv feature")
            }
        }
        other => bail!(
            "unknown detector backend '{}' (available: {})",
            other,
            available_detectors().join(", ")
        ),
    };
    detector.warm_up()?;
    log::info!("detector backend: {}", detector.name());
    Ok(detector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::DetectParams;
    use crate::frame::Frame;
    use image::RgbImage;

    #[test]
    fn builds_stub_with_configured_regions() {
        let settings = DetectorSettings {
            regions: Some(vec![[1, 2, 30, 40]]),
            ..DetectorSettings::default()
        };
        let mut detector = build_detector(&settings).unwrap();
        assert_eq!(detector.name(), "stub");
        let frame = Frame::new(RgbImage::new(8, 8), 1);
        assert_eq!(
            detector.detect(&frame, &DetectParams::default()).unwrap(),
            vec![Region::new(1, 2, 30, 40)]
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let settings = DetectorSettings {
            backend: "yolo".to_string(),
            ..DetectorSettings::default()
        };
        let err = build_detector(&settings).err().expect("error");
        assert!(err.to_string().contains("unknown detector backend 'yolo'"));
    }

    #[cfg(not(feature = "detector-opencv"))]
    #[test]
    fn cascade_needs_feature() {
        let settings = DetectorSettings {
            backend: "cascade".to_string(),
            ..DetectorSettings::default()
        };
        assert!(build_detector(&settings).is_err());
    }
}
