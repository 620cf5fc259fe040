//! Synthetic camera (`stub://`) for tests and demos.

use anyhow::{anyhow, Result};
use image::{Rgb, RgbImage};

use super::{CaptureSession, VideoSource};
use crate::detect::centered_region;
use crate::frame::Frame;

/// Configuration for the synthetic camera.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Stop yielding frames after this many reads.
    pub frame_limit: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            url: "stub://camera0".to_string(),
            width: 640,
            height: 480,
            frame_limit: None,
        }
    }
}

impl SyntheticConfig {
    /// Parse `stub://name[?frames=N]`.
    pub fn from_url(url: &str) -> Result<Self> {
        let mut config = Self {
            url: url.to_string(),
            ..Self::default()
        };
        if let Some((_, query)) = url.split_once('?') {
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some(("frames", value)) => {
                        let limit = value
                            .parse()
                            .map_err(|_| anyhow!("invalid frame limit in {}", url))?;
                        config.frame_limit = Some(limit);
                    }
                    _ => return Err(anyhow!("unsupported stub parameter '{}' in {}", pair, url)),
                }
            }
        }
        Ok(config)
    }
}

/// Synthetic camera. Always opens successfully.
pub struct SyntheticSource {
    config: SyntheticConfig,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }
}

impl VideoSource for SyntheticSource {
    fn describe(&self) -> String {
        self.config.url.clone()
    }

    fn open(&mut self) -> Result<Box<dyn CaptureSession>> {
        log::info!("SyntheticSource: connected to {}", self.config.url);
        Ok(Box::new(SyntheticSession {
            config: self.config.clone(),
            frame_count: 0,
            released: false,
        }))
    }
}

struct SyntheticSession {
    config: SyntheticConfig,
    frame_count: u64,
    released: bool,
}

impl SyntheticSession {
    /// Gray road scene with a light plate-shaped block in the middle.
    ///
    /// The dark bars inside the plate drift by one pixel per frame so
    /// consecutive frames differ.
    fn generate_pixels(&self) -> RgbImage {
        let (width, height) = (self.config.width, self.config.height);
        let plate = centered_region(width, height)
            .clamp_to(width, height)
            .unwrap_or((0, 0, 0, 0));
        let shift = (self.frame_count % 8) as u32;
        RgbImage::from_fn(width, height, |x, y| {
            let inside =
                x >= plate.0 && x < plate.0 + plate.2 && y >= plate.1 && y < plate.1 + plate.3;
            if !inside {
                let shade = 60 + ((x + y) % 40) as u8;
                return Rgb([shade, shade, shade]);
            }
            if ((x - plate.0 + shift) / 6) % 3 == 0 {
                Rgb([20, 20, 20])
            } else {
                Rgb([235, 235, 225])
            }
        })
    }
}

impl CaptureSession for SyntheticSession {
    fn read(&mut self) -> Result<Option<Frame>> {
        if self.released {
            return Ok(None);
        }
        if self
            .config
            .frame_limit
            .is_some_and(|limit| self.frame_count >= limit)
        {
            return Ok(None);
        }
        let image = self.generate_pixels();
        self.frame_count += 1;
        Ok(Some(Frame::new(image, self.frame_count)))
    }

    fn release(&mut self) {
        if !self.released {
            log::info!(
                "SyntheticSource: released {} after {} frames",
                self.config.url,
                self.frame_count
            );
        }
        self.released = true;
    }

    fn frames_read(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frame_limit() -> Result<()> {
        let config = SyntheticConfig::from_url("stub://cam?frames=3")?;
        assert_eq!(config.frame_limit, Some(3));
        assert_eq!(SyntheticConfig::from_url("stub://cam")?.frame_limit, None);
        assert!(SyntheticConfig::from_url("stub://cam?frames=x").is_err());
        assert!(SyntheticConfig::from_url("stub://cam?fps=3").is_err());
        Ok(())
    }

    #[test]
    fn produces_numbered_frames() -> Result<()> {
        let mut source = SyntheticSource::new(SyntheticConfig::default());
        let mut session = source.open()?;
        let first = session.read()?.expect("frame");
        let second = session.read()?.expect("frame");
        assert_eq!((first.width(), first.height()), (640, 480));
        assert_eq!((first.index(), second.index()), (1, 2));
        assert_ne!(first.image().as_raw(), second.image().as_raw());
        assert_eq!(session.frames_read(), 2);
        Ok(())
    }

    #[test]
    fn released_session_yields_nothing() -> Result<()> {
        let mut source = SyntheticSource::new(SyntheticConfig::default());
        let mut session = source.open()?;
        session.release();
        assert!(session.read()?.is_none());
        Ok(())
    }
}
