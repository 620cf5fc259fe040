//! Still-image source: a directory of PNG/JPEG files played back in name order.
//!
//! Useful for replaying captured gate snapshots. A single image file is
//! treated as a one-frame directory.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

use super::{CaptureSession, VideoSource};
use crate::frame::Frame;

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub struct StillsSource {
    path: PathBuf,
}

impl StillsSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn list_images(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        if !is_image(path) {
            return Err(anyhow!("{} is not a PNG or JPEG image", path.display()));
        }
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)
        .with_context(|| format!("open image directory {}", path.display()))?
    {
        let entry_path = entry?.path();
        if entry_path.is_file() && is_image(&entry_path) {
            files.push(entry_path);
        }
    }
    files.sort();
    Ok(files)
}

impl VideoSource for StillsSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&mut self) -> Result<Box<dyn CaptureSession>> {
        let files = list_images(&self.path)?;
        log::info!(
            "StillsSource: connected to {} ({} images)",
            self.path.display(),
            files.len()
        );
        Ok(Box::new(StillsSession {
            files,
            next: 0,
            released: false,
        }))
    }
}

struct StillsSession {
    files: Vec<PathBuf>,
    next: usize,
    released: bool,
}

impl CaptureSession for StillsSession {
    fn read(&mut self) -> Result<Option<Frame>> {
        if self.released {
            return Ok(None);
        }
        let Some(path) = self.files.get(self.next) else {
            return Ok(None);
        };
        // Advance first so an undecodable file is skipped on the next tick.
        self.next += 1;
        let image = image::open(path)
            .with_context(|| format!("decode {}", path.display()))?
            .to_rgb8();
        Ok(Some(Frame::new(image, self.next as u64)))
    }

    fn release(&mut self) {
        self.released = true;
    }

    fn frames_read(&self) -> u64 {
        self.next as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn plays_images_in_name_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        RgbImage::from_pixel(4, 2, Rgb([200, 0, 0])).save(dir.path().join("b.png"))?;
        RgbImage::from_pixel(3, 3, Rgb([0, 200, 0])).save(dir.path().join("a.png"))?;
        std::fs::write(dir.path().join("notes.txt"), "ignored")?;

        let mut source = StillsSource::new(dir.path());
        let mut session = source.open()?;
        let first = session.read()?.expect("first frame");
        let second = session.read()?.expect("second frame");
        assert_eq!((first.width(), first.height()), (3, 3));
        assert_eq!((second.width(), second.height()), (4, 2));
        assert!(session.read()?.is_none());
        assert_eq!(session.frames_read(), 2);
        Ok(())
    }

    #[test]
    fn missing_directory_fails_to_open() {
        let mut source = StillsSource::new(Path::new("/nonexistent/plate-scanner/stills"));
        assert!(source.open().is_err());
    }

    #[test]
    fn undecodable_file_is_skipped_after_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("a.png"), b"not a png")?;
        RgbImage::new(2, 2).save(dir.path().join("b.png"))?;

        let mut session = StillsSource::new(dir.path()).open()?;
        assert!(session.read().is_err());
        assert!(session.read()?.is_some());
        Ok(())
    }
}
