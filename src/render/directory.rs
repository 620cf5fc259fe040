//! Directory sink: mirrors the operator view as image files.
//!
//! Layout inside the output directory:
//! - `current.png`: latest frame, scaled to the frame view size
//! - `history_<n>.png`: plate thumbnails, oldest first, with a bottom band
//!   coloured by access status (green authorized, red denied)
//! - `history.json`: text and access status per history slot

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::RenderSink;
use crate::frame::Frame;
use crate::history::HistorySnapshot;
use crate::validate::AuthorizationStatus;

pub const FRAME_VIEW_SIZE: (u32, u32) = (730, 450);
pub const THUMBNAIL_SIZE: (u32, u32) = (200, 100);
/// Height of the access status band along the thumbnail's bottom edge.
pub const STATUS_BAND_HEIGHT: u32 = 8;

fn status_colour(status: AuthorizationStatus) -> Rgb<u8> {
    match status {
        AuthorizationStatus::Authorized => Rgb([0, 160, 0]),
        AuthorizationStatus::Denied => Rgb([200, 0, 0]),
    }
}

fn mark_status(thumb: &mut RgbImage, status: AuthorizationStatus) {
    let band = RgbImage::from_pixel(
        thumb.width(),
        STATUS_BAND_HEIGHT.min(thumb.height()),
        status_colour(status),
    );
    let y = thumb.height() - band.height();
    imageops::replace(thumb, &band, 0, i64::from(y));
}

#[derive(Serialize)]
struct HistoryEntry<'a> {
    slot: usize,
    plate_text: &'a str,
    authorization: AuthorizationStatus,
    frame_index: u64,
    thumbnail: String,
}

pub struct DirectorySink {
    dir: PathBuf,
    /// Thumbnails written by the previous history update.
    written: usize,
}

impl DirectorySink {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create render directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RenderSink for DirectorySink {
    fn display_current_frame(&mut self, frame: &Frame) -> Result<()> {
        let (width, height) = FRAME_VIEW_SIZE;
        let view = imageops::resize(frame.image(), width, height, FilterType::CatmullRom);
        let path = self.dir.join("current.png");
        view.save(&path)
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    fn display_history(&mut self, history: &HistorySnapshot) -> Result<()> {
        let (width, height) = THUMBNAIL_SIZE;
        let mut entries = Vec::with_capacity(history.len());
        for (slot, record) in history.iter().enumerate() {
            let name = format!("history_{}.png", slot);
            let mut thumb = imageops::resize(
                record.cropped_image(),
                width,
                height,
                FilterType::CatmullRom,
            );
            mark_status(&mut thumb, record.authorization());
            let path = self.dir.join(&name);
            thumb
                .save(&path)
                .with_context(|| format!("write {}", path.display()))?;
            entries.push(HistoryEntry {
                slot,
                plate_text: record.plate_text(),
                authorization: record.authorization(),
                frame_index: record.frame_index(),
                thumbnail: name,
            });
        }
        for stale in history.len()..self.written {
            let path = self.dir.join(format!("history_{}.png", stale));
            if let Err(err) = std::fs::remove_file(&path) {
                log::debug!("remove stale thumbnail {}: {}", path.display(), err);
            }
        }
        self.written = history.len();

        let json = serde_json::to_vec_pretty(&entries)?;
        let path = self.dir.join("history.json");
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoryCache, RecognitionRecord};

    #[test]
    fn writes_frame_thumbnails_and_index() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut sink = DirectorySink::new(&dir.path().join("view"))?;

        sink.display_current_frame(&Frame::new(RgbImage::new(64, 48), 1))?;
        let current = image::open(sink.dir().join("current.png"))?;
        assert_eq!((current.width(), current.height()), FRAME_VIEW_SIZE);

        let mut cache = HistoryCache::new();
        cache.append(RecognitionRecord::new(
            "QWE456",
            RgbImage::new(30, 10),
            AuthorizationStatus::Authorized,
            1,
        ));
        cache.append(RecognitionRecord::new(
            "ZZZ999",
            RgbImage::new(30, 10),
            AuthorizationStatus::Denied,
            2,
        ));
        sink.display_history(&cache.snapshot())?;

        let thumb = image::open(sink.dir().join("history_1.png"))?.to_rgb8();
        assert_eq!(thumb.dimensions(), THUMBNAIL_SIZE);
        let (w, h) = THUMBNAIL_SIZE;
        assert_eq!(thumb.get_pixel(w / 2, h - 1), &Rgb([200, 0, 0]));
        assert_eq!(thumb.get_pixel(w / 2, 0), &Rgb([0, 0, 0]));
        let first = image::open(sink.dir().join("history_0.png"))?.to_rgb8();
        assert_eq!(first.get_pixel(0, h - 1), &Rgb([0, 160, 0]));
        let index: serde_json::Value =
            serde_json::from_slice(&std::fs::read(sink.dir().join("history.json"))?)?;
        assert_eq!(index[0]["plate_text"], "QWE456");
        assert_eq!(index[0]["authorization"], "Authorized");
        assert_eq!(index[1]["authorization"], "Denied");
        Ok(())
    }
}
