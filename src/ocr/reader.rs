use anyhow::{bail, Result};

use crate::config::OcrSettings;
use crate::frame::PlateCandidateImage;

use super::backends::ScriptedReader;

/// Characters a plate may contain.
pub const DEFAULT_CHAR_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Assume a single uniform block of text.
pub const DEFAULT_PAGE_SEG_MODE: u32 = 6;
/// Let the engine pick between legacy and LSTM recognisers.
pub const DEFAULT_ENGINE_MODE: u32 = 3;

/// Recognition configuration passed to the OCR engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OcrParams {
    pub char_whitelist: String,
    pub page_seg_mode: u32,
    pub engine_mode: u32,
}

impl Default for OcrParams {
    fn default() -> Self {
        Self {
            char_whitelist: DEFAULT_CHAR_WHITELIST.to_string(),
            page_seg_mode: DEFAULT_PAGE_SEG_MODE,
            engine_mode: DEFAULT_ENGINE_MODE,
        }
    }
}

/// OCR engine backend.
///
/// Returns the raw recognized text; trimming and validation happen in the
/// pipeline. Blank output is a valid answer, not an error.
pub trait PlateReader {
    fn name(&self) -> &'static str;

    fn recognize(&mut self, candidate: &PlateCandidateImage, params: &OcrParams)
        -> Result<String>;
}

pub fn available_readers() -> Vec<&'static str> {
    let mut names = vec!["stub"];
    if cfg!(feature = "ocr-tesseract") {
        names.push("tesseract");
    }
    names
}

/// Construct the reader named by `settings.backend`.
pub fn build_reader(settings: &OcrSettings) -> Result<Box<dyn PlateReader>> {
    let reader: Box<dyn PlateReader> = match settings.backend.as_str() {
        "stub" => Box::new(ScriptedReader::cycle(settings.stub_texts.clone())),
        "tesseract" => {
            #[cfg(feature = "ocr-tesseract")]
            {
                Box::new(super::backends::TesseractReader::new(
                    settings.data_path.as_deref(),
                    &settings.language,
                    &settings.params(),
                )?)
            }
            #[cfg(not(feature = "ocr-tesseract"))]
            {
                bail!("tesseract reader requires the ocr-tesseract feature")
            }
        }
        other => bail!(
            "unknown ocr backend '{}' (available: {})",
            other,
            available_readers().join(", ")
        ),
    };
    log::info!("ocr backend: {}", reader.name());
    Ok(reader)
}
