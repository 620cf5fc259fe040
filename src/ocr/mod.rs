//! Optical character recognition.
//!
//! Like detection, OCR is delegated: the pipeline hands a plate candidate to a
//! `PlateReader` and gets raw text back.
//! - `stub`: replays configured texts (always available)
//! - `tesseract`: Tesseract via leptess (feature: ocr-tesseract)

mod backends;
mod reader;

pub use backends::ScriptedReader;
#[cfg(feature = "ocr-tesseract")]
pub use backends::TesseractReader;
pub use reader::{
    available_readers, build_reader, OcrParams, PlateReader, DEFAULT_CHAR_WHITELIST,
    DEFAULT_ENGINE_MODE, DEFAULT_PAGE_SEG_MODE,
};
