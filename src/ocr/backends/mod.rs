pub mod scripted;

#[cfg(feature = "ocr-tesseract")]
pub mod tesseract;

pub use scripted::ScriptedReader;

#[cfg(feature = "ocr-tesseract")]
pub use tesseract::TesseractReader;
