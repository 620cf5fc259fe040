use anyhow::{bail, Result};

use crate::frame::PlateCandidateImage;
use crate::ocr::reader::{OcrParams, PlateReader};

/// Reader that replays a fixed list of texts, one per call.
///
/// `cycle` wraps around forever; `once` fails after the last text, which lets
/// tests exercise delegate failures.
#[derive(Clone, Debug)]
pub struct ScriptedReader {
    texts: Vec<String>,
    next: usize,
    wrap: bool,
}

impl ScriptedReader {
    pub fn cycle<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(texts, true)
    }

    pub fn once<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(texts, false)
    }

    fn build<I, S>(texts: I, wrap: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            next: 0,
            wrap,
        }
    }

    /// Number of texts handed out so far.
    pub fn calls(&self) -> usize {
        self.next
    }
}

impl PlateReader for ScriptedReader {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn recognize(
        &mut self,
        _candidate: &PlateCandidateImage,
        _params: &OcrParams,
    ) -> Result<String> {
        if self.texts.is_empty() {
            return Ok(String::new());
        }
        let index = if self.wrap {
            self.next % self.texts.len()
        } else {
            self.next
        };
        let Some(text) = self.texts.get(index) else {
            bail!("scripted reader exhausted after {} texts", self.texts.len());
        };
        self.next += 1;
        Ok(text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Region;
    use image::RgbImage;

    fn candidate() -> PlateCandidateImage {
        PlateCandidateImage::new(RgbImage::new(3, 3), Region::new(0, 0, 3, 3))
    }

    #[test]
    fn cycle_wraps_around() {
        let mut reader = ScriptedReader::cycle(["A", "B"]);
        let params = OcrParams::default();
        let texts: Vec<String> = (0..5)
            .map(|_| reader.recognize(&candidate(), &params).unwrap())
            .collect();
        assert_eq!(texts, vec!["A", "B", "A", "B", "A"]);
        assert_eq!(reader.calls(), 5);
    }

    #[test]
    fn once_fails_when_exhausted() {
        let mut reader = ScriptedReader::once(["A"]);
        let params = OcrParams::default();
        assert_eq!(reader.recognize(&candidate(), &params).unwrap(), "A");
        assert!(reader.recognize(&candidate(), &params).is_err());
    }

    #[test]
    fn empty_script_reads_blank() {
        let mut reader = ScriptedReader::cycle(Vec::<String>::new());
        let text = reader
            .recognize(&candidate(), &OcrParams::default())
            .unwrap();
        assert!(text.is_empty());
    }
}
