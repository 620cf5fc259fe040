//! Tesseract reader (leptess).

use anyhow::{anyhow, Context, Result};
use leptess::tesseract::TessApi;
use std::ffi::CString;

use crate::frame::PlateCandidateImage;
use crate::ocr::reader::{OcrParams, PlateReader};

pub struct TesseractReader {
    api: TessApi,
}

impl TesseractReader {
    pub fn new(data_path: Option<&str>, language: &str, params: &OcrParams) -> Result<Self> {
        let mut api = TessApi::new(data_path, language)
            .map_err(|e| anyhow!("init tesseract ({}): {:?}", language, e))?;

        let data_path_cstr = data_path
            .map(CString::new)
            .transpose()
            .context("tesseract data path")?;
        let lang = CString::new(language).context("tesseract language")?;
        api.raw
            .init_4(data_path_cstr.as_deref(), Some(lang.as_ref()), params.engine_mode)
            .map_err(|e| anyhow!("init tesseract engine mode {}: {:?}", params.engine_mode, e))?;

        set_variable(&mut api, "tessedit_char_whitelist", &params.char_whitelist)?;
        set_variable(
            &mut api,
            "tessedit_pageseg_mode",
            &params.page_seg_mode.to_string(),
        )?;

        log::info!(
            "TesseractReader: language={} psm={} oem={}",
            language,
            params.page_seg_mode,
            params.engine_mode
        );
        Ok(Self { api })
    }
}

fn set_variable(api: &mut TessApi, name: &str, value: &str) -> Result<()> {
    let name_c = CString::new(name).context("tesseract variable name")?;
    let value_c = CString::new(value).context("tesseract variable value")?;
    api.raw
        .set_variable(&name_c, &value_c)
        .map_err(|e| anyhow!("set tesseract variable {}: {:?}", name, e))
}

impl PlateReader for TesseractReader {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(
        &mut self,
        candidate: &PlateCandidateImage,
        _params: &OcrParams,
    ) -> Result<String> {
        // Whitelist and segmentation mode are applied once at construction.
        let gray = candidate.luma();
        let width = gray.width() as i32;
        let height = gray.height() as i32;
        self.api
            .raw
            .set_image(gray.as_raw(), width, height, 1, width)
            .map_err(|e| anyhow!("set tesseract image: {:?}", e))?;
        self.api
            .get_utf8_text()
            .map_err(|e| anyhow!("read tesseract text: {:?}", e))
    }
}
