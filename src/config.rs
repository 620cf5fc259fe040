use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detect::{DetectParams, DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR};
use crate::frame::Inset;
use crate::ocr::{OcrParams, DEFAULT_CHAR_WHITELIST, DEFAULT_ENGINE_MODE, DEFAULT_PAGE_SEG_MODE};
use crate::validate::{Allowlist, DEFAULT_ALLOWLIST};
use crate::{MAX_HISTORY_ENTRIES, TICK_DELAY_MILLIS, UPSCALE_PERCENT};

const DEFAULT_SOURCE: &str = "stub://camera0";
const DEFAULT_DETECTOR: &str = "stub";
const DEFAULT_CASCADE_PATH: &str = "haar_cascades/haarcascade_russian_plate_number.xml";
const DEFAULT_OCR: &str = "stub";
const DEFAULT_OCR_LANGUAGE: &str = "eng";
const MAX_UPSCALE_PERCENT: u32 = 1000;

pub const CONFIG_ENV: &str = "PLATE_SCANNER_CONFIG";

#[derive(Debug, Deserialize, Default)]
struct ScannerConfigFile {
    source: Option<String>,
    tick_delay_ms: Option<u64>,
    max_history: Option<usize>,
    upscale_percent: Option<u32>,
    inset: Option<Inset>,
    detector: Option<DetectorConfigFile>,
    ocr: Option<OcrConfigFile>,
    allowlist: Option<Vec<String>>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    backend: Option<String>,
    scale_factor: Option<f64>,
    min_neighbors: Option<i32>,
    cascade_path: Option<String>,
    regions: Option<Vec<[i32; 4]>>,
}

#[derive(Debug, Deserialize, Default)]
struct OcrConfigFile {
    backend: Option<String>,
    char_whitelist: Option<String>,
    page_seg_mode: Option<u32>,
    engine_mode: Option<u32>,
    language: Option<String>,
    data_path: Option<String>,
    stub_texts: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct RenderConfigFile {
    output_dir: Option<PathBuf>,
}

/// Fully resolved scanner configuration.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub source: String,
    pub tick_delay: Duration,
    pub max_history: usize,
    pub upscale_percent: u32,
    pub inset: Inset,
    pub detector: DetectorSettings,
    pub ocr: OcrSettings,
    pub allowlist: Vec<String>,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorSettings {
    pub backend: String,
    pub scale_factor: f64,
    pub min_neighbors: i32,
    pub cascade_path: String,
    /// Fixed `[x, y, w, h]` regions for the stub backend.
    pub regions: Option<Vec<[i32; 4]>>,
}

impl DetectorSettings {
    pub fn params(&self) -> DetectParams {
        DetectParams {
            scale_factor: self.scale_factor,
            min_neighbors: self.min_neighbors,
        }
    }
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            backend: DEFAULT_DETECTOR.to_string(),
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            cascade_path: DEFAULT_CASCADE_PATH.to_string(),
            regions: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    pub backend: String,
    pub char_whitelist: String,
    pub page_seg_mode: u32,
    pub engine_mode: u32,
    pub language: String,
    pub data_path: Option<String>,
    /// Texts replayed by the stub backend.
    pub stub_texts: Vec<String>,
}

impl OcrSettings {
    pub fn params(&self) -> OcrParams {
        OcrParams {
            char_whitelist: self.char_whitelist.clone(),
            page_seg_mode: self.page_seg_mode,
            engine_mode: self.engine_mode,
        }
    }
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            backend: DEFAULT_OCR.to_string(),
            char_whitelist: DEFAULT_CHAR_WHITELIST.to_string(),
            page_seg_mode: DEFAULT_PAGE_SEG_MODE,
            engine_mode: DEFAULT_ENGINE_MODE,
            language: DEFAULT_OCR_LANGUAGE.to_string(),
            data_path: None,
            stub_texts: default_stub_texts(),
        }
    }
}

/// Demo reads: every allowlisted plate, one unknown plate and one blank read.
fn default_stub_texts() -> Vec<String> {
    DEFAULT_ALLOWLIST
        .iter()
        .map(|s| s.to_string())
        .chain(["ZZZ999".to_string(), "  ".to_string()])
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSettings {
    pub output_dir: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            tick_delay: Duration::from_millis(TICK_DELAY_MILLIS),
            max_history: MAX_HISTORY_ENTRIES,
            upscale_percent: UPSCALE_PERCENT,
            inset: Inset::default(),
            detector: DetectorSettings::default(),
            ocr: OcrSettings::default(),
            allowlist: DEFAULT_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
            render: RenderSettings::default(),
        }
    }
}

impl ScannerConfig {
    /// Load from the file named by `PLATE_SCANNER_CONFIG` (if any), then
    /// apply environment overrides and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var(CONFIG_ENV).ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Like `load`, with an explicit config file path.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ScannerConfigFile) -> Self {
        let defaults = Self::default();
        let detector_file = file.detector.unwrap_or_default();
        let ocr_file = file.ocr.unwrap_or_default();
        let detector = DetectorSettings {
            backend: detector_file.backend.unwrap_or(defaults.detector.backend),
            scale_factor: detector_file
                .scale_factor
                .unwrap_or(defaults.detector.scale_factor),
            min_neighbors: detector_file
                .min_neighbors
                .unwrap_or(defaults.detector.min_neighbors),
            cascade_path: detector_file
                .cascade_path
                .unwrap_or(defaults.detector.cascade_path),
            regions: detector_file.regions,
        };
        let ocr = OcrSettings {
            backend: ocr_file.backend.unwrap_or(defaults.ocr.backend),
            char_whitelist: ocr_file
                .char_whitelist
                .unwrap_or(defaults.ocr.char_whitelist),
            page_seg_mode: ocr_file.page_seg_mode.unwrap_or(defaults.ocr.page_seg_mode),
            engine_mode: ocr_file.engine_mode.unwrap_or(defaults.ocr.engine_mode),
            language: ocr_file.language.unwrap_or(defaults.ocr.language),
            data_path: ocr_file.data_path,
            stub_texts: ocr_file.stub_texts.unwrap_or(defaults.ocr.stub_texts),
        };
        Self {
            source: file.source.unwrap_or(defaults.source),
            tick_delay: file
                .tick_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_delay),
            max_history: file.max_history.unwrap_or(defaults.max_history),
            upscale_percent: file.upscale_percent.unwrap_or(defaults.upscale_percent),
            inset: file.inset.unwrap_or(defaults.inset),
            detector,
            ocr,
            allowlist: file.allowlist.unwrap_or(defaults.allowlist),
            render: RenderSettings {
                output_dir: file.render.and_then(|render| render.output_dir),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(source) = std::env::var("PLATE_SCANNER_SOURCE") {
            if !source.trim().is_empty() {
                self.source = source;
            }
        }
        if let Ok(delay) = std::env::var("PLATE_SCANNER_TICK_MS") {
            let millis: u64 = delay.parse().map_err(|_| {
                anyhow!("PLATE_SCANNER_TICK_MS must be an integer number of milliseconds")
            })?;
            self.tick_delay = Duration::from_millis(millis);
        }
        if let Ok(percent) = std::env::var("PLATE_SCANNER_UPSCALE_PERCENT") {
            self.upscale_percent = percent
                .parse()
                .map_err(|_| anyhow!("PLATE_SCANNER_UPSCALE_PERCENT must be an integer"))?;
        }
        if let Ok(allowlist) = std::env::var("PLATE_SCANNER_ALLOWLIST") {
            let parsed = split_csv(&allowlist);
            if !parsed.is_empty() {
                self.allowlist = parsed;
            }
        }
        if let Ok(backend) = std::env::var("PLATE_SCANNER_DETECTOR") {
            if !backend.trim().is_empty() {
                self.detector.backend = backend.trim().to_string();
            }
        }
        if let Ok(backend) = std::env::var("PLATE_SCANNER_OCR") {
            if !backend.trim().is_empty() {
                self.ocr.backend = backend.trim().to_string();
            }
        }
        if let Ok(dir) = std::env::var("PLATE_SCANNER_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.render.output_dir = Some(PathBuf::from(dir));
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(anyhow!("source must not be empty"));
        }
        if self.max_history == 0 {
            return Err(anyhow!("max_history must be greater than zero"));
        }
        if self.upscale_percent == 0 || self.upscale_percent > MAX_UPSCALE_PERCENT {
            return Err(anyhow!(
                "upscale_percent must be between 1 and {}",
                MAX_UPSCALE_PERCENT
            ));
        }
        if !self.inset.is_valid() {
            return Err(anyhow!(
                "inset margins must be between 0 and {}",
                Inset::MAX_MARGIN
            ));
        }
        if self.detector.scale_factor <= 1.0 {
            return Err(anyhow!("detector.scale_factor must be greater than 1.0"));
        }
        if self.detector.min_neighbors < 0 {
            return Err(anyhow!("detector.min_neighbors must not be negative"));
        }
        if self.ocr.char_whitelist.is_empty() {
            return Err(anyhow!("ocr.char_whitelist must not be empty"));
        }
        Ok(())
    }

    /// Allowlist entries exactly as configured (no whitespace folding).
    pub fn allowlist(&self) -> Allowlist {
        Allowlist::new(self.allowlist.iter().cloned())
    }
}

fn read_config_file(path: &Path) -> Result<ScannerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}
