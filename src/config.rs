// Configuration for wellstim: defaults < config file < environment < CLI flags
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::pdf_extraction::conductor::{DEFAULT_MAX_BATCH_SIZE, DEFAULT_WORKERS};
use crate::pdf_extraction::ExtractionOptions;

pub const ENV_CONFIG: &str = "WELLSTIM_CONFIG";
pub const ENV_WORKERS: &str = "WELLSTIM_WORKERS";
pub const ENV_BATCH_SIZE: &str = "WELLSTIM_BATCH_SIZE";
pub const ENV_DB: &str = "WELLSTIM_DB";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    pub workers: usize,
    pub max_batch_size: usize,
    pub database: PathBuf,
    pub ocr: OcrConfig,
    /// Per-field label variants replacing the built-in ones.
    pub labels: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OcrConfig {
    pub language: String,
    pub dpi: u32,
    pub pdftoppm: PathBuf,
    pub tesseract: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            database: PathBuf::from("wells.db"),
            ocr: OcrConfig::default(),
            labels: BTreeMap::new(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            dpi: 300,
            pdftoppm: PathBuf::from("pdftoppm"),
            tesseract: PathBuf::from("tesseract"),
        }
    }
}

impl IngestConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit file if given, else `$WELLSTIM_CONFIG`, else the per-user
    /// config file if one exists, else defaults. Environment overrides are applied on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(ENV_CONFIG).map(PathBuf::from))
            .or_else(|| default_config_path().filter(|p| p.exists()));

        let mut config = match path {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        config.apply_env(|name| env::var(name).ok())?;
        Ok(config)
    }

    /// Apply environment overrides. The lookup is injected so tests don't touch the
    /// process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_WORKERS) {
            self.workers = parse_count(ENV_WORKERS, value)?;
        }
        if let Some(value) = lookup(ENV_BATCH_SIZE) {
            self.max_batch_size = parse_count(ENV_BATCH_SIZE, value)?;
        }
        if let Some(value) = lookup(ENV_DB) {
            self.database = PathBuf::from(value);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroTunable("workers"));
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::ZeroTunable("max_batch_size"));
        }
        if self.ocr.dpi == 0 {
            return Err(ConfigError::ZeroTunable("ocr.dpi"));
        }
        Ok(())
    }

    pub fn extraction_options(&self) -> ExtractionOptions {
        ExtractionOptions {
            workers: self.workers,
            max_batch_size: self.max_batch_size,
        }
    }
}

fn parse_count(name: &'static str, value: String) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { name, value })
}

/// `~/.config/wellstim/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wellstim").join("config.toml"))
}
