use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::Result;
use crate::structs::MAX_VALID;

/// The fill value RSS uses in its verify files.
pub const DEFAULT_MISSING: f64 = -999.0;

/// Options controlling how a bytemap file is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Fill value for non-data cells. `None` or `0.0` keeps the raw byte
    /// codes (251-255) where the decoding allows it; `None` is written as
    /// `"raw"` in TOML.
    #[serde(with = "fill_value")]
    pub missing: Option<f64>,

    /// Bytes above this value are fill codes.
    pub max_valid: u8,

    /// Report an unreadable file as an error instead of yielding a dataset
    /// with no variables.
    pub strict_open: bool,
}

mod fill_value {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const RAW: &str = "raw";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Value(f64),
        Word(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_f64(*v),
            None => s.serialize_str(RAW),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Value(v) => Ok(Some(v)),
            Repr::Word(w) if w == RAW => Ok(None),
            Repr::Word(w) => Err(D::Error::custom(format!(
                "expected a number or \"{}\", found \"{}\"",
                RAW, w
            ))),
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            missing: Some(DEFAULT_MISSING),
            max_valid: MAX_VALID,
            strict_open: false,
        }
    }
}

impl ReaderConfig {
    pub fn with_missing(mut self, missing: Option<f64>) -> Self {
        self.missing = missing;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_open = true;
        self
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: ReaderConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }
}
