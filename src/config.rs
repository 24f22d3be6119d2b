//! Runtime configuration, optionally loaded from a JSON file

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Compute the derived eco-score during enrichment
    pub eco_score: bool,
    /// Slider bounds used when the dataset has no density values
    pub density_fallback: (f64, f64),
    /// Slider bounds used when the dataset has no conductivity values
    pub conductivity_fallback: (f64, f64),
    /// Field separator for CSV input and export
    pub delimiter: char,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            eco_score: true,
            density_fallback: (0.0, 8000.0),
            conductivity_fallback: (0.0, 10.0),
            delimiter: ';',
        }
    }
}

impl CatalogConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The CSV reader and writer take a single-byte delimiter
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(CatalogError::Dataset(format!(
                "delimiter '{}' is not a single ASCII character",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Delimiter as the byte the CSV reader and writer expect
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b';'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: CatalogConfig = serde_json::from_str(r#"{ "eco_score": false }"#).unwrap();
        assert!(!config.eco_score);
        assert_eq!(config.density_fallback, (0.0, 8000.0));
        assert_eq!(config.delimiter_byte(), b';');
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "delimiter": "§" }"#).unwrap();

        let err = CatalogConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Dataset(_)));
    }

    #[test]
    fn ascii_delimiter_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "delimiter": "," }"#).unwrap();

        let config = CatalogConfig::load_from_file(&path).unwrap();
        assert_eq!(config.delimiter_byte(), b',');
    }
}
