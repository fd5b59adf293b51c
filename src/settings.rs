//! Configuration file handling
//!
//! Settings are a single camelCase JSON document. Every field has a default,
//! so a partial file is valid.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::EvaluationConfig;
use crate::loader::LoaderKind;
use crate::wavelet_clean::DenoiseOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub denoise: DenoiseOptions,
    pub evaluation: EvaluationConfig,
    pub loader: LoaderKind,
    /// Multiplier applied to samples after loading (1e6 turns volts into microvolts)
    pub scale: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            denoise: DenoiseOptions::default(),
            evaluation: EvaluationConfig::default(),
            loader: LoaderKind::Auto,
            scale: 1.0,
        }
    }
}

/// Read settings, falling back to defaults when the file is missing or broken
pub fn load_config(path: &Path) -> AppConfig {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to parse settings, using defaults: {}", e);
                AppConfig::default()
            }
        },
        Err(_) => {
            log::debug!("No settings at {:?}; using defaults", path);
            AppConfig::default()
        }
    }
}

/// Read settings, reporting any IO or parse failure
pub fn load_config_strict(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    log::info!("Settings written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavelet_clean::{FilterFamily, Method};

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut config = AppConfig::default();
        config.denoise.method = Method::Baseline;
        config.denoise.wavelet = FilterFamily::Haar;
        config.scale = 1e6;

        save_config(&path, &config).unwrap();
        assert_eq!(load_config_strict(&path).unwrap(), config);
        assert_eq!(load_config(&path), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "denoise": { "wavelet": "db6", "levels": 3 } }"#).unwrap();

        let config = load_config_strict(&path).unwrap();
        assert_eq!(config.denoise.wavelet, FilterFamily::Daubechies(6));
        assert_eq!(config.denoise.levels, 3);
        assert_eq!(config.denoise.method, Method::Adaptive);
        assert_eq!(config.scale, 1.0);
    }

    #[test]
    fn test_missing_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert_eq!(load_config(&missing), AppConfig::default());
        assert!(matches!(load_config_strict(&missing), Err(ConfigError::Io(_))));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(load_config(&broken), AppConfig::default());
        assert!(matches!(load_config_strict(&broken), Err(ConfigError::Parse(_))));

        let unknown_wavelet = dir.path().join("sym5.json");
        fs::write(&unknown_wavelet, r#"{ "denoise": { "wavelet": "sym5" } }"#).unwrap();
        assert!(load_config_strict(&unknown_wavelet).is_err());

        let meyer = dir.path().join("dmey.json");
        fs::write(&meyer, r#"{ "evaluation": { "wavelets": ["db4", "dmey"] } }"#).unwrap();
        assert_eq!(
            load_config_strict(&meyer).unwrap().evaluation.wavelets,
            vec![FilterFamily::Daubechies(4), FilterFamily::DiscreteMeyer]
        );
    }
}
