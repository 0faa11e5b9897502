use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::ChemblError;

pub const DEFAULT_URL: &str =
    "ftp://ftp.ebi.ac.uk/pub/databases/chembl/ChEMBLdb/latest/chembl_25_chemreps.txt.gz";
pub const DEFAULT_DOWNLOAD_PATH: &str = "./cache/chembl/chembl_25_chemreps.txt.gz";
pub const DEFAULT_PROCESSED_PATH: &str = "./cache/chembl/chembl_25.json";
pub const DEFAULT_MAX_ATOMS: usize = 20;
pub const CONFIG_FILE_NAME: &str = "chembl-ds.json";

/// Where the raw database comes from, where it and the processed corpus live,
/// and how the filtered list is partitioned.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatasetConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_download_path")]
    pub download_path: Utf8PathBuf,
    #[serde(default = "default_processed_path")]
    pub processed_path: Utf8PathBuf,
    /// Per-split proportions, one per entry of `sets`.
    #[serde(default = "default_splits")]
    pub splits: Vec<f64>,
    #[serde(default = "default_sets")]
    pub sets: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            download_path: default_download_path(),
            processed_path: default_processed_path(),
            splits: default_splits(),
            sets: default_sets(),
        }
    }
}

impl DatasetConfig {
    /// Keeps the default URL and split layout but places both files under `root`.
    pub fn with_cache_root(root: &camino::Utf8Path) -> Self {
        Self {
            download_path: root.join("chembl").join("chembl_25_chemreps.txt.gz"),
            processed_path: root.join("chembl").join("chembl_25.json"),
            ..Self::default()
        }
    }

    pub fn default_set(&self) -> String {
        self.sets
            .first()
            .cloned()
            .unwrap_or_else(|| "train".to_string())
    }
}

/// The two construction parameters of a dataset instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOptions {
    pub max_atoms: usize,
    pub set: String,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            max_atoms: DEFAULT_MAX_ATOMS,
            set: "train".to_string(),
        }
    }
}

impl SelectOptions {
    pub fn for_config(config: &DatasetConfig) -> Self {
        Self {
            max_atoms: DEFAULT_MAX_ATOMS,
            set: config.default_set(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path` when given, otherwise `chembl-ds.json` from the working
    /// directory if it exists, otherwise the built-in defaults.
    pub fn resolve(path: Option<&str>) -> Result<DatasetConfig, ChemblError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(CONFIG_FILE_NAME),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(DatasetConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ChemblError::ConfigRead(config_path.clone()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<DatasetConfig, ChemblError> {
        serde_json::from_str(content).map_err(|err| ChemblError::ConfigParse(err.to_string()))
    }
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_download_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_DOWNLOAD_PATH)
}

fn default_processed_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PROCESSED_PATH)
}

pub fn default_splits() -> Vec<f64> {
    vec![0.5, 0.1, 0.4]
}

pub fn default_sets() -> Vec<String> {
    vec!["train".to_string(), "valid".to_string(), "test".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse(r#"{"processed_path": "/tmp/x.json"}"#).unwrap();
        assert_eq!(config.processed_path, Utf8PathBuf::from("/tmp/x.json"));
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.splits, default_splits());
        assert_eq!(config.sets, default_sets());
    }

    #[test]
    fn default_set_is_first_name() {
        let config = DatasetConfig {
            sets: vec!["fit".to_string(), "holdout".to_string()],
            splits: vec![0.8, 0.2],
            ..DatasetConfig::default()
        };
        assert_eq!(SelectOptions::for_config(&config).set, "fit");
    }
}
