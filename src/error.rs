use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ChemblError {
    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("download returned status {status}: {message}")]
    DownloadStatus { status: u16, message: String },

    #[error("invalid set: {0}")]
    #[diagnostic(help("the set must be one of the configured split names"))]
    InvalidSplit(String),

    #[error("invalid split configuration: {0}")]
    InvalidSplitConfig(String),

    #[error("invalid SMILES string {notation:?}: {reason}")]
    InvalidStructure { notation: String, reason: String },

    #[error("structure toolkit failure: {0}")]
    #[diagnostic(help("SMILES processing needs a Python environment with RDKit installed"))]
    Toolkit(String),

    #[error("failed to decompress raw dataset: {0}")]
    Decompress(String),

    #[error("failed to load processed cache at {path}: {message}")]
    #[diagnostic(help("remove the processed cache file and run again to rebuild it"))]
    CacheDeserialization { path: String, message: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl ChemblError {
    pub fn invalid_structure(notation: &str, reason: impl Into<String>) -> Self {
        ChemblError::InvalidStructure {
            notation: notation.to_string(),
            reason: reason.into(),
        }
    }
}
