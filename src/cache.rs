use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::Corpus;
use crate::error::ChemblError;

/// On-disk form of the processed corpus: two same-length columns plus
/// provenance. Nothing here is checked on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheArtifact {
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    pub smiles: Vec<String>,
    pub heavy_atom_count: Vec<usize>,
}

impl CacheArtifact {
    pub fn new(corpus: &Corpus, source_url: &str, seed: u64) -> Self {
        let (smiles, heavy_atom_count) = corpus.to_columns();
        Self {
            source_url: Some(source_url.to_string()),
            seed: Some(seed),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            tool: Some(format!("chembl-ds/{}", env!("CARGO_PKG_VERSION"))),
            smiles,
            heavy_atom_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Loaded,
    Built,
}

/// Owner of the single processed-corpus file.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: Utf8PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.as_std_path().exists()
    }

    /// Returns the stored corpus, or runs `build` and stores its result when
    /// no artifact exists yet. An existing artifact is never rewritten.
    pub fn load_or_build<F>(&self, build: F) -> Result<(Corpus, CacheOutcome), ChemblError>
    where
        F: FnOnce() -> Result<CacheArtifact, ChemblError>,
    {
        if self.exists() {
            debug!(path = %self.path, "loading processed corpus");
            return Ok((self.load()?, CacheOutcome::Loaded));
        }
        let artifact = build()?;
        self.write(&artifact)?;
        info!(path = %self.path, molecules = artifact.smiles.len(), "processed corpus saved");
        let corpus = Corpus::from_columns(artifact.smiles, artifact.heavy_atom_count)
            .ok_or_else(|| self.corrupt("column lengths differ"))?;
        Ok((corpus, CacheOutcome::Built))
    }

    pub fn load(&self) -> Result<Corpus, ChemblError> {
        let content = fs::read(self.path.as_std_path())
            .map_err(|err| ChemblError::Filesystem(format!("read {}: {err}", self.path)))?;
        let artifact: CacheArtifact =
            serde_json::from_slice(&content).map_err(|err| self.corrupt(&err.to_string()))?;
        Corpus::from_columns(artifact.smiles, artifact.heavy_atom_count)
            .ok_or_else(|| self.corrupt("column lengths differ"))
    }

    fn write(&self, artifact: &CacheArtifact) -> Result<(), ChemblError> {
        let content = serde_json::to_vec(artifact)
            .map_err(|err| ChemblError::Filesystem(err.to_string()))?;
        write_bytes_atomic(&self.path, &content)
    }

    fn corrupt(&self, message: &str) -> ChemblError {
        ChemblError::CacheDeserialization {
            path: self.path.to_string(),
            message: message.to_string(),
        }
    }
}

pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), ChemblError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| ChemblError::Filesystem(err.to_string()))?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(tmp_path.as_std_path(), content)
        .map_err(|err| ChemblError::Filesystem(err.to_string()))?;
    fs::rename(tmp_path.as_std_path(), path.as_std_path())
        .map_err(|err| ChemblError::Filesystem(err.to_string()))?;
    Ok(())
}
