use std::fs;
use std::time::{Duration, Instant};

use tracing::info;

use crate::cache::{CacheArtifact, CacheOutcome, CacheStore};
use crate::config::{DatasetConfig, SelectOptions};
use crate::corpus::build_corpus;
use crate::domain::{Corpus, DatasetSplit};
use crate::error::ChemblError;
use crate::fetch::{RemoteSource, ensure_local};
use crate::permute::{PERMUTATION_SEED, permutation};
use crate::smiles::StructureToolkit;
use crate::split::{SplitPlan, filter_by_heavy_atoms};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Download,
    Read,
    Process,
    Save,
    Load,
    Filter,
    Split,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// What happened while materializing the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusLoad {
    pub corpus: Corpus,
    pub outcome: CacheOutcome,
    pub downloaded: bool,
    pub invalid: usize,
    pub malformed: usize,
}

/// The dataset pipeline: fetch, canonicalize, cache, filter, split.
pub struct App<S: RemoteSource, T: StructureToolkit> {
    config: DatasetConfig,
    source: S,
    toolkit: T,
}

impl<S: RemoteSource, T: StructureToolkit> App<S, T> {
    pub fn new(config: DatasetConfig, source: S, toolkit: T) -> Self {
        Self {
            config,
            source,
            toolkit,
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Returns the requested split of the size-filtered corpus.
    ///
    /// The set name and split layout are validated before any file is touched.
    pub fn materialize(
        &self,
        options: &SelectOptions,
        sink: &dyn ProgressSink,
    ) -> Result<DatasetSplit, ChemblError> {
        let plan = SplitPlan::new(&self.config.sets, &self.config.splits)?;
        let index = plan.index_of(&options.set)?;

        let loaded = self.load_corpus(sink)?;
        let corpus = loaded.corpus;

        let filtered = filter_by_heavy_atoms(&corpus, options.max_atoms);
        emit(
            sink,
            Phase::Filter,
            format!("{} molecules match the count limit", filtered.len()),
        );

        let range = plan.bounds(filtered.len(), index);
        let smiles = filtered[range.clone()].to_vec();
        emit(
            sink,
            Phase::Split,
            format!("{} molecules used for {} set.", smiles.len(), options.set),
        );
        info!(
            set = %options.set,
            max_atoms = options.max_atoms,
            start = range.start,
            end = range.end,
            "split materialized"
        );

        Ok(DatasetSplit {
            set: options.set.clone(),
            max_atoms: options.max_atoms,
            corpus_size: corpus.len(),
            filtered_size: filtered.len(),
            start: range.start,
            end: range.end,
            smiles,
        })
    }

    /// Loads the processed corpus, building and caching it on the first run.
    pub fn load_corpus(&self, sink: &dyn ProgressSink) -> Result<CorpusLoad, ChemblError> {
        let store = CacheStore::new(self.config.processed_path.clone());
        let mut downloaded = false;
        let mut invalid = 0;
        let mut malformed = 0;

        if store.exists() {
            emit(sink, Phase::Load, format!("Loading {}", store.path()));
        }
        let (corpus, outcome) = store.load_or_build(|| {
            let artifact = self.build_artifact(sink)?;
            downloaded = artifact.downloaded;
            invalid = artifact.invalid;
            malformed = artifact.malformed;
            emit(sink, Phase::Save, "Saving".to_string());
            Ok(artifact.artifact)
        })?;
        if outcome == CacheOutcome::Built {
            emit(sink, Phase::Save, "Done.".to_string());
        }

        Ok(CorpusLoad {
            corpus,
            outcome,
            downloaded,
            invalid,
            malformed,
        })
    }

    fn build_artifact(&self, sink: &dyn ProgressSink) -> Result<BuiltArtifact, ChemblError> {
        let raw_path = self.config.download_path.as_std_path();
        let start = Instant::now();
        if !raw_path.exists() {
            emit(sink, Phase::Download, "Downloading...".to_string());
        }
        let downloaded = ensure_local(&self.source, &self.config.url, raw_path)?;
        if downloaded {
            sink.event(ProgressEvent {
                phase: Phase::Download,
                message: "Downloaded".to_string(),
                elapsed: Some(start.elapsed()),
            });
        }

        emit(sink, Phase::Read, "Reading dataset...".to_string());
        let raw = fs::read(raw_path)
            .map_err(|err| ChemblError::Filesystem(format!("read {}: {err}", raw_path.display())))?;

        emit(sink, Phase::Process, "Read. Processing SMILES strings".to_string());
        let start = Instant::now();
        let report = build_corpus(&raw, &self.toolkit)?;

        let order = permutation(report.corpus.len(), PERMUTATION_SEED);
        let corpus = report.corpus.reordered(&order);
        sink.event(ProgressEvent {
            phase: Phase::Process,
            message: format!("Done. Read {}", corpus.len()),
            elapsed: Some(start.elapsed()),
        });

        Ok(BuiltArtifact {
            artifact: CacheArtifact::new(&corpus, &self.config.url, PERMUTATION_SEED),
            downloaded,
            invalid: report.invalid.len(),
            malformed: report.malformed,
        })
    }
}

struct BuiltArtifact {
    artifact: CacheArtifact,
    downloaded: bool,
    invalid: usize,
    malformed: usize,
}

fn emit(sink: &dyn ProgressSink, phase: Phase, message: String) {
    sink.event(ProgressEvent {
        phase,
        message,
        elapsed: None,
    });
}
