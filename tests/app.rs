use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use flate2::Compression;
use flate2::write::GzEncoder;

use chembl_dataset::app::{App, ProgressEvent, ProgressSink};
use chembl_dataset::cache::CacheOutcome;
use chembl_dataset::config::{DatasetConfig, SelectOptions};
use chembl_dataset::error::ChemblError;
use chembl_dataset::fetch::RemoteSource;
use chembl_dataset::output::JsonOutput;
use chembl_dataset::smiles::StructureToolkit;

const CHEMREPS: &str = "chembl_id\tcanonical_smiles\tstandard_inchi\tstandard_inchi_key\n\
CHEMBL1\tCCO\tInChI=1S\tKEY1\n\
CHEMBL2\tnot_a_molecule\tInChI=1S\tKEY2\n\
CHEMBL3\tc1ccccc1\tInChI=1S\tKEY3\n\
CHEMBL4\tCC(=O)Oc1ccccc1C(=O)O\tInChI=1S\tKEY4\n\
CHEMBL5\tOCC\tInChI=1S\tKEY5\n\
CHEMBL6\tCCCCCCCCCCCCCCCCCCCCCCCC\tInChI=1S\tKEY6\n\
truncated\n\
CHEMBL7\tC1CCCCC1\tInChI=1S\tKEY7\n\
CHEMBL8\tCN\tInChI=1S\tKEY8\n\
CHEMBL9\t[Na+].[Cl-]\tInChI=1S\tKEY9\n\
CHEMBL10\tO=C=O\tInChI=1S\tKEY10\n\
CHEMBL11\tC#N\tInChI=1S\tKEY11\n";

/// Stands in for RDKit: known notations map to a fixed canonical form and size.
struct TableToolkit;

const STRUCTURES: &[(&str, &str, usize)] = &[
    ("CCO", "CCO", 3),
    ("OCC", "CCO", 3),
    ("c1ccccc1", "c1ccccc1", 6),
    ("CC(=O)Oc1ccccc1C(=O)O", "CC(=O)Oc1ccccc1C(=O)O", 13),
    ("CCCCCCCCCCCCCCCCCCCCCCCC", "CCCCCCCCCCCCCCCCCCCCCCCC", 24),
    ("C1CCCCC1", "C1CCCCC1", 6),
    ("CN", "CN", 2),
    ("[Na+].[Cl-]", "[Cl-].[Na+]", 2),
    ("O=C=O", "O=C=O", 3),
    ("C#N", "C#N", 2),
];

impl StructureToolkit for TableToolkit {
    type Molecule = (&'static str, usize);

    fn parse(&self, raw: &str) -> Result<Self::Molecule, ChemblError> {
        STRUCTURES
            .iter()
            .find(|(notation, _, _)| *notation == raw)
            .map(|&(_, canonical, heavy)| (canonical, heavy))
            .ok_or_else(|| ChemblError::invalid_structure(raw, "unknown structure"))
    }

    fn canonicalize(&self, molecule: &Self::Molecule) -> Result<String, ChemblError> {
        Ok(molecule.0.to_string())
    }

    fn heavy_atom_count(&self, molecule: &Self::Molecule) -> Result<usize, ChemblError> {
        Ok(molecule.1)
    }
}

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

#[derive(Default)]
struct MockSource {
    calls: Mutex<usize>,
}

impl MockSource {
    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl RemoteSource for MockSource {
    fn download(&self, _url: &str, destination: &Path) -> Result<(), ChemblError> {
        let mut guard = self.calls.lock().unwrap();
        *guard += 1;
        std::fs::write(destination, gzip(CHEMREPS)).unwrap();
        Ok(())
    }
}

impl RemoteSource for &MockSource {
    fn download(&self, url: &str, destination: &Path) -> Result<(), ChemblError> {
        (*self).download(url, destination)
    }
}

struct FailingSource;

impl RemoteSource for FailingSource {
    fn download(&self, _url: &str, _destination: &Path) -> Result<(), ChemblError> {
        Err(ChemblError::DownloadFailed("connection refused".to_string()))
    }
}

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent) {
        self.messages.lock().unwrap().push(event.message);
    }
}

fn temp_config(temp: &tempfile::TempDir) -> DatasetConfig {
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    DatasetConfig::with_cache_root(&root)
}

#[test]
fn first_run_downloads_and_caches_second_run_reuses() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp_config(&temp);
    let source = MockSource::default();

    let app = App::new(config.clone(), &source, TableToolkit);
    let first = app.load_corpus(&JsonOutput).unwrap();
    assert_eq!(first.outcome, CacheOutcome::Built);
    assert!(first.downloaded);
    assert_eq!(first.invalid, 1);
    // "truncated" plus the empty line after the last newline
    assert_eq!(first.malformed, 2);
    assert_eq!(first.corpus.len(), 10);
    assert!(config.processed_path.as_std_path().exists());
    assert_eq!(source.calls(), 1);

    // Removing the raw file proves the second run never looks at it.
    std::fs::remove_file(config.download_path.as_std_path()).unwrap();

    let app = App::new(config.clone(), &source, TableToolkit);
    let second = app.load_corpus(&JsonOutput).unwrap();
    assert_eq!(second.outcome, CacheOutcome::Loaded);
    assert!(!second.downloaded);
    assert_eq!(second.corpus, first.corpus);
    assert_eq!(source.calls(), 1);
    assert!(!config.download_path.as_std_path().exists());
}

#[test]
fn existing_raw_file_is_not_downloaded_again() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp_config(&temp);
    std::fs::create_dir_all(config.download_path.parent().unwrap().as_std_path()).unwrap();
    std::fs::write(config.download_path.as_std_path(), gzip(CHEMREPS)).unwrap();

    let source = MockSource::default();
    let app = App::new(config, &source, TableToolkit);
    let loaded = app.load_corpus(&JsonOutput).unwrap();
    assert!(!loaded.downloaded);
    assert_eq!(source.calls(), 0);
    assert_eq!(loaded.corpus.len(), 10);
}

#[test]
fn splits_partition_the_filtered_list() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp_config(&temp);
    let source = MockSource::default();
    let app = App::new(config.clone(), &source, TableToolkit);

    let mut joined = Vec::new();
    let mut filtered_size = None;
    for set in &config.sets {
        let options = SelectOptions {
            max_atoms: 20,
            set: set.clone(),
        };
        let split = app.materialize(&options, &JsonOutput).unwrap();
        assert_eq!(split.set, *set);
        assert_eq!(split.corpus_size, 10);
        filtered_size = Some(split.filtered_size);
        joined.extend(split.smiles);
    }

    // the 24-carbon chain is over the limit
    assert_eq!(filtered_size, Some(9));
    assert_eq!(joined.len(), 9);
    let corpus = app.load_corpus(&JsonOutput).unwrap().corpus;
    let expected: Vec<String> = corpus
        .iter()
        .filter(|m| m.heavy_atom_count <= 20)
        .map(|m| m.canonical_smiles.clone())
        .collect();
    assert_eq!(joined, expected);
    assert_eq!(source.calls(), 1);
}

#[test]
fn default_split_sizes_follow_proportions() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp_config(&temp);
    let source = MockSource::default();
    let app = App::new(config, &source, TableToolkit);

    let sizes: Vec<usize> = ["train", "valid", "test"]
        .iter()
        .map(|set| {
            let options = SelectOptions {
                max_atoms: 100,
                set: set.to_string(),
            };
            app.materialize(&options, &JsonOutput).unwrap().len()
        })
        .collect();
    assert_eq!(sizes, vec![5, 1, 4]);
}

#[test]
fn unknown_set_fails_before_any_io() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp_config(&temp);
    let source = MockSource::default();
    let app = App::new(config.clone(), &source, TableToolkit);

    let options = SelectOptions {
        max_atoms: 20,
        set: "bogus".to_string(),
    };
    let err = app.materialize(&options, &JsonOutput).unwrap_err();
    assert_matches!(err, ChemblError::InvalidSplit(name) if name == "bogus");
    assert_eq!(source.calls(), 0);
    assert!(!config.processed_path.as_std_path().exists());
    assert!(!config.download_path.as_std_path().exists());
}

#[test]
fn download_failure_is_fatal_and_writes_no_cache() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp_config(&temp);
    let app = App::new(config.clone(), FailingSource, TableToolkit);

    let err = app
        .materialize(&SelectOptions::default(), &JsonOutput)
        .unwrap_err();
    assert_matches!(err, ChemblError::DownloadFailed(_));
    assert!(!config.processed_path.as_std_path().exists());
}

#[test]
fn corrupt_cache_is_not_rebuilt() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp_config(&temp);
    std::fs::create_dir_all(config.processed_path.parent().unwrap().as_std_path()).unwrap();
    std::fs::write(config.processed_path.as_std_path(), b"{not json").unwrap();

    let source = MockSource::default();
    let app = App::new(config.clone(), &source, TableToolkit);
    let err = app
        .materialize(&SelectOptions::default(), &JsonOutput)
        .unwrap_err();
    assert_matches!(err, ChemblError::CacheDeserialization { .. });
    assert_eq!(source.calls(), 0);
    assert_eq!(
        std::fs::read(config.processed_path.as_std_path()).unwrap(),
        b"{not json"
    );
}

#[test]
fn progress_reports_counts() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp_config(&temp);
    let source = MockSource::default();
    let app = App::new(config, &source, TableToolkit);
    let sink = RecordingSink::default();

    app.materialize(&SelectOptions::default(), &sink).unwrap();
    let messages = sink.messages.lock().unwrap();
    assert!(messages.iter().any(|m| m == "Downloading..."));
    assert!(messages.iter().any(|m| m == "Done. Read 10"));
    assert!(messages.iter().any(|m| m == "9 molecules match the count limit"));
    assert!(messages.iter().any(|m| m == "5 molecules used for train set."));
}
