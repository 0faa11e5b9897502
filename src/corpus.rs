use std::io::Read;

use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::domain::{Corpus, Molecule};
use crate::error::ChemblError;
use crate::smiles::StructureToolkit;

/// Column of the chemreps file holding the SMILES string.
pub const SMILES_COLUMN: usize = 1;

/// A freshly built corpus plus the records that did not make it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub corpus: Corpus,
    /// Raw notations rejected by the structure toolkit, in file order.
    pub invalid: Vec<String>,
    /// Lines with fewer than two tab-separated fields.
    pub malformed: usize,
}

pub fn decompress(raw_gz: &[u8]) -> Result<String, ChemblError> {
    let mut decoder = GzDecoder::new(raw_gz);
    let mut text = String::new();
    decoder
        .read_to_string(&mut text)
        .map_err(|err| ChemblError::Decompress(err.to_string()))?;
    Ok(text)
}

/// Decompresses a gzip'd chemreps file and canonicalizes every record.
pub fn build_corpus<T: StructureToolkit>(
    raw_gz: &[u8],
    toolkit: &T,
) -> Result<BuildReport, ChemblError> {
    let text = decompress(raw_gz)?;
    build_corpus_from_text(&text, toolkit)
}

/// The first line is a header. Records keep file order and duplicates are kept.
///
/// Rejected notations are skipped; any other toolkit error aborts the build.
pub fn build_corpus_from_text<T: StructureToolkit>(
    text: &str,
    toolkit: &T,
) -> Result<BuildReport, ChemblError> {
    let mut report = BuildReport::default();
    for line in text.split('\n').skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() <= SMILES_COLUMN {
            report.malformed += 1;
            continue;
        }
        let raw = fields[SMILES_COLUMN];
        match toolkit.parse(raw) {
            Ok(molecule) => {
                report.corpus.push(Molecule::new(
                    toolkit.canonicalize(&molecule)?,
                    toolkit.heavy_atom_count(&molecule)?,
                ));
            }
            Err(err @ ChemblError::InvalidStructure { .. }) => {
                warn!(smiles = raw, "Invalid SMILES string: {err}");
                report.invalid.push(raw.to_string());
            }
            Err(err) => return Err(err),
        }
    }
    debug!(
        molecules = report.corpus.len(),
        invalid = report.invalid.len(),
        malformed = report.malformed,
        "corpus built"
    );
    Ok(report)
}
