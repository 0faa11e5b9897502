use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Molecule {
    pub canonical_smiles: String,
    pub heavy_atom_count: usize,
}

impl Molecule {
    pub fn new(canonical_smiles: impl Into<String>, heavy_atom_count: usize) -> Self {
        Self {
            canonical_smiles: canonical_smiles.into(),
            heavy_atom_count,
        }
    }
}

/// The canonicalized molecule list in its stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    molecules: Vec<Molecule>,
}

impl Corpus {
    pub fn new(molecules: Vec<Molecule>) -> Self {
        Self { molecules }
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    pub fn molecules(&self) -> &[Molecule] {
        &self.molecules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Molecule> {
        self.molecules.iter()
    }

    pub fn push(&mut self, molecule: Molecule) {
        self.molecules.push(molecule);
    }

    /// Reorders so that entry `k` of the result is entry `order[k]` of `self`.
    ///
    /// `order` must be a permutation of `0..self.len()`.
    pub fn reordered(&self, order: &[usize]) -> Corpus {
        debug_assert_eq!(order.len(), self.molecules.len());
        Corpus {
            molecules: order.iter().map(|&i| self.molecules[i].clone()).collect(),
        }
    }

    /// Splits into the two same-length columns the cache artifact stores.
    pub fn to_columns(&self) -> (Vec<String>, Vec<usize>) {
        self.molecules
            .iter()
            .map(|m| (m.canonical_smiles.clone(), m.heavy_atom_count))
            .unzip()
    }

    /// Rebuilds from stored columns; `None` when their lengths differ.
    pub fn from_columns(smiles: Vec<String>, heavy_atom_count: Vec<usize>) -> Option<Corpus> {
        if smiles.len() != heavy_atom_count.len() {
            return None;
        }
        Some(Corpus {
            molecules: smiles
                .into_iter()
                .zip(heavy_atom_count)
                .map(|(s, n)| Molecule::new(s, n))
                .collect(),
        })
    }
}

impl IntoIterator for Corpus {
    type Item = Molecule;
    type IntoIter = std::vec::IntoIter<Molecule>;

    fn into_iter(self) -> Self::IntoIter {
        self.molecules.into_iter()
    }
}

/// One named slice of the size-filtered corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSplit {
    pub set: String,
    pub max_atoms: usize,
    pub corpus_size: usize,
    pub filtered_size: usize,
    /// Range of the slice within the filtered list.
    pub start: usize,
    pub end: usize,
    pub smiles: Vec<String>,
}

impl DatasetSplit {
    pub fn len(&self) -> usize {
        self.smiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.smiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.smiles.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.smiles.iter().map(String::as_str)
    }
}
