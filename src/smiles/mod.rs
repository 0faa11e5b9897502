//! Structure capability consumed by the corpus builder.
//!
//! The pipeline only talks to [`StructureToolkit`]. [`SmilesToolkit`] backs it
//! with RDKit, which perceives aromaticity and canonicalizes stereochemistry,
//! so every spelling of one structure renders to the same string.

mod rdkit;

pub use rdkit::{RdkitMolecule, SmilesToolkit};

use crate::error::ChemblError;

/// Parse, canonicalize and size a molecule from its raw notation.
pub trait StructureToolkit {
    type Molecule;

    /// Fails with [`ChemblError::InvalidStructure`] when the notation is rejected.
    /// Any other error means the toolkit itself is unusable.
    fn parse(&self, raw: &str) -> Result<Self::Molecule, ChemblError>;
    fn canonicalize(&self, molecule: &Self::Molecule) -> Result<String, ChemblError>;
    fn heavy_atom_count(&self, molecule: &Self::Molecule) -> Result<usize, ChemblError>;
}
