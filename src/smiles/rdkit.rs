use pyo3::prelude::*;
use pyo3::types::PyModule;

use super::StructureToolkit;
use crate::error::ChemblError;

/// RDKit's `Chem` module driven through an embedded Python interpreter.
#[derive(Debug)]
pub struct SmilesToolkit {
    chem: Py<PyModule>,
}

/// An RDKit `Mol`.
#[derive(Debug)]
pub struct RdkitMolecule(PyObject);

impl SmilesToolkit {
    /// Imports `rdkit.Chem`. RDKit's own parse-error log is switched off;
    /// rejected records are reported through `tracing` by the caller.
    pub fn new() -> Result<Self, ChemblError> {
        Python::with_gil(|py| {
            PyModule::import_bound(py, "rdkit.RDLogger")
                .and_then(|logger| logger.call_method1("DisableLog", ("rdApp.*",)))
                .map_err(toolkit_error)?;
            let chem = PyModule::import_bound(py, "rdkit.Chem").map_err(toolkit_error)?;
            Ok(Self { chem: chem.unbind() })
        })
    }
}

impl StructureToolkit for SmilesToolkit {
    type Molecule = RdkitMolecule;

    fn parse(&self, raw: &str) -> Result<RdkitMolecule, ChemblError> {
        Python::with_gil(|py| {
            let mol = self
                .chem
                .bind(py)
                .call_method1("MolFromSmiles", (raw,))
                .map_err(|err| ChemblError::invalid_structure(raw, err.to_string()))?;
            if mol.is_none() {
                return Err(ChemblError::invalid_structure(raw, "rejected by RDKit"));
            }
            Ok(RdkitMolecule(mol.unbind()))
        })
    }

    fn canonicalize(&self, molecule: &RdkitMolecule) -> Result<String, ChemblError> {
        Python::with_gil(|py| {
            self.chem
                .bind(py)
                .call_method1("MolToSmiles", (molecule.0.clone_ref(py),))
                .and_then(|smiles| smiles.extract::<String>())
                .map_err(toolkit_error)
        })
    }

    fn heavy_atom_count(&self, molecule: &RdkitMolecule) -> Result<usize, ChemblError> {
        Python::with_gil(|py| {
            molecule
                .0
                .bind(py)
                .call_method0("GetNumHeavyAtoms")
                .and_then(|count| count.extract::<usize>())
                .map_err(toolkit_error)
        })
    }
}

fn toolkit_error(err: PyErr) -> ChemblError {
    ChemblError::Toolkit(err.to_string())
}
