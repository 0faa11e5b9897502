use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::DatasetSplit;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Console,
    Json,
}

/// Prints progress lines to stdout as the pipeline runs.
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn event(&self, event: ProgressEvent) {
        let mut stdout = io::stdout().lock();
        let _ = match event.elapsed {
            Some(elapsed) => writeln!(
                stdout,
                "{} ({:.1}s)",
                event.message,
                elapsed.as_secs_f64()
            ),
            None => writeln!(stdout, "{}", event.message),
        };
    }
}

#[derive(Debug, Serialize)]
struct SplitSummary<'a> {
    set: &'a str,
    max_atoms: usize,
    corpus_size: usize,
    filtered_size: usize,
    start: usize,
    end: usize,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    smiles: Option<&'a [String]>,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_split(split: &DatasetSplit, include_smiles: bool) -> io::Result<()> {
        Self::print_json(&SplitSummary {
            set: &split.set,
            max_atoms: split.max_atoms,
            corpus_size: split.corpus_size,
            filtered_size: split.filtered_size,
            start: split.start,
            end: split.end,
            size: split.len(),
            smiles: include_smiles.then_some(split.smiles.as_slice()),
        })
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}
