use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use chembl_dataset::app::App;
use chembl_dataset::config::{ConfigLoader, DEFAULT_MAX_ATOMS, SelectOptions};
use chembl_dataset::error::ChemblError;
use chembl_dataset::fetch::HttpSource;
use chembl_dataset::output::{ConsoleProgress, JsonOutput, OutputMode};
use chembl_dataset::smiles::SmilesToolkit;

#[derive(Parser)]
#[command(name = "chembl-ds")]
#[command(about = "Materialize a size-filtered ChEMBL SMILES split (downloads and caches on first run)")]
#[command(version)]
struct Cli {
    /// Largest heavy-atom count kept.
    #[arg(long, default_value_t = DEFAULT_MAX_ATOMS)]
    max_atoms: usize,

    /// Split to materialize; defaults to the first configured set.
    #[arg(long)]
    set: Option<String>,

    /// JSON config file; `chembl-ds.json` is used when present.
    #[arg(long)]
    config: Option<String>,

    /// Print a JSON summary instead of progress lines.
    #[arg(long)]
    json: bool,

    /// With --json, include the split's SMILES strings.
    #[arg(long, requires = "json")]
    with_smiles: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<ChemblError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ChemblError) -> u8 {
    match error {
        ChemblError::InvalidSplit(_)
        | ChemblError::InvalidSplitConfig(_)
        | ChemblError::ConfigRead(_)
        | ChemblError::ConfigParse(_) => 2,
        ChemblError::DownloadFailed(_) | ChemblError::DownloadStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Console
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let options = SelectOptions {
        max_atoms: cli.max_atoms,
        set: cli.set.unwrap_or_else(|| config.default_set()),
    };

    let source = HttpSource::new()?;
    let toolkit = SmilesToolkit::new()?;
    let app = App::new(config, source, toolkit);

    match output_mode {
        OutputMode::Console => {
            app.materialize(&options, &ConsoleProgress)?;
        }
        OutputMode::Json => {
            let split = app.materialize(&options, &JsonOutput)?;
            JsonOutput::print_split(&split, cli.with_smiles).into_diagnostic()?;
        }
    }
    Ok(())
}
