//! Export command: re-export a saved JSON run report

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::export::{ExportFormat, RunReport};

#[derive(Args)]
pub struct ExportArgs {
    /// JSON report produced by `import --report ... --format json`
    #[arg(short, long)]
    pub input: PathBuf,
    /// Destination path
    #[arg(short, long)]
    pub output: PathBuf,
    /// Output format: csv, json, or text
    #[arg(long, default_value = "csv")]
    pub format: String,
}

pub fn handle(args: ExportArgs) -> Result<()> {
    let format: ExportFormat = args
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let report = RunReport::load_json(&args.input)?;
    report.write(&args.output, format)?;
    println!("report written to {}", args.output.display());
    Ok(())
}
