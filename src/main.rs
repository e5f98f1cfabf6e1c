use anyhow::{bail, Context};
use clap::Parser;
use cutsheet::config::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, SNIFF_SAMPLE_BYTES};
use cutsheet::{process_file, run_batch, ReaderOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cutsheet", version, about = "Derive connection maps and rack topologies from network cutsheets")]
struct Cli {
    /// Directory of .csv/.xlsx cutsheets, or a single cutsheet file
    #[arg(env = "CUTSHEET_INPUT", default_value = DEFAULT_INPUT_DIR)]
    input: PathBuf,

    /// Directory receiving the generated text files
    #[arg(env = "CUTSHEET_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Bytes of delimited text examined when sniffing its dialect
    #[arg(long, default_value_t = SNIFF_SAMPLE_BYTES)]
    sniff_bytes: usize,

    /// Worksheet name glob for workbooks (default: first worksheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Cell text treated as empty, e.g. "N/A" (repeatable)
    #[arg(long = "null", value_name = "LITERAL")]
    nulls: Vec<String>,
}

impl Cli {
    fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            sniff_bytes: self.sniff_bytes,
            sheet: self.sheet.clone(),
            nulls: self.nulls.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let options = cli.reader_options();

    if cli.input.is_file() {
        let summary = process_file(&cli.input, &cli.output, &options)
            .with_context(|| format!("Failed to process {}", cli.input.display()))?;
        match summary {
            Some(summary) => println!("{summary}"),
            None => bail!("Failed to parse {}", cli.input.display()),
        }
        return Ok(());
    }

    let summaries = run_batch(&cli.input, &cli.output, &options)
        .with_context(|| format!("Batch over {} failed", cli.input.display()))?;
    println!(
        "Processed {} cutsheet(s) into {}",
        summaries.len(),
        cli.output.display()
    );
    Ok(())
}
