//! # Orchestrator
//!
//! Drives one cutsheet, or every cutsheet in a directory, through reading,
//! extraction and writing. Output locations are always passed in by the caller.

use crate::config::ReaderOptions;
use crate::connections::extract_connections;
use crate::error::CutsheetError;
use crate::error::ResultMessage;
use crate::table::{read_table, SheetFormat};
use crate::topology::build_topology;
use crate::writer;
use glob::Pattern;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extensions picked up by batch mode, in enumeration order.
pub const BATCH_EXTENSIONS: [&str; 2] = ["csv", "xlsx"];

/// What processing one cutsheet produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSummary {
    /// Logical name: the input file name without its extension
    pub name: String,
    /// Devices in the connection map
    pub device_count: usize,
    /// Distinct racks across all buildings
    pub rack_count: usize,
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cutsheet: {}", self.name)?;
        writeln!(f, "  - Devices: {}", self.device_count)?;
        write!(f, "  - Racks: {}", self.rack_count)
    }
}

/// Base name of `path` without its extension.
pub fn logical_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn connections_file_name(name: &str) -> String {
    format!("{name}_connections.txt")
}

pub fn topology_file_name(name: &str) -> String {
    format!("{name}_rack_topology.txt")
}

/// Processes one cutsheet and writes its two artifacts into `output_dir`.
///
/// Returns `Ok(None)` when the file could not be parsed; the failure is logged.
///
/// # Errors
///
/// [`CutsheetError::UnsupportedFormat`] for an extension other than `.csv` or
/// `.xlsx`, and any error raised while writing the artifacts.
pub fn process_file(
    path: &Path,
    output_dir: &Path,
    options: &ReaderOptions,
) -> Result<Option<FileSummary>, CutsheetError> {
    SheetFormat::from_path(path)?;
    let table = match read_table(path, options) {
        Ok(table) => table,
        Err(error @ CutsheetError::ParseFailure { .. }) => {
            warn!("Failed to parse {}: {}", path.display(), error);
            return Ok(None);
        }
        Err(error) => return Err(error),
    };

    let name = logical_name(path);
    let connections = extract_connections(&table);
    let topology = build_topology(&table);
    writer::write_connections(&connections, output_dir, &connections_file_name(&name))?;
    writer::write_topology(&topology, output_dir, &topology_file_name(&name))?;

    Ok(Some(FileSummary {
        name,
        device_count: connections.device_count(),
        rack_count: topology.rack_count(),
    }))
}

/// Cutsheets directly inside `input_dir`: every `.csv` first, then every
/// `.xlsx`, each group in path order.
pub fn collect_inputs(input_dir: &Path) -> Result<Vec<PathBuf>, CutsheetError> {
    let base = Pattern::escape(&input_dir.to_string_lossy());
    let mut inputs = Vec::new();
    for extension in BATCH_EXTENSIONS {
        for entry in glob::glob(&format!("{base}/*.{extension}"))? {
            let path = entry?;
            if path.is_file() {
                inputs.push(path);
            }
        }
    }
    Ok(inputs)
}

/// Processes every cutsheet in `input_dir` and writes the summary.
///
/// Files that fail are logged and left out of the summary, which is written
/// even when nothing succeeded. Only an unusable output directory or input
/// listing aborts the batch.
pub fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    options: &ReaderOptions,
) -> Result<Vec<FileSummary>, CutsheetError> {
    fs::create_dir_all(output_dir)
        .map_err(CutsheetError::from)
        .with_prefix(&format!("Cannot create output directory '{}'", output_dir.display()))?;

    let mut summaries = Vec::new();
    for path in collect_inputs(input_dir)? {
        info!("Processing {}", path.display());
        match process_file(&path, output_dir, options) {
            Ok(Some(summary)) => summaries.push(summary),
            Ok(None) => (),
            Err(error) => warn!("Failed to process {}: {}", path.display(), error),
        }
    }
    writer::write_summary(&summaries, output_dir)?;
    Ok(summaries)
}
