//! # Deterministic Writers
//!
//! Text renderings of the connection and topology maps and of the batch
//! summary. Output is sorted throughout so repeated runs are byte-identical.

use crate::connections::ConnectionMap;
use crate::error::CutsheetError;
use crate::error::ResultMessage;
use crate::pipeline::FileSummary;
use crate::topology::TopologyMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the batch summary inside the output directory.
pub const SUMMARY_FILE_NAME: &str = "processing_summary.txt";

const SUMMARY_HEADER: &str = "Cutsheet Processing Summary:";

/// One block per device in name order, ports ascending:
///
/// ```text
/// leaf-01
///   Eth1 -> spine-01:Eth49
///
/// ```
pub fn render_connections(connections: &ConnectionMap) -> String {
    let mut text = String::new();
    for (device, ports) in connections.devices() {
        text.push_str(&format!("{device}\n"));
        for (port, peer) in &ports.ports {
            text.push_str(&format!("  {port} -> {peer}\n"));
        }
        text.push('\n');
    }
    text
}

/// Buildings and racks ascending, rack units in descending label order. A
/// blank line closes every building.
///
/// ```text
/// DC1
///   R01 (Open19)
///     RU 42: leaf-01 (switch)
///
/// ```
pub fn render_topology(topology: &TopologyMap) -> String {
    let mut text = String::new();
    for (building, racks) in topology.buildings() {
        text.push_str(&format!("{building}\n"));
        for (rack, units) in &racks.racks {
            text.push_str(&format!("  {rack}\n"));
            // Labels compare as strings, so "2" sorts above "10"
            for (unit, occupant) in units.iter().rev() {
                text.push_str(&format!("    RU {unit}: {occupant}\n"));
            }
        }
        text.push('\n');
    }
    text
}

/// Header line, then one block per processed file in processing order.
pub fn render_summary(summaries: &[FileSummary]) -> String {
    let mut text = format!("{SUMMARY_HEADER}\n\n");
    for summary in summaries {
        text.push_str(&format!("{summary}\n\n"));
    }
    text
}

pub fn write_connections(connections: &ConnectionMap, output_dir: &Path, file_name: &str) -> Result<PathBuf, CutsheetError> {
    let path = write_artifact(output_dir, file_name, &render_connections(connections))?;
    info!("Connections written to {}", path.display());
    Ok(path)
}

pub fn write_topology(topology: &TopologyMap, output_dir: &Path, file_name: &str) -> Result<PathBuf, CutsheetError> {
    let path = write_artifact(output_dir, file_name, &render_topology(topology))?;
    info!("Rack topology written to {}", path.display());
    Ok(path)
}

/// Writes [`SUMMARY_FILE_NAME`] into `output_dir`.
pub fn write_summary(summaries: &[FileSummary], output_dir: &Path) -> Result<PathBuf, CutsheetError> {
    let path = write_artifact(output_dir, SUMMARY_FILE_NAME, &render_summary(summaries))?;
    info!("Processing summary written to {}", path.display());
    Ok(path)
}

/// Creates `output_dir` if needed and replaces `file_name` inside it.
fn write_artifact(output_dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, CutsheetError> {
    fs::create_dir_all(output_dir)
        .map_err(CutsheetError::from)
        .with_prefix(&format!("Cannot create output directory '{}'", output_dir.display()))?;
    let path = output_dir.join(file_name);
    fs::write(&path, contents)
        .map_err(CutsheetError::from)
        .with_prefix(&format!("Cannot write '{}'", path.display()))?;
    Ok(path)
}
