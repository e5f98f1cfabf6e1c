//! # Cutsheet
//!
//! Turns network cutsheets, the spreadsheets that record which port of which
//! device is cabled to which, into two plain-text artifacts per file: a
//! port-to-port connection map and a building/rack/rack-unit topology.
//!
//! ## Features
//!
//! - **Heterogeneous input**: `.xlsx` workbooks are read natively; `.csv` files
//!   of unknown delimiter and with or without a header row go through an ordered
//!   chain of parsing strategies ending in dialect sniffing
//! - **Header synonyms**: each endpoint field is looked up through a short,
//!   ordered list of header spellings
//! - **Deterministic output**: every artifact is sorted, so reruns are
//!   byte-identical and diffable
//! - **Batch mode**: a directory of cutsheets is processed file by file, failures
//!   are logged and skipped, and a summary is always written
//!
//! ## Entry points
//!
//! - [`process_file`]: one cutsheet in, two artifacts out, a [`FileSummary`] back
//! - [`run_batch`]: every `.csv` and `.xlsx` in a directory, plus `processing_summary.txt`

pub mod config;
pub mod connections;
pub mod error;
pub mod fields;
mod helpers;
pub mod pipeline;
mod spreadsheet;
pub mod table;
pub mod topology;
pub mod writer;

pub use crate::config::ReaderOptions;
pub use crate::connections::{extract_connections, ConnectionMap};
pub use crate::error::CutsheetError;
pub use crate::pipeline::{process_file, run_batch, FileSummary};
pub use crate::table::{read_table, Table};
pub use crate::topology::{build_topology, TopologyMap};
