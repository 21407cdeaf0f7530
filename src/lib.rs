//! vulnmerge - unified vulnerability-scan reporting
//!
//! This library merges and enriches CSV exports from two security scanners
//! into one analyst-ready report. The pipeline fingerprints raw exports by
//! structure, projects their divergent column vocabularies onto a canonical
//! schema, derives ownership, age, severity tier and SLA status for every
//! finding, and collapses repeated detections across historical snapshots.
//!
//! # Pipeline
//!
//! - **fingerprint**: classify raw exports by header-row shape
//! - **scan_stage / inventory_stage**: per-scanner parse, join and enrich
//! - **schema**: project both vocabularies onto the canonical column set
//! - **merge**: header-checked concatenation and composite-key dedup
//! - **report**: write the date-stamped unified CSV
//!
//! # Example
//!
//! ```no_run
//! use vulnmerge::cli::Stage;
//! use vulnmerge::config::RunConfig;
//! use vulnmerge::pipeline;
//! use std::path::PathBuf;
//!
//! # fn main() -> vulnmerge::error::Result<()> {
//! let config = RunConfig {
//!     scan_dir: PathBuf::from("exports/scan"),
//!     inventory_dir: PathBuf::from("exports/inventory"),
//!     owners_path: PathBuf::from("owners.csv"),
//!     output_dir: PathBuf::from("reports"),
//! };
//! pipeline::run(&config, Stage::All)?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod csvio;
pub mod enrich;
pub mod error;
pub mod fingerprint;
pub mod inventory_stage;
pub mod merge;
pub mod owners;
pub mod pipeline;
pub mod report;
pub mod scan_stage;
pub mod schema;
pub mod table;
