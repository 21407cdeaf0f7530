use std::path::PathBuf;

use clap::Parser;

/// Which part of the pipeline to run. Individual stages pick up the
/// intermediates earlier stages left in the output directory, mirroring how
/// the reports used to be produced step by step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scan,
    Inventory,
    Merge,
    All,
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scan" => Ok(Stage::Scan),
            "inventory" => Ok(Stage::Inventory),
            "merge" => Ok(Stage::Merge),
            "all" => Ok(Stage::All),
            _ => Err(format!(
                "Invalid stage: {}. Please specify 'scan', 'inventory', 'merge' or 'all'",
                s
            )),
        }
    }
}

/// Merge and enrich vulnerability-scan exports into a unified CSV report
#[derive(Parser, Debug)]
#[command(name = "vulnmerge")]
#[command(version)]
#[command(about = "Merge and enrich vulnerability-scan exports into a unified CSV report", long_about = None)]
pub struct Args {
    /// Directory holding the raw network-scanner exports
    #[arg(long)]
    pub scan_dir: Option<PathBuf>,

    /// Directory holding the inventory snapshot exports
    #[arg(long)]
    pub inventory_dir: Option<PathBuf>,

    /// Path of the IP-to-owner lookup CSV ("IP Address","Owner" columns)
    #[arg(long)]
    pub owners: Option<PathBuf>,

    /// Directory for intermediates and the final report
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Pipeline stage to run: scan, inventory, merge or all
    #[arg(short, long, default_value = "all")]
    pub stage: Stage,

    /// Explicit config file path (default: ./vulnmerge.config.yml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
