//! Stage orchestration: wires classification, mapping, enrichment and the
//! final merge together for a single run.

use chrono::{Local, NaiveDateTime};

use crate::cli::Stage;
use crate::config::RunConfig;
use crate::error::Result;
use crate::inventory_stage;
use crate::owners::OwnerDirectory;
use crate::report;
use crate::scan_stage;

/// Runs the requested stage(s) against the wall clock.
pub fn run(config: &RunConfig, stage: Stage) -> Result<()> {
    run_at(config, stage, Local::now().naive_local())
}

/// Same as [`run`] with an injected "now", so age and status derivations
/// are reproducible in tests.
pub fn run_at(config: &RunConfig, stage: Stage, now: NaiveDateTime) -> Result<()> {
    match stage {
        Stage::Scan => {
            let owners = OwnerDirectory::load(&config.owners_path)?;
            run_scan(config, &owners, now)?;
        }
        Stage::Inventory => {
            let owners = OwnerDirectory::load(&config.owners_path)?;
            run_inventory(config, &owners, now)?;
        }
        Stage::Merge => {
            // Intermediates from earlier runs are picked up from the
            // output directory.
            let scan_plus = config.output_dir.join(scan_stage::UNDATED_PLUS_NAME);
            let enriched = config.output_dir.join(inventory_stage::ENRICHED_NAME);
            report::assemble(&scan_plus, &enriched, &config.output_dir, now.date())?;
        }
        Stage::All => {
            let owners = OwnerDirectory::load(&config.owners_path)?;
            let scan_out = run_scan(config, &owners, now)?;
            let enriched = run_inventory(config, &owners, now)?;
            report::assemble(
                &scan_out.undated_plus,
                &enriched,
                &config.output_dir,
                now.date(),
            )?;
        }
    }
    Ok(())
}

fn run_scan(
    config: &RunConfig,
    owners: &OwnerDirectory,
    now: NaiveDateTime,
) -> Result<scan_stage::ScanStageOutput> {
    eprintln!("🔍 Classifying scanner exports in {}", config.scan_dir.display());
    scan_stage::run(&config.scan_dir, &config.output_dir, owners, now)
}

fn run_inventory(
    config: &RunConfig,
    owners: &OwnerDirectory,
    now: NaiveDateTime,
) -> Result<std::path::PathBuf> {
    eprintln!(
        "🔍 Merging inventory snapshots in {}",
        config.inventory_dir.display()
    );
    inventory_stage::run(&config.inventory_dir, &config.output_dir, owners, now)
}
