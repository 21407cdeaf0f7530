//! Inventory-scanner stage: merge the three snapshot exports into one
//! record set, then derive age, ownership and SLA columns.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::csvio;
use crate::enrich::{self, Severity, INVENTORY_SINCE_FORMATS};
use crate::error::{ReportError, Result};
use crate::merge;
use crate::owners::OwnerDirectory;
use crate::table::Table;

pub const MERGED_NAME: &str = "Inventory_Merged.csv";
pub const ENRICHED_NAME: &str = "Inventory_Enriched.csv";

/// The inventory tool is pulled three times per reporting cycle; any other
/// file count means the snapshot directory is stale or polluted.
pub const SNAPSHOT_COUNT: usize = 3;

/// Runs the inventory stage: merge the snapshots under `inventory_dir`
/// (headers must agree), enrich, and write both the merged and enriched
/// intermediates into `work_dir`. Returns the enriched path.
pub fn run(
    inventory_dir: &Path,
    work_dir: &Path,
    owners: &OwnerDirectory,
    now: NaiveDateTime,
) -> Result<PathBuf> {
    let snapshots = snapshot_files(inventory_dir)?;
    let mut tables = Vec::with_capacity(snapshots.len());
    for path in &snapshots {
        tables.push((path.as_path(), csvio::read_table(path, 0)?));
    }
    let merged = merge::concat_checked(tables)?;

    let merged_path = work_dir.join(MERGED_NAME);
    csvio::write_table(&merged_path, &merged)?;
    eprintln!(
        "📄 Merged {} snapshots into {} ({} findings)",
        snapshots.len(),
        merged_path.display(),
        merged.len()
    );

    let enriched = enrich_merged(merged, &merged_path, owners, now)?;
    let enriched_path = work_dir.join(ENRICHED_NAME);
    csvio::write_table(&enriched_path, &enriched)?;
    eprintln!("📄 Wrote {}", enriched_path.display());

    Ok(enriched_path)
}

/// The snapshot CSVs, sorted for a deterministic merge order. Exactly
/// `SNAPSHOT_COUNT` files must be present.
fn snapshot_files(inventory_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(inventory_dir)
        .map_err(|e| ReportError::InvalidInputDir {
            path: inventory_dir.to_path_buf(),
            reason: e.to_string(),
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();

    if files.len() != SNAPSHOT_COUNT {
        return Err(ReportError::WrongFileCount {
            dir: inventory_dir.to_path_buf(),
            expected: SNAPSHOT_COUNT,
            found: files.len(),
        }
        .into());
    }
    Ok(files)
}

/// Derives Days (after Vulnerable Since), Owner (after the asset IP),
/// Severity Tag (after the CVSS score) and the trailing Status column.
/// The three anchor columns are required; everything else is tolerated.
fn enrich_merged(
    mut table: Table,
    path: &Path,
    owners: &OwnerDirectory,
    now: NaiveDateTime,
) -> Result<Table> {
    let since = table.require_column("Vulnerable Since", path)?;
    let days: Vec<Option<i64>> = table
        .rows
        .iter()
        .map(|row| enrich::days_since(&row[since], now, INVENTORY_SINCE_FORMATS))
        .collect();
    table.insert_column_after(
        since,
        "Days",
        days.iter()
            .map(|d| d.map(|v| v.to_string()).unwrap_or_default())
            .collect(),
    );

    let ip = table.require_column("Asset IP Address", path)?;
    let owner_values = table.map_rows(|row| owners.lookup(&row[ip]).to_string());
    table.insert_column_after(ip, "Owner", owner_values);

    let score = table.require_column("Vulnerability CVSS Score", path)?;
    let severities: Vec<Severity> = table
        .rows
        .iter()
        .map(|row| Severity::from_cvss_score(&row[score]))
        .collect();
    table.insert_column_after(
        score,
        "Severity Tag",
        severities.iter().map(|s| s.to_string()).collect(),
    );

    let statuses: Vec<String> = severities
        .iter()
        .zip(&days)
        .map(|(severity, days)| enrich::sla_status(*severity, *days).to_string())
        .collect();
    table.append_column("Status", statuses);

    Ok(table)
}
