//! Final assembly: project both enriched intermediates onto the canonical
//! schema and write the date-stamped unified report.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::csvio;
use crate::error::Result;
use crate::merge;
use crate::schema::{self, SourceKind};

/// Date-stamped report name, e.g. `Unified_Report_30AUG26.csv`.
pub fn output_name(date: NaiveDate) -> String {
    format!(
        "Unified_Report_{}.csv",
        date.format("%d%b%y").to_string().to_uppercase()
    )
}

/// Maps the scanner and inventory intermediates onto the canonical column
/// set and writes the unified report into `output_dir`. Scanner rows come
/// first, matching the order the report has always been reviewed in.
pub fn assemble(
    scan_plus: &Path,
    inventory_enriched: &Path,
    output_dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf> {
    let scan = csvio::read_table(scan_plus, 0)?;
    let inventory = csvio::read_table(inventory_enriched, 0)?;

    let scan_mapped = schema::map_table(SourceKind::Scan, &scan);
    let inventory_mapped = schema::map_table(SourceKind::Inventory, &inventory);
    let unified = merge::concat_checked(vec![
        (scan_plus, scan_mapped),
        (inventory_enriched, inventory_mapped),
    ])?;

    let output_path = output_dir.join(output_name(date));
    csvio::write_table(&output_path, &unified)?;
    eprintln!(
        "✅ Unified report written to {} ({} findings)",
        output_path.display(),
        unified.len()
    );
    Ok(output_path)
}
