//! Network-scanner stage: classify the raw exports, join ownership and
//! first-detection data onto the current-state export, derive the SLA
//! columns, and write the enriched intermediates.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::csvio;
use crate::enrich::{self, Severity, SCAN_DETECTED_FORMAT};
use crate::error::{ReportError, Result};
use crate::fingerprint::{self, FormatTag, SCAN_RULES};
use crate::merge;
use crate::owners::OwnerDirectory;
use crate::table::Table;

pub const UNDATED_PLUS_NAME: &str = "Scan_Undated_plus.csv";
pub const DATED_PLUS_NAME: &str = "Scan_Dated_plus.csv";

/// Paths of the enriched intermediates this stage leaves in the work dir.
#[derive(Debug)]
pub struct ScanStageOutput {
    pub undated_plus: PathBuf,
    pub dated_plus: PathBuf,
}

/// Runs the full scanner stage: fingerprint the exports in `scan_dir`,
/// enrich the undated export with owner, composite key, detection date and
/// the derived SLA columns, dedup the dated export, and write both
/// intermediates into `work_dir`.
pub fn run(
    scan_dir: &Path,
    work_dir: &Path,
    owners: &OwnerDirectory,
    now: NaiveDateTime,
) -> Result<ScanStageOutput> {
    let copies = fingerprint::classify_directory(scan_dir, work_dir, SCAN_RULES)?;
    let undated_path = classified_path(&copies, FormatTag::ScanUndated, work_dir)?;
    let dated_path = classified_path(&copies, FormatTag::ScanDated, work_dir)?;

    let undated = csvio::read_table(&undated_path, FormatTag::ScanUndated.preamble_rows())?;
    let dated = csvio::read_table(&dated_path, FormatTag::ScanDated.preamble_rows())?;

    let dated_plus = dedup_dated(dated, &dated_path)?;
    let undated_plus = enrich_undated(undated, &undated_path, &dated_plus, owners, now)?;

    let undated_out = work_dir.join(UNDATED_PLUS_NAME);
    let dated_out = work_dir.join(DATED_PLUS_NAME);
    csvio::write_table(&undated_out, &undated_plus)?;
    eprintln!("📄 Wrote {} ({} findings)", undated_out.display(), undated_plus.len());
    csvio::write_table(&dated_out, &dated_plus)?;
    eprintln!("📄 Wrote {} ({} findings)", dated_out.display(), dated_plus.len());

    Ok(ScanStageOutput {
        undated_plus: undated_out,
        dated_plus: dated_out,
    })
}

fn classified_path(
    copies: &HashMap<FormatTag, PathBuf>,
    tag: FormatTag,
    work_dir: &Path,
) -> Result<PathBuf> {
    copies.get(&tag).cloned().ok_or_else(|| {
        ReportError::ClassifiedFileMissing {
            path: work_dir.join(tag.canonical_name()),
            tag: tag.to_string(),
        }
        .into()
    })
}

/// Composite keys for every row of a scan export (IP + numeric QID).
fn row_keys(table: &Table, path: &Path) -> Result<Vec<String>> {
    let ip = table.require_column("IP", path)?;
    let qid = table.require_column("QID", path)?;
    Ok(table.map_rows(|row| merge::composite_key(&row[ip], &row[qid])))
}

/// The dated export keyed by composite id, first detection wins, with the
/// key inserted in front of the Port column.
fn dedup_dated(mut dated: Table, path: &Path) -> Result<Table> {
    let keys = row_keys(&dated, path)?;
    merge::dedup_first(&mut dated, &keys);

    let keys = row_keys(&dated, path)?;
    let port = dated.require_column("Port", path)?;
    dated.insert_column(port, "Unique Id", keys);
    Ok(dated)
}

/// All enrichment of the undated export. Column placement follows the
/// report layout: Owner after IP, Unique Id before Port, detection date and
/// age at the end, category/description after Type, tag/status after
/// Severity.
fn enrich_undated(
    mut undated: Table,
    path: &Path,
    dated_plus: &Table,
    owners: &OwnerDirectory,
    now: NaiveDateTime,
) -> Result<Table> {
    // Owner directly after the asset IP.
    let ip = undated.require_column("IP", path)?;
    let owner_values = undated.map_rows(|row| owners.lookup(&row[ip]).to_string());
    undated.insert_column_after(ip, "Owner", owner_values);

    // Composite key in front of Port.
    let keys = row_keys(&undated, path)?;
    let port = undated.require_column("Port", path)?;
    undated.insert_column(port, "Unique Id", keys.clone());

    // First Detected joined from the deduped dated export; assets the dated
    // pull never saw get an empty cell and count as not overdue.
    let first_detected = lookup_first_detected(dated_plus, &keys)?;
    let days: Vec<Option<i64>> = first_detected
        .iter()
        .map(|raw| enrich::days_since(raw, now, &[SCAN_DETECTED_FORMAT]))
        .collect();
    undated.append_column("First Detected", first_detected);
    undated.append_column(
        "Days",
        days.iter()
            .map(|d| d.map(|v| v.to_string()).unwrap_or_default())
            .collect(),
    );

    // Vulnerability category and composed description, next to Type.
    let title = undated.require_column("Title", path)?;
    let categories =
        undated.map_rows(|row| enrich::categorize_title(&row[title]).to_string());
    let kind = undated.require_column("Type", path)?;
    undated.insert_column_after(kind, "Vulnerability Id", categories);

    let threat = undated.require_column("Threat", path)?;
    let impact = undated.require_column("Impact", path)?;
    let descriptions =
        undated.map_rows(|row| enrich::compose_description(&row[threat], &row[impact]));
    let category = undated.require_column("Vulnerability Id", path)?;
    undated.insert_column_after(category, "Vulnerability Description", descriptions);

    // Severity tag and SLA status, next to the raw severity code.
    let code = undated.require_column("Severity", path)?;
    let severities: Vec<Severity> = undated
        .rows
        .iter()
        .map(|row| Severity::from_code(&row[code]))
        .collect();
    let statuses: Vec<String> = severities
        .iter()
        .zip(&days)
        .map(|(severity, days)| enrich::sla_status(*severity, *days).to_string())
        .collect();
    undated.insert_column_after(
        code,
        "Severity Tag",
        severities.iter().map(|s| s.to_string()).collect(),
    );
    let tag = undated.require_column("Severity Tag", path)?;
    undated.insert_column_after(tag, "Status", statuses);

    Ok(undated)
}

/// First Detected value per composite key, read from the deduped dated
/// export. Keys missing from the dated pull map to empty.
fn lookup_first_detected(dated_plus: &Table, keys: &[String]) -> Result<Vec<String>> {
    let key_idx = dated_plus.require_column("Unique Id", Path::new(DATED_PLUS_NAME))?;
    let detected_idx = dated_plus.require_column(
        "First Detected",
        Path::new(DATED_PLUS_NAME),
    )?;

    let by_key: HashMap<&str, &str> = dated_plus
        .rows
        .iter()
        .map(|row| (row[key_idx].as_str(), row[detected_idx].as_str()))
        .collect();

    Ok(keys
        .iter()
        .map(|key| by_key.get(key.as_str()).copied().unwrap_or("").to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    const UNDATED_HEADER: &str = "IP,DNS,OS,QID,Title,Type,Severity,Threat,Impact,CVE ID,Solution,Results,Port";
    const DATED_HEADER: &str = "IP,DNS,QID,First Detected,Port";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 30)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn undated_table(rows: &[&str]) -> Table {
        let mut t = Table::new(UNDATED_HEADER.split(',').map(|s| s.to_string()).collect());
        for row in rows {
            t.push_row(row.split(',').map(|s| s.to_string()).collect());
        }
        t
    }

    fn dated_table(rows: &[&str]) -> Table {
        let mut t = Table::new(DATED_HEADER.split(',').map(|s| s.to_string()).collect());
        for row in rows {
            t.push_row(row.split(',').map(|s| s.to_string()).collect());
        }
        t
    }

    fn owners() -> OwnerDirectory {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("owners.csv");
        fs::write(&path, "IP Address,Owner\n10.0.0.1,Alice\n").unwrap();
        OwnerDirectory::load(&path).unwrap()
    }

    #[test]
    fn test_dedup_dated_keys_and_keeps_first() {
        let dated = dated_table(&[
            "10.0.0.1,host1,90001,04/01/2026 08:00:00,445",
            "10.0.0.1,host1,90001,05/01/2026 08:00:00,445",
            "10.0.0.2,host2,90002,04/02/2026 08:00:00,22",
        ]);
        let out = dedup_dated(dated, Path::new("dated.csv")).unwrap();

        assert_eq!(out.len(), 2);
        let key = out.column_index("Unique Id").unwrap();
        let detected = out.column_index("First Detected").unwrap();
        assert_eq!(out.cell(0, key), "10.0.0.190001");
        assert_eq!(out.cell(0, detected), "04/01/2026 08:00:00");
        // Unique Id sits directly before Port
        assert_eq!(out.column_index("Port").unwrap(), key + 1);
    }

    #[test]
    fn test_enrich_undated_columns_and_values() {
        let undated = undated_table(&[
            "10.0.0.1,host1,Windows Server 2019,90001,Google Chrome Update,Vuln,4,Old Chrome.,Code execution.,CVE-2026-1111,Update Chrome,chrome.exe 99,443",
            "10.0.0.9,host9,Windows 10,90009,Mystery finding,Vuln,2,Threat text.,Impact text.,,,,80",
        ]);
        let dated_plus = dedup_dated(
            dated_table(&["10.0.0.1,host1,90001,05/01/2026 08:00:00,443"]),
            Path::new("dated.csv"),
        )
        .unwrap();

        let out = enrich_undated(undated, Path::new("undated.csv"), &dated_plus, &owners(), now())
            .unwrap();
        let col = |name: &str| out.column_index(name).unwrap();

        // placement contracts
        assert_eq!(col("Owner"), col("IP") + 1);
        assert_eq!(col("Port"), col("Unique Id") + 1);
        assert_eq!(col("Vulnerability Id"), col("Type") + 1);
        assert_eq!(col("Vulnerability Description"), col("Vulnerability Id") + 1);
        assert_eq!(col("Severity Tag"), col("Severity") + 1);
        assert_eq!(col("Status"), col("Severity Tag") + 1);

        // joined + derived values, first row (121 days old on 2026-08-30)
        assert_eq!(out.cell(0, col("Owner")), "Alice");
        assert_eq!(out.cell(0, col("Unique Id")), "10.0.0.190001");
        assert_eq!(out.cell(0, col("First Detected")), "05/01/2026 08:00:00");
        assert_eq!(out.cell(0, col("Days")), "121");
        assert_eq!(out.cell(0, col("Vulnerability Id")), "Chrome");
        assert_eq!(
            out.cell(0, col("Vulnerability Description")),
            "Old Chrome. Code execution."
        );
        assert_eq!(out.cell(0, col("Severity Tag")), "High");
        assert_eq!(out.cell(0, col("Status")), "Overdue");

        // second row: unknown owner, no dated record, out-of-range code
        assert_eq!(out.cell(1, col("Owner")), "Not Available");
        assert_eq!(out.cell(1, col("First Detected")), "");
        assert_eq!(out.cell(1, col("Days")), "");
        assert_eq!(out.cell(1, col("Vulnerability Id")), "Others");
        assert_eq!(out.cell(1, col("Severity Tag")), "Unknown");
        assert_eq!(out.cell(1, col("Status")), "Not Overdue");
    }

    #[test]
    fn test_enrich_undated_missing_severity_column_is_fatal() {
        let mut undated = undated_table(&[]);
        let severity = undated.column_index("Severity").unwrap();
        undated.headers.remove(severity);

        let dated_plus =
            dedup_dated(dated_table(&[]), Path::new("dated.csv")).unwrap();
        let err = enrich_undated(
            undated,
            Path::new("undated.csv"),
            &dated_plus,
            &owners(),
            now(),
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("Required column 'Severity'"));
    }
}
