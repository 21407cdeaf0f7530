//! Snapshot merging: header-checked concatenation and composite-key dedup.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{ReportError, Result};
use crate::table::Table;

/// Composite key identifying one (asset, vulnerability) pairing: the asset
/// IP concatenated with the numeric vulnerability id. Non-numeric ids
/// collapse to 0, matching how blank ids were keyed historically.
pub fn composite_key(ip: &str, vuln_id: &str) -> String {
    let id = vuln_id
        .trim()
        .parse::<f64>()
        .map(|v| v as i64)
        .unwrap_or(0);
    format!("{}{}", ip, id)
}

/// Concatenates record sets that must share an identical header, in input
/// order. A header mismatch fails before anything is written; the paths are
/// only used for error reporting.
pub fn concat_checked(tables: Vec<(&Path, Table)>) -> Result<Table> {
    let mut iter = tables.into_iter();
    let (first_path, mut merged) = match iter.next() {
        Some(first) => first,
        None => return Ok(Table::new(Vec::new())),
    };

    for (path, table) in iter {
        if table.headers != merged.headers {
            return Err(ReportError::HeaderMismatch {
                first: first_path.to_path_buf(),
                second: path.to_path_buf(),
            }
            .into());
        }
        merged.rows.extend(table.rows);
    }
    Ok(merged)
}

/// Drops rows whose key was already seen, keeping the first occurrence.
/// Repeated detections of one (asset, vulnerability) pair across historical
/// pulls collapse to the earliest record in input order.
pub fn dedup_first(table: &mut Table, keys: &[String]) {
    debug_assert_eq!(keys.len(), table.rows.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(keys.len());
    let mut keep = keys.iter().map(|k| seen.insert(k.as_str()));
    table.rows.retain(|_| keep.next().unwrap_or(false));
}
