//! The canonical report schema and the per-source column mappings onto it.

use crate::table::Table;

/// Target column set of the unified report, in output order. Derived columns
/// sit directly after their logical source (Owner after the IP, Days after
/// the detection date) so analysts read cause and derivation side by side.
pub const CANONICAL_COLUMNS: [&str; 16] = [
    "Asset Names",
    "Asset IP Address",
    "Owner",
    "OS",
    "Asset OS Version",
    "Vulnerability Title",
    "Vulnerability Description",
    "Severity Tag",
    "Vulnerability ID",
    "Vulnerability CVE IDs",
    "Vulnerability Solution",
    "Vulnerability Proof",
    "Vulnerable Since",
    "Days",
    "Status",
    "Service Port",
];

/// Which enriched intermediate a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Network scanner rows (Scan_Undated_plus.csv vocabulary).
    Scan,
    /// Inventory scanner rows (Inventory_Enriched.csv vocabulary).
    Inventory,
}

/// Canonical-column → source-column pairs for the scanner vocabulary.
/// `Asset OS Version` is absent: the scanner does not report it.
const SCAN_MAPPING: &[(&str, &str)] = &[
    ("Asset Names", "DNS"),
    ("Asset IP Address", "IP"),
    ("Owner", "Owner"),
    ("OS", "OS"),
    ("Vulnerability Title", "Title"),
    ("Vulnerability Description", "Vulnerability Description"),
    ("Severity Tag", "Severity Tag"),
    ("Vulnerability ID", "Vulnerability Id"),
    ("Vulnerability CVE IDs", "CVE ID"),
    ("Vulnerability Solution", "Solution"),
    ("Vulnerability Proof", "Results"),
    ("Vulnerable Since", "First Detected"),
    ("Days", "Days"),
    ("Status", "Status"),
    ("Service Port", "Port"),
];

/// Canonical-column → source-column pairs for the inventory vocabulary.
/// Mostly identity; the OS name column differs.
const INVENTORY_MAPPING: &[(&str, &str)] = &[
    ("Asset Names", "Asset Names"),
    ("Asset IP Address", "Asset IP Address"),
    ("Owner", "Owner"),
    ("OS", "Asset OS Name"),
    ("Asset OS Version", "Asset OS Version"),
    ("Vulnerability Title", "Vulnerability Title"),
    ("Vulnerability Description", "Vulnerability Description"),
    ("Severity Tag", "Severity Tag"),
    ("Vulnerability ID", "Vulnerability ID"),
    ("Vulnerability CVE IDs", "Vulnerability CVE IDs"),
    ("Vulnerability Solution", "Vulnerability Solution"),
    ("Vulnerability Proof", "Vulnerability Proof"),
    ("Vulnerable Since", "Vulnerable Since"),
    ("Days", "Days"),
    ("Status", "Status"),
    ("Service Port", "Service Port"),
];

fn mapping(kind: SourceKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        SourceKind::Scan => SCAN_MAPPING,
        SourceKind::Inventory => INVENTORY_MAPPING,
    }
}

fn source_column(kind: SourceKind, canonical: &str) -> Option<&'static str> {
    mapping(kind)
        .iter()
        .find(|(target, _)| *target == canonical)
        .map(|(_, source)| *source)
}

/// Projects a source table onto the canonical schema.
///
/// Total over the canonical column list: a canonical column with no mapping
/// for this source, or whose mapped column is absent from the actual rows,
/// comes out as empty string. Never fails.
pub fn map_table(kind: SourceKind, source: &Table) -> Table {
    // Resolve each canonical column to a source index once, up front.
    let indices: Vec<Option<usize>> = CANONICAL_COLUMNS
        .iter()
        .map(|canonical| {
            source_column(kind, canonical).and_then(|name| source.column_index(name))
        })
        .collect();

    let mut mapped = Table::new(CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect());
    for row in &source.rows {
        let canonical_row = indices
            .iter()
            .map(|idx| idx.map(|i| row[i].clone()).unwrap_or_default())
            .collect();
        mapped.push_row(canonical_row);
    }
    mapped
}
