//! Structural fingerprinting of raw scanner exports.
//!
//! The network scanner's exports carry no reliable filename or header, but
//! each layout has a signature: the real header row sits at a fixed offset
//! below the preamble and has a fixed field count. Classification inspects
//! raw lines before any CSV parsing and copies each recognized file to a
//! canonical name in the work directory, leaving the raw inputs untouched.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::csvio;
use crate::error::{ReportError, Result};

/// Known export layouts of the network scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    /// Current-state export: no detection dates, 7 preamble rows.
    ScanUndated,
    /// Historical export: detection dates included, 10 preamble rows.
    ScanDated,
}

impl FormatTag {
    /// Canonical file name the classified copy is written under.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            FormatTag::ScanUndated => "Scan_Undated.csv",
            FormatTag::ScanDated => "Scan_Dated.csv",
        }
    }

    /// Number of preamble rows above the real header row.
    pub fn preamble_rows(&self) -> usize {
        match self {
            FormatTag::ScanUndated => 7,
            FormatTag::ScanDated => 10,
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatTag::ScanUndated => f.write_str("Scan_Undated"),
            FormatTag::ScanDated => f.write_str("Scan_Dated"),
        }
    }
}

/// One fingerprint: "the line at `row_offset` splits into `field_count`
/// comma-separated fields". Rules are evaluated in declaration order and the
/// first hit decides the tag.
#[derive(Debug, Clone, Copy)]
pub struct FingerprintRule {
    pub row_offset: usize,
    pub field_count: usize,
    pub tag: FormatTag,
}

impl FingerprintRule {
    pub fn matches(&self, lines: &[String]) -> bool {
        match lines.get(self.row_offset) {
            // Naive comma split on purpose: the fingerprint contract is over
            // the raw line shape, not an RFC 4180 parse.
            Some(line) => line.trim_end().split(',').count() == self.field_count,
            None => false,
        }
    }
}

/// Rule set for the two known scanner layouts, in priority order.
pub const SCAN_RULES: &[FingerprintRule] = &[
    FingerprintRule {
        row_offset: 7,
        field_count: 28,
        tag: FormatTag::ScanUndated,
    },
    FingerprintRule {
        row_offset: 10,
        field_count: 42,
        tag: FormatTag::ScanDated,
    },
];

/// Outcome of fingerprinting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Matched(FormatTag),
    Unclassified,
}

/// Evaluates the rule set against a file's raw lines. The first matching
/// rule wins; every matching tag is returned so ambiguous files can be
/// reported instead of silently resolved.
pub fn classify(lines: &[String], rules: &[FingerprintRule]) -> (Classification, Vec<FormatTag>) {
    let matched: Vec<FormatTag> = rules
        .iter()
        .filter(|rule| rule.matches(lines))
        .map(|rule| rule.tag)
        .collect();
    match matched.first() {
        Some(tag) => (Classification::Matched(*tag), matched),
        None => (Classification::Unclassified, matched),
    }
}

/// Fingerprints every CSV in `input_dir` and copies each recognized file to
/// its canonical name under `work_dir`. Raw inputs are never renamed or
/// modified, so repeated runs classify the same way.
///
/// Ambiguous and unrecognized files produce warnings; two files claiming the
/// same tag is a structural error.
pub fn classify_directory(
    input_dir: &Path,
    work_dir: &Path,
    rules: &[FingerprintRule],
) -> Result<HashMap<FormatTag, PathBuf>> {
    let mut csv_files: Vec<PathBuf> = fs::read_dir(input_dir)
        .map_err(|e| ReportError::InvalidInputDir {
            path: input_dir.to_path_buf(),
            reason: e.to_string(),
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    csv_files.sort();

    let mut claimed: HashMap<FormatTag, PathBuf> = HashMap::new();
    let mut copies: HashMap<FormatTag, PathBuf> = HashMap::new();

    for path in csv_files {
        let lines = csvio::read_lines(&path)?;
        let (classification, matched) = classify(&lines, rules);

        if matched.len() > 1 {
            let tags: Vec<String> = matched.iter().map(|t| t.to_string()).collect();
            eprintln!(
                "⚠️  Warning: {} matches multiple fingerprints ({}); using '{}'",
                path.display(),
                tags.join(", "),
                matched[0]
            );
        }

        let tag = match classification {
            Classification::Matched(tag) => tag,
            Classification::Unclassified => {
                eprintln!(
                    "⚠️  Warning: {} matches no known export fingerprint; skipping",
                    path.display()
                );
                continue;
            }
        };

        if let Some(previous) = claimed.get(&tag) {
            return Err(ReportError::DuplicateClassification {
                tag: tag.to_string(),
                first: previous.clone(),
                second: path,
            }
            .into());
        }

        let destination = work_dir.join(tag.canonical_name());
        fs::copy(&path, &destination).map_err(|e| ReportError::FileWriteError {
            path: destination.clone(),
            details: e.to_string(),
        })?;
        eprintln!("🗂️  Classified {} as {}", path.display(), tag);

        claimed.insert(tag, path);
        copies.insert(tag, destination);
    }

    Ok(copies)
}
