//! Derivation rules for the enrichment pass: severity tiers, SLA overdue
//! status, vulnerability age, and the keyword-based vulnerability category.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// Severity tier of a finding.
///
/// `Unknown` covers integer severity codes outside {3, 4, 5}, which the
/// scanner emits for informational findings; they never count against an SLA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
    Unknown,
}

impl Severity {
    /// Tier for a CVSS base score in [0.0, 10.0].
    ///
    /// Boundaries are inclusive per the CVSS v3 qualitative scale:
    /// [9.0, 10.0] Critical, [7.0, 8.9] High, [4.0, 6.9] Medium,
    /// [0.1, 3.9] Low, 0.0 None. The Low floor is deliberately 0.1, the
    /// smallest score CVSS can express: anything below it only arises from
    /// malformed data and lands in None with the other unscorable cells.
    /// An unparseable score is None.
    pub fn from_cvss_score(raw: &str) -> Severity {
        let score: f64 = match raw.trim().parse() {
            Ok(s) => s,
            Err(_) => return Severity::None,
        };
        if (9.0..=10.0).contains(&score) {
            Severity::Critical
        } else if (7.0..=8.9).contains(&score) {
            Severity::High
        } else if (4.0..=6.9).contains(&score) {
            Severity::Medium
        } else if (0.1..=3.9).contains(&score) {
            Severity::Low
        } else {
            Severity::None
        }
    }

    /// Tier for the scanner's integer severity code: 3 Medium, 4 High,
    /// 5 Critical, anything else Unknown.
    pub fn from_code(raw: &str) -> Severity {
        // Some exports render codes as "4.0"; parse as float and compare.
        match raw.trim().parse::<f64>() {
            Ok(c) if c == 3.0 => Severity::Medium,
            Ok(c) if c == 4.0 => Severity::High,
            Ok(c) if c == 5.0 => Severity::Critical,
            _ => Severity::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "None",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
            Severity::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a finding has outlived the remediation SLA for its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaStatus {
    Overdue,
    NotOverdue,
}

impl SlaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaStatus::Overdue => "Overdue",
            SlaStatus::NotOverdue => "Not Overdue",
        }
    }
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SLA table: Medium 90 days, High 60, Critical 30. Findings with no age
/// (unparseable detection date) and Low/None/Unknown tiers are never overdue.
pub fn sla_status(severity: Severity, days: Option<i64>) -> SlaStatus {
    let days = match days {
        Some(d) => d,
        None => return SlaStatus::NotOverdue,
    };
    match severity {
        Severity::Medium if days > 90 => SlaStatus::Overdue,
        Severity::High if days > 60 => SlaStatus::Overdue,
        Severity::Critical if days > 30 => SlaStatus::Overdue,
        _ => SlaStatus::NotOverdue,
    }
}

/// Timestamp layout of the network scanner's "First Detected" column.
pub const SCAN_DETECTED_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Layouts seen in inventory "Vulnerable Since" cells, tried in order.
pub const INVENTORY_SINCE_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y",
    "%Y-%m-%d",
];

/// Parses a detection timestamp against a list of candidate layouts.
/// Date-only layouts resolve to midnight. Returns None when nothing matches.
pub fn parse_detection_time(raw: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
        if let Some(dt) = NaiveDate::parse_from_str(raw, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Some(dt);
        }
    }
    None
}

/// Whole days between the detection timestamp and the run time. None when
/// the cell is missing or unparseable; the status rules treat that as not
/// overdue rather than failing the run.
pub fn days_since(raw: &str, now: NaiveDateTime, formats: &[&str]) -> Option<i64> {
    parse_detection_time(raw, formats).map(|detected| (now - detected).num_days())
}

/// Keyword-to-category table for vulnerability titles, checked in order;
/// the first keyword contained in the title wins.
const TITLE_CATEGORIES: &[(&str, &str)] = &[
    ("SMB", "SMB"),
    ("SNMP", "SNMP"),
    ("Chrome", "Chrome"),
    ("Foxit", "Foxit"),
    ("Mozilla", "Mozilla Firefox"),
    ("Adobe", "Adobe"),
    ("TLS", "TLS-Cipher"),
    ("7-Zip", "7-Zip"),
    ("Explorer", "Internet Explorer"),
];

/// Category label for a vulnerability title; "Others" when no keyword hits.
pub fn categorize_title(title: &str) -> &'static str {
    for (keyword, category) in TITLE_CATEGORIES {
        if title.contains(keyword) {
            return category;
        }
    }
    "Others"
}

/// Free-text description: threat and impact joined with a single space.
pub fn compose_description(threat: &str, impact: &str) -> String {
    format!("{} {}", threat, impact)
}
