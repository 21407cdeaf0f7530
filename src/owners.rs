use std::collections::HashMap;
use std::path::Path;

use crate::csvio;
use crate::error::Result;

/// Sentinel owner for assets absent from the lookup table.
pub const OWNER_NOT_AVAILABLE: &str = "Not Available";

/// Read-only IP-to-owner lookup, loaded once per run from the owner CSV
/// ("IP Address", "Owner" columns).
#[derive(Debug, Default)]
pub struct OwnerDirectory {
    by_ip: HashMap<String, String>,
}

impl OwnerDirectory {
    pub fn load(path: &Path) -> Result<Self> {
        let table = csvio::read_table(path, 0)?;
        let ip = table.require_column("IP Address", path)?;
        let owner = table.require_column("Owner", path)?;

        let by_ip = table
            .rows
            .iter()
            .map(|row| (row[ip].clone(), row[owner].clone()))
            .collect();
        Ok(Self { by_ip })
    }

    /// Owner for an asset IP, or the "Not Available" sentinel.
    pub fn lookup(&self, ip: &str) -> &str {
        self.by_ip
            .get(ip)
            .map(|o| o.as_str())
            .unwrap_or(OWNER_NOT_AVAILABLE)
    }

    pub fn len(&self) -> usize {
        self.by_ip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ip.is_empty()
    }
}
