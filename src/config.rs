//! Configuration file support for vulnmerge.
//!
//! Provides YAML-based configuration through `vulnmerge.config.yml` files,
//! merged underneath command-line flags, plus the resolved `RunConfig`
//! every stage receives explicitly. No component reads global state.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::cli::Args;
use crate::error::{ReportError, Result};

const CONFIG_FILENAME: &str = "vulnmerge.config.yml";

/// Top-level configuration file schema. Every field is optional; CLI flags
/// take precedence over file values.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub scan_dir: Option<PathBuf>,
    pub inventory_dir: Option<PathBuf>,
    pub owners: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    warn_unknown_fields(&config);
    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}

/// Fully resolved run configuration, passed explicitly to every stage.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory holding the raw network-scanner exports.
    pub scan_dir: PathBuf,
    /// Directory holding the inventory snapshot exports.
    pub inventory_dir: PathBuf,
    /// Path of the IP-to-owner lookup CSV.
    pub owners_path: PathBuf,
    /// Directory all intermediates and the final report are written to.
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Merges CLI flags over config-file values and validates the result.
    /// The output directory is created when missing; input locations must
    /// already exist.
    pub fn resolve(args: &Args, file: Option<ConfigFile>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let scan_dir = require("scan-dir", args.scan_dir.clone().or(file.scan_dir))?;
        let inventory_dir = require(
            "inventory-dir",
            args.inventory_dir.clone().or(file.inventory_dir),
        )?;
        let owners_path = require("owners", args.owners.clone().or(file.owners))?;
        let output_dir = require("output-dir", args.output_dir.clone().or(file.output_dir))?;

        let config = Self {
            scan_dir,
            inventory_dir,
            owners_path,
            output_dir,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for dir in [&self.scan_dir, &self.inventory_dir] {
            if !dir.is_dir() {
                return Err(ReportError::InvalidInputDir {
                    path: dir.clone(),
                    reason: "Not a directory".to_string(),
                }
                .into());
            }
        }
        if !self.owners_path.is_file() {
            return Err(ReportError::FileReadError {
                path: self.owners_path.clone(),
                details: "Owner lookup file does not exist".to_string(),
            }
            .into());
        }
        fs::create_dir_all(&self.output_dir).map_err(|e| ReportError::FileWriteError {
            path: self.output_dir.clone(),
            details: e.to_string(),
        })?;
        Ok(())
    }
}

fn require(flag: &str, value: Option<PathBuf>) -> Result<PathBuf> {
    match value {
        Some(path) => Ok(path),
        None => bail!(
            "Missing required setting '{}'.\n\n💡 Hint: Pass --{} or set it in {}.",
            flag,
            flag,
            CONFIG_FILENAME
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args_with(dir: &Path, owners: &Path) -> Args {
        Args {
            scan_dir: Some(dir.join("scan")),
            inventory_dir: Some(dir.join("inventory")),
            owners: Some(owners.to_path_buf()),
            output_dir: Some(dir.join("out")),
            stage: crate::cli::Stage::All,
            config: None,
        }
    }

    fn fixture() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("scan")).unwrap();
        fs::create_dir(dir.path().join("inventory")).unwrap();
        let owners = dir.path().join("owners.csv");
        fs::write(&owners, "IP Address,Owner\n").unwrap();
        (dir, owners)
    }

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            "scan_dir: /data/scan\ninventory_dir: /data/inventory\nowners: /data/owners.csv\noutput_dir: /data/out\n",
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.scan_dir, Some(PathBuf::from("/data/scan")));
        assert_eq!(config.output_dir, Some(PathBuf::from("/data/out")));
        assert!(config.unknown_fields.is_empty());
    }

    #[test]
    fn test_load_config_collects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "scan_dir: /data/scan\ntypo_field: true\n").unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert!(config.unknown_fields.contains_key("typo_field"));
    }

    #[test]
    fn test_load_config_invalid_yaml_is_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "scan_dir: [unterminated\n").unwrap();

        let err = load_config_from_path(&config_path).unwrap_err();
        assert!(format!("{}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_discover_config_absent_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_resolve_cli_over_file() {
        let (dir, owners) = fixture();
        let args = args_with(dir.path(), &owners);
        let file = ConfigFile {
            scan_dir: Some(PathBuf::from("/somewhere/else")),
            ..Default::default()
        };

        let config = RunConfig::resolve(&args, Some(file)).unwrap();
        assert_eq!(config.scan_dir, dir.path().join("scan"));
    }

    #[test]
    fn test_resolve_missing_setting_is_error() {
        let (dir, owners) = fixture();
        let mut args = args_with(dir.path(), &owners);
        args.inventory_dir = None;

        let err = RunConfig::resolve(&args, None).unwrap_err();
        let display = format!("{}", err);
        assert!(display.contains("Missing required setting 'inventory-dir'"));
        assert!(display.contains("vulnmerge.config.yml"));
    }

    #[test]
    fn test_resolve_creates_output_dir() {
        let (dir, owners) = fixture();
        let args = args_with(dir.path(), &owners);
        let config = RunConfig::resolve(&args, None).unwrap();
        assert!(config.output_dir.is_dir());
    }

    #[test]
    fn test_resolve_missing_input_dir_is_error() {
        let (dir, owners) = fixture();
        let mut args = args_with(dir.path(), &owners);
        args.scan_dir = Some(dir.path().join("nope"));

        let err = RunConfig::resolve(&args, None).unwrap_err();
        assert!(format!("{}", err).contains("Input directory not found"));
    }
}
