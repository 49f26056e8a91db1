//! Configuration schema for fieldscan.
//!
//! A configuration file lists the watched tables and their obsolete fields.
//! Without one, the built-in table for SAP Note 2267246 is used.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::registry::builtin;

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["fieldscan.yaml", ".fieldscan.yaml"];

/// Errors raised while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("compiling pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// Advisory quoted in remediation comments
    #[serde(default = "default_note")]
    pub note: String,
    #[serde(default)]
    pub tables: Vec<TableEntry>,
}

/// One watched table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableEntry {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

fn default_note() -> String {
    builtin::NOTE.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            note: default_note(),
            tables: builtin::OBSOLETE_FIELDS
                .iter()
                .map(|(table, fields)| TableEntry {
                    name: table.to_string(),
                    fields: fields.iter().map(|f| f.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl RegistryConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&content)
    }

    /// Parse a configuration from YAML text.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        let config: RegistryConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Render the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Look for a configuration file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Validate a configuration.
pub fn validate(config: &RegistryConfig) -> Result<(), ConfigError> {
    if config.tables.is_empty() {
        return Err(ConfigError::Invalid("no tables configured".to_string()));
    }

    for (i, table) in config.tables.iter().enumerate() {
        check_identifier(&table.name)
            .map_err(|e| ConfigError::Invalid(format!("tables[{}].name: {}", i, e)))?;
        for (j, field) in table.fields.iter().enumerate() {
            check_identifier(field).map_err(|e| {
                ConfigError::Invalid(format!("tables[{}].fields[{}]: {}", i, j, e))
            })?;
        }
    }

    Ok(())
}

fn check_identifier(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name is empty".to_string());
    }
    if name.chars().any(|c| c.is_whitespace() || c == '-') {
        return Err(format!("{:?} must not contain whitespace or '-'", name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_matches_builtin() {
        let config = RegistryConfig::default();
        assert_eq!(config.note, "SAP Note 2267246");
        assert_eq!(config.tables.len(), 2);
        assert_eq!(config.tables[0].name, "MARC");
        assert_eq!(config.tables[0].fields.len(), 8);
        assert_eq!(config.tables[1].name, "MARD");
        assert_eq!(config.tables[1].fields, vec!["DISKZ", "LSOBS", "LMINB", "LBSTF"]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_parse_str() {
        let config = RegistryConfig::parse_str(
            r#"
tables:
  - name: mara
    fields: [ZZOLD, zznew]
"#,
        )
        .unwrap();

        assert_eq!(config.note, "SAP Note 2267246");
        assert_eq!(config.tables[0].name, "mara");
        assert_eq!(config.tables[0].fields, vec!["ZZOLD", "zznew"]);
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let empty = RegistryConfig {
            note: "x".to_string(),
            tables: vec![],
        };
        assert!(validate(&empty).is_err());

        let hyphen = RegistryConfig::parse_str("tables:\n  - name: MARC-X\n").unwrap();
        let err = validate(&hyphen).unwrap_err().to_string();
        assert!(err.contains("tables[0].name"), "got {}", err);

        let blank_field =
            RegistryConfig::parse_str("tables:\n  - name: MARC\n    fields: ['  ']\n").unwrap();
        let err = validate(&blank_field).unwrap_err().to_string();
        assert!(err.contains("tables[0].fields[0]"), "got {}", err);
    }

    #[test]
    fn test_yaml_round_trip_and_discover() {
        let temp = TempDir::new().unwrap();
        assert!(discover(temp.path()).is_none());

        let path = temp.path().join(".fieldscan.yaml");
        std::fs::write(&path, RegistryConfig::default().to_yaml().unwrap()).unwrap();

        assert_eq!(discover(temp.path()), Some(path.clone()));
        let loaded = RegistryConfig::parse_file(&path).unwrap();
        assert_eq!(loaded.tables.len(), 2);
        assert_eq!(loaded.tables[0].fields[0], "MEGRU");
    }

    #[test]
    fn test_parse_file_missing() {
        let err = RegistryConfig::parse_file("/nonexistent/fieldscan.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
