//! Registry of obsolete table fields.
//!
//! Maps each watched table to its ordered list of obsolete fields and keeps
//! the flat set of all obsolete field names for lookups without table
//! context. Names are stored upper-cased; every lookup upper-cases its input.
//! The registry has no mutation API once built.

pub mod builtin;

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::config::{self, ConfigError, RegistryConfig};

static BUILTIN: Lazy<Registry> = Lazy::new(|| {
    Registry::from_entries(
        builtin::NOTE,
        builtin::OBSOLETE_FIELDS
            .iter()
            .map(|(table, fields)| (*table, fields.iter().copied())),
    )
});

/// A watched table and its obsolete fields.
#[derive(Debug, Clone)]
struct WatchedTable {
    name: String,
    fields: Vec<String>,
}

/// Immutable table -> obsolete fields lookup.
#[derive(Debug, Clone)]
pub struct Registry {
    note: String,
    tables: Vec<WatchedTable>,
    index: HashMap<String, usize>,
    field_names: HashSet<String>,
}

impl Registry {
    /// The built-in registry for SAP Note 2267246.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Build a registry from a validated configuration.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        config::validate(config)?;
        Ok(Self::from_entries(
            &config.note,
            config
                .tables
                .iter()
                .map(|t| (t.name.as_str(), t.fields.iter().map(String::as_str))),
        ))
    }

    /// Duplicate tables are merged and duplicate fields dropped, keeping
    /// first-seen order.
    fn from_entries<'a, T, F>(note: &str, entries: T) -> Self
    where
        T: IntoIterator<Item = (&'a str, F)>,
        F: IntoIterator<Item = &'a str>,
    {
        let mut tables: Vec<WatchedTable> = Vec::new();
        let mut index = HashMap::new();
        let mut field_names = HashSet::new();

        for (name, fields) in entries {
            let name = name.trim().to_uppercase();
            let slot = *index.entry(name.clone()).or_insert_with(|| {
                tables.push(WatchedTable {
                    name,
                    fields: Vec::new(),
                });
                tables.len() - 1
            });

            let table = &mut tables[slot];
            for field in fields {
                let field = field.trim().to_uppercase();
                if !table.fields.contains(&field) {
                    field_names.insert(field.clone());
                    table.fields.push(field);
                }
            }
        }

        Self {
            note: note.to_string(),
            tables,
            index,
            field_names,
        }
    }

    /// Advisory quoted in remediation comments.
    pub fn note(&self) -> &str {
        &self.note
    }

    /// Watched table names, in registry order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Whether the table is watched.
    pub fn is_watched(&self, table: &str) -> bool {
        self.index.contains_key(&table.to_uppercase())
    }

    /// Obsolete fields of a table, empty when the table is not watched.
    pub fn fields_for(&self, table: &str) -> &[String] {
        match self.index.get(&table.to_uppercase()) {
            Some(&i) => self.tables[i].fields.as_slice(),
            None => &[],
        }
    }

    /// Whether `field` is obsolete for `table`.
    pub fn is_obsolete(&self, table: &str, field: &str) -> bool {
        let field = field.to_uppercase();
        self.fields_for(table).iter().any(|f| *f == field)
    }

    /// Whether `field` is obsolete in any watched table.
    pub fn is_obsolete_field_name(&self, field: &str) -> bool {
        self.field_names.contains(&field.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableEntry;

    #[test]
    fn test_builtin_lookups() {
        let registry = Registry::builtin();

        assert_eq!(registry.tables().collect::<Vec<_>>(), vec!["MARC", "MARD"]);
        assert_eq!(registry.fields_for("MARC")[0], "MEGRU");
        assert_eq!(registry.fields_for("marc").len(), 8);
        assert!(registry.fields_for("MARA").is_empty());

        assert!(registry.is_obsolete("mard", "lsobs"));
        assert!(!registry.is_obsolete("MARC", "LSOBS"));
        assert!(!registry.is_obsolete("MARA", "MEGRU"));
    }

    #[test]
    fn test_flat_field_set() {
        let registry = Registry::builtin();

        assert!(registry.is_obsolete_field_name("ALTSL"));
        assert!(registry.is_obsolete_field_name("diskz"));
        assert!(!registry.is_obsolete_field_name("MATNR"));
        assert!(!registry.is_obsolete_field_name("MARC"));
    }

    #[test]
    fn test_from_config_normalizes() {
        let config = RegistryConfig {
            note: "Note 1".to_string(),
            tables: vec![
                TableEntry {
                    name: "mara".to_string(),
                    fields: vec!["zzold".to_string(), "ZZOLD".to_string()],
                },
                TableEntry {
                    name: "MARA".to_string(),
                    fields: vec!["zznew".to_string()],
                },
            ],
        };

        let registry = Registry::from_config(&config).unwrap();
        assert_eq!(registry.note(), "Note 1");
        assert_eq!(registry.tables().collect::<Vec<_>>(), vec!["MARA"]);
        assert_eq!(registry.fields_for("Mara"), ["ZZOLD", "ZZNEW"]);
        assert!(registry.is_watched("mara"));
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = RegistryConfig {
            note: String::new(),
            tables: vec![],
        };
        assert!(Registry::from_config(&config).is_err());
    }
}
