//! Registry store
//!
//! Loads `registry.json` from a registry directory once and serves
//! read-only lookups from it. Component source files live next to the
//! manifest and are addressed by the relative paths listed in each entry.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::entry::{validate_component_config, ComponentEntry, ValidationError};
use crate::error::RegistryError;

/// Manifest file name inside a registry directory
pub const REGISTRY_MANIFEST: &str = "registry.json";

/// Registry directory shipped with this crate
pub const BUNDLED_REGISTRY_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/registry");

/// Environment variable that points the CLI at another registry directory
pub const REGISTRY_DIR_ENV: &str = "UIKIT_REGISTRY";

/// An immutable component registry
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
    entries: Map<String, Value>,
}

impl Registry {
    /// Load the registry from a directory containing `registry.json`
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let root = root.into();
        let path = root.join(REGISTRY_MANIFEST);

        let content = std::fs::read_to_string(&path).map_err(|source| RegistryError::Read {
            path: path.clone(),
            source,
        })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
                path: path.clone(),
                source,
            })?;

        let Value::Object(entries) = value else {
            return Err(RegistryError::NotAnObject { path });
        };

        tracing::debug!(
            "Loaded registry from {} ({} components)",
            path.display(),
            entries.len()
        );

        Ok(Self { root, entries })
    }

    /// Load the registry bundled with this crate
    pub fn bundled() -> Result<Self, RegistryError> {
        Self::load(BUNDLED_REGISTRY_DIR)
    }

    /// Build a registry from an in-memory manifest
    pub fn from_entries(root: impl Into<PathBuf>, entries: Map<String, Value>) -> Self {
        Self {
            root: root.into(),
            entries,
        }
    }

    /// Raw entry for a component, if the registry has one
    pub fn get_component_config(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Whether the registry knows this component
    pub fn has_component(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All component names, sorted
    pub fn component_names(&self) -> BTreeSet<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Validated entry for a component
    pub fn component(&self, name: &str) -> Result<ComponentEntry, ValidationError> {
        validate_component_config(name, self.get_component_config(name))
    }

    /// Absolute location of a file listed in an entry
    pub fn source_path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
