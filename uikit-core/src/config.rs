//! Project configuration (components.json)
//!
//! The config file is an open JSON object. Whatever the consumer writes is
//! laid over [`default_config`] one level deep: a top-level key present in
//! the file replaces the default value for that key wholesale.

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file name in the project root
pub const CONFIG_FILE: &str = "components.json";

/// Built-in configuration every project starts from
pub fn default_config() -> Map<String, Value> {
    let defaults = json!({
        "style": "default",
        "tsx": true,
        "paths": {
            "components": "src/components/ui",
            "lib": "src/lib"
        },
        "aliases": {
            "ui": "@/components/ui",
            "lib": "@/lib",
            "utils": "@/lib/utils"
        }
    });

    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// A loaded or about-to-be-written project configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    values: Map<String, Value>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            values: default_config(),
        }
    }
}

impl ProjectConfig {
    /// Wrap an object without merging defaults
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Shallow-merge `overrides` over the defaults
    pub fn with_defaults(overrides: Map<String, Value>) -> Self {
        let mut values = default_config();
        for (key, value) in overrides {
            values.insert(key, value);
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Directory that `components/*` registry files are copied into
    pub fn components_dir(&self) -> PathBuf {
        PathBuf::from(self.path_setting("components"))
    }

    /// Directory that `lib/*` registry files are copied into
    pub fn lib_dir(&self) -> PathBuf {
        PathBuf::from(self.path_setting("lib"))
    }

    /// Import aliases the consumer has configured
    ///
    /// Entries that are not strings are ignored.
    pub fn aliases(&self) -> BTreeMap<String, String> {
        string_map(self.values.get("aliases"))
    }

    /// A `paths.<key>` value, falling back to the built-in default when the
    /// consumer's `paths` object omits it.
    fn path_setting(&self, key: &str) -> String {
        self.values
            .get("paths")
            .and_then(|paths| paths.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                default_config()
                    .get("paths")
                    .and_then(|paths| paths.get(key))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_default()
    }
}

/// The default alias table, used as the "from" side of alias rewriting
pub fn default_aliases() -> BTreeMap<String, String> {
    string_map(default_config().get("aliases"))
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|object| {
            object
                .iter()
                .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Path of the config file for a project root
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load the project config, merged over defaults
///
/// Returns `None` when the file is missing, unreadable, not valid JSON, or
/// not a JSON object.
pub fn load_config(root: &Path) -> Option<ProjectConfig> {
    let path = config_path(root);

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("No usable config at {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(parsed)) => Some(ProjectConfig::with_defaults(parsed)),
        Ok(_) => {
            tracing::debug!("Ignoring {}: not a JSON object", path.display());
            None
        }
        Err(e) => {
            tracing::debug!("Ignoring {}: {}", path.display(), e);
            None
        }
    }
}

/// Write the project config, replacing any existing file
pub fn write_config(root: &Path, config: &ProjectConfig) -> Result<()> {
    let path = config_path(root);

    let mut content =
        serde_json::to_string_pretty(config.as_map()).context("Failed to serialize config")?;
    content.push('\n');

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;

    tracing::debug!("Wrote config to {}", path.display());
    Ok(())
}
