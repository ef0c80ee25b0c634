//! Component entry parsing and shape validation
//!
//! Registry entries are stored as raw JSON and only turned into a typed
//! [`ComponentEntry`] when a component is actually requested. A malformed
//! entry therefore never breaks registry loading, but it always aborts an
//! install before any file is touched.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A validated registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEntry {
    /// Component name (the registry key)
    pub name: String,

    /// Source files, relative to the registry directory
    pub files: Vec<String>,

    /// npm packages this component imports
    pub dependencies: Vec<String>,

    /// Other registry components this component needs
    pub registry_dependencies: Vec<String>,

    /// Short human description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reasons a registry entry is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Component '{name}' has no registry entry")]
    Missing { name: String },

    #[error("Component '{name}' entry must be a JSON object")]
    NotAnObject { name: String },

    #[error("Component '{name}' must declare a non-empty 'files' array")]
    MissingFiles { name: String },

    #[error("Component '{name}': '{field}' must be an array of strings")]
    NotAnArray { name: String, field: &'static str },

    #[error("Component '{name}': '{field}[{index}]' must be a non-blank string")]
    BlankItem {
        name: String,
        field: &'static str,
        index: usize,
    },

    #[error("Component '{name}': 'description' must be a string")]
    InvalidDescription { name: String },
}

/// Parse a raw registry entry into a [`ComponentEntry`]
///
/// `entry` is `None` when the registry has no such key.
pub fn validate_component_config(
    name: &str,
    entry: Option<&Value>,
) -> Result<ComponentEntry, ValidationError> {
    let entry = entry.ok_or_else(|| ValidationError::Missing {
        name: name.to_string(),
    })?;

    let object = entry.as_object().ok_or_else(|| ValidationError::NotAnObject {
        name: name.to_string(),
    })?;

    let files = match object.get("files") {
        Some(Value::Array(items)) if !items.is_empty() => string_list(name, "files", items)?,
        _ => {
            return Err(ValidationError::MissingFiles {
                name: name.to_string(),
            })
        }
    };

    let dependencies = optional_string_list(name, object, "dependencies")?;
    let registry_dependencies = optional_string_list(name, object, "registryDependencies")?;

    let description = match object.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            return Err(ValidationError::InvalidDescription {
                name: name.to_string(),
            })
        }
    };

    Ok(ComponentEntry {
        name: name.to_string(),
        files,
        dependencies,
        registry_dependencies,
        description,
    })
}

/// Fail-fast check for callers that only need pass/fail
pub fn assert_valid_component_config(name: &str, entry: Option<&Value>) -> anyhow::Result<()> {
    validate_component_config(name, entry)?;
    Ok(())
}

fn optional_string_list(
    name: &str,
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, ValidationError> {
    match object.get(field) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => string_list(name, field, items),
        Some(_) => Err(ValidationError::NotAnArray {
            name: name.to_string(),
            field,
        }),
    }
}

fn string_list(
    name: &str,
    field: &'static str,
    items: &[Value],
) -> Result<Vec<String>, ValidationError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item.as_str() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(ValidationError::BlankItem {
                name: name.to_string(),
                field,
                index,
            }),
        })
        .collect()
}
