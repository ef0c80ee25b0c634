//! Error types shared across the install pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::registry::ValidationError;

/// The registry manifest could not be loaded
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read registry manifest: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse registry manifest: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Registry manifest must be a JSON object mapping component names to entries: {path}")]
    NotAnObject { path: PathBuf },
}

/// Failures while planning or applying a component install
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Component '{name}' not found in registry.\n\nRun 'uikit list' to see available components.")]
    ComponentNotFound { name: String },

    #[error(transparent)]
    InvalidComponent(#[from] ValidationError),

    #[error("No components requested")]
    NothingRequested,

    #[error("Component '{component}' lists '{file}', which escapes the project directory")]
    UnsafePath { component: String, file: String },
}

/// The external package manager could not complete an install
#[derive(Error, Debug)]
pub enum PackageManagerError {
    #[error("Failed to start '{program}'. Is it installed and on your PATH?")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}")]
    Failed { command: String, status: String },
}
