//! Test helper functions for integration tests
//!
//! Shared across test files using the tests/common/ pattern.

use anyhow::Result;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::sync::Once;

use uikit_core::{PackageInstaller, PackageManager, ProjectConfig};

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Create a consumer project with components.json and an optional package.json
pub fn create_test_project(project_path: &Path, dependencies: &[&str]) -> Result<()> {
    uikit_core::write_config(project_path, &ProjectConfig::default())?;

    if !dependencies.is_empty() {
        let deps: serde_json::Map<String, serde_json::Value> = dependencies
            .iter()
            .map(|name| (name.to_string(), serde_json::json!("*")))
            .collect();
        fs::write(
            project_path.join("package.json"),
            serde_json::to_string_pretty(&serde_json::json!({ "dependencies": deps }))?,
        )?;
    }

    Ok(())
}

/// Package installer double that records calls
#[derive(Default)]
pub struct RecordingInstaller {
    pub calls: RefCell<Vec<Vec<String>>>,
}

impl PackageInstaller for RecordingInstaller {
    fn manager(&self) -> PackageManager {
        PackageManager::Npm
    }

    fn install(&self, _root: &Path, packages: &[String]) -> Result<()> {
        if !packages.is_empty() {
            self.calls.borrow_mut().push(packages.to_vec());
        }
        Ok(())
    }
}

pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
