//! Component installation
//!
//! Installing is split in two phases. [`Installer::plan`] resolves and
//! validates every requested component and works out where each file goes
//! and which packages are missing, without touching the project.
//! [`Installer::apply`] then reads every source, writes the files and runs
//! the package manager. Nothing is written unless the whole plan is valid.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::config::{default_aliases, ProjectConfig};
use crate::deps::{collect_dependencies, get_missing_deps, resolve_components};
use crate::error::InstallError;
use crate::package_manager::PackageInstaller;
use crate::registry::{ComponentEntry, Registry};
use crate::transform::AliasRewriter;

/// A single file to copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCopy {
    /// Component the file belongs to
    pub component: String,
    /// Path as listed in the registry entry
    pub registry_file: String,
    /// Absolute source location inside the registry
    pub source: PathBuf,
    /// Destination relative to the project root
    pub destination: PathBuf,
}

/// Everything an install will do
#[derive(Debug, Clone, Serialize)]
pub struct InstallPlan {
    pub components: Vec<ComponentEntry>,
    pub files: Vec<FileCopy>,
    /// All package dependencies of the resolved components
    pub dependencies: Vec<String>,
    /// The subset not yet declared in package.json
    pub missing_dependencies: Vec<String>,
}

impl InstallPlan {
    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Switches for [`Installer::apply`]
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Replace files that already exist
    pub overwrite: bool,
    /// Copy files but leave packages to the user
    pub skip_install: bool,
}

/// What [`Installer::apply`] did
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub installed_packages: Vec<String>,
}

/// Copies components from a registry into a project
pub struct Installer<'a> {
    registry: &'a Registry,
    root: PathBuf,
    config: ProjectConfig,
    packages: &'a dyn PackageInstaller,
}

impl<'a> Installer<'a> {
    pub fn new(
        registry: &'a Registry,
        root: impl Into<PathBuf>,
        config: ProjectConfig,
        packages: &'a dyn PackageInstaller,
    ) -> Self {
        Self {
            registry,
            root: root.into(),
            config,
            packages,
        }
    }

    /// Resolve, validate and map the requested components
    pub fn plan(&self, names: &[String]) -> Result<InstallPlan> {
        let components = resolve_components(self.registry, names)?;

        // Components sharing a file copy it once, from the first that lists it
        let mut destinations = HashSet::new();
        let mut files = Vec::new();
        for component in &components {
            for file in &component.files {
                let destination = destination_for(component, file, &self.config)?;
                if !destinations.insert(destination.clone()) {
                    continue;
                }
                files.push(FileCopy {
                    component: component.name.clone(),
                    registry_file: file.clone(),
                    source: self.registry.source_path(file),
                    destination,
                });
            }
        }

        let dependencies = collect_dependencies(&components);
        let missing_dependencies = get_missing_deps(&self.root, &dependencies)?;

        tracing::debug!(
            "Planned {} component(s), {} file(s), {} missing package(s)",
            components.len(),
            files.len(),
            missing_dependencies.len()
        );

        Ok(InstallPlan {
            components,
            files,
            dependencies,
            missing_dependencies,
        })
    }

    /// Write the planned files and install missing packages
    pub fn apply(&self, plan: &InstallPlan, options: InstallOptions) -> Result<InstallReport> {
        let rewriter = AliasRewriter::new(&default_aliases(), &self.config.aliases())?;

        // Read everything up front so a missing source leaves the project untouched
        let mut contents = Vec::with_capacity(plan.files.len());
        for file in &plan.files {
            let source = std::fs::read_to_string(&file.source).with_context(|| {
                format!(
                    "Failed to read '{}' for component '{}'",
                    file.source.display(),
                    file.component
                )
            })?;
            contents.push(rewriter.rewrite(&source));
        }

        let mut report = InstallReport::default();

        for (file, content) in plan.files.iter().zip(contents) {
            let target = self.root.join(&file.destination);

            if target.exists() && !options.overwrite {
                tracing::warn!(
                    "Skipping {} (already exists, use --overwrite to replace)",
                    file.destination.display()
                );
                report.skipped.push(file.destination.clone());
                continue;
            }

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }

            std::fs::write(&target, content)
                .with_context(|| format!("Failed to write {}", target.display()))?;

            tracing::info!("Wrote {}", file.destination.display());
            report.written.push(file.destination.clone());
        }

        if options.skip_install || plan.missing_dependencies.is_empty() {
            return Ok(report);
        }

        self.packages
            .install(&self.root, &plan.missing_dependencies)
            .with_context(|| {
                format!(
                    "Failed to install dependencies ({})",
                    self.packages.install_hint(&plan.missing_dependencies)
                )
            })?;
        report.installed_packages = plan.missing_dependencies.clone();

        Ok(report)
    }
}

/// Where a registry file lands, relative to the project root
///
/// `components/*` goes under `paths.components`, `lib/*` under `paths.lib`,
/// anything else keeps its registry-relative path.
pub fn destination_for(
    component: &ComponentEntry,
    file: &str,
    config: &ProjectConfig,
) -> Result<PathBuf, InstallError> {
    let mut path = PathBuf::new();
    for part in Path::new(file).components() {
        match part {
            Component::Normal(segment) => path.push(segment),
            Component::CurDir => {}
            _ => {
                return Err(InstallError::UnsafePath {
                    component: component.name.clone(),
                    file: file.to_string(),
                })
            }
        }
    }

    let destination = if let Ok(rest) = path.strip_prefix("components") {
        config.components_dir().join(rest)
    } else if let Ok(rest) = path.strip_prefix("lib") {
        config.lib_dir().join(rest)
    } else {
        path
    };

    Ok(destination)
}
