//! Dependency resolution
//!
//! Two kinds of dependencies are tracked: registry dependencies (other
//! components that must be copied alongside) and package dependencies (npm
//! packages the copied sources import). Package dependencies are checked
//! against the consumer's `package.json` on every call.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::InstallError;
use crate::registry::{ComponentEntry, Registry};

/// Consumer manifest file name
pub const PACKAGE_MANIFEST: &str = "package.json";

type DependencyMap = BTreeMap<String, serde_json::Value>;

/// The parts of `package.json` this tool reads
///
/// A missing or `null` dependency map is treated as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dependencies: DependencyMap,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub dev_dependencies: DependencyMap,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<DependencyMap, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DependencyMap>::deserialize(deserializer)?.unwrap_or_default())
}

impl PackageManifest {
    /// Read `package.json` from a project root, `None` if it does not exist
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(PACKAGE_MANIFEST);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let manifest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(manifest))
    }

    /// Whether a package is declared as a dependency or dev dependency
    pub fn declares(&self, package: &str) -> bool {
        self.dependencies.contains_key(package) || self.dev_dependencies.contains_key(package)
    }
}

/// Resolve requested components and everything they depend on
///
/// Every requested name is checked for existence before any entry is
/// validated. The result lists dependencies before their dependents and
/// contains each component once.
pub fn resolve_components(
    registry: &Registry,
    names: &[String],
) -> Result<Vec<ComponentEntry>, InstallError> {
    if names.is_empty() {
        return Err(InstallError::NothingRequested);
    }

    if let Some(unknown) = names.iter().find(|name| !registry.has_component(name)) {
        return Err(InstallError::ComponentNotFound {
            name: unknown.clone(),
        });
    }

    let mut visited = HashSet::new();
    let mut resolved = Vec::new();

    for name in names {
        visit(registry, name, &mut visited, &mut resolved)?;
    }

    Ok(resolved)
}

fn visit(
    registry: &Registry,
    name: &str,
    visited: &mut HashSet<String>,
    resolved: &mut Vec<ComponentEntry>,
) -> Result<(), InstallError> {
    if !visited.insert(name.to_string()) {
        return Ok(());
    }

    if !registry.has_component(name) {
        return Err(InstallError::ComponentNotFound {
            name: name.to_string(),
        });
    }

    let entry = registry.component(name)?;

    for dependency in &entry.registry_dependencies {
        visit(registry, dependency, visited, resolved)?;
    }

    tracing::debug!("Resolved component '{}'", entry.name);
    resolved.push(entry);
    Ok(())
}

/// Package dependencies of a set of components, first-seen order, no repeats
pub fn collect_dependencies(components: &[ComponentEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    components
        .iter()
        .flat_map(|component| component.dependencies.iter())
        .filter(|dependency| seen.insert(dependency.as_str()))
        .cloned()
        .collect()
}

/// Requested packages not yet declared in the project's `package.json`
///
/// With no manifest every requested package is missing. Order follows
/// `requested`.
pub fn get_missing_deps(root: &Path, requested: &[String]) -> Result<Vec<String>> {
    let Some(manifest) = PackageManifest::load(root)? else {
        tracing::debug!("No {} in {}", PACKAGE_MANIFEST, root.display());
        return Ok(requested.to_vec());
    };

    Ok(requested
        .iter()
        .filter(|spec| !manifest.declares(package_name(spec)))
        .cloned()
        .collect())
}

/// Package name of an install spec, dropping any `@version` suffix
///
/// `@scope/pkg@^1.0` -> `@scope/pkg`, `clsx@2` -> `clsx`.
pub fn package_name(spec: &str) -> &str {
    let search_from = usize::from(spec.starts_with('@'));
    match spec[search_from..].find('@') {
        Some(index) => &spec[..search_from + index],
        None => spec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn registry(manifest: serde_json::Value) -> Registry {
        Registry::from_entries("/registry", manifest.as_object().cloned().unwrap())
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn resolved_names(components: &[ComponentEntry]) -> Vec<&str> {
        components.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_missing_deps_against_manifest() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(PACKAGE_MANIFEST),
            r#"{ "dependencies": { "a": "1.0.0" } }"#,
        )
        .unwrap();

        let missing = get_missing_deps(temp_dir.path(), &names(&["a", "b"])).unwrap();
        assert_eq!(missing, names(&["b"]));
    }

    #[test]
    fn test_missing_deps_without_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let missing = get_missing_deps(temp_dir.path(), &names(&["a", "b"])).unwrap();
        assert_eq!(missing, names(&["a", "b"]));
    }

    #[test]
    fn test_dev_dependencies_count_as_installed() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(PACKAGE_MANIFEST),
            r#"{ "devDependencies": { "clsx": "^2.0.0" }, "name": "app" }"#,
        )
        .unwrap();

        let missing =
            get_missing_deps(temp_dir.path(), &names(&["tailwind-merge", "clsx@2"])).unwrap();
        assert_eq!(missing, names(&["tailwind-merge"]));
    }

    #[test]
    fn test_null_dependency_map_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(PACKAGE_MANIFEST),
            r#"{"dependencies": null, "devDependencies": {"a": "1"}}"#,
        )
        .unwrap();

        let missing = get_missing_deps(temp_dir.path(), &names(&["a", "b"])).unwrap();
        assert_eq!(missing, names(&["b"]));
    }

    #[test]
    fn test_unparsable_manifest_is_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(PACKAGE_MANIFEST), "{").unwrap();
        assert!(get_missing_deps(temp_dir.path(), &names(&["a"])).is_err());
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("clsx"), "clsx");
        assert_eq!(package_name("clsx@2.1.0"), "clsx");
        assert_eq!(package_name("@rn-primitives/slot"), "@rn-primitives/slot");
        assert_eq!(package_name("@rn-primitives/slot@^1.1"), "@rn-primitives/slot");
        assert_eq!(package_name("@"), "@");
    }

    #[test]
    fn test_resolve_orders_dependencies_first() {
        let registry = registry(json!({
            "utils": { "files": ["lib/utils.ts"], "dependencies": ["clsx"] },
            "text": { "files": ["components/text.tsx"], "registryDependencies": ["utils"] },
            "button": {
                "files": ["components/button.tsx"],
                "dependencies": ["cva", "clsx"],
                "registryDependencies": ["utils", "text"]
            }
        }));

        let resolved = resolve_components(&registry, &names(&["button"])).unwrap();
        assert_eq!(resolved_names(&resolved), vec!["utils", "text", "button"]);
        assert_eq!(collect_dependencies(&resolved), names(&["clsx", "cva"]));
    }

    #[test]
    fn test_resolve_collapses_duplicates() {
        let registry = registry(json!({
            "utils": { "files": ["lib/utils.ts"] },
            "badge": { "files": ["components/badge.tsx"], "registryDependencies": ["utils"] },
            "switch": { "files": ["components/switch.tsx"], "registryDependencies": ["utils"] }
        }));

        let resolved =
            resolve_components(&registry, &names(&["badge", "switch", "badge"])).unwrap();
        assert_eq!(resolved_names(&resolved), vec!["utils", "badge", "switch"]);
    }

    #[test]
    fn test_resolve_tolerates_cycles() {
        let registry = registry(json!({
            "a": { "files": ["a.tsx"], "registryDependencies": ["b"] },
            "b": { "files": ["b.tsx"], "registryDependencies": ["a"] }
        }));

        let resolved = resolve_components(&registry, &names(&["a"])).unwrap();
        assert_eq!(resolved_names(&resolved), vec!["b", "a"]);
    }

    #[test]
    fn test_unknown_component_short_circuits_validation() {
        // "broken" would fail validation, but "foo" is reported first
        let registry = registry(json!({ "broken": { "files": [] } }));

        let err = resolve_components(&registry, &names(&["broken", "foo"])).unwrap_err();
        assert!(matches!(err, InstallError::ComponentNotFound { ref name } if name == "foo"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_unknown_registry_dependency() {
        let registry = registry(json!({
            "dialog": { "files": ["dialog.tsx"], "registryDependencies": ["overlay"] }
        }));

        let err = resolve_components(&registry, &names(&["dialog"])).unwrap_err();
        assert!(matches!(err, InstallError::ComponentNotFound { ref name } if name == "overlay"));
    }

    #[test]
    fn test_invalid_transitive_entry() {
        let registry = registry(json!({
            "utils": { "files": "lib/utils.ts" },
            "button": { "files": ["button.tsx"], "registryDependencies": ["utils"] }
        }));

        let err = resolve_components(&registry, &names(&["button"])).unwrap_err();
        assert!(matches!(err, InstallError::InvalidComponent(_)));
    }

    #[test]
    fn test_nothing_requested() {
        let registry = registry(json!({}));
        assert!(matches!(
            resolve_components(&registry, &[]),
            Err(InstallError::NothingRequested)
        ));
    }
}
