//! Component commands: add, list, show

use anyhow::Result;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use uikit_core::config::{load_config, CONFIG_FILE};
use uikit_core::deps::get_missing_deps;
use uikit_core::{
    get_install_hint, InstallError, InstallOptions, InstallPlan, Installer, SystemInstaller,
};

use crate::CommandContext;

pub(crate) fn execute_add(
    ctx: &CommandContext,
    components: &[String],
    overwrite: bool,
    dry_run: bool,
    no_install: bool,
) -> Result<()> {
    let registry = ctx.registry()?;

    let Some(config) = load_config(&ctx.root) else {
        anyhow::bail!(
            "No valid {} found in {}.\n\nRun 'uikit init' first.",
            CONFIG_FILE,
            ctx.root.display()
        );
    };

    let packages = SystemInstaller::new(ctx.package_manager);
    let installer = Installer::new(&registry, &ctx.root, config, &packages);

    let plan = installer.plan(components)?;

    if dry_run {
        print_plan(&plan, ctx);
        return Ok(());
    }

    println!("Adding {}...\n", plan.component_names().join(", "));

    let report = installer.apply(
        &plan,
        InstallOptions {
            overwrite,
            skip_install: no_install,
        },
    )?;

    for path in &report.written {
        println!("  + {}", path.display());
    }
    for path in &report.skipped {
        println!("  = {} (exists, use --overwrite to replace)", path.display());
    }

    if !report.installed_packages.is_empty() {
        println!("\nInstalled {}", report.installed_packages.join(", "));
    } else if no_install && !plan.missing_dependencies.is_empty() {
        println!("\nSkipped package install. Run:");
        println!(
            "  {}",
            get_install_hint(ctx.package_manager, &plan.missing_dependencies)
        );
    }

    println!("\nDone.");
    Ok(())
}

fn print_plan(plan: &InstallPlan, ctx: &CommandContext) {
    println!("Would add {}:\n", plan.component_names().join(", "));

    for file in &plan.files {
        let marker = if ctx.root.join(&file.destination).exists() {
            "="
        } else {
            "+"
        };
        println!("  {} {}", marker, file.destination.display());
    }

    if plan.missing_dependencies.is_empty() {
        println!("\nNo packages to install.");
    } else {
        println!("\nWould run:");
        println!(
            "  {}",
            get_install_hint(ctx.package_manager, &plan.missing_dependencies)
        );
    }
}

/// Table row for registry listing
#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "Dependencies")]
    dependencies: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub(crate) fn execute_list(ctx: &CommandContext, json_output: bool) -> Result<()> {
    let registry = ctx.registry()?;

    if registry.is_empty() {
        println!("The registry has no components.");
        return Ok(());
    }

    if json_output {
        let json_results: Vec<serde_json::Value> = registry
            .component_names()
            .into_iter()
            .map(|name| match registry.component(name) {
                Ok(entry) => serde_json::json!({
                    "name": entry.name,
                    "description": entry.description,
                    "files": entry.files,
                    "dependencies": entry.dependencies,
                    "registryDependencies": entry.registry_dependencies,
                    "valid": true,
                }),
                Err(e) => serde_json::json!({
                    "name": name,
                    "valid": false,
                    "error": e.to_string(),
                }),
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    let table_rows: Vec<ComponentRow> = registry
        .component_names()
        .into_iter()
        .map(|name| match registry.component(name) {
            Ok(entry) => {
                let description = entry.description.clone().unwrap_or_default();
                let truncated = if description.chars().count() > 50 {
                    format!("{}...", description.chars().take(47).collect::<String>())
                } else {
                    description
                };

                ComponentRow {
                    name: entry.name.clone(),
                    files: entry.files.len(),
                    dependencies: entry.dependencies.join(", "),
                    description: truncated,
                }
            }
            Err(_) => ComponentRow {
                name: name.to_string(),
                files: 0,
                dependencies: String::new(),
                description: "(invalid registry entry)".to_string(),
            },
        })
        .collect();

    println!("Available components ({}):\n", table_rows.len());

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");

    Ok(())
}

pub(crate) fn execute_show(ctx: &CommandContext, name: &str, json_output: bool) -> Result<()> {
    let registry = ctx.registry()?;

    if !registry.has_component(name) {
        return Err(InstallError::ComponentNotFound {
            name: name.to_string(),
        }
        .into());
    }

    let entry = registry.component(name)?;
    let missing = get_missing_deps(&ctx.root, &entry.dependencies)?;

    if json_output {
        let output = serde_json::json!({
            "component": entry,
            "missingDependencies": missing,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", entry.name);
    if let Some(description) = &entry.description {
        println!("  {description}");
    }

    println!("\nFiles:");
    for file in &entry.files {
        println!("  {file}");
    }

    if !entry.registry_dependencies.is_empty() {
        println!("\nRequires components: {}", entry.registry_dependencies.join(", "));
    }

    if entry.dependencies.is_empty() {
        println!("\nNo package dependencies.");
    } else {
        println!("\nPackages:");
        for dependency in &entry.dependencies {
            let status = if missing.contains(dependency) {
                "missing"
            } else {
                "installed"
            };
            println!("  {dependency} ({status})");
        }
    }

    if !missing.is_empty() {
        println!(
            "\nInstall with: {}",
            get_install_hint(ctx.package_manager, &missing)
        );
    }

    Ok(())
}
