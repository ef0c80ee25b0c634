//! uikit - copy UI components and their dependencies into your project
//!
//! Entry point: argument parsing, logging setup and the `init` command.
//! Component commands live in `component_cli`.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use uikit_core::config::{config_path, load_config, write_config, ProjectConfig};
use uikit_core::registry::{Registry, REGISTRY_DIR_ENV};
use uikit_core::{detect_package_manager, PackageManager};

mod component_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "uikit",
    about = "Copy UI components and their dependencies into your project",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level (RUST_LOG takes precedence when set)
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Project directory (defaults to the current directory)
    #[clap(long, global = true)]
    cwd: Option<PathBuf>,

    /// Registry directory containing registry.json (defaults to $UIKIT_REGISTRY, then the bundled registry)
    #[clap(long, global = true)]
    registry: Option<PathBuf>,

    /// Package manager to use instead of detecting it from npm_config_user_agent
    #[clap(long, global = true, value_parser = PackageManager::from_str)]
    package_manager: Option<PackageManager>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Create components.json with the default configuration
    Init {
        /// Replace an existing components.json
        #[clap(long)]
        force: bool,
    },

    /// Add components to the project
    Add {
        /// Component names (registry dependencies are added automatically)
        #[clap(required = true)]
        components: Vec<String>,

        /// Replace files that already exist
        #[clap(long)]
        overwrite: bool,

        /// Show what would be written and installed without doing it
        #[clap(long)]
        dry_run: bool,

        /// Copy files but do not run the package manager
        #[clap(long)]
        no_install: bool,
    },

    /// List components available in the registry
    List {
        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show details for a single component
    Show {
        /// Component name
        name: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

/// Shared context every command runs with
pub(crate) struct CommandContext {
    pub root: PathBuf,
    pub registry_dir: Option<PathBuf>,
    pub package_manager: PackageManager,
}

impl CommandContext {
    /// Load the registry; a broken manifest is fatal
    pub fn registry(&self) -> Result<Registry> {
        let registry = match &self.registry_dir {
            Some(dir) => Registry::load(dir.clone()),
            None => Registry::bundled(),
        };
        registry.context("Failed to load component registry")
    }
}

/// Initialize tracing from the --log-level flag
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    let root = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    if !root.is_dir() {
        anyhow::bail!("Project directory does not exist: {}", root.display());
    }

    let ctx = CommandContext {
        root,
        registry_dir: cli
            .registry
            .or_else(|| std::env::var_os(REGISTRY_DIR_ENV).map(PathBuf::from)),
        package_manager: cli
            .package_manager
            .unwrap_or_else(detect_package_manager),
    };

    debug!(
        "Project root: {}, package manager: {}",
        ctx.root.display(),
        ctx.package_manager
    );

    match cli.command {
        Command::Init { force } => init_command(&ctx.root, force),
        Command::Add {
            components,
            overwrite,
            dry_run,
            no_install,
        } => component_cli::execute_add(&ctx, &components, overwrite, dry_run, no_install),
        Command::List { json } => component_cli::execute_list(&ctx, json),
        Command::Show { name, json } => component_cli::execute_show(&ctx, &name, json),
    }
}

fn init_command(root: &Path, force: bool) -> Result<()> {
    let path = config_path(root);

    if path.exists() && !force {
        if load_config(root).is_none() {
            anyhow::bail!(
                "{} exists but is not a valid JSON object.\nFix it or run 'uikit init --force' to replace it.",
                path.display()
            );
        }
        println!("{} already exists. Use --force to overwrite.", path.display());
        return Ok(());
    }

    write_config(root, &ProjectConfig::default())?;

    println!("Wrote {}", path.display());
    println!("\nNext: uikit add <component>   (see 'uikit list')");

    Ok(())
}
