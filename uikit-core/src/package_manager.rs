//! Package manager detection and invocation
//!
//! The package manager that launched us (via `npx`, `pnpm dlx`, `bunx`, ...)
//! advertises itself through `npm_config_user_agent`. That hint picks one of
//! four install command forms; everything else falls back to npm.

use anyhow::Result;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;

use crate::error::PackageManagerError;

/// Environment variable carrying the package manager hint
pub const USER_AGENT_ENV: &str = "npm_config_user_agent";

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    pub const ALL: [PackageManager; 4] = [
        PackageManager::Npm,
        PackageManager::Yarn,
        PackageManager::Pnpm,
        PackageManager::Bun,
    ];

    /// Executable name
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
        }
    }

    /// Subcommand that adds packages to the project
    pub fn install_subcommand(&self) -> &'static str {
        match self {
            PackageManager::Npm => "install",
            PackageManager::Yarn | PackageManager::Pnpm | PackageManager::Bun => "add",
        }
    }

    /// Pick a package manager from a user-agent style hint
    ///
    /// `"pnpm/9.1.0 npm/? node/v20.11.0 linux x64"` -> `Pnpm`. Anything that
    /// does not start with yarn, pnpm or bun is npm.
    pub fn from_user_agent(hint: &str) -> Self {
        [PackageManager::Yarn, PackageManager::Pnpm, PackageManager::Bun]
            .into_iter()
            .find(|manager| hint.starts_with(manager.program()))
            .unwrap_or_default()
    }

    /// Arguments after the program name for installing `packages`
    pub fn install_args(&self, packages: &[String]) -> Vec<String> {
        std::iter::once(self.install_subcommand().to_string())
            .chain(packages.iter().cloned())
            .collect()
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageManager::ALL
            .into_iter()
            .find(|manager| manager.program().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown package manager '{s}' (expected npm, yarn, pnpm or bun)"))
    }
}

/// Detect the package manager from the process environment
pub fn detect_package_manager() -> PackageManager {
    let hint = std::env::var(USER_AGENT_ENV).unwrap_or_default();
    let manager = PackageManager::from_user_agent(&hint);
    tracing::debug!("Detected package manager {} from '{}'", manager, hint);
    manager
}

/// The install command line for `packages`, without running it
pub fn get_install_hint(manager: PackageManager, packages: &[String]) -> String {
    let words = std::iter::once(manager.program().to_string()).chain(manager.install_args(packages));
    shell_words::join(words)
}

/// Something that can add packages to a project
pub trait PackageInstaller {
    /// The package manager whose command form is used
    fn manager(&self) -> PackageManager;

    /// Install `packages` into the project at `root`
    ///
    /// An empty list is a no-op.
    fn install(&self, root: &Path, packages: &[String]) -> Result<()>;

    /// Human-readable command line for `packages`
    fn install_hint(&self, packages: &[String]) -> String {
        get_install_hint(self.manager(), packages)
    }
}

/// Runs the real package manager as a child process
///
/// The child inherits stdin/stdout/stderr so install progress is shown
/// live. The call blocks until the child exits.
#[derive(Debug, Clone)]
pub struct SystemInstaller {
    manager: PackageManager,
    program: String,
}

impl SystemInstaller {
    pub fn new(manager: PackageManager) -> Self {
        Self {
            manager,
            program: executable_name(manager.program()),
        }
    }

    /// Installer for whatever the environment says launched us
    pub fn detect() -> Self {
        Self::new(detect_package_manager())
    }

    /// Run a different executable with the same command form
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl PackageInstaller for SystemInstaller {
    fn manager(&self) -> PackageManager {
        self.manager
    }

    fn install(&self, root: &Path, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }

        let args = self.manager.install_args(packages);
        let command_line = shell_words::join(std::iter::once(&self.program).chain(args.iter()));

        tracing::info!("Running {} in {}", command_line, root.display());

        let status = Command::new(&self.program)
            .args(&args)
            .current_dir(root)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| PackageManagerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PackageManagerError::Failed {
                command: command_line,
                status: status.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// npm, yarn and pnpm ship as `.cmd` shims on Windows
fn executable_name(program: &str) -> String {
    if cfg!(windows) && program != "bun" {
        format!("{program}.cmd")
    } else {
        program.to_string()
    }
}
