//! uikit-core library exports

pub mod config;
pub mod deps;
pub mod error;
pub mod installer;
pub mod package_manager;
pub mod registry;
pub mod transform;

pub use config::{load_config, write_config, ProjectConfig, CONFIG_FILE};
pub use deps::get_missing_deps;
pub use error::{InstallError, PackageManagerError, RegistryError};
pub use installer::{InstallOptions, InstallPlan, InstallReport, Installer};
pub use package_manager::{
    detect_package_manager, get_install_hint, PackageInstaller, PackageManager, SystemInstaller,
};
pub use registry::{ComponentEntry, Registry, ValidationError};
