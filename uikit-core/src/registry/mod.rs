//! uikit Registry - component discovery and entry validation
//!
//! # Overview
//!
//! The registry is a directory holding a `registry.json` manifest and the
//! component sources it refers to:
//!
//! ```text
//! registry/
//!     ├── registry.json            ← name -> { files, dependencies, registryDependencies }
//!     ├── components/button.tsx    ← copied into paths.components
//!     └── lib/utils.ts             ← copied into paths.lib
//! ```
//!
//! A [`Registry`] is loaded once and passed by reference to everything that
//! needs it. Entries stay raw JSON until requested, at which point
//! [`validate_component_config`] turns them into a typed [`ComponentEntry`].

mod entry;
mod store;

pub use entry::{
    assert_valid_component_config, validate_component_config, ComponentEntry, ValidationError,
};
pub use store::{Registry, BUNDLED_REGISTRY_DIR, REGISTRY_DIR_ENV, REGISTRY_MANIFEST};
