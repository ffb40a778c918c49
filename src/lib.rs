//! tfcheck - Terraform settings checker
//!
//! A library for parsing and validating the settings surface of a Terraform
//! configuration: remote state backend, provider version requirements, and
//! provider default parameters.

pub mod document;
pub mod output;
pub mod registry;
pub mod version;

mod error;
mod syntax;

pub use document::{BackendSpec, Configuration, ProviderInstance, ProviderRequirement};
pub use error::{ConfigError, TfcheckError};
pub use registry::{PluginRegistry, ResolvedProvider};
pub use version::{Version, VersionConstraint};
