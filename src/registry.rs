//! Resolution of version constraints against installed provider plugins.

use std::collections::BTreeMap;

use crate::document::Configuration;
use crate::error::ConfigError;
use crate::version::Version;

/// In-memory table of installed provider plugin versions.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    installed: BTreeMap<String, Vec<Version>>,
}

/// The version picked for one provider requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub name: String,
    pub version: Version,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, name: &str, version: Version) {
        let versions = self.installed.entry(name.to_string()).or_default();
        if !versions.contains(&version) {
            versions.push(version);
        }
    }

    pub fn installed_versions(&self, name: &str) -> &[Version] {
        self.installed.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Picks, for every requirement in the configuration, the newest installed
    /// version its constraint allows. Any requirement with no acceptable
    /// installed version fails the whole resolution.
    pub fn resolve(&self, config: &Configuration) -> Result<Vec<ResolvedProvider>, ConfigError> {
        let mut resolved = Vec::with_capacity(config.required_providers.len());
        for requirement in &config.required_providers {
            let available = self.installed_versions(&requirement.name);
            if available.is_empty() {
                return Err(ConfigError::Constraint(format!(
                    "no installed plugin for provider \"{}\"",
                    requirement.name
                )));
            }
            let version = requirement.constraint.select(available).ok_or_else(|| {
                ConfigError::Constraint(format!(
                    "no installed version of provider \"{}\" satisfies \"{}\" (installed: {})",
                    requirement.name,
                    requirement.constraint,
                    available
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;
            resolved.push(ResolvedProvider {
                name: requirement.name.clone(),
                version,
            });
        }
        Ok(resolved)
    }
}
