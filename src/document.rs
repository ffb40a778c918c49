//! Typed configuration model: the settings surface of a document.
//!
//! [`Configuration::parse`] runs lex, parse, and validate in one pure pass;
//! it touches neither the network nor the filesystem. [`Configuration::load`]
//! is the thin file-reading wrapper the CLI uses.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, TfcheckError};
use crate::syntax::{self, Block, Body, Item, Value};
use crate::version::VersionConstraint;

/// Remote state backend selection. Exactly one per configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSpec {
    pub backend_type: String,
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// One entry of the `required_providers` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequirement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub constraint: VersionConstraint,
}

/// A `provider "<name>"` instantiation with its default parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInstance {
    pub name: String,
    pub project: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub backend: BackendSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_version: Option<VersionConstraint>,
    pub required_providers: Vec<ProviderRequirement>,
    pub providers: Vec<ProviderInstance>,
}

impl Configuration {
    /// Parses and validates a settings document.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let body = syntax::parse(source)?;
        Self::from_body(&body)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TfcheckError> {
        let source = fs::read_to_string(path)?;
        Ok(Self::parse(&source)?)
    }

    fn from_body(body: &Body) -> Result<Self, ConfigError> {
        let mut backend: Option<BackendSpec> = None;
        let mut required_version: Option<VersionConstraint> = None;
        let mut required_providers: Option<Vec<ProviderRequirement>> = None;
        let mut seen_terraform = false;
        let mut providers: Vec<ProviderInstance> = Vec::new();

        for item in &body.items {
            match item {
                Item::Block(block) if block.ident == "terraform" => {
                    if seen_terraform {
                        return Err(duplicate_block("terraform"));
                    }
                    seen_terraform = true;
                    read_terraform_block(
                        block,
                        &mut backend,
                        &mut required_version,
                        &mut required_providers,
                    )?;
                }
                Item::Block(block) if block.ident == "provider" => {
                    providers.push(ProviderInstance::from_block(block)?);
                }
                Item::Block(block) => {
                    return Err(ConfigError::Validation(format!(
                        "unsupported block \"{}\"",
                        block.ident
                    )));
                }
                Item::Attribute(attr) => {
                    return Err(ConfigError::Validation(format!(
                        "unexpected top-level attribute \"{}\"",
                        attr.name
                    )));
                }
            }
        }

        let backend = backend.ok_or_else(|| {
            ConfigError::Validation(
                "missing \"backend\" block under \"terraform\"".to_string(),
            )
        })?;
        let required_providers = required_providers.unwrap_or_default();

        for (index, provider) in providers.iter().enumerate() {
            if !required_providers.iter().any(|req| req.name == provider.name) {
                return Err(ConfigError::Validation(format!(
                    "provider reference \"{}\" is not declared in required_providers",
                    provider.name
                )));
            }
            if providers[..index].iter().any(|other| other.name == provider.name) {
                return Err(ConfigError::Validation(format!(
                    "duplicate \"provider\" block for \"{}\"",
                    provider.name
                )));
            }
        }

        Ok(Self {
            backend,
            required_version,
            required_providers,
            providers,
        })
    }

    /// Serializes back to canonical document text.
    ///
    /// parse -> to_document -> parse yields an identical configuration.
    pub fn to_document(&self) -> String {
        let mut out = String::new();
        out.push_str("terraform {\n");
        if let Some(required_version) = &self.required_version {
            out.push_str(&format!(
                "  required_version = {}\n",
                quote(&required_version.to_string())
            ));
        }
        out.push_str(&format!("  backend {} {{\n", quote(&self.backend.backend_type)));
        out.push_str(&format!("    bucket = {}\n", quote(&self.backend.bucket)));
        if let Some(prefix) = &self.backend.prefix {
            out.push_str(&format!("    prefix = {}\n", quote(prefix)));
        }
        out.push_str("  }\n");
        if !self.required_providers.is_empty() {
            out.push_str("\n  required_providers {\n");
            for req in &self.required_providers {
                match &req.source {
                    Some(source) => {
                        out.push_str(&format!("    {} = {{\n", req.name));
                        out.push_str(&format!("      source  = {}\n", quote(source)));
                        out.push_str(&format!(
                            "      version = {}\n",
                            quote(&req.constraint.to_string())
                        ));
                        out.push_str("    }\n");
                    }
                    None => {
                        out.push_str(&format!(
                            "    {} = {}\n",
                            req.name,
                            quote(&req.constraint.to_string())
                        ));
                    }
                }
            }
            out.push_str("  }\n");
        }
        out.push_str("}\n");
        for provider in &self.providers {
            out.push_str(&format!("\nprovider {} {{\n", quote(&provider.name)));
            out.push_str(&format!("  project = {}\n", quote(&provider.project)));
            out.push_str(&format!("  region  = {}\n", quote(&provider.region)));
            out.push_str("}\n");
        }
        out
    }
}

fn read_terraform_block(
    block: &Block,
    backend: &mut Option<BackendSpec>,
    required_version: &mut Option<VersionConstraint>,
    required_providers: &mut Option<Vec<ProviderRequirement>>,
) -> Result<(), ConfigError> {
    if !block.labels.is_empty() {
        return Err(ConfigError::Validation(
            "\"terraform\" block takes no labels".to_string(),
        ));
    }
    for item in &block.body.items {
        match item {
            Item::Block(inner) if inner.ident == "backend" => {
                if backend.is_some() {
                    return Err(duplicate_block("backend"));
                }
                *backend = Some(BackendSpec::from_block(inner)?);
            }
            Item::Block(inner) if inner.ident == "required_providers" => {
                if required_providers.is_some() {
                    return Err(duplicate_block("required_providers"));
                }
                *required_providers = Some(read_required_providers(inner)?);
            }
            Item::Attribute(attr) if attr.name == "required_version" => {
                if required_version.is_some() {
                    return Err(duplicate_attribute("required_version"));
                }
                let raw = require_string(&attr.value, "required_version")?;
                *required_version = Some(VersionConstraint::parse(&raw)?);
            }
            Item::Block(inner) => {
                return Err(ConfigError::Validation(format!(
                    "unsupported block \"{}\" under \"terraform\"",
                    inner.ident
                )));
            }
            Item::Attribute(attr) => {
                return Err(ConfigError::Validation(format!(
                    "unsupported setting \"{}\" under \"terraform\"",
                    attr.name
                )));
            }
        }
    }
    Ok(())
}

fn read_required_providers(block: &Block) -> Result<Vec<ProviderRequirement>, ConfigError> {
    if !block.labels.is_empty() {
        return Err(ConfigError::Validation(
            "\"required_providers\" block takes no labels".to_string(),
        ));
    }
    let mut requirements: Vec<ProviderRequirement> = Vec::new();
    for item in &block.body.items {
        let Item::Attribute(attr) = item else {
            return Err(ConfigError::Validation(
                "\"required_providers\" must contain only attributes".to_string(),
            ));
        };
        if requirements.iter().any(|req| req.name == attr.name) {
            return Err(ConfigError::Validation(format!(
                "duplicate provider requirement \"{}\"",
                attr.name
            )));
        }
        requirements.push(ProviderRequirement::from_value(&attr.name, &attr.value)?);
    }
    Ok(requirements)
}

impl BackendSpec {
    fn from_block(block: &Block) -> Result<Self, ConfigError> {
        let [backend_type] = block.labels.as_slice() else {
            return Err(ConfigError::Validation(
                "\"backend\" block requires exactly one type label".to_string(),
            ));
        };
        if backend_type.as_str() != "gcs" {
            return Err(ConfigError::Validation(format!(
                "unsupported backend type \"{backend_type}\" (expected \"gcs\")"
            )));
        }
        let mut bucket: Option<String> = None;
        let mut prefix: Option<String> = None;
        for item in &block.body.items {
            let Item::Attribute(attr) = item else {
                return Err(ConfigError::Validation(
                    "\"backend\" block must contain only attributes".to_string(),
                ));
            };
            match attr.name.as_str() {
                "bucket" => {
                    if bucket.is_some() {
                        return Err(duplicate_attribute("bucket"));
                    }
                    bucket = Some(require_string(&attr.value, "bucket")?);
                }
                "prefix" => {
                    if prefix.is_some() {
                        return Err(duplicate_attribute("prefix"));
                    }
                    prefix = Some(require_string(&attr.value, "prefix")?);
                }
                other => {
                    return Err(ConfigError::Validation(format!(
                        "unsupported backend setting \"{other}\""
                    )));
                }
            }
        }
        let bucket = bucket.ok_or_else(|| {
            ConfigError::Validation("backend \"gcs\" requires a \"bucket\"".to_string())
        })?;
        Ok(Self {
            backend_type: backend_type.clone(),
            bucket,
            prefix,
        })
    }
}

impl ProviderRequirement {
    /// Accepts both the string shorthand (`google = "~> 4.48.0"`) and the
    /// object form (`google = { source = "...", version = "..." }`).
    fn from_value(name: &str, value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::String(raw) => Ok(Self {
                name: name.to_string(),
                source: None,
                constraint: VersionConstraint::parse(raw)?,
            }),
            Value::Object(entries) => {
                let mut source: Option<String> = None;
                let mut constraint: Option<VersionConstraint> = None;
                for (key, entry) in entries {
                    match key.as_str() {
                        "source" => {
                            if source.is_some() {
                                return Err(duplicate_attribute("source"));
                            }
                            source = Some(require_string(entry, "source")?);
                        }
                        "version" => {
                            if constraint.is_some() {
                                return Err(duplicate_attribute("version"));
                            }
                            let raw = require_string(entry, "version")?;
                            constraint = Some(VersionConstraint::parse(&raw)?);
                        }
                        other => {
                            return Err(ConfigError::Validation(format!(
                                "unsupported key \"{other}\" in required_providers.{name}"
                            )));
                        }
                    }
                }
                let constraint = constraint.ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "required_providers.{name} is missing \"version\""
                    ))
                })?;
                Ok(Self {
                    name: name.to_string(),
                    source,
                    constraint,
                })
            }
            _ => Err(ConfigError::Validation(format!(
                "required_providers.{name} must be a version string or an object"
            ))),
        }
    }
}

impl ProviderInstance {
    fn from_block(block: &Block) -> Result<Self, ConfigError> {
        let [name] = block.labels.as_slice() else {
            return Err(ConfigError::Validation(
                "\"provider\" block requires exactly one name label".to_string(),
            ));
        };
        let mut project: Option<String> = None;
        let mut region: Option<String> = None;
        for item in &block.body.items {
            let Item::Attribute(attr) = item else {
                return Err(ConfigError::Validation(format!(
                    "provider \"{name}\" must contain only attributes"
                )));
            };
            match attr.name.as_str() {
                "project" => {
                    if project.is_some() {
                        return Err(duplicate_attribute("project"));
                    }
                    project = Some(require_string(&attr.value, "project")?);
                }
                "region" => {
                    if region.is_some() {
                        return Err(duplicate_attribute("region"));
                    }
                    region = Some(require_string(&attr.value, "region")?);
                }
                other => {
                    return Err(ConfigError::Validation(format!(
                        "unsupported provider setting \"{other}\""
                    )));
                }
            }
        }
        let project = project.ok_or_else(|| {
            ConfigError::Validation(format!("provider \"{name}\" requires a \"project\""))
        })?;
        let region = region.ok_or_else(|| {
            ConfigError::Validation(format!("provider \"{name}\" requires a \"region\""))
        })?;
        Ok(Self {
            name: name.clone(),
            project,
            region,
        })
    }
}

fn require_string(value: &Value, field: &str) -> Result<String, ConfigError> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::String(_) => Err(ConfigError::Validation(format!(
            "\"{field}\" must be a non-empty string"
        ))),
        _ => Err(ConfigError::Validation(format!(
            "\"{field}\" must be a string"
        ))),
    }
}

fn duplicate_block(ident: &str) -> ConfigError {
    ConfigError::Validation(format!("duplicate \"{ident}\" block"))
}

fn duplicate_attribute(field: &str) -> ConfigError {
    ConfigError::Validation(format!("duplicate attribute \"{field}\""))
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
terraform {
  backend "gcs" {
    bucket = "my-state"
  }
}
"#;

    fn parse(source: &str) -> Configuration {
        Configuration::parse(source).unwrap()
    }

    fn parse_err(source: &str) -> ConfigError {
        Configuration::parse(source).unwrap_err()
    }

    #[test]
    fn test_minimal_backend_only() {
        let config = parse(MINIMAL);
        assert_eq!(config.backend.backend_type, "gcs");
        assert_eq!(config.backend.bucket, "my-state");
        assert_eq!(config.backend.prefix, None);
        assert!(config.required_providers.is_empty());
        assert!(config.providers.is_empty());
        assert!(config.required_version.is_none());
    }

    #[test]
    fn test_requirement_shorthand_and_object_are_equivalent() {
        let shorthand = parse(
            r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers {
    google = "~> 4.48.0"
  }
}
"#,
        );
        let object = parse(
            r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers {
    google = {
      version = "~> 4.48.0"
    }
  }
}
"#,
        );
        assert_eq!(shorthand, object);
        assert_eq!(shorthand.required_providers[0].name, "google");
        assert_eq!(shorthand.required_providers[0].source, None);
    }

    #[test]
    fn test_requirement_object_with_source() {
        let config = parse(
            r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers {
    google = {
      source  = "hashicorp/google"
      version = "~> 4.48.0"
    }
  }
}
"#,
        );
        let req = &config.required_providers[0];
        assert_eq!(req.source.as_deref(), Some("hashicorp/google"));
        assert_eq!(req.constraint.to_string(), "~> 4.48.0");
    }

    #[test]
    fn test_backend_prefix() {
        let config = parse(
            r#"
terraform {
  backend "gcs" {
    bucket = "b"
    prefix = "env/prod"
  }
}
"#,
        );
        assert_eq!(config.backend.prefix.as_deref(), Some("env/prod"));
    }

    #[test]
    fn test_required_version() {
        let config = parse(
            r#"
terraform {
  required_version = ">= 1.3.0"
  backend "gcs" { bucket = "b" }
}
"#,
        );
        assert_eq!(config.required_version.unwrap().to_string(), ">= 1.3.0");
    }

    #[test]
    fn test_missing_backend() {
        let err = parse_err("terraform {\n}\n");
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("backend"));
    }

    #[test]
    fn test_missing_bucket() {
        let err = parse_err("terraform {\n  backend \"gcs\" {\n  }\n}\n");
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("bucket"));
    }

    #[test]
    fn test_empty_bucket() {
        let err = parse_err("terraform {\n  backend \"gcs\" {\n    bucket = \"\"\n  }\n}\n");
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("bucket"));
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn test_unsupported_backend_type() {
        let err = parse_err("terraform {\n  backend \"s3\" {\n    bucket = \"b\"\n  }\n}\n");
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("s3"));
    }

    #[test]
    fn test_backend_without_label() {
        let err = parse_err("terraform {\n  backend {\n    bucket = \"b\"\n  }\n}\n");
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("type label"));
    }

    #[test]
    fn test_duplicate_backend_block() {
        let source = r#"
terraform {
  backend "gcs" { bucket = "a" }
  backend "gcs" { bucket = "b" }
}
"#;
        let err = parse_err(source);
        assert!(err.to_string().contains("duplicate \"backend\" block"));
    }

    #[test]
    fn test_duplicate_terraform_block() {
        let source = r#"
terraform {
  backend "gcs" { bucket = "a" }
}

terraform {
}
"#;
        let err = parse_err(source);
        assert!(err.to_string().contains("duplicate \"terraform\" block"));
    }

    #[test]
    fn test_duplicate_provider_requirement() {
        let source = r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers {
    google = "~> 4.48.0"
    google = "~> 5.0"
  }
}
"#;
        let err = parse_err(source);
        assert!(err.to_string().contains("duplicate provider requirement"));
    }

    #[test]
    fn test_bad_version_constraint_is_constraint_error() {
        let source = r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers {
    google = {
      version = "not-a-version"
    }
  }
}
"#;
        let err = parse_err(source);
        assert!(matches!(err, ConfigError::Constraint(_)));
    }

    #[test]
    fn test_requirement_missing_version() {
        let source = r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers {
    google = {
      source = "hashicorp/google"
    }
  }
}
"#;
        let err = parse_err(source);
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_provider_reference_must_be_declared() {
        let source = r#"
terraform {
  backend "gcs" { bucket = "b" }
}

provider "google" {
  project = "p"
  region  = "r"
}
"#;
        let err = parse_err(source);
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("provider reference"));
    }

    #[test]
    fn test_duplicate_provider_block() {
        let source = r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers {
    google = "~> 4.48.0"
  }
}

provider "google" {
  project = "p"
  region  = "r"
}

provider "google" {
  project = "p2"
  region  = "r2"
}
"#;
        let err = parse_err(source);
        assert!(err.to_string().contains("duplicate \"provider\" block"));
    }

    #[test]
    fn test_provider_missing_project() {
        let source = r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers {
    google = "~> 4.48.0"
  }
}

provider "google" {
  region = "europe-west3"
}
"#;
        let err = parse_err(source);
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("project"));
    }

    #[test]
    fn test_provider_empty_region() {
        let source = r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers {
    google = "~> 4.48.0"
  }
}

provider "google" {
  project = "p"
  region  = ""
}
"#;
        let err = parse_err(source);
        assert!(err.to_string().contains("region"));
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn test_unsupported_top_level_block() {
        let err = parse_err("resource \"x\" \"y\" {\n}\n");
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("unsupported block"));
    }

    #[test]
    fn test_unsupported_provider_setting() {
        let source = r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers {
    google = "~> 4.48.0"
  }
}

provider "google" {
  project = "p"
  region  = "r"
  zone    = "z"
}
"#;
        let err = parse_err(source);
        assert!(err.to_string().contains("zone"));
    }

    #[test]
    fn test_to_document_canonical_form() {
        let config = parse(
            r#"
terraform {
  backend "gcs" { bucket = "b" }
  required_providers { google = "~> 4.48.0" }
}

provider "google" {
  project = "p"
  region  = "r"
}
"#,
        );
        let expected = "terraform {\n  backend \"gcs\" {\n    bucket = \"b\"\n  }\n\n  required_providers {\n    google = \"~> 4.48.0\"\n  }\n}\n\nprovider \"google\" {\n  project = \"p\"\n  region  = \"r\"\n}\n";
        assert_eq!(config.to_document(), expected);
    }

    #[test]
    fn test_to_document_is_idempotent() {
        let config = parse(MINIMAL);
        let first = config.to_document();
        let second = parse(&first).to_document();
        assert_eq!(first, second);
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn test_json_round_trip() {
        let config = parse(
            r#"
terraform {
  required_version = ">= 1.3.0"
  backend "gcs" {
    bucket = "b"
    prefix = "env/prod"
  }
  required_providers {
    google = {
      source  = "hashicorp/google"
      version = "~> 4.48.0"
    }
  }
}

provider "google" {
  project = "p"
  region  = "r"
}
"#,
        );
        let json = serde_json::to_string(&config).unwrap();
        let back: Configuration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
