//! Rendering of a parsed configuration for the `show` command.

use tabled::settings::Style;
use tabled::{Table, Tabled};
use termtree::Tree;

use crate::document::Configuration;

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Details")]
    details: String,
}

pub fn render_table(config: &Configuration) -> String {
    let mut rows = vec![SettingRow {
        kind: "backend".to_string(),
        name: config.backend.backend_type.clone(),
        details: match &config.backend.prefix {
            Some(prefix) => format!("bucket={}, prefix={}", config.backend.bucket, prefix),
            None => format!("bucket={}", config.backend.bucket),
        },
    }];
    if let Some(required_version) = &config.required_version {
        rows.push(SettingRow {
            kind: "required_version".to_string(),
            name: "terraform".to_string(),
            details: required_version.to_string(),
        });
    }
    for req in &config.required_providers {
        rows.push(SettingRow {
            kind: "required_provider".to_string(),
            name: req.name.clone(),
            details: match &req.source {
                Some(source) => format!("{} ({})", req.constraint, source),
                None => req.constraint.to_string(),
            },
        });
    }
    for provider in &config.providers {
        rows.push(SettingRow {
            kind: "provider".to_string(),
            name: provider.name.clone(),
            details: format!("project={}, region={}", provider.project, provider.region),
        });
    }
    Table::new(rows).with(Style::modern()).to_string()
}

pub fn render_tree(config: &Configuration) -> String {
    let mut terraform = Tree::new("terraform".to_string());
    if let Some(required_version) = &config.required_version {
        terraform.push(Tree::new(format!(
            "required_version = \"{required_version}\""
        )));
    }
    let mut backend = Tree::new(format!("backend \"{}\"", config.backend.backend_type));
    backend.push(Tree::new(format!("bucket = \"{}\"", config.backend.bucket)));
    if let Some(prefix) = &config.backend.prefix {
        backend.push(Tree::new(format!("prefix = \"{prefix}\"")));
    }
    terraform.push(backend);
    if !config.required_providers.is_empty() {
        let mut required = Tree::new("required_providers".to_string());
        for req in &config.required_providers {
            required.push(Tree::new(match &req.source {
                Some(source) => format!(
                    "{} = {{ source = \"{}\", version = \"{}\" }}",
                    req.name, source, req.constraint
                ),
                None => format!("{} = \"{}\"", req.name, req.constraint),
            }));
        }
        terraform.push(required);
    }

    let mut root = Tree::new("configuration".to_string());
    root.push(terraform);
    for provider in &config.providers {
        let mut node = Tree::new(format!("provider \"{}\"", provider.name));
        node.push(Tree::new(format!("project = \"{}\"", provider.project)));
        node.push(Tree::new(format!("region = \"{}\"", provider.region)));
        root.push(node);
    }
    root.to_string()
}

pub fn render_json(config: &Configuration) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(config)
}
