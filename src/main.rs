mod cli;
mod document;
mod error;
mod output;
mod registry;
mod syntax;
mod version;

use std::fs;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ShowFormat};
use document::Configuration;
use registry::PluginRegistry;
use version::Version;

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate(args) => {
            let config = Configuration::load(&args.file)?;
            if !args.plugins.is_empty() {
                let mut registry = PluginRegistry::new();
                for entry in &args.plugins {
                    let (name, version) = entry
                        .split_once('=')
                        .ok_or_else(|| eyre!("invalid --plugin \"{entry}\", expected NAME=VERSION"))?;
                    registry.install(name, Version::parse(version)?);
                }
                let resolved = registry.resolve(&config)?;
                for provider in &resolved {
                    println!("provider {} -> {}", provider.name, provider.version);
                }
            }
            tracing::info!(
                backend = %config.backend.backend_type,
                providers = config.required_providers.len(),
                "configuration valid"
            );
            println!("{}: ok", args.file.display());
        }
        Command::Show(args) => {
            let config = Configuration::load(&args.file)?;
            match args.format {
                ShowFormat::Table => println!("{}", output::render_table(&config)),
                ShowFormat::Tree => println!("{}", output::render_tree(&config)),
                ShowFormat::Json => println!("{}", output::render_json(&config)?),
            }
        }
        Command::Fmt(args) => {
            let config = Configuration::load(&args.file)?;
            let formatted = config.to_document();
            if args.write {
                fs::write(&args.file, &formatted)?;
                tracing::info!(file = %args.file.display(), "rewrote in canonical form");
            } else {
                print!("{formatted}");
            }
        }
    }

    Ok(())
}
