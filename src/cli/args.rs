use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and validate a settings document
    Validate(ValidateArgs),
    /// Render a parsed configuration
    Show(ShowArgs),
    /// Print (or rewrite) the document in canonical form
    Fmt(FmtArgs),
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    pub file: PathBuf,

    /// Installed provider plugins, as NAME=VERSION pairs. When given,
    /// every version constraint is resolved against this set.
    #[arg(long = "plugin", value_name = "NAME=VERSION")]
    pub plugins: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    pub file: PathBuf,

    #[arg(long, value_enum, default_value_t = ShowFormat::Table)]
    pub format: ShowFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum ShowFormat {
    Table,
    Tree,
    Json,
}

#[derive(clap::Args, Debug)]
pub struct FmtArgs {
    pub file: PathBuf,

    /// Rewrite the file in place instead of printing to stdout
    #[arg(long)]
    pub write: bool,
}
