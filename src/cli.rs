mod args;

pub use args::{Cli, Command, FmtArgs, ShowArgs, ShowFormat, ValidateArgs};
