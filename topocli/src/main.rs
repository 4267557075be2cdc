//! Command-line interface for electrical network topology analysis.
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use topolib::Config;

/// Print an error message in bold red and exit with the given code.
macro_rules! fatal_error {
    ($code:expr, $($arg:tt)*) => {{
        eprintln!("{}", format!($($arg)*).red().bold());
        std::process::exit($code)
    }};
}

mod commands;
use commands::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file. Defaults are used if omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn read_config(path: Option<&Path>) -> Config {
    match path {
        Some(path) => match Config::read_yaml_file(path) {
            Ok(config) => config,
            Err(err) => fatal_error!(1, "Cannot read config {}: {}", path.display(), err),
        },
        None => Config::default(),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = read_config(cli.config.as_deref());
    cli.command.run(&config);
}
