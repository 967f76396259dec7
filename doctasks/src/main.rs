mod clean;
mod config;
mod environment;
mod html;
mod linkcheck;
mod live;
mod spelling;
mod targets;
#[cfg(all(test, unix))]
mod testutil;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use config::{Config, Overrides};
use environment::change_to_directory;
use targets::Target;
use xshell::Shell;

#[derive(Parser)]
#[command(name = "doctasks")]
#[command(about = "Build, check and preview the Sphinx documentation", long_about = None)]
struct Cli {
    /// Targets to run in order, `help` when none are given.
    #[arg(value_enum)]
    targets: Vec<Target>,

    /// Run as if started in this directory.
    #[arg(short = 'C', long = "directory")]
    directory: Option<PathBuf>,

    /// Configuration file, `doctasks.toml` is used if present.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

impl Cli {
    /// True when there is nothing to do but print the usage.
    ///
    /// Help needs neither configuration nor the filesystem.
    fn is_help_only(&self) -> bool { self.targets.iter().all(|target| *target == Target::Help) }
}

fn main() {
    let cli = Cli::parse();

    if cli.is_help_only() {
        print!("{}", targets::usage());
        return;
    }

    let sh = match Shell::new() {
        Ok(sh) => sh,
        Err(e) => {
            eprintln!("Error creating shell: {}", e);
            process::exit(1);
        }
    };
    if let Some(directory) = &cli.directory {
        if let Err(e) = change_to_directory(&sh, directory) {
            eprintln!("Error changing directory: {}", e);
            process::exit(1);
        }
    }

    let config = match Config::resolve(&sh, cli.config.as_deref(), &cli.overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err((target, e)) = targets::run_all(&sh, &config, &cli.targets, &mut io::stdout()) {
        eprintln!("Error running {}: {}", target, e);
        process::exit(environment::exit_code(e.as_ref()));
    }
}
