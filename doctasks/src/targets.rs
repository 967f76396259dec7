//! The named targets and their dispatch.

use std::fmt;
use std::io::Write;

use clap::ValueEnum;
use xshell::Shell;

use crate::config::Config;
use crate::{clean, html, linkcheck, live, spelling};

/// A named documentation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Show the list of targets.
    Help,
    /// Remove everything under the build directory.
    Clean,
    /// Build standalone HTML pages.
    Html,
    /// Clean, then build HTML with warnings as errors.
    Stricthtml,
    /// Check all external links with the helper script.
    Linkcheck,
    /// Check spelling, any misspelled word fails.
    Spellcheck,
    /// Serve HTML with live reload until interrupted.
    Livehtml,
}

impl Target {
    /// Name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Clean => "clean",
            Self::Html => "html",
            Self::Stricthtml => "stricthtml",
            Self::Linkcheck => "linkcheck",
            Self::Spellcheck => "spellcheck",
            Self::Livehtml => "livehtml",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

/// Static usage message listing every target.
pub fn usage() -> String {
    let mut usage = String::from("Usage: doctasks [OPTIONS] [TARGET]...\n\nTargets:\n");
    for value in Target::value_variants().iter().filter_map(Target::to_possible_value) {
        let help = value.get_help().map(ToString::to_string).unwrap_or_default();
        usage.push_str(&format!("  {:<12}{}\n", value.get_name(), help));
    }
    usage.push_str("\nRun `doctasks --help` for the configuration options.\n");
    usage
}

/// Run a single target.
pub fn run(
    sh: &Shell,
    config: &Config,
    target: Target,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match target {
        Target::Help => write!(out, "{}", usage())?,
        Target::Clean => clean::run(sh, config)?,
        Target::Html => html::run(sh, config, out)?,
        Target::Stricthtml => html::run_strict(sh, config, out)?,
        Target::Linkcheck => linkcheck::run(sh, config, out)?,
        Target::Spellcheck => spelling::run(sh, config, out)?,
        Target::Livehtml => live::run(sh, config)?,
    }
    Ok(())
}

/// Run targets strictly in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the failing target together with its error.
pub fn run_all(
    sh: &Shell,
    config: &Config,
    targets: &[Target],
    out: &mut impl Write,
) -> Result<(), (Target, Box<dyn std::error::Error>)> {
    for &target in targets {
        run(sh, config, target, out).map_err(|e| (target, e))?;
    }
    Ok(())
}


#[cfg(all(test, unix))]
mod sequence_tests {
    use std::fs;

    use super::*;
    use crate::environment::exit_code;
    use crate::testutil::{Workspace, BUILDER};

    #[test]
    fn test_targets_run_in_order() {
        let ws = Workspace::new();
        let stray = ws.path().join("build/stray.txt");
        fs::create_dir_all(stray.parent().unwrap()).unwrap();
        fs::write(&stray, "").unwrap();
        let mut out = Vec::new();

        run_all(&ws.sh, &ws.config, &[Target::Clean, Target::Html], &mut out).unwrap();

        assert!(!stray.exists());
        assert!(ws.path().join("build/html/index.html").exists());
        assert!(String::from_utf8(out).unwrap().starts_with("Build finished."));
    }

    #[test]
    fn test_failure_aborts_later_targets() {
        let mut ws = Workspace::new();
        ws.fail_builder(2);
        let stray = ws.path().join("build/stray.txt");
        fs::create_dir_all(stray.parent().unwrap()).unwrap();
        fs::write(&stray, "").unwrap();

        let (target, err) =
            run_all(&ws.sh, &ws.config, &[Target::Html, Target::Clean], &mut Vec::new())
                .unwrap_err();

        assert_eq!(target, Target::Html);
        assert_eq!(exit_code(err.as_ref()), 2);
        assert!(stray.exists());
        assert!(ws.tool_was_run(BUILDER));
    }
}
