//! HTML documentation building tasks.

use std::io::Write;

use xshell::{cmd, Cmd, Shell};

use crate::clean;
use crate::config::Config;
use crate::environment::run_step;

/// Build the HTML pages.
pub fn run(
    sh: &Shell,
    config: &Config,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    run_step(html_cmd(sh, config, false))?;
    print_trailer(config, out)
}

/// Build the HTML pages from scratch with strict options.
///
/// Cleans the build directory first, then adds the strict flags on top of
/// the regular HTML build so broken references, internal errors and any
/// warning fail the build.
pub fn run_strict(
    sh: &Shell,
    config: &Config,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    clean::run(sh, config)?;
    run_step(html_cmd(sh, config, true))?;
    print_trailer(config, out)
}

fn html_cmd<'a>(sh: &'a Shell, config: &Config, strict: bool) -> Cmd<'a> {
    let builder = &config.builder;
    let doctrees = config.doctree_dir();
    let options = config.option_args();
    let strict_options = if strict { config.strict_option_args() } else { Vec::new() };
    let source = &config.source_dir;
    let html = config.html_dir();

    cmd!(sh, "{builder} -b html -d {doctrees} {options...} {strict_options...} {source} {html}")
}

fn print_trailer(config: &Config, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    writeln!(out, "Build finished. The HTML pages are in {}.", config.html_dir().display())?;
    Ok(())
}
