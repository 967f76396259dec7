//! Spell checking with the builder's spelling output mode.

use std::io::Write;

use xshell::{cmd, Shell};

use crate::config::Config;
use crate::environment::run_step;

/// Run the spelling builder with warnings promoted to errors.
///
/// Any misspelling fails the step. The word list ends up in
/// `<build>/spelling/output.txt`, away from the HTML output.
pub fn run(
    sh: &Shell,
    config: &Config,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let builder = &config.builder;
    let doctrees = config.doctree_dir();
    let options = config.option_args();
    let source = &config.source_dir;
    let spelling = config.spelling_dir();

    run_step(cmd!(sh, "{builder} -b spelling -d {doctrees} {options...} -W {source} {spelling}"))?;

    writeln!(
        out,
        "Spell check finished. Misspelled words are listed in {}.",
        spelling.join("output.txt").display()
    )?;
    Ok(())
}
