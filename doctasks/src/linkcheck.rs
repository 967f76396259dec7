//! Link checking of the built documentation.
//!
//! The builder's own `linkcheck` mode is not used because one of the
//! documentation extensions breaks it. A helper script crawls the links
//! instead and leaves its logs under `<build>/linkcheck/`.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use xshell::{cmd, Shell};

use crate::config::Config;
use crate::environment::{quiet_println, run_step};

/// Plain-text log the helper script writes.
const OUTPUT_LOG: &str = "output.txt";

/// Machine readable report, one JSON object per line.
const OUTPUT_JSON: &str = "output.json";

/// One line of the JSON link report.
#[derive(Debug, Deserialize)]
struct LinkReport {
    filename: String,
    #[serde(default)]
    lineno: Option<u64>,
    status: String,
    uri: String,
    #[serde(default)]
    info: String,
}

/// Run the link-check helper script.
///
/// The script gets no arguments; `BUILDDIR` and `SOURCEDIR` are exported so it
/// can find the docs. The trailer only points at the log. Whether links are
/// broken is up to the script's exit status and output.
pub fn run(
    sh: &Shell,
    config: &Config,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let script = sh.current_dir().join(&config.linkcheck_script);
    let linkcheck_dir = config.linkcheck_dir();
    let report = sh.current_dir().join(&linkcheck_dir).join(OUTPUT_JSON);

    // Only summarize a report written by this run.
    sh.remove_path(&report)?;

    run_step(
        cmd!(sh, "{script}")
            .env("BUILDDIR", &config.build_dir)
            .env("SOURCEDIR", &config.source_dir),
    )?;

    writeln!(
        out,
        "Link check complete; look for any errors in the above output or in {}.",
        linkcheck_dir.join(OUTPUT_LOG).display()
    )?;

    if report.exists() {
        summarize_report(&report, out)?;
    }

    Ok(())
}

/// Print the broken entries of a JSON link report.
fn summarize_report(path: &Path, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let mut broken = Vec::new();

    for line in contents.lines().filter(|line| !line.trim().is_empty()) {
        match serde_json::from_str::<LinkReport>(line) {
            Ok(entry) if entry.status == "broken" => broken.push(entry),
            Ok(_) => {}
            Err(e) => quiet_println(&format!("Skipping unreadable report line: {}", e)),
        }
    }

    if broken.is_empty() {
        writeln!(out, "No broken links reported in {}.", path.display())?;
        return Ok(());
    }

    writeln!(out, "Found {} broken link(s):", broken.len())?;
    for entry in &broken {
        match entry.lineno {
            Some(lineno) => write!(out, "  {}:{}: {}", entry.filename, lineno, entry.uri)?,
            None => write!(out, "  {}: {}", entry.filename, entry.uri)?,
        }
        if entry.info.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, " ({})", entry.info)?;
        }
    }

    Ok(())
}
