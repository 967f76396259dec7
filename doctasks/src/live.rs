//! Live-reloading HTML preview.

use xshell::{cmd, Shell};

use crate::config::Config;
use crate::environment::{quiet_println, run_step};

/// Serve the HTML docs, rebuilding whenever a source file changes.
///
/// Blocks until the preview server is interrupted. Its exit status is
/// passed through like any other step.
pub fn run(sh: &Shell, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let server = &config.live_server;
    let doctrees = config.doctree_dir();
    let options = config.option_args();
    let source = &config.source_dir;
    let html = config.html_dir();
    let port = config.port.to_string();

    quiet_println(&format!("Serving live preview on port {}, interrupt to stop", port));
    run_step(cmd!(
        sh,
        "{server} -b html -d {doctrees} {options...} {source} {html} --port {port}"
    ))
}
