//! Remove generated output.

use xshell::Shell;

use crate::config::Config;
use crate::environment::quiet_println;

/// Remove everything under the build directory.
///
/// The directory itself is kept. An empty or missing build directory is not an error.
pub fn run(sh: &Shell, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let build_dir = &config.build_dir;

    if !sh.path_exists(build_dir) {
        quiet_println(&format!("Nothing to clean, {} does not exist", build_dir.display()));
        return Ok(());
    }

    quiet_println(&format!("Removing everything under {}", build_dir.display()));
    for entry in sh.read_dir(build_dir)? {
        sh.remove_path(&entry)?;
    }

    Ok(())
}
