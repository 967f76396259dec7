//! Scratch docs trees with shell stand-ins for the external tools.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::TempDir;
use xshell::Shell;

use crate::config::Config;

pub const BUILDER: &str = "sphinx-build";
pub const LIVE_SERVER: &str = "sphinx-autobuild";
pub const LINKCHECK_SCRIPT: &str = "linkcheck.sh";

/// Records the arguments, then creates an index page in the output directory.
const BUILDER_BODY: &str = r#"last=
for arg in "$@"; do last=$arg; done
mkdir -p "$last" && echo '<html></html>' > "$last/index.html"
"#;

/// Records the exported directories and publishes `linkcheck.report` if one is staged.
const LINKCHECK_BODY: &str = r#"echo "$BUILDDIR $SOURCEDIR" > linkcheck.env
if [ -f linkcheck.report ]; then
    mkdir -p "$BUILDDIR/linkcheck" && cp linkcheck.report "$BUILDDIR/linkcheck/output.json"
fi
"#;

// Writing a script while another test forks can leave the script busy
// (ETXTBSY) when it is executed, so tests using tools run one at a time.
static TOOLS: Mutex<()> = Mutex::new(());

/// A docs tree in a temporary directory, configured to use stand-in tools.
pub struct Workspace {
    pub sh: Shell,
    pub config: Config,
    dir: TempDir,
    _lock: MutexGuard<'static, ()>,
}

impl Workspace {
    pub fn new() -> Self {
        let lock = TOOLS.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.rst"), "Welcome\n=======\n").unwrap();

        let sh = Shell::new().unwrap();
        sh.change_dir(dir.path());

        let config = Config {
            builder: write_tool(dir.path(), BUILDER, 0, BUILDER_BODY),
            live_server: write_tool(dir.path(), LIVE_SERVER, 0, ""),
            linkcheck_script: PathBuf::from(LINKCHECK_SCRIPT),
            ..Config::default()
        };
        write_tool(dir.path(), LINKCHECK_SCRIPT, 0, LINKCHECK_BODY);

        Self { sh, config, dir, _lock: lock }
    }

    pub fn path(&self) -> &Path { self.dir.path() }

    /// Make the builder exit with `code` before producing any output.
    pub fn fail_builder(&mut self, code: i32) {
        self.config.builder = write_tool(self.path(), BUILDER, code, BUILDER_BODY);
    }

    pub fn fail_live_server(&mut self, code: i32) {
        self.config.live_server = write_tool(self.path(), LIVE_SERVER, code, "");
    }

    pub fn fail_linkcheck_script(&mut self, code: i32) {
        write_tool(self.path(), LINKCHECK_SCRIPT, code, LINKCHECK_BODY);
    }

    /// Have the link-check script write `report` as its JSON output.
    pub fn linkcheck_writes_report(&self, report: &str) {
        fs::write(self.path().join("linkcheck.report"), report).unwrap();
    }

    /// Arguments of the most recent run of a tool.
    pub fn recorded_args(&self, tool: &str) -> Vec<String> {
        let contents = fs::read_to_string(self.args_file(tool)).unwrap();
        contents.lines().map(str::to_owned).collect()
    }

    pub fn tool_was_run(&self, tool: &str) -> bool { self.args_file(tool).exists() }

    fn args_file(&self, tool: &str) -> PathBuf { self.path().join(format!("{}.args", tool)) }
}

/// Write an executable stand-in that records its arguments next to itself.
fn write_tool(dir: &Path, name: &str, exit_code: i32, body: &str) -> String {
    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\n\
         : > \"$0.args\"\n\
         [ $# -eq 0 ] || printf '%s\\n' \"$@\" > \"$0.args\"\n\
         [ {exit_code} -eq 0 ] || exit {exit_code}\n\
         {body}"
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_str().unwrap().to_owned()
}
