//! Configuration for the documentation tasks.
//!
//! Values are layered: built-in defaults, then `doctasks.toml`, then the
//! conventional make-style environment variables, then command line flags.
//! The result is resolved once at startup and only read afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use xshell::Shell;

use crate::environment::{quiet_println, CONFIG_FILE_PATH};

/// Flags which turn on nitpicky references, full tracebacks and warnings-as-errors.
const DEFAULT_STRICT_OPTIONS: &str = "-n -T -W";

/// Resolved settings shared by every target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Documentation builder executable.
    pub builder: String,
    /// Extra builder flags, space separated, passed through verbatim.
    pub options: String,
    /// Flags appended for strict builds.
    pub strict_options: String,
    /// Location of the input documents.
    pub source_dir: PathBuf,
    /// Location of the generated output.
    pub build_dir: PathBuf,
    /// Live-reload preview server executable.
    pub live_server: String,
    /// Port for the live-reload preview server.
    pub port: u16,
    /// Helper script which checks the links of the built docs.
    pub linkcheck_script: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            builder: "sphinx-build".to_owned(),
            options: String::new(),
            strict_options: DEFAULT_STRICT_OPTIONS.to_owned(),
            source_dir: PathBuf::from("src"),
            build_dir: PathBuf::from("build"),
            live_server: "sphinx-autobuild".to_owned(),
            port: 8888,
            linkcheck_script: PathBuf::from("scripts/linkcheck.sh"),
        }
    }
}

/// Command line overrides, the highest priority layer.
#[derive(Debug, Default, clap::Args)]
pub struct Overrides {
    /// Documentation builder executable [env: SPHINXBUILD].
    #[arg(long)]
    pub builder: Option<String>,
    /// Extra builder flags, space separated [env: SPHINXOPTS].
    #[arg(long = "opts", allow_hyphen_values = true)]
    pub options: Option<String>,
    /// Directory of the documentation sources [env: SOURCEDIR].
    #[arg(long)]
    pub source_dir: Option<PathBuf>,
    /// Directory for generated output [env: BUILDDIR].
    #[arg(long)]
    pub build_dir: Option<PathBuf>,
    /// Port of the live preview server [env: PORT].
    #[arg(long)]
    pub port: Option<u16>,
}

/// Layout of doctasks.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    build: BuildSection,
    live: LiveSection,
    linkcheck: LinkcheckSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
struct BuildSection {
    builder: Option<String>,
    options: Option<String>,
    strict_options: Option<String>,
    source_dir: Option<PathBuf>,
    build_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct LiveSection {
    server: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct LinkcheckSection {
    script: Option<PathBuf>,
}

impl ConfigFile {
    /// Load the configuration file.
    ///
    /// A missing file is only an error if it was named explicitly.
    fn load(path: &Path, required: bool) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            if required {
                return Err(format!("Config file not found: {}", path.display()).into());
            }
            return Ok(Self::default());
        }

        quiet_println(&format!("Using config file: {}", path.display()));
        let contents = fs::read_to_string(path)?;
        let file: Self = toml::from_str(&contents)
            .map_err(|e| format!("Invalid config file {}: {}", path.display(), e))?;
        Ok(file)
    }
}

impl Config {
    /// Resolve the configuration for a run in the shell's working directory.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Explicit config file, relative to the working directory.
    ///   Defaults to [`CONFIG_FILE_PATH`], which may be absent.
    /// * `overrides` - Command line flags.
    ///
    /// # Errors
    ///
    /// * An explicit config file doesn't exist.
    /// * The config file can't be read or parsed.
    /// * `PORT` is not a valid port number.
    pub fn resolve(
        sh: &Shell,
        config_path: Option<&Path>,
        overrides: &Overrides,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let path = sh.current_dir().join(config_path.unwrap_or(Path::new(CONFIG_FILE_PATH)));
        let file = ConfigFile::load(&path, config_path.is_some())?;
        Self::from_layers(file, |key| sh.var(key).ok(), overrides)
    }

    /// Stack the layers on top of the defaults.
    fn from_layers(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::default();
        config.apply_file(file);
        config.apply_env(env)?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        let ConfigFile { build, live, linkcheck } = file;

        if let Some(builder) = build.builder {
            self.builder = builder;
        }
        if let Some(options) = build.options {
            self.options = options;
        }
        if let Some(strict_options) = build.strict_options {
            self.strict_options = strict_options;
        }
        if let Some(source_dir) = build.source_dir {
            self.source_dir = source_dir;
        }
        if let Some(build_dir) = build.build_dir {
            self.build_dir = build_dir;
        }
        if let Some(server) = live.server {
            self.live_server = server;
        }
        if let Some(port) = live.port {
            self.port = port;
        }
        if let Some(script) = linkcheck.script {
            self.linkcheck_script = script;
        }
    }

    /// Apply the make-style variables.
    ///
    /// `SPHINXOPTS` may be set to an empty string to drop configured options,
    /// every other variable is ignored when empty.
    fn apply_env(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let non_empty = |key: &str| env(key).filter(|value| !value.is_empty());

        if let Some(builder) = non_empty("SPHINXBUILD") {
            self.builder = builder;
        }
        if let Some(options) = env("SPHINXOPTS") {
            self.options = options;
        }
        if let Some(source_dir) = non_empty("SOURCEDIR") {
            self.source_dir = PathBuf::from(source_dir);
        }
        if let Some(build_dir) = non_empty("BUILDDIR") {
            self.build_dir = PathBuf::from(build_dir);
        }
        if let Some(server) = non_empty("SPHINXAUTOBUILD") {
            self.live_server = server;
        }
        if let Some(port) = non_empty("PORT") {
            self.port =
                port.trim().parse().map_err(|_| format!("Invalid PORT value: {}", port))?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(builder) = &overrides.builder {
            self.builder.clone_from(builder);
        }
        if let Some(options) = &overrides.options {
            self.options.clone_from(options);
        }
        if let Some(source_dir) = &overrides.source_dir {
            self.source_dir.clone_from(source_dir);
        }
        if let Some(build_dir) = &overrides.build_dir {
            self.build_dir.clone_from(build_dir);
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
    }

    /// Doctree cache used by the builder for incremental rebuilds.
    pub fn doctree_dir(&self) -> PathBuf { self.build_dir.join("doctrees") }

    /// Output directory of the HTML builder.
    pub fn html_dir(&self) -> PathBuf { self.build_dir.join("html") }

    /// Output directory of the spelling builder.
    pub fn spelling_dir(&self) -> PathBuf { self.build_dir.join("spelling") }

    /// Directory the link-check helper writes its logs into.
    pub fn linkcheck_dir(&self) -> PathBuf { self.build_dir.join("linkcheck") }

    /// Extra builder flags split the way a shell would split an unquoted variable.
    pub fn option_args(&self) -> Vec<&str> { self.options.split_whitespace().collect() }

    /// Strict flags split into separate arguments.
    pub fn strict_option_args(&self) -> Vec<&str> {
        self.strict_options.split_whitespace().collect()
    }
}
