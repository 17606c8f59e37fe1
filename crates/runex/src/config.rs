//! Configuration settings for runex, read from `runex.toml`

use std::{
    fs::read_to_string,
    io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use workflow::{Code, CodeRegistry, Family, Local, PseudoFamilies, Resources};

#[cfg(test)]
mod tests;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to deserialize config file `{path}`")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to locate template file `{file}`")]
    Template {
        file: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Templates can either be literal strings in the config file, or the name of
/// a file to be loaded
#[derive(Clone, Deserialize, PartialEq, Debug)]
#[serde(untagged)]
enum TemplateSrc {
    Literal(String),
    File { file: PathBuf },
}

impl TemplateSrc {
    /// the template text, reading it from a file relative to `dir` if needed
    fn load(self, dir: &Path) -> Result<String, ConfigError> {
        match self {
            TemplateSrc::Literal(s) => Ok(s),
            TemplateSrc::File { file } => {
                let file = dir.join(file);
                read_to_string(&file)
                    .map_err(|source| ConfigError::Template { file, source })
            }
        }
    }
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawRunner {
    /// The directory the run directories are written to. Defaults to `runs`.
    dir: Option<PathBuf>,

    /// The template for the submit script. Supported formatting directives
    /// are {{.basename}} for the name of the run directory, which is useful
    /// for naming the job in the queue, and {{.filename}} for the name of the
    /// payload file. The code's command line is appended to the template.
    template: Option<TemplateSrc>,

    /// The program the submit script is passed to. Defaults to `bash`.
    submit_command: Option<String>,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    /// The name of the catalog of structures. The first time the catalog is
    /// requested it is populated from the CIF files in the directory of the
    /// same name under `structures`. Defaults to `example-structures`.
    catalog: Option<String>,

    /// The directory holding the catalog source directory. Defaults to the
    /// directory containing the config file.
    structures: Option<PathBuf>,

    /// The directory of the JSON catalog store. Defaults to `.runex`.
    store: Option<PathBuf>,

    /// The installed codes, each with a `label`, the `input_plugin` it
    /// expects, and the `command` that runs it.
    #[serde(default)]
    code: Vec<Code>,

    /// The pseudopotential families, each with a `name`, a `folder` of `psf`
    /// files, and an optional `description`.
    #[serde(default)]
    family: Vec<Family>,

    /// The resources requested for every run. Defaults to one process on one
    /// machine.
    resources: Option<Resources>,

    #[serde(default)]
    runner: RawRunner,
}

/// The full configuration, built from a `runex.toml` file by [Config::load]
#[derive(Debug, PartialEq)]
pub struct Config {
    /// the name of the catalog to load structures from
    pub catalog: String,

    /// the directory containing the catalog's source directory
    pub structures: PathBuf,

    /// the root of the catalog store
    pub store: PathBuf,

    pub codes: Vec<Code>,

    /// pseudopotential families with their folders resolved against the
    /// config file's directory
    pub families: Vec<Family>,

    pub resources: Resources,

    /// where the run directories go
    pub run_dir: PathBuf,

    /// the submit script template, if any
    pub template: Option<String>,

    pub submit_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_raw(RawConfig::default(), Path::new(""))
            .expect("the default config loads no files")
    }
}

impl Config {
    pub const DEFAULT_CATALOG: &'static str = "example-structures";

    /// load a [Config] from the TOML file `filename`. A missing file yields
    /// [Config::default]. Relative paths in the file are taken relative to
    /// the directory containing it
    pub fn load(filename: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = filename.as_ref();
        let contents = match read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("{} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        let raw: RawConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Toml {
                path: path.to_owned(),
                source,
            })?;
        Self::from_raw(raw, path.parent().unwrap_or(Path::new("")))
    }

    fn from_raw(rc: RawConfig, dir: &Path) -> Result<Self, ConfigError> {
        let rel = |p: PathBuf| if p.is_relative() { dir.join(p) } else { p };
        let template = match rc.runner.template {
            Some(t) => Some(t.load(dir)?),
            None => None,
        };
        let families = rc
            .family
            .into_iter()
            .map(|mut f| {
                f.folder = rel(f.folder);
                f
            })
            .collect();
        Ok(Self {
            catalog: rc
                .catalog
                .unwrap_or_else(|| Self::DEFAULT_CATALOG.to_owned()),
            structures: rel(rc.structures.unwrap_or_default()),
            store: rel(rc.store.unwrap_or_else(|| PathBuf::from(".runex"))),
            codes: rc.code,
            families,
            resources: rc.resources.unwrap_or_default(),
            run_dir: rel(rc.runner.dir.unwrap_or_else(|| PathBuf::from("runs"))),
            template,
            submit_command: rc
                .runner
                .submit_command
                .unwrap_or_else(|| String::from("bash")),
        })
    }

    pub fn registry(&self) -> CodeRegistry {
        CodeRegistry::new(self.codes.clone())
    }

    pub fn pseudo_families(&self) -> PseudoFamilies {
        PseudoFamilies::new(self.families.clone())
    }

    /// the [Local] runner described by the `[runner]` table
    pub fn runner(&self, no_submit: bool) -> Local {
        Local::new(
            &self.run_dir,
            self.template.clone(),
            &self.submit_command,
            no_submit,
        )
    }
}
