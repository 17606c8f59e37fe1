use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// An auxiliary input referenced by name from a plugin payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub description: String,
    pub path: PathBuf,

    /// the file names making up the resource
    pub files: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("no resource named `{0}`")]
    Unknown(String),

    #[error("resource `{name}` is unavailable at `{path}`")]
    Unavailable {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolves resources by name for the plugins
pub trait ResourceLookup {
    fn lookup(&self, name: &str) -> Result<Resource, ResourceError>;
}

impl ResourceLookup for [Resource] {
    fn lookup(&self, name: &str) -> Result<Resource, ResourceError> {
        self.iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| ResourceError::Unknown(name.to_owned()))
    }
}

/// One configured pseudopotential family
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Family {
    pub name: String,

    /// the directory holding the family's potential files
    pub folder: PathBuf,

    #[serde(default)]
    pub description: String,
}

/// Pseudopotential families backed by directories of `psf` files
#[derive(Clone, Debug, Default)]
pub struct PseudoFamilies {
    families: Vec<Family>,
}

impl PseudoFamilies {
    /// the extension of the potential files in a family folder
    pub const EXT: &'static str = "psf";

    pub fn new(families: Vec<Family>) -> Self {
        Self { families }
    }

    /// resolve relative family folders against `dir`
    pub fn relative_to(mut self, dir: &Path) -> Self {
        for f in &mut self.families {
            if f.folder.is_relative() {
                f.folder = dir.join(&f.folder);
            }
        }
        self
    }
}

impl ResourceLookup for PseudoFamilies {
    fn lookup(&self, name: &str) -> Result<Resource, ResourceError> {
        let family = self
            .families
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ResourceError::Unknown(name.to_owned()))?;
        let unavailable = |source| ResourceError::Unavailable {
            name: name.to_owned(),
            path: family.folder.clone(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(&family.folder).map_err(unavailable)? {
            let path = entry.map_err(unavailable)?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == Self::EXT)
            {
                if let Some(f) = path.file_name() {
                    files.push(f.to_string_lossy().into_owned());
                }
            }
        }
        files.sort();
        log::debug!("{} files found in family {name}", files.len());
        Ok(Resource {
            name: family.name.clone(),
            description: family.description.clone(),
            path: family.folder.clone(),
            files,
        })
    }
}
