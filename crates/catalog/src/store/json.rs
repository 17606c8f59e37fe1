use std::{
    fs, io,
    path::{Path, PathBuf},
};

use super::{Catalog, Store, StoreError};
use crate::record::Record;

/// A [Store] keeping one JSON file per catalog in a directory. A catalog file
/// appears complete in a single step, and two processes racing to create the
/// same catalog cannot both succeed
#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_owned(),
        source,
    }
}

impl JsonStore {
    /// open the store in `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(io_err(&root))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || "-_.".contains(c));
        if !valid {
            return Err(StoreError::InvalidName(name.to_owned()));
        }
        Ok(self.root.join(format!("{name}.json")))
    }

    /// where a new catalog file is assembled before it is published. the
    /// leading dot keeps it out of the catalog namespace, and the process id
    /// keeps concurrent creators apart
    pub fn staging_path(&self, name: &str) -> PathBuf {
        self.root.join(format!(".{name}.json.{}.tmp", std::process::id()))
    }

    fn encode(catalog: &Catalog, path: &Path) -> Result<String, StoreError> {
        serde_json::to_string_pretty(catalog).map_err(|source| {
            StoreError::Corrupt {
                path: path.to_owned(),
                source,
            }
        })
    }
}

impl Store for JsonStore {
    fn get(&self, name: &str) -> Result<Option<Catalog>, StoreError> {
        let path = self.path(name)?;
        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(&path)(e)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path, source })
    }

    fn create(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<Catalog, StoreError> {
        self.create_with_records(name, description, Vec::new())
    }

    /// The updated catalog is written next to the old one and renamed over it,
    /// so readers see either the old or the new contents
    fn add_records(
        &mut self,
        catalog: &mut Catalog,
        records: Vec<Record>,
    ) -> Result<(), StoreError> {
        let path = self.path(&catalog.name)?;
        let mut stored = self
            .get(&catalog.name)?
            .ok_or_else(|| StoreError::NotFound(catalog.name.clone()))?;
        stored.extend(records)?;
        let body = Self::encode(&stored, &path)?;
        let tmp = self.staging_path(&catalog.name);
        fs::write(&tmp, body).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_err(&path))?;
        *catalog = stored;
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        let path = self.path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_owned()))
            }
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    /// The whole catalog is written to a private temporary file and then
    /// hard-linked to its final name. Linking fails if the name is taken, and
    /// readers only ever see the complete file
    fn create_with_records(
        &mut self,
        name: &str,
        description: &str,
        records: Vec<Record>,
    ) -> Result<Catalog, StoreError> {
        let path = self.path(name)?;
        let mut catalog = Catalog::new(name, description);
        catalog.extend(records)?;
        let body = Self::encode(&catalog, &path)?;
        let tmp = self.staging_path(name);
        fs::write(&tmp, body).map_err(io_err(&tmp))?;
        let linked = fs::hard_link(&tmp, &path);
        if let Err(e) = fs::remove_file(&tmp) {
            log::warn!("failed to remove {}: {e}", tmp.display());
        }
        match linked {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(name.to_owned()));
            }
            Err(e) => return Err(io_err(&path)(e)),
        }
        log::debug!(
            "created catalog file {} with {} records",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }
}
