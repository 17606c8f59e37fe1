use std::{
    fs, io,
    path::{Path, PathBuf},
};

use cryst::CifError;

use crate::{
    record::Record,
    store::{Catalog, Store, StoreError},
};

/// the description attached to every catalog created by [ensure_catalog]
pub const DESCRIPTION: &str = "Set of atomic structures used by examples for \
AiiDA plugins of different codes";

/// the extension of the source files read into a catalog
pub const SOURCE_EXT: &str = "cif";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read `{path}`")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse `{path}`")]
    Parse {
        path: PathBuf,
        #[source]
        source: CifError,
    },

    #[error("Structure {label} not found. Available structures: {available}")]
    RecordNotFound { label: String, available: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn unavailable(path: &Path) -> impl FnOnce(io::Error) -> LoadError + '_ {
    move |source| LoadError::SourceUnavailable {
        path: path.to_owned(),
        source,
    }
}

/// [ensure_catalog_in] with the source directory `name` taken relative to the
/// current directory
pub fn ensure_catalog<S: Store>(
    store: &mut S,
    name: &str,
) -> Result<Catalog, LoadError> {
    ensure_catalog_in(store, name, ".")
}

/// Return the catalog called `name` from `store`, populating it from the CIF
/// files in `root/name` the first time it is requested. Once a catalog exists
/// it is returned as stored, whatever has since changed on disk.
///
/// Every file is parsed before anything is written, and the catalog is
/// created together with its records, so a failure leaves the store
/// untouched.
pub fn ensure_catalog_in<S: Store>(
    store: &mut S,
    name: &str,
    root: impl AsRef<Path>,
) -> Result<Catalog, LoadError> {
    if let Some(catalog) = store.get(name)? {
        log::debug!(
            "found catalog `{name}` with {} records",
            catalog.records.len()
        );
        return Ok(catalog);
    }

    let dir = root.as_ref().join(name);
    let records = read_records(&dir)?;

    let catalog = match store.create_with_records(name, DESCRIPTION, records)
    {
        Ok(c) => c,
        Err(StoreError::AlreadyExists(_)) => {
            log::warn!("catalog `{name}` was created concurrently, refetching");
            return store
                .get(name)?
                .ok_or_else(|| StoreError::NotFound(name.to_owned()).into());
        }
        Err(e) => return Err(e.into()),
    };
    log::info!(
        "created catalog `{name}` with {} records from {}",
        catalog.len(),
        dir.display()
    );

    Ok(catalog)
}

/// the files with extension [SOURCE_EXT] directly inside `dir`, in
/// lexicographic order of file name
fn source_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(unavailable(dir))? {
        let path = entry.map_err(unavailable(dir))?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == SOURCE_EXT)
        {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The labels the records read from `dir` would get, without parsing the
/// files
pub fn source_labels(dir: &Path) -> Result<Vec<String>, LoadError> {
    Ok(source_files(dir)?.iter().map(|p| label(p)).collect())
}

/// Read every file with extension [SOURCE_EXT] directly inside `dir` into a
/// [Record], in lexicographic order of file name
pub fn read_records(dir: &Path) -> Result<Vec<Record>, LoadError> {
    source_files(dir)?.iter().map(|p| read_record(p)).collect()
}

fn read_record(path: &Path) -> Result<Record, LoadError> {
    let label = label(path);
    let contents = fs::read_to_string(path).map_err(unavailable(path))?;
    let structure =
        cryst::cif::parse(&contents).map_err(|source| LoadError::Parse {
            path: path.to_owned(),
            source,
        })?;
    log::info!("storing {label} in database");
    Ok(Record::new(label, structure))
}

/// Look up the record labeled `label` in `catalog`. The error lists the
/// labels that are available
pub fn find_record<'a>(
    catalog: &'a Catalog,
    label: &str,
) -> Result<&'a Record, LoadError> {
    catalog.get(label).ok_or_else(|| LoadError::RecordNotFound {
        label: label.to_owned(),
        available: catalog.labels().join(", "),
    })
}
