use std::{io, path::PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::record::Record;

pub mod json;
pub mod memory;

/// A named collection of [Record]s
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub name: String,
    pub description: String,
    pub created: Timestamp,
    pub records: Vec<Record>,
}

impl Catalog {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            created: Timestamp::now(),
            records: Vec::new(),
        }
    }

    /// the labels of all of the records, in catalog order
    pub fn labels(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.label.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.label == label)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append `records` to `self`, rejecting the whole batch if any label
    /// collides with an existing record or with another record in the batch
    pub(crate) fn extend(
        &mut self,
        records: Vec<Record>,
    ) -> Result<(), StoreError> {
        for (i, r) in records.iter().enumerate() {
            if self.get(&r.label).is_some()
                || records[..i].iter().any(|o| o.label == r.label)
            {
                return Err(StoreError::DuplicateLabel {
                    catalog: self.name.clone(),
                    label: r.label.clone(),
                });
            }
        }
        self.records.extend(records);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("catalog `{0}` already exists")]
    AlreadyExists(String),

    #[error("catalog `{0}` does not exist")]
    NotFound(String),

    #[error("invalid catalog name `{0}`")]
    InvalidName(String),

    #[error("record `{label}` already exists in catalog `{catalog}`")]
    DuplicateLabel { catalog: String, label: String },

    #[error("failed to access `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode catalog file `{path}`")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The backing store holding catalogs and their records
pub trait Store {
    /// fetch the catalog called `name`, if there is one
    fn get(&self, name: &str) -> Result<Option<Catalog>, StoreError>;

    /// Create an empty catalog called `name`. Fails with
    /// [StoreError::AlreadyExists] if the name is taken
    fn create(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<Catalog, StoreError>;

    /// Add `records` to `catalog` as a single batch: either all of them are
    /// stored or none are. `catalog` is updated to match the store on success
    fn add_records(
        &mut self,
        catalog: &mut Catalog,
        records: Vec<Record>,
    ) -> Result<(), StoreError>;

    /// Delete the catalog called `name` and all of its records
    fn remove(&mut self, name: &str) -> Result<(), StoreError>;

    /// Create the catalog called `name` already holding `records`. Nobody
    /// sees the catalog without its records: if the batch cannot be added,
    /// the new catalog is removed again and the batch's error returned.
    ///
    /// Stores that can publish a whole catalog in one write should override
    /// this so that concurrent readers never see it empty
    fn create_with_records(
        &mut self,
        name: &str,
        description: &str,
        records: Vec<Record>,
    ) -> Result<Catalog, StoreError> {
        let mut catalog = self.create(name, description)?;
        if let Err(e) = self.add_records(&mut catalog, records) {
            if let Err(r) = self.remove(name) {
                log::error!("failed to remove incomplete catalog `{name}`: {r}");
            }
            return Err(e);
        }
        Ok(catalog)
    }
}
