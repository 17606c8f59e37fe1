use rustc_hash::FxHashMap;

use super::{Catalog, Store, StoreError};
use crate::record::Record;

/// A [Store] that lives only as long as the process. It counts every write so
/// callers can check that a load did not touch it
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalogs: FxHashMap<String, Catalog>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// the number of successful writes made so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Store for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<Catalog>, StoreError> {
        Ok(self.catalogs.get(name).cloned())
    }

    fn create(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<Catalog, StoreError> {
        if self.catalogs.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_owned()));
        }
        let catalog = Catalog::new(name, description);
        self.catalogs.insert(name.to_owned(), catalog.clone());
        self.writes += 1;
        Ok(catalog)
    }

    fn add_records(
        &mut self,
        catalog: &mut Catalog,
        records: Vec<Record>,
    ) -> Result<(), StoreError> {
        let stored = self
            .catalogs
            .get_mut(&catalog.name)
            .ok_or_else(|| StoreError::NotFound(catalog.name.clone()))?;
        stored.extend(records)?;
        *catalog = stored.clone();
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        self.catalogs
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))?;
        self.writes += 1;
        Ok(())
    }

    fn create_with_records(
        &mut self,
        name: &str,
        description: &str,
        records: Vec<Record>,
    ) -> Result<Catalog, StoreError> {
        if self.catalogs.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_owned()));
        }
        let mut catalog = Catalog::new(name, description);
        catalog.extend(records)?;
        self.catalogs.insert(name.to_owned(), catalog.clone());
        self.writes += 1;
        Ok(catalog)
    }
}
