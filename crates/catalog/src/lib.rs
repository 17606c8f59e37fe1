//! Catalogs of example structures, seeded once from a directory of CIF files
//! and kept in a [store::Store] from then on.

pub mod loader;
pub mod record;
pub mod store;


pub use loader::{
    LoadError, ensure_catalog, ensure_catalog_in, find_record, read_records,
    source_labels,
};
pub use record::{Record, Tags};
pub use store::{Catalog, Store, StoreError};
