use catalog::{Store, store::json::JsonStore};

use crate::config::Config;

pub mod config;

/// print the message to stderr and exit with status 1
#[macro_export]
macro_rules! die {
    ($($t:tt)*) => {{
        eprintln!($($t)*);
        std::process::exit(1)
    }};
}

/// The labels of the structures that can be run with `config`: the stored
/// catalog's if it has been seeded, otherwise the ones it would be seeded
/// with. Nothing is written, and anything unreadable gives an empty list
pub fn available_structures(config: &Config) -> Vec<String> {
    if config.store.is_dir() {
        let stored = JsonStore::open(&config.store)
            .and_then(|store| store.get(&config.catalog));
        if let Ok(Some(catalog)) = stored {
            return catalog.labels().into_iter().map(str::to_owned).collect();
        }
    }
    catalog::source_labels(&config.structures.join(&config.catalog))
        .unwrap_or_default()
}
