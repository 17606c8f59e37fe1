//! Periodic crystal structures and a reader for the CIF files they are stored
//! in.

pub mod cell;
pub mod cif;
pub mod element;
pub mod structure;
pub mod symop;

pub use cell::Cell;
pub use cif::CifError;
pub use structure::{Site, Structure};
