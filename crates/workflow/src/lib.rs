//! Dispatch of catalog records to simulation plugins. A [code::Code] names the
//! input plugin it expects, [resolver::select] turns that into a
//! [plugin::PluginKind], the plugin builds a [payload::Payload], and a
//! [runner::Runner] starts the run.

pub mod code;
pub mod kpoints;
pub mod options;
pub mod payload;
pub mod plugin;
pub mod resolver;
pub mod resource;
pub mod runner;

#[cfg(test)]
mod tests;

pub use code::{Code, CodeRegistry};
pub use kpoints::{BandPath, KpointMesh};
pub use options::{Options, Resources};
pub use payload::Payload;
pub use plugin::{BuildError, Plugin, PluginKind};
pub use resolver::{DispatchError, Run, build_run, dispatch, select};
pub use resource::{Family, PseudoFamilies, Resource, ResourceLookup};
pub use runner::{RunError, RunResult, Runner, local::Local};
