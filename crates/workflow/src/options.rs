use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::kpoints::KpointMesh;

/// The computing resources requested for a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub num_machines: usize,
    pub num_mpiprocs_per_machine: usize,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            num_machines: 1,
            num_mpiprocs_per_machine: 1,
        }
    }
}

/// Settings shared by every plugin, mostly taken from the command line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Options {
    pub resources: Resources,

    /// the wall-clock limit for the run in seconds
    pub max_wallclock_seconds: u64,

    pub kpoints: KpointMesh,
}

impl Default for Options {
    /// a 4x4x4 mesh on a single process for at most half an hour
    fn default() -> Self {
        Self {
            resources: Resources::default(),
            max_wallclock_seconds: 1800,
            kpoints: KpointMesh::default(),
        }
    }
}

impl Options {
    pub fn new(kpoints: KpointMesh, max_wallclock_seconds: u64) -> Self {
        Self {
            kpoints,
            max_wallclock_seconds,
            ..Self::default()
        }
    }

    pub fn resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    /// the scheduler options handed to the calculation itself
    pub fn calc_options(&self) -> Value {
        json!({
            "resources": self.resources,
            "max_wallclock_seconds": self.max_wallclock_seconds,
        })
    }
}
