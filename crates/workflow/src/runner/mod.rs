use std::{io, path::PathBuf};

use serde::Serialize;

use crate::resolver::Run;

pub mod local;

/// What a [Runner] reports back about a run it accepted
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// the directory holding the run's inputs
    pub dir: PathBuf,

    /// the id reported by the submit command, if the run was submitted
    pub job_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to write `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode run inputs")]
    Encode(#[from] serde_json::Error),

    #[error("failed to submit `{script}` with `{stderr}`")]
    Submit { script: PathBuf, stderr: String },
}

/// The interface that takes an assembled [Run] and starts it
pub trait Runner {
    fn run(&self, run: &Run) -> Result<RunResult, RunError>;
}
