use catalog::Record;
use serde::Serialize;

use crate::{
    code::Code,
    options::Options,
    payload::Payload,
    plugin::{BuildError, PluginKind},
    resource::ResourceLookup,
    runner::{RunError, RunResult, Runner},
};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Code {label} not found. Available codes: {available}")]
    UnknownCode { label: String, available: String },

    #[error("no plugin available for `{0}`")]
    UnsupportedTarget(String),

    #[error("failed to build inputs for {workflow}")]
    Build {
        workflow: &'static str,
        #[source]
        source: BuildError,
    },

    #[error(transparent)]
    Run(#[from] RunError),
}

impl DispatchError {
    /// Returns `true` if the dispatch error is [`UnsupportedTarget`].
    ///
    /// [`UnsupportedTarget`]: DispatchError::UnsupportedTarget
    #[must_use]
    pub fn is_unsupported_target(&self) -> bool {
        matches!(self, Self::UnsupportedTarget(..))
    }
}

/// A fully assembled run, ready to hand to a [Runner]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Run {
    pub code: Code,
    pub kind: PluginKind,
    pub workflow: &'static str,

    /// the label of the record being run
    pub record: String,

    pub label: String,
    pub description: String,
    pub payload: Payload,
}

/// choose the plugin for `selector`, see [PluginKind::select]
pub fn select(selector: &str) -> Result<PluginKind, DispatchError> {
    PluginKind::select(selector)
        .ok_or_else(|| DispatchError::UnsupportedTarget(selector.to_owned()))
}

/// Build the [Run] of `record` on `code`, choosing the plugin from the code's
/// input plugin name
pub fn build_run(
    code: &Code,
    record: &Record,
    options: &Options,
    resources: &dyn ResourceLookup,
) -> Result<Run, DispatchError> {
    let kind = select(&code.input_plugin)?;
    let plugin = kind.plugin();
    let workflow = plugin.workflow();
    log::info!("running {} with {kind} plugin {workflow}", code.label);
    let payload = plugin
        .build(record, options, resources)
        .map_err(|source| DispatchError::Build { workflow, source })?;
    let label = format!("{workflow}: {}", record.label);
    let description = format!(
        "{workflow} on {} ({}) with code {}",
        record.label,
        record.formula(),
        code.label
    );
    Ok(Run {
        code: code.clone(),
        kind,
        workflow,
        record: record.label.clone(),
        label,
        description,
        payload,
    })
}

/// hand `run` to `runner` and return whatever it reports
pub fn dispatch<R: Runner + ?Sized>(
    run: &Run,
    runner: &R,
) -> Result<RunResult, DispatchError> {
    log::info!("dispatching {}", run.label);
    Ok(runner.run(run)?)
}
