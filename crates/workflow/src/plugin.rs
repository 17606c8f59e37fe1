use std::fmt::Display;

use catalog::Record;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    kpoints::BandPath,
    options::Options,
    payload::Payload,
    resource::{ResourceError, ResourceLookup},
};

pub mod fleur;
pub mod siesta;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("pseudopotential family `{family}` has no potential for {element}")]
    MissingPseudo { family: String, element: String },

    #[error("unknown high-symmetry point `{0}`")]
    UnknownPoint(String),
}

/// A trait for building the inputs of one family of simulation codes
pub trait Plugin {
    /// the canonical name of the workflow the payload is meant for
    fn workflow(&self) -> &'static str;

    /// Assemble the complete set of inputs for running `record` with
    /// `options`. Auxiliary inputs are resolved by name through `resources`
    fn build(
        &self,
        record: &Record,
        options: &Options,
        resources: &dyn ResourceLookup,
    ) -> Result<Payload, BuildError>;
}

/// The closed set of supported plugins
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginKind {
    #[serde(alias = "siesta")]
    Siesta,
    #[serde(alias = "fleur")]
    Fleur,
}

/// Selector substrings and the plugins they choose, tried in order. The first
/// pattern found in a selector wins, so more specific patterns must come
/// before more general ones
pub const PLUGINS: [(&str, PluginKind); 2] = [
    ("siesta", PluginKind::Siesta),
    ("fleur", PluginKind::Fleur),
];

impl PluginKind {
    /// the first entry of [PLUGINS] whose pattern occurs in `selector`
    pub fn select(selector: &str) -> Option<Self> {
        PLUGINS
            .iter()
            .find(|(pattern, _)| selector.contains(pattern))
            .map(|(_, kind)| *kind)
    }

    pub fn plugin(self) -> &'static dyn Plugin {
        match self {
            PluginKind::Siesta => &siesta::Siesta,
            PluginKind::Fleur => &fleur::Fleur,
        }
    }
}

impl Display for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginKind::Siesta => write!(f, "siesta"),
            PluginKind::Fleur => write!(f, "fleur"),
        }
    }
}

/// The inputs shared by every plugin: the structure, the k-point mesh, the
/// band-structure path, and the scheduler options
pub(crate) fn common_inputs(record: &Record, options: &Options) -> Payload {
    let structure = &record.structure;
    let sites: Vec<_> = structure
        .sites
        .iter()
        .zip(structure.cartesian())
        .map(|(site, pos)| {
            json!({
                "symbol": site.symbol(),
                "label": site.label,
                "position": [pos.x, pos.y, pos.z],
            })
        })
        .collect();
    let mut payload = Payload::new();
    payload.insert(
        "structure",
        json!({
            "uuid": record.uuid,
            "label": record.label,
            "formula": record.formula(),
            "cell": structure.cell.rows(),
            "pbc": structure.pbc,
            "sites": sites,
        }),
    );
    payload.insert("kpoints", json!(options.kpoints));
    payload.insert("bandskpoints", json!(BandPath::standard(structure.pbc)));
    payload.insert("options", options.calc_options());
    payload
}
