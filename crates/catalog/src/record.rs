use cryst::Structure;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// labels containing this substring describe two-dimensional monolayers
pub const MONOLAYER_MARKER: &str = "ML";

/// Flags derived from a record's label
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    pub monolayer: bool,
}

impl Tags {
    pub fn from_label(label: &str) -> Self {
        Self {
            monolayer: label.contains(MONOLAYER_MARKER),
        }
    }

    /// The periodicity implied by the tags. The surface normal of a monolayer
    /// lies along the third lattice vector, so it does not repeat there
    pub fn pbc(&self) -> [bool; 3] {
        if self.monolayer {
            [true, true, false]
        } else {
            [true, true, true]
        }
    }
}

/// One structure in a [crate::Catalog]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// permanent identity, assigned when the record is first built
    pub uuid: Uuid,

    /// the stem of the file the structure was read from, unique within its
    /// catalog
    pub label: String,

    pub structure: Structure,

    pub tags: Tags,
}

impl Record {
    /// Build a record for `structure`, deriving its [Tags] from `label` and
    /// applying their periodicity to the structure
    pub fn new(label: impl Into<String>, mut structure: Structure) -> Self {
        let label = label.into();
        let tags = Tags::from_label(&label);
        structure.set_pbc(tags.pbc());
        Self {
            uuid: Uuid::now_v7(),
            label,
            structure,
            tags,
        }
    }

    pub fn formula(&self) -> String {
        self.structure.formula()
    }
}
