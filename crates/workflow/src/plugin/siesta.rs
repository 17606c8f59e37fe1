use catalog::Record;
use serde_json::json;

use super::{BuildError, Plugin, common_inputs};
use crate::{
    options::Options,
    payload::Payload,
    resource::{PseudoFamilies, ResourceLookup},
};

/// the pseudopotential family the examples are run with
pub const PSEUDO_FAMILY: &str = "example-siesta-pps";

/// double-zeta polarized basis for Ti and O
const PAO_BASIS: &str = "
Ti    5      1.91
n=3    0    1   E     93.95      5.20
5.69946662616249
1.00000000000000
n=3    1    1   E     95.47      5.20
5.69941339465994
1.00000000000000
n=4    0    2   E     96.47      5.60
6.09996398975307        5.09944363262274
1.00000000000000        1.00000000000000
n=3    2    2   E     46.05      4.95
5.94327035784617        4.70009988294302
1.00000000000000        1.00000000000000
n=4    1    1   E      0.50      1.77
3.05365979938936
1.00000000000000
O     3     -0.28
n=2    0    2   E     40.58      3.95
4.95272270428712        3.60331408800389
1.00000000000000        1.00000000000000
n=2    1    2   E     36.78      4.35
4.99990228025066        3.89745395068600
1.00000000000000        1.00000000000000
n=3    2    1   E     21.69      0.93
2.73276990670788
1.00000000000000
";

/// Inputs for the SIESTA base workflow
pub struct Siesta;

impl Plugin for Siesta {
    fn workflow(&self) -> &'static str {
        "siesta.base"
    }

    fn build(
        &self,
        record: &Record,
        options: &Options,
        resources: &dyn ResourceLookup,
    ) -> Result<Payload, BuildError> {
        let family = resources.lookup(PSEUDO_FAMILY)?;
        for kind in record.structure.kinds() {
            let file = format!("{kind}.{}", PseudoFamilies::EXT);
            if !family.files.contains(&file) {
                return Err(BuildError::MissingPseudo {
                    family: family.name,
                    element: kind.to_owned(),
                });
            }
        }
        log::info!(
            "using {} potentials from family {}",
            family.files.len(),
            family.name
        );

        let mut payload = common_inputs(record, options);
        payload.insert(
            "parameters",
            json!({
                "xc-functional": "GGA",
                "xc-authors": "PBE",
                "spin-polarized": false,
                "meshcutoff": "200 Ry",
                "dm-numberpulay": 4,
                "dm-mixingweight": 0.3,
                "dm-tolerance": 1.0e-4,
                "electronic-temperature": "25 meV",
                "max-scfiterations": 10,
                "scf-must-converge": true,
                "geometry-must-converge": true,
                "Solution-method": "diagon",
                "md-maxcgsteps": 8,
                "md-maxcgdispl": "0.1 Ang",
                "md-maxforcetol": "0.02 eV/Ang",
                "writeforces": true,
                "writecoorstep": true,
                "xml:write": true,
            }),
        );
        payload.insert("settings", json!({}));
        payload.insert("basis", json!({ "%block pao-basis": PAO_BASIS }));
        payload.insert("pseudo_family", family.name);
        Ok(payload)
    }
}
