use catalog::Record;
use serde_json::json;

use super::{BuildError, Plugin, common_inputs};
use crate::{options::Options, payload::Payload, resource::ResourceLookup};

/// Inputs for the FLEUR self-consistency workflow. Everything beyond the
/// k-point mesh is left to FLEUR's input generator
pub struct Fleur;

impl Plugin for Fleur {
    fn workflow(&self) -> &'static str {
        "fleur.scf"
    }

    fn build(
        &self,
        record: &Record,
        options: &Options,
        _resources: &dyn ResourceLookup,
    ) -> Result<Payload, BuildError> {
        let [div1, div2, div3] = options.kpoints.0;
        let mut payload = common_inputs(record, options);
        payload.insert(
            "wf_parameters",
            json!({
                "fleur_runmax": 4,
                "resources": options.resources,
                "walltime_sec": options.max_wallclock_seconds,
                "queue_name": "batch",
                "serial": true,
                "custom_scheduler_commands": "",
            }),
        );
        payload.insert(
            "calc_parameters",
            json!({
                "kpt": {
                    "tkb": 0.001,
                    "div1": div1,
                    "div2": div2,
                    "div3": div3,
                },
            }),
        );
        Ok(payload)
    }
}
