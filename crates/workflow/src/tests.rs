use std::{fs, path::Path};

use catalog::Record;
use insta::assert_snapshot;
use serde_json::json;
use tempfile::tempdir;
use test_case::test_case;

use super::*;
use crate::plugin::siesta::PSEUDO_FAMILY;

fn record(label: &str) -> Record {
    let path = Path::new("testfiles").join(format!("{label}.cif"));
    let contents = fs::read_to_string(path).unwrap();
    Record::new(label, cryst::cif::parse(&contents).unwrap())
}

fn families() -> PseudoFamilies {
    PseudoFamilies::new(vec![Family {
        name: PSEUDO_FAMILY.to_owned(),
        folder: "siesta-pps".into(),
        description: String::from("test potentials"),
    }])
    .relative_to(Path::new("testfiles"))
}

fn code(label: &str, input_plugin: &str) -> Code {
    Code {
        label: label.to_owned(),
        input_plugin: input_plugin.to_owned(),
        command: String::from("true"),
    }
}

fn registry() -> CodeRegistry {
    CodeRegistry::new(vec![
        code("siesta-v4.1@localhost", "siesta.siesta"),
        code("fleur@localhost", "fleur.fleur"),
        code("vasp@localhost", "vasp.vasp"),
    ])
}

#[test_case("siesta.siesta", Some(PluginKind::Siesta))]
#[test_case("siesta.base", Some(PluginKind::Siesta))]
#[test_case("fleur.fleur", Some(PluginKind::Fleur))]
#[test_case("fleur.scf", Some(PluginKind::Fleur))]
#[test_case("vasp.vasp", None)]
#[test_case("", None)]
fn selection(selector: &str, want: Option<PluginKind>) {
    assert_eq!(PluginKind::select(selector), want);
}

#[test]
fn unsupported_target() {
    let err = select("quantumespresso.pw").unwrap_err();
    assert!(err.is_unsupported_target());
    assert_snapshot!(err, @"no plugin available for `quantumespresso.pw`");
}

#[test]
fn resolve_codes() {
    let reg = registry();
    assert_eq!(reg.resolve("fleur@localhost").unwrap().label, "fleur@localhost");
    assert_eq!(
        reg.resolve("siesta-v4.1").unwrap().label,
        "siesta-v4.1@localhost"
    );
    let err = reg.resolve("castep").unwrap_err();
    assert_snapshot!(err, @"Code castep not found. Available codes: siesta-v4.1@localhost, fleur@localhost, vasp@localhost");
}

#[test]
fn ambiguous_name() {
    let reg = CodeRegistry::new(vec![
        code("siesta@a", "siesta.siesta"),
        code("siesta@b", "siesta.siesta"),
    ]);
    assert!(reg.resolve("siesta").is_err());
    assert_eq!(reg.resolve("siesta@b").unwrap().label, "siesta@b");
}

#[test]
fn family_lookup() {
    let got = families().lookup(PSEUDO_FAMILY).unwrap();
    assert_eq!(got.files, vec!["O.psf", "Ti.psf"]);
    assert_eq!(got.path, Path::new("testfiles/siesta-pps"));
}

#[test]
fn unknown_family() {
    let err = families().lookup("nc-sr-04").unwrap_err();
    assert!(matches!(err, resource::ResourceError::Unknown(_)));
}

#[test]
fn siesta_payload() {
    let rec = record("TiO2");
    let payload = plugin::siesta::Siesta
        .build(&rec, &Options::default(), &families())
        .unwrap();
    assert_eq!(
        payload.keys().collect::<Vec<_>>(),
        vec![
            "bandskpoints",
            "basis",
            "kpoints",
            "options",
            "parameters",
            "pseudo_family",
            "settings",
            "structure",
        ]
    );
    assert_eq!(payload.get("max_iterations"), None);
    assert_eq!(payload.get("pseudo_family"), Some(&json!(PSEUDO_FAMILY)));
    assert_eq!(payload.get("kpoints"), Some(&json!([4, 4, 4])));
    assert_eq!(
        payload.get("options"),
        Some(&json!({
            "resources": {"num_machines": 1, "num_mpiprocs_per_machine": 1},
            "max_wallclock_seconds": 1800,
        }))
    );
    let params = payload.get("parameters").unwrap();
    assert_eq!(params["xc-functional"], "GGA");
    assert_eq!(params["meshcutoff"], "200 Ry");
    let structure = payload.get("structure").unwrap();
    assert_eq!(structure["formula"], "O4Ti2");
    assert_eq!(structure["sites"].as_array().unwrap().len(), 6);
}

#[test]
fn siesta_missing_pseudo() {
    let rec = record("MoS2_ML");
    let err = plugin::siesta::Siesta
        .build(&rec, &Options::default(), &families())
        .unwrap_err();
    assert_snapshot!(err, @"pseudopotential family `example-siesta-pps` has no potential for Mo");
}

#[test]
fn siesta_without_family() {
    let rec = record("TiO2");
    let empty = PseudoFamilies::default();
    let err = plugin::siesta::Siesta
        .build(&rec, &Options::default(), &empty)
        .unwrap_err();
    assert!(matches!(err, BuildError::Resource(_)));
}

#[test]
fn fleur_payload() {
    let rec = record("MoS2_ML");
    let options = Options::new(KpointMesh([6, 6, 1]), 3600).resources(
        Resources {
            num_machines: 2,
            num_mpiprocs_per_machine: 4,
        },
    );
    let payload = plugin::fleur::Fleur
        .build(&rec, &options, &PseudoFamilies::default())
        .unwrap();
    assert_eq!(
        payload.get("calc_parameters"),
        Some(&json!({
            "kpt": {"tkb": 0.001, "div1": 6, "div2": 6, "div3": 1},
        }))
    );
    let wf = payload.get("wf_parameters").unwrap();
    assert_eq!(wf["walltime_sec"], 3600);
    assert_eq!(wf["fleur_runmax"], 4);
    assert_eq!(wf["resources"]["num_machines"], 2);
    assert_eq!(payload.get("structure").unwrap()["pbc"], json!([true, true, false]));
}

#[test]
fn monolayer_band_path() {
    let rec = record("MoS2_ML");
    let payload = plugin::fleur::Fleur
        .build(&rec, &Options::default(), &PseudoFamilies::default())
        .unwrap();
    let path: BandPath =
        serde_json::from_value(payload.get("bandskpoints").unwrap().clone())
            .unwrap();
    assert!(path.points.iter().all(|p| p[2] == 0.0));
    assert_eq!(path.points.len(), 101);
}

#[test]
fn run_labels() {
    let reg = registry();
    let rec = record("TiO2");
    let run = build_run(
        reg.resolve("fleur").unwrap(),
        &rec,
        &Options::default(),
        &families(),
    )
    .unwrap();
    assert_eq!(run.kind, PluginKind::Fleur);
    assert_eq!(run.workflow, "fleur.scf");
    assert_eq!(run.record, "TiO2");
    assert_snapshot!(run.label, @"fleur.scf: TiO2");
    assert_snapshot!(run.description, @"fleur.scf on TiO2 (O4Ti2) with code fleur@localhost");
}

#[test]
fn build_unsupported() {
    let reg = registry();
    let err = build_run(
        reg.resolve("vasp").unwrap(),
        &record("TiO2"),
        &Options::default(),
        &families(),
    )
    .unwrap_err();
    assert!(err.is_unsupported_target());
}

#[test]
fn build_failure_names_workflow() {
    let reg = registry();
    let err = build_run(
        reg.resolve("siesta-v4.1").unwrap(),
        &record("MoS2_ML"),
        &Options::default(),
        &families(),
    )
    .unwrap_err();
    assert_snapshot!(err, @"failed to build inputs for siesta.base");
}

#[test]
fn dispatch_dry_run() {
    let dir = tempdir().unwrap();
    let reg = registry();
    let run = build_run(
        reg.resolve("siesta-v4.1").unwrap(),
        &record("TiO2"),
        &Options::default(),
        &families(),
    )
    .unwrap();
    let runner = Local::new(dir.path(), None, "bash", true);
    let got = dispatch(&run, &runner).unwrap();
    assert_eq!(got.dir, dir.path().join("TiO2-siesta"));
    assert_eq!(got.job_id, None);
    let written: Payload = serde_json::from_str(
        &fs::read_to_string(got.dir.join(Local::PAYLOAD)).unwrap(),
    )
    .unwrap();
    assert_eq!(
        written.keys().collect::<Vec<_>>(),
        run.payload.keys().collect::<Vec<_>>()
    );
    assert_eq!(written.get("structure").unwrap()["label"], "TiO2");
    let script = fs::read_to_string(got.dir.join(Local::SCRIPT)).unwrap();
    assert_snapshot!(script, @r"
    #!/bin/sh
    true payload.json
    ");
}

#[test]
fn dispatch_submit() {
    let dir = tempdir().unwrap();
    let reg = registry();
    let run = build_run(
        reg.resolve("fleur@localhost").unwrap(),
        &record("TiO2"),
        &Options::default(),
        &families(),
    )
    .unwrap();
    let runner = Local::new(dir.path(), Some("echo 17".to_owned()), "sh", false);
    let got = dispatch(&run, &runner).unwrap();
    assert_eq!(got.job_id.as_deref(), Some("17"));
}
