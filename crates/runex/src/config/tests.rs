use super::*;

#[test]
fn config() {
    let got = Config::load("testfiles/runex.toml").unwrap();
    let dir = Path::new("testfiles");
    let want = Config {
        catalog: String::from("example-structures"),
        structures: dir.to_owned(),
        store: dir.join(".runex"),
        codes: vec![
            Code {
                label: String::from("siesta-v4.1@localhost"),
                input_plugin: String::from("siesta.siesta"),
                command: String::from("true"),
            },
            Code {
                label: String::from("fleur@localhost"),
                input_plugin: String::from("fleur.fleur"),
                command: String::from("true"),
            },
            Code {
                label: String::from("vasp@localhost"),
                input_plugin: String::from("vasp.vasp"),
                command: String::from("vasp_std"),
            },
        ],
        families: vec![Family {
            name: String::from("example-siesta-pps"),
            folder: dir.join("siesta-files"),
            description: String::from("Ti and O potentials for the examples"),
        }],
        resources: Resources {
            num_machines: 1,
            num_mpiprocs_per_machine: 2,
        },
        run_dir: dir.join("runs"),
        template: Some(String::from(
            "#!/bin/sh
# job {{.basename}} reading {{.filename}}
echo 12345
",
        )),
        submit_command: String::from("sh"),
    };
    assert_eq!(got, want);
}

#[test]
fn template_file() {
    let got = Config::load("testfiles/template.toml").unwrap();
    assert_eq!(
        got.template.as_deref(),
        Some("#!/bin/bash\n#SBATCH --job-name={{.basename}}\n")
    );
    assert_eq!(got.submit_command, "sbatch");
    assert_eq!(got.catalog, Config::DEFAULT_CATALOG);
    assert!(got.codes.is_empty());
}

#[test]
fn missing_file() {
    let got = Config::load("testfiles/nonexistent.toml").unwrap();
    assert_eq!(got, Config::default());
    assert_eq!(got.store, Path::new(".runex"));
    assert_eq!(got.run_dir, Path::new("runs"));
    assert_eq!(got.submit_command, "bash");
    assert_eq!(got.resources, Resources::default());
}

#[test]
fn unknown_field() {
    let err = Config::load("testfiles/unknown.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
}

#[test]
fn missing_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runex.toml");
    std::fs::write(&path, "[runner]\ntemplate = { file = \"gone.sh\" }\n")
        .unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Template { .. }));
}
