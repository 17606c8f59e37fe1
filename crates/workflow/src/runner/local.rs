use std::{
    fmt::Write,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use serde_json::json;

use super::{RunError, RunResult, Runner};
use crate::resolver::Run;

/// Runs each [Run] from its own directory on the local machine
#[derive(Debug)]
pub struct Local {
    /// the directory the run directories are created in
    pub dir: PathBuf,

    /// optional header for the submit script. `{{.basename}}` is replaced
    /// with the name of the run directory and `{{.filename}}` with the name of
    /// the payload file
    pub template: Option<String>,

    /// the program the submit script is passed to
    pub submit_command: String,

    /// write the run directory but don't submit it
    pub no_submit: bool,
}

impl Default for Local {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            template: None,
            submit_command: String::from("bash"),
            no_submit: false,
        }
    }
}

impl Local {
    pub const SCRIPT: &'static str = "run.sh";
    pub const PAYLOAD: &'static str = "payload.json";
    pub const RUN_INFO: &'static str = "run.json";

    pub fn new(
        dir: impl Into<PathBuf>,
        template: Option<String>,
        submit_command: impl Into<String>,
        no_submit: bool,
    ) -> Self {
        Self {
            dir: dir.into(),
            template,
            submit_command: submit_command.into(),
            no_submit,
        }
    }

    /// the directory `run` is written to
    pub fn run_dir(&self, run: &Run) -> PathBuf {
        self.dir.join(format!("{}-{}", run.record, run.kind))
    }

    fn default_submit_script(&self) -> String {
        String::from("#!/bin/sh\n")
    }

    fn program_cmd(&self, run: &Run) -> String {
        format!("{} {}", run.code.command, Self::PAYLOAD)
    }

    /// write the submit script for `run` to `filename`
    pub fn write_submit_script(
        &self,
        run: &Run,
        filename: &Path,
    ) -> Result<(), RunError> {
        let basename = filename
            .parent()
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut body = self
            .template
            .clone()
            .unwrap_or_else(|| self.default_submit_script())
            .replace("{{.basename}}", &basename)
            .replace("{{.filename}}", Self::PAYLOAD);
        if !body.is_empty() && !body.ends_with('\n') {
            body.push('\n');
        }
        writeln!(body, "{}", self.program_cmd(run))
            .expect("writing to a String cannot fail");
        write_file(filename, body)
    }

    /// submit `script` from `dir` and return the last word of its output as
    /// the job id
    fn submit(&self, dir: &Path, script: &str) -> Result<Option<String>, RunError> {
        let path = dir.join(script);
        let output = Command::new(&self.submit_command)
            .arg(script)
            .current_dir(dir)
            .output()
            .map_err(|e| RunError::Submit {
                script: path.clone(),
                stderr: e.to_string(),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::warn!("failed to submit {} with `{stderr}`", path.display());
            return Err(RunError::Submit {
                script: path,
                stderr: stderr.trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .last()
            .map(str::to_owned))
    }
}

fn write_file(path: &Path, contents: String) -> Result<(), RunError> {
    fs::write(path, contents).map_err(|source| RunError::Io {
        path: path.to_owned(),
        source,
    })
}

impl Runner for Local {
    fn run(&self, run: &Run) -> Result<RunResult, RunError> {
        let dir = self.run_dir(run);
        fs::create_dir_all(&dir).map_err(|source| RunError::Io {
            path: dir.clone(),
            source,
        })?;
        write_file(
            &dir.join(Self::PAYLOAD),
            serde_json::to_string_pretty(&run.payload)?,
        )?;
        let info = json!({
            "label": run.label,
            "description": run.description,
            "workflow": run.workflow,
            "code": run.code,
        });
        write_file(
            &dir.join(Self::RUN_INFO),
            serde_json::to_string_pretty(&info)?,
        )?;
        self.write_submit_script(run, &dir.join(Self::SCRIPT))?;

        let job_id = if self.no_submit {
            log::info!("not submitting {}", dir.display());
            None
        } else {
            self.submit(&dir, Self::SCRIPT)?
        };
        Ok(RunResult { dir, job_id })
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use tempfile::tempdir;

    use super::*;
    use crate::{code::Code, payload::Payload, plugin::PluginKind};

    fn run() -> Run {
        let mut payload = Payload::new();
        payload.insert("pseudo_family", "example-siesta-pps");
        Run {
            code: Code {
                label: String::from("siesta@localhost"),
                input_plugin: String::from("siesta.siesta"),
                command: String::from("siesta <"),
            },
            kind: PluginKind::Siesta,
            workflow: "siesta.base",
            record: String::from("TiO2"),
            label: String::from("siesta.base: TiO2"),
            description: String::from("siesta.base on TiO2 (O4Ti2)"),
            payload,
        }
    }

    #[test]
    fn default_script() {
        let dir = tempdir().unwrap();
        let local = Local::new(dir.path(), None, "bash", true);
        let script = dir.path().join(Local::SCRIPT);
        local.write_submit_script(&run(), &script).unwrap();
        assert_snapshot!(fs::read_to_string(script).unwrap(), @r"
        #!/bin/sh
        siesta < payload.json
        ");
    }

    #[test]
    fn template_script() {
        let dir = tempdir().unwrap();
        let template = "#!/bin/bash
#SBATCH --job-name={{.basename}}
#SBATCH --comment={{.filename}}";
        let local =
            Local::new(dir.path(), Some(template.to_owned()), "sbatch", true);
        let run = run();
        let run_dir = local.run_dir(&run);
        fs::create_dir_all(&run_dir).unwrap();
        let script = run_dir.join(Local::SCRIPT);
        local.write_submit_script(&run, &script).unwrap();
        assert_snapshot!(fs::read_to_string(script).unwrap(), @r"
        #!/bin/bash
        #SBATCH --job-name=TiO2-siesta
        #SBATCH --comment=payload.json
        siesta < payload.json
        ");
    }

    #[test]
    fn dry_run() {
        let dir = tempdir().unwrap();
        let local = Local::new(dir.path(), None, "false", true);
        let got = local.run(&run()).unwrap();
        assert_eq!(got.dir, dir.path().join("TiO2-siesta"));
        assert_eq!(got.job_id, None);
        let payload = fs::read_to_string(got.dir.join(Local::PAYLOAD)).unwrap();
        assert_snapshot!(payload, @r#"
        {
          "pseudo_family": "example-siesta-pps"
        }
        "#);
        assert!(got.dir.join(Local::RUN_INFO).exists());
    }

    #[test]
    fn submit() {
        let dir = tempdir().unwrap();
        let template = "echo submitted job 4242\nexit 0";
        let local = Local::new(dir.path(), Some(template.to_owned()), "sh", false);
        let got = local.run(&run()).unwrap();
        assert_eq!(got.job_id.as_deref(), Some("4242"));
    }

    #[test]
    fn failed_submit() {
        let dir = tempdir().unwrap();
        let local = Local::new(dir.path(), None, "false", false);
        let err = local.run(&run()).unwrap_err();
        assert!(matches!(err, RunError::Submit { .. }));
    }
}
