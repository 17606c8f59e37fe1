use serde::{Deserialize, Serialize};

use crate::resolver::DispatchError;

/// An installed simulation code that runs can be sent to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    /// the full label of the code, conventionally `name@computer`
    pub label: String,

    /// the name of the input plugin the code expects, like `siesta.siesta`
    /// or `fleur.fleur`. this is the selector used to choose a
    /// [crate::plugin::Plugin]
    pub input_plugin: String,

    /// the command line that runs the code
    pub command: String,
}

impl Code {
    /// the part of the label before any `@computer` suffix
    pub fn name(&self) -> &str {
        self.label.split_once('@').map_or(self.label.as_str(), |(n, _)| n)
    }
}

/// The codes available to the CLI
#[derive(Clone, Debug, Default)]
pub struct CodeRegistry {
    codes: Vec<Code>,
}

impl CodeRegistry {
    pub fn new(codes: Vec<Code>) -> Self {
        Self { codes }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.codes.iter().map(|c| c.label.as_str()).collect()
    }

    /// Look up a code by its full label, or by the name before `@` when only
    /// one code has that name
    pub fn resolve(&self, label: &str) -> Result<&Code, DispatchError> {
        if let Some(code) = self.codes.iter().find(|c| c.label == label) {
            return Ok(code);
        }
        let mut by_name = self.codes.iter().filter(|c| c.name() == label);
        match (by_name.next(), by_name.next()) {
            (Some(code), None) => Ok(code),
            _ => Err(DispatchError::UnknownCode {
                label: label.to_owned(),
                available: self.labels().join(", "),
            }),
        }
    }
}
