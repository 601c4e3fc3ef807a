use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HandBrake executable not found in system PATH. Searched paths: {searched_paths:?}")]
    ExecutableNotFound { searched_paths: Vec<PathBuf> },
    #[error("Invalid HandBrake executable at '{path}': {reason}")]
    InvalidExecutable { path: PathBuf, reason: String },
    #[error("Output directory not found at '{path}'")]
    OutputDirectoryNotFound { path: PathBuf },
    #[error("No value given for {what}")]
    Unresolved { what: &'static str },
    #[error("unknown ratio '{name}' not one of {known:?}")]
    UnknownRatio { name: String, known: Vec<String> },
    #[error("Could not split extra arguments '{args}': unbalanced quotes")]
    InvalidExtraArgs { args: String },
    #[error("Could not determine the home directory for the preference file")]
    NoHomeDirectory,
    #[error("Failed to access preference file '{path}': {source}")]
    Preferences {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read answer from terminal: {source}")]
    Prompt { source: std::io::Error },
    #[error("Failed to spawn HandBrake process: {source}")]
    ProcessSpawnFailed { source: std::io::Error },
    #[error("HandBrake failed to encode '{input}' (exit code: {exit_code:?})")]
    EncodeFailed {
        input: PathBuf,
        exit_code: Option<i32>,
    },
}

impl Error {
    /// Whether the error stems from how the program was invoked rather than
    /// from the environment or the encoder.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::UnknownRatio { .. } | Error::InvalidExtraArgs { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ratio_lists_known_names() {
        let err = Error::UnknownRatio {
            name: "wide".into(),
            known: vec!["tv".into(), "w1".into()],
        };
        assert_eq!(
            err.to_string(),
            "unknown ratio 'wide' not one of [\"tv\", \"w1\"]"
        );
        assert!(err.is_usage());
    }

    #[test]
    fn test_encode_failure_is_not_usage() {
        let err = Error::EncodeFailed {
            input: "a.mkv".into(),
            exit_code: Some(3),
        };
        assert!(!err.is_usage());
        assert!(err.to_string().contains("a.mkv"));
    }
}
