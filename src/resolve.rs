use std::ffi::OsStr;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::Error;
use crate::find_executable_in_path;
use crate::prefs::Preferences;

/// Asks the operator for a value.
pub trait Prompt {
    /// Shows `question` with `default` and returns the raw answer. An empty
    /// answer means the default was accepted.
    fn ask(&mut self, question: &str, default: &str) -> io::Result<String>;
}

/// Prompts on the controlling terminal.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str, default: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{question} [{default}]: ")?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer)
    }
}

/// The preferences a batch needs, confirmed to exist on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub handbrake_cli: PathBuf,
    pub output_directory: PathBuf,
}

/// Fills in missing or stale preferences by asking the operator once per
/// value, and records the answers in `prefs`.
///
/// The HandBrakeCLI prompt defaults to the first match on `path_env`; the
/// output directory prompt defaults to the current directory.
///
/// # Errors
///
/// Fails when an answer is empty with no default, or names something that
/// does not exist.
pub fn resolve<P: Prompt>(
    prefs: &mut Preferences,
    prompt: &mut P,
    path_env: Option<&OsStr>,
) -> Result<Resolved, Error> {
    let handbrake_cli = match prefs.handbrake_cli() {
        Some(path) if path.is_file() => path,
        stored => {
            if let Some(path) = stored {
                warn!(path = %path.display(), "HandBrakeCLI not found");
            }
            let default = path_env
                .and_then(|p| find_executable_in_path(p).ok())
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let path = ask_path(prompt, "Path to HandBrakeCLI", &default, "the HandBrakeCLI path")?;
            if !path.is_file() {
                return Err(Error::InvalidExecutable {
                    path,
                    reason: "no such file".to_string(),
                });
            }
            info!(path = %path.display(), "using HandBrakeCLI");
            path
        }
    };

    let output_directory = match prefs.output_directory() {
        Some(path) if path.is_dir() => path,
        stored => {
            if let Some(path) = stored {
                warn!(path = %path.display(), "Destination directory not found");
            }
            let path = ask_path(
                prompt,
                "Directory to save output files",
                ".",
                "the output directory",
            )?;
            if !path.is_dir() {
                return Err(Error::OutputDirectoryNotFound { path });
            }
            info!(path = %path.display(), "saving output files");
            path
        }
    };

    prefs.set_handbrake_cli(&handbrake_cli);
    prefs.set_output_directory(&output_directory);
    Ok(Resolved {
        handbrake_cli,
        output_directory,
    })
}

fn ask_path<P: Prompt>(
    prompt: &mut P,
    question: &str,
    default: &str,
    what: &'static str,
) -> Result<PathBuf, Error> {
    let answer = prompt
        .ask(question, default)
        .map_err(|e| Error::Prompt { source: e })?;
    let answer = answer.trim();
    let chosen = if answer.is_empty() { default } else { answer };
    if chosen.is_empty() {
        return Err(Error::Unresolved { what });
    }
    Ok(PathBuf::from(chosen))
}
