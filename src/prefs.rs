use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Error;

const PREFERENCES_FILE_NAME: &str = ".hbencode_prefs";
const HANDBRAKE_CLI_KEY: &str = "handbrake_cli";
const OUTPUT_DIRECTORY_KEY: &str = "output_directory";

/// Environment variable overriding the preference file location.
pub const PREFERENCES_ENV: &str = "HBENCODE_PREFS";

/// Operator preferences persisted between runs as `key=value` lines.
///
/// Keys this program does not know about are kept and written back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// The per-user preference file, `~/.hbencode_prefs`.
    pub fn default_path() -> Result<PathBuf, Error> {
        dirs::home_dir()
            .map(|home| home.join(PREFERENCES_FILE_NAME))
            .ok_or(Error::NoHomeDirectory)
    }

    /// Loads preferences from `path`. A missing file yields empty preferences.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no preference file yet");
                return Ok(Preferences::default());
            }
            Err(e) => {
                return Err(Error::Preferences {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        Ok(Self::parse(&text, path))
    }

    fn parse(text: &str, path: &Path) -> Self {
        let mut values = BTreeMap::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => {
                    values.insert(key.to_string(), value.to_string());
                }
                None => warn!(
                    path = %path.display(),
                    line = number + 1,
                    "ignoring preference line without '='"
                ),
            }
        }
        Preferences { values }
    }

    /// Writes every preference to `path`, one `key=value` per line.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let mut text = String::new();
        for (key, value) in &self.values {
            text.push_str(key);
            text.push('=');
            text.push_str(value);
            text.push('\n');
        }
        fs::write(path, text).map_err(|e| Error::Preferences {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), "saved preferences");
        Ok(())
    }

    pub fn handbrake_cli(&self) -> Option<PathBuf> {
        self.values.get(HANDBRAKE_CLI_KEY).map(PathBuf::from)
    }

    pub fn set_handbrake_cli(&mut self, path: &Path) {
        self.values
            .insert(HANDBRAKE_CLI_KEY.to_string(), path.display().to_string());
    }

    pub fn output_directory(&self) -> Option<PathBuf> {
        self.values.get(OUTPUT_DIRECTORY_KEY).map(PathBuf::from)
    }

    pub fn set_output_directory(&mut self, path: &Path) {
        self.values
            .insert(OUTPUT_DIRECTORY_KEY.to_string(), path.display().to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}
