use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

pub mod cli;
mod error;
pub mod job;
pub mod prefs;
pub mod profile;
pub mod resolve;
pub mod scan;
mod settings;

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "HandBrakeCLI.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "HandBrakeCLI";

/// Runs `HandBrakeCLI --version` and returns what it printed.
async fn probe_version(path: &Path) -> Result<String, Error> {
    let output = Command::new(path)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::InvalidExecutable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::InvalidExecutable {
            path: path.to_path_buf(),
            reason: format!(
                "'--version' command failed with exit code: {:?}",
                output.status.code()
            ),
        });
    }

    let version_string = String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_string())
        .unwrap_or_default();

    if version_string.is_empty() {
        return Err(Error::InvalidExecutable {
            path: path.to_path_buf(),
            reason: "HandBrakeCLI --version returned empty output".to_string(),
        });
    }

    Ok(version_string)
}

/// Searches the given PATH string for the HandBrake executable.
pub(crate) fn find_executable_in_path(path_env: &std::ffi::OsStr) -> Result<PathBuf, Error> {
    let paths = env::split_paths(path_env).collect::<Vec<_>>();
    for path in &paths {
        let executable_path = path.join(EXECUTABLE_NAME);
        if executable_path.is_file() {
            return Ok(executable_path);
        }
    }

    Err(Error::ExecutableNotFound {
        searched_paths: paths,
    })
}

pub use error::Error;
pub use job::JobBuilder;
pub use profile::{EncodeProfile, Frame, Ratio, RatioTable};
pub use scan::ScanReport;
pub use settings::Settings;

/// Represents the HandBrake executable.
pub struct HandBrake {
    executable_path: PathBuf,
}

impl HandBrake {
    /// Uses the HandBrakeCLI executable at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidExecutable` if `path` is not a file.
    pub fn new_with_path(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let executable_path = path.into();
        if !executable_path.is_file() {
            return Err(Error::InvalidExecutable {
                path: executable_path,
                reason: "no such file".to_string(),
            });
        }
        Ok(Self { executable_path })
    }

    pub fn executable_path(&self) -> &Path {
        &self.executable_path
    }

    /// Returns the version line reported by `HandBrakeCLI --version`.
    pub async fn version(&self) -> Result<String, Error> {
        probe_version(&self.executable_path).await
    }

    /// Starts building an encode of `input` into `output`.
    pub fn job(
        &self,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        profile: &EncodeProfile,
    ) -> JobBuilder {
        JobBuilder::new(
            self.executable_path.clone(),
            input.into(),
            output.into(),
            profile,
        )
    }

    /// Runs `HandBrakeCLI --scan` on `input` and parses its report.
    ///
    /// HandBrake writes the report to `stderr`; both streams are read. A scan
    /// that exits non-zero is logged and whatever it printed is still parsed.
    ///
    /// # Errors
    ///
    /// Returns an `Error` only if the process could not be spawned.
    pub async fn scan(&self, input: &Path) -> Result<ScanReport, Error> {
        debug!(input = %input.display(), "scanning source");
        let output = Command::new(&self.executable_path)
            .arg("--scan")
            .arg("-i")
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::ProcessSpawnFailed { source: e })?;

        if !output.status.success() {
            warn!(
                input = %input.display(),
                code = ?output.status.code(),
                "scan exited with an error, using what it reported"
            );
        }

        let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
        text.push('\n');
        text.push_str(&String::from_utf8_lossy(&output.stdout));
        Ok(ScanReport::parse(&text))
    }

    /// Scans `input` and derives its settings from `base`.
    pub async fn detect_settings(
        &self,
        input: &Path,
        base: &Settings,
        profile: &EncodeProfile,
    ) -> Result<Settings, Error> {
        let report = self.scan(input).await?;
        Ok(report.detect_settings(base, profile))
    }

    /// Encodes each file in order into `output_dir`.
    ///
    /// Every file starts from `base`; with `auto_detect` set, its own scan
    /// decides the rest. A test encode is opened once it finishes.
    ///
    /// # Errors
    ///
    /// Stops at the first file that fails to scan, build or encode. Later
    /// files are not started.
    pub async fn encode_all(
        &self,
        files: &[PathBuf],
        base: &Settings,
        output_dir: &Path,
        profile: &EncodeProfile,
    ) -> Result<(), Error> {
        for input in files {
            let settings = if base.auto_detect {
                self.detect_settings(input, base, profile).await?
            } else {
                base.clone()
            };

            let output = job::output_path(output_dir, input, &profile.container_extension);
            self.job(input, &output, profile)
                .settings(&settings)?
                .run()
                .await?;

            if settings.test {
                job::open_output(&output).await;
            }
        }
        Ok(())
    }
}
