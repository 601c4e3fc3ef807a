use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::profile::{EncodeProfile, Ratio};
use crate::settings::Settings;

#[cfg(target_os = "macos")]
const OPENER: &[&str] = &["open"];
#[cfg(windows)]
const OPENER: &[&str] = &["cmd", "/C", "start", ""];
#[cfg(all(unix, not(target_os = "macos")))]
const OPENER: &[&str] = &["xdg-open"];
#[cfg(not(any(unix, windows)))]
const OPENER: &[&str] = &[];

/// Derives the output file for `input`: its stem with the profile's
/// container extension, placed in `output_dir`.
pub fn output_path(output_dir: &Path, input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| input.as_os_str().to_os_string());
    let mut file_name = stem;
    file_name.push(".");
    file_name.push(extension);
    output_dir.join(file_name)
}

/// Opens `path` with the platform's default viewer and reports whether it
/// launched.
///
/// Failures are logged and otherwise ignored; the encode has already
/// succeeded by the time this runs.
pub async fn open_output(path: &Path) -> bool {
    open_with(OPENER, path).await
}

async fn open_with(opener: &[&str], path: &Path) -> bool {
    let Some((program, args)) = opener.split_first() else {
        warn!(path = %path.display(), "Could not open file: no opener on this platform");
        return false;
    };
    match Command::new(program).args(args).arg(path).status().await {
        Ok(status) if status.success() => {
            debug!(path = %path.display(), "opened output");
            true
        }
        Ok(status) => {
            warn!(
                path = %path.display(),
                code = ?status.code(),
                "Could not open file"
            );
            false
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not open file");
            false
        }
    }
}

/// A fluent builder for a single `HandBrakeCLI` encode.
pub struct JobBuilder {
    // The path to the HandBrakeCLI executable, copied from HandBrake instance
    handbrake_path: PathBuf,
    input: PathBuf,
    output: PathBuf,
    profile: EncodeProfile,

    // Configuration options, stored to ensure "last call wins"
    ratio: Option<Ratio>,
    subtitle: u32,
    subtitle_burned: bool,
    audio: u32,
    bitrate_multiplier: f64,
    constant_quality: bool,
    stop_at: Option<Duration>,
    extra_args: Vec<String>,
}

impl JobBuilder {
    /// Creates a new `JobBuilder` instance.
    ///
    /// This is typically called via `HandBrake::job()`.
    pub fn new(
        handbrake_path: PathBuf,
        input: PathBuf,
        output: PathBuf,
        profile: &EncodeProfile,
    ) -> Self {
        JobBuilder {
            handbrake_path,
            input,
            output,
            profile: profile.clone(),
            ratio: None,
            subtitle: 1,
            subtitle_burned: false,
            audio: 1,
            bitrate_multiplier: 1.0,
            constant_quality: false,
            stop_at: None,
            extra_args: Vec::new(),
        }
    }

    /// Applies a whole settings record.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownRatio` if the settings name a ratio missing from
    /// the profile's table.
    pub fn settings(self, settings: &Settings) -> Result<Self, Error> {
        let ratio = self.profile.ratios.resolve(&settings.ratio)?.clone();
        let test_duration = self.profile.test_duration;
        let mut builder = self
            .ratio(ratio)
            .subtitle(settings.subtitle_track)
            .subtitle_burned(settings.burn_subtitles)
            .audio(settings.audio_track)
            .bitrate_multiplier(settings.quality)
            .constant_quality(settings.constant_quality)
            .extra_args(settings.extra_args.iter().cloned());
        if settings.test {
            builder = builder.stop_at(test_duration);
        }
        Ok(builder)
    }

    /// Sets the ratio preset, which decides frame size and bitrate.
    ///
    /// Without a ratio, or with one that has no frame, HandBrake's preset
    /// keeps the source geometry and its own audio bitrate.
    pub fn ratio(mut self, ratio: Ratio) -> Self {
        self.ratio = Some(ratio);
        self
    }

    /// Selects the subtitle track.
    pub fn subtitle(mut self, track: u32) -> Self {
        self.subtitle = track;
        self
    }

    /// Burns the selected subtitle track into the video. Otherwise it is
    /// muxed and flagged as the default track.
    pub fn subtitle_burned(mut self, burned: bool) -> Self {
        self.subtitle_burned = burned;
        self
    }

    /// Selects the audio track.
    pub fn audio(mut self, track: u32) -> Self {
        self.audio = track;
        self
    }

    /// Scales the ratio's average video bitrate. The result is truncated to
    /// whole kbit/s.
    pub fn bitrate_multiplier(mut self, multiplier: f64) -> Self {
        self.bitrate_multiplier = multiplier;
        self
    }

    /// Encodes for the profile's constant quality level instead of an
    /// average bitrate.
    pub fn constant_quality(mut self, enabled: bool) -> Self {
        self.constant_quality = enabled;
        self
    }

    /// Stops the encode after `duration` of source.
    pub fn stop_at(mut self, duration: Duration) -> Self {
        self.stop_at = Some(duration);
        self
    }

    /// Appends raw arguments, passed after everything the builder generates.
    pub fn extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// The full command line, quoted for display.
    pub fn command_line(&self) -> String {
        let program = self.handbrake_path.display().to_string();
        let args = self.build_args();
        let words = std::iter::once(program.as_str()).chain(args.iter().map(String::as_str));
        shlex::try_join(words.clone()).unwrap_or_else(|_| words.collect::<Vec<_>>().join(" "))
    }

    fn create_process(&self) -> Command {
        let mut cmd = Command::new(&self.handbrake_path);
        cmd.args(self.build_args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }

    /// Executes the job and waits for completion, returning only the final `ExitStatus`.
    ///
    /// The `stdout` and `stderr` of the child process are inherited by the parent.
    ///
    /// # Errors
    ///
    /// Returns an `Error` if the process could not be spawned.
    pub async fn status(self) -> Result<ExitStatus, Error> {
        info!(command = %self.command_line(), "invoking HandBrakeCLI");
        self.create_process()
            .status()
            .await
            .map_err(|e| Error::ProcessSpawnFailed { source: e })
    }

    /// Executes the job and treats a non-zero exit as an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::EncodeFailed` when HandBrakeCLI reports failure, or an
    /// `Error` if the process could not be spawned.
    pub async fn run(self) -> Result<(), Error> {
        let input = self.input.clone();
        let status = self.status().await?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::EncodeFailed {
                input,
                exit_code: status.code(),
            })
        }
    }

    /// Builds the final list of command-line arguments based on the configured options.
    pub fn build_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        let frame = self.ratio.as_ref().and_then(|r| r.frame);

        args.extend(["-Z".into(), self.profile.handbrake_preset.clone()]);
        args.extend(["-e".into(), self.profile.video_encoder.clone()]);

        args.extend(["-E".into(), self.profile.audio_encoder.clone()]);
        if frame.is_some() {
            args.extend(["--ab".into(), self.profile.audio_bitrate.to_string()]);
        }

        if self.constant_quality {
            args.extend([
                "-q".into(),
                format!("{:.1}", self.profile.constant_quality_level),
            ]);
        } else if let Some(f) = &frame {
            let bitrate = (f64::from(f.video_bitrate) * self.bitrate_multiplier).trunc() as u32;
            args.extend(["--vb".into(), bitrate.to_string()]);
        }
        if let Some(f) = &frame {
            args.extend(["-w".into(), f.width.to_string()]);
            args.extend(["-l".into(), f.height.to_string()]);
        }

        args.extend(["-s".into(), self.subtitle.to_string()]);
        if self.subtitle_burned {
            args.extend(["--subtitle-burn".into(), self.subtitle.to_string()]);
        } else {
            args.extend(["--subtitle-default".into(), self.subtitle.to_string()]);
        }

        args.extend(["-a".into(), self.audio.to_string()]);

        if let Some(d) = &self.stop_at {
            args.extend(["--stop-at".into(), format!("duration:{}", d.as_secs())]);
        }

        args.extend(["-i".into(), self.input.display().to_string()]);
        args.extend(["-o".into(), self.output.display().to_string()]);

        args.extend(self.extra_args.iter().cloned());
        args
    }
}
