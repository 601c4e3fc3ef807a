use std::env;
use std::path::PathBuf;

use clap::Parser;

use crate::error::Error;
use crate::prefs::{PREFERENCES_ENV, Preferences};
use crate::profile::EncodeProfile;
use crate::settings::Settings;

/// Encode video files with HandBrakeCLI for small-screen devices.
#[derive(Parser, Debug)]
#[command(name = "hbencode", version, about, long_about = None)]
pub struct Cli {
    /// Aspect ratio preset (tv, tv-hq, w1, w1-hq, w1-hq2, w3-hq, same)
    #[arg(short, long, value_name = "RATIO_NAME", overrides_with_all = ["w1", "tv"])]
    pub ratio: Option<String>,

    /// Shortcut for `--ratio w1` (the default)
    #[arg(long, overrides_with_all = ["ratio", "tv"])]
    pub w1: bool,

    /// Shortcut for `--ratio tv`
    #[arg(long, overrides_with_all = ["ratio", "w1"])]
    pub tv: bool,

    /// Subtitle track to select
    #[arg(short, long, value_name = "SUBTITLE_TRACK", default_value_t = 1)]
    pub subtitle: u32,

    /// Burn the subtitle track into the video (what you want for SSA)
    #[arg(short = 'B', long = "sb")]
    pub burn_subtitles: bool,

    /// Audio track to select
    #[arg(short, long, value_name = "AUDIO_TRACK", default_value_t = 1)]
    pub audio: u32,

    /// Multiplies the preset's video bitrate
    #[arg(short, long, value_name = "QUALITY_MULTIPLIER", default_value_t = 1.0, value_parser = parse_multiplier)]
    pub quality: f64,

    /// Use constant quality instead of average bitrate for video
    #[arg(short = 'C', long)]
    pub constant_quality: bool,

    /// Test encode: first 30 seconds only, then open the result
    #[arg(short = 'T', long)]
    pub test: bool,

    /// Scan only; passes `--scan` to HandBrakeCLI
    #[arg(short = 'S', long)]
    pub scan_only: bool,

    /// Extra argument(s) passed to HandBrakeCLI, split like a shell would
    #[arg(short = 'x', long = "extra", value_name = "EXTRA_ARGS", allow_hyphen_values = true)]
    pub extra: Vec<String>,

    /// Detect ratio, audio and subtitle tracks from a scan of each file
    #[arg(long)]
    pub auto: bool,

    /// Preference file [env: HBENCODE_PREFS] [default: ~/.hbencode_prefs]
    #[arg(long, value_name = "PATH")]
    pub prefs: Option<PathBuf>,

    /// Video files to encode
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

fn parse_multiplier(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{s} is not a positive number"))
    }
}

impl Cli {
    /// The settings record every file in the batch starts from.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownRatio` for a ratio missing from the profile and
    /// `Error::InvalidExtraArgs` for extra arguments with unbalanced quotes.
    pub fn settings(&self, profile: &EncodeProfile) -> Result<Settings, Error> {
        // At most one of these survives parsing; the last ratio flag given wins.
        let ratio = if self.tv {
            "tv".to_string()
        } else if self.w1 {
            "w1".to_string()
        } else {
            self.ratio.clone().unwrap_or_else(|| Settings::default().ratio)
        };
        profile.ratios.resolve(&ratio)?;

        let mut extra_args = Vec::new();
        for extra in &self.extra {
            let words = shlex::split(extra).ok_or_else(|| Error::InvalidExtraArgs {
                args: extra.clone(),
            })?;
            extra_args.extend(words);
        }
        if self.scan_only {
            extra_args.push("--scan".to_string());
        }

        Ok(Settings {
            ratio,
            subtitle_track: self.subtitle,
            burn_subtitles: self.burn_subtitles,
            audio_track: self.audio,
            quality: self.quality,
            constant_quality: self.constant_quality,
            test: self.test,
            extra_args,
            auto_detect: self.auto,
        })
    }

    /// Where preferences live: `--prefs`, then `HBENCODE_PREFS`, then the
    /// home directory.
    pub fn preferences_path(&self) -> Result<PathBuf, Error> {
        if let Some(path) = &self.prefs {
            return Ok(path.clone());
        }
        match env::var_os(PREFERENCES_ENV) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Preferences::default_path(),
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
