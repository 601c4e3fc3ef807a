//! Reading `HandBrakeCLI --scan` reports.
//!
//! The scan report is free text meant for humans, so everything here is
//! best effort: anything that cannot be recognised falls back to defaults
//! instead of failing the encode.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::profile::EncodeProfile;
use crate::settings::Settings;

static DISPLAY_ASPECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"display aspect: (?P<aspect>[0-9.]+)")
        .expect("BUG: Failed to compile display aspect regex")
});

const TITLE_MARKER: char = '+';
const AUDIO_HEADER: &str = "audio tracks";
const SUBTITLE_HEADER: &str = "subtitle tracks";
const JAPANESE_TAGS: &[&str] = &["Japanese", "jpn"];

/// What a scan report says about a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// The last display aspect found in the report.
    pub display_aspect: Option<f64>,
    /// One line per audio track, in track order.
    pub audio_tracks: Vec<String>,
    /// One line per subtitle track, in track order.
    pub subtitle_tracks: Vec<String>,
}

#[derive(PartialEq)]
enum Group {
    None,
    Audio,
    Subtitle,
}

impl ScanReport {
    /// Parses the combined output of a scan.
    pub fn parse(output: &str) -> Self {
        let mut report = ScanReport::default();
        let mut group = Group::None;

        let title_lines = output
            .lines()
            .filter(|line| line.trim().starts_with(TITLE_MARKER));

        for line in title_lines {
            if let Some(caps) = DISPLAY_ASPECT_RE.captures(line) {
                if let Ok(aspect) = caps["aspect"].parse::<f64>() {
                    report.display_aspect = Some(aspect);
                }
            }

            if line.contains(AUDIO_HEADER) {
                group = Group::Audio;
            } else if line.contains(SUBTITLE_HEADER) {
                group = Group::Subtitle;
            } else {
                let track = line.trim().to_string();
                match group {
                    Group::Audio => report.audio_tracks.push(track),
                    Group::Subtitle => report.subtitle_tracks.push(track),
                    Group::None => {}
                }
            }
        }

        report
    }

    /// 1-based number of the first audio track tagged as Japanese.
    pub fn japanese_audio_track(&self) -> Option<u32> {
        pick_japanese(&self.audio_tracks)
    }

    /// 1-based number of the subtitle track to burn: the first one tagged
    /// as Japanese, else track 1. `None` when the source has no subtitles.
    pub fn japanese_subtitle_track(&self) -> Option<u32> {
        pick_japanese(&self.subtitle_tracks)
    }

    /// Derives encode settings for the scanned source from `base`.
    ///
    /// The ratio becomes the profile's auto candidate closest to the display
    /// aspect, the encode switches to constant quality, and a subtitle track
    /// found in the report is burned in.
    pub fn detect_settings(&self, base: &Settings, profile: &EncodeProfile) -> Settings {
        let mut settings = base.clone();
        if let Some(ratio) = self.closest_ratio(profile) {
            settings.ratio = ratio.to_string();
        }
        settings.constant_quality = true;

        let subtitle = self.japanese_subtitle_track();
        settings.subtitle_track = subtitle.unwrap_or(1);
        settings.burn_subtitles = subtitle.is_some();
        settings.audio_track = self.japanese_audio_track().unwrap_or(1);

        debug!(
            aspect = ?self.display_aspect,
            ratio = %settings.ratio,
            audio = settings.audio_track,
            subtitle = settings.subtitle_track,
            burn = settings.burn_subtitles,
            "detected settings"
        );
        settings
    }

    /// Name of the auto candidate whose width/height is closest to the
    /// display aspect. Ties go to the earlier candidate; without an aspect
    /// the first candidate wins.
    pub fn closest_ratio<'a>(&self, profile: &'a EncodeProfile) -> Option<&'a str> {
        let mut best: Option<(&str, f64)> = None;
        for name in &profile.auto_ratios {
            let Some(frame) = profile.ratios.get(name).and_then(|r| r.frame) else {
                continue;
            };
            let distance = match self.display_aspect {
                Some(aspect) => (frame.aspect() - aspect).abs(),
                None => 0.0,
            };
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((name.as_str(), distance)),
            }
        }
        best.map(|(name, _)| name)
    }
}

fn pick_japanese(tracks: &[String]) -> Option<u32> {
    if tracks.is_empty() {
        return None;
    }
    let index = tracks
        .iter()
        .position(|t| JAPANESE_TAGS.iter().any(|tag| t.contains(tag)))
        .unwrap_or(0);
    Some(index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_aspect_re_match() {
        let line = "  + size: 720x480, pixel aspect: 32/27, display aspect: 1.78, 29.970 fps";
        let caps = DISPLAY_ASPECT_RE.captures(line).unwrap();
        assert_eq!(&caps["aspect"], "1.78");
    }

    #[test]
    fn test_display_aspect_re_no_match() {
        assert!(DISPLAY_ASPECT_RE.captures("  + size: 720x480").is_none());
    }

    #[test]
    fn test_pick_japanese_prefers_first_tagged() {
        let tracks = vec![
            "+ 1, English (AC3)".to_string(),
            "+ 2, Japanese (AAC)".to_string(),
            "+ 3, Japanese (AC3)".to_string(),
        ];
        assert_eq!(pick_japanese(&tracks), Some(2));
    }

    #[test]
    fn test_pick_japanese_iso_code() {
        let tracks = vec![
            "+ 1, Unknown (iso639-2: und)".to_string(),
            "+ 2, Unknown (iso639-2: jpn)".to_string(),
        ];
        assert_eq!(pick_japanese(&tracks), Some(2));
    }

    #[test]
    fn test_pick_japanese_fallback_and_empty() {
        assert_eq!(pick_japanese(&["+ 1, English".to_string()]), Some(1));
        assert_eq!(pick_japanese(&[]), None);
    }
}
