use std::time::Duration;

use crate::error::Error;

/// Target frame geometry and average video bitrate of a ratio preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Average video bitrate in kbit/s.
    pub video_bitrate: u32,
}

impl Frame {
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// A named aspect-ratio preset.
///
/// A ratio without a frame keeps the source's geometry and lets HandBrake
/// pick the bitrate.
#[derive(Debug, Clone, PartialEq)]
pub struct Ratio {
    pub name: String,
    pub frame: Option<Frame>,
}

impl Ratio {
    pub fn new(name: impl Into<String>, width: u32, height: u32, video_bitrate: u32) -> Self {
        Ratio {
            name: name.into(),
            frame: Some(Frame {
                width,
                height,
                video_bitrate,
            }),
        }
    }

    pub fn same_as_source(name: impl Into<String>) -> Self {
        Ratio {
            name: name.into(),
            frame: None,
        }
    }
}

/// The set of ratio presets a run may choose from, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioTable {
    ratios: Vec<Ratio>,
}

impl RatioTable {
    pub fn new(ratios: Vec<Ratio>) -> Self {
        RatioTable { ratios }
    }

    pub fn get(&self, name: &str) -> Option<&Ratio> {
        self.ratios.iter().find(|r| r.name == name)
    }

    /// Looks up a preset by name, failing with the list of valid names.
    pub fn resolve(&self, name: &str) -> Result<&Ratio, Error> {
        self.get(name).ok_or_else(|| Error::UnknownRatio {
            name: name.to_string(),
            known: self.names().map(str::to_string).collect(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ratios.iter().map(|r| r.name.as_str())
    }
}

impl Default for RatioTable {
    // Sized for a 480x320 handheld screen; pixel aspect makes the 4:3 and
    // 16:9 widths look uneven.
    fn default() -> Self {
        RatioTable::new(vec![
            // 4:3
            Ratio::new("tv", 320, 240, 196),
            Ratio::new("tv-hq", 432, 320, 352),
            // 16:9
            Ratio::new("w1", 432, 240, 230),
            Ratio::new("w1-hq", 480, 272, 333),
            Ratio::new("w1-hq2", 576, 320, 470),
            // 2.39
            Ratio::new("w3-hq", 480, 208, 255),
            Ratio::same_as_source("same"),
        ])
    }
}

/// Everything about an encode that is fixed for a whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeProfile {
    /// The HandBrake preset passed with `-Z`.
    pub handbrake_preset: String,
    pub video_encoder: String,
    pub audio_encoder: String,
    /// Audio bitrate in kbit/s, omitted for ratios without a frame.
    pub audio_bitrate: u32,
    /// RF value used when encoding for constant quality.
    pub constant_quality_level: f32,
    /// How much of the source a test encode covers.
    pub test_duration: Duration,
    /// Extension given to output files.
    pub container_extension: String,
    pub ratios: RatioTable,
    /// Ratio names considered by auto-detection, in evaluation order.
    pub auto_ratios: Vec<String>,
}

impl Default for EncodeProfile {
    fn default() -> Self {
        EncodeProfile {
            handbrake_preset: "Apple/iPhone & iPod Touch".to_string(),
            video_encoder: "x264".to_string(),
            audio_encoder: "ca_aac".to_string(),
            audio_bitrate: 96,
            constant_quality_level: 20.0,
            test_duration: Duration::from_secs(30),
            container_extension: "m4v".to_string(),
            ratios: RatioTable::default(),
            auto_ratios: vec!["tv-hq".into(), "w1-hq".into(), "w3-hq".into()],
        }
    }
}
