/// Encode settings for a single input file.
///
/// A batch starts every file from the same record; auto-detection only
/// ever changes the copy belonging to the file being scanned.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Name of the ratio preset. Must exist in the profile's ratio table.
    pub ratio: String,
    pub subtitle_track: u32,
    /// Burn the subtitle track into the video instead of muxing it.
    pub burn_subtitles: bool,
    pub audio_track: u32,
    /// Multiplier applied to the preset's video bitrate.
    pub quality: f64,
    pub constant_quality: bool,
    /// Encode only the beginning of the source and open the result.
    pub test: bool,
    /// Passed to HandBrakeCLI verbatim after all generated arguments.
    pub extra_args: Vec<String>,
    /// Derive ratio and tracks from a scan of each source before encoding.
    pub auto_detect: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            ratio: "w1".to_string(),
            subtitle_track: 1,
            burn_subtitles: false,
            audio_track: 1,
            quality: 1.0,
            constant_quality: false,
            test: false,
            extra_args: Vec::new(),
            auto_detect: false,
        }
    }
}
