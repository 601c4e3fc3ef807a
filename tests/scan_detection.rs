use hbencode::{EncodeProfile, Ratio, RatioTable, ScanReport, Settings};

const SCAN_OUTPUT: &str = r#"[10:42:01] hb_init: starting libhb thread
[10:42:01] scan: decoding previews for title 1
+ title 1:
  + stream: /videos/episode01.mkv
  + duration: 00:23:40
  + size: 1920x1080, pixel aspect: 1/1, display aspect: 1.78, 23.976 fps
  + autocrop: 0/0/0/0
  + chapters:
    + 1: duration 00:23:40
  + audio tracks:
    + 1, English (AAC) (2.0 ch) (iso639-2: eng)
    + 2, Japanese (AAC) (2.0 ch) (iso639-2: jpn)
  + subtitle tracks:
    + 1, English (SSA) (iso639-2: eng)
    + 2, Unknown (SSA) (iso639-2: jpn)
HandBrake has exited.
"#;

#[test]
fn test_parse_full_report() {
    let report = ScanReport::parse(SCAN_OUTPUT);

    assert_eq!(report.display_aspect, Some(1.78));
    assert_eq!(
        report.audio_tracks,
        vec![
            "+ 1, English (AAC) (2.0 ch) (iso639-2: eng)",
            "+ 2, Japanese (AAC) (2.0 ch) (iso639-2: jpn)",
        ]
    );
    assert_eq!(
        report.subtitle_tracks,
        vec![
            "+ 1, English (SSA) (iso639-2: eng)",
            "+ 2, Unknown (SSA) (iso639-2: jpn)",
        ]
    );
}

#[test]
fn test_detect_widescreen_japanese_source() {
    let report = ScanReport::parse(SCAN_OUTPUT);
    let settings = report.detect_settings(&Settings::default(), &EncodeProfile::default());

    assert_eq!(settings.ratio, "w1-hq");
    assert!(settings.constant_quality);
    assert_eq!(settings.audio_track, 2);
    assert_eq!(settings.subtitle_track, 2);
    assert!(settings.burn_subtitles);
}

#[test]
fn test_closest_ratio_for_common_aspects() {
    let profile = EncodeProfile::default();
    let closest = |aspect: f64| {
        let report = ScanReport {
            display_aspect: Some(aspect),
            ..ScanReport::default()
        };
        report.closest_ratio(&profile).map(str::to_string)
    };

    assert_eq!(closest(1.33).as_deref(), Some("tv-hq"));
    assert_eq!(closest(1.78).as_deref(), Some("w1-hq"));
    assert_eq!(closest(2.35).as_deref(), Some("w3-hq"));
    assert_eq!(closest(4.0).as_deref(), Some("w3-hq"));
}

#[test]
fn test_closest_ratio_tie_goes_to_first_candidate() {
    let profile = EncodeProfile {
        ratios: RatioTable::new(vec![
            Ratio::new("small", 400, 200, 100),
            Ratio::new("large", 800, 400, 200),
        ]),
        auto_ratios: vec!["small".into(), "large".into()],
        ..EncodeProfile::default()
    };
    let report = ScanReport {
        display_aspect: Some(1.9),
        ..ScanReport::default()
    };
    assert_eq!(report.closest_ratio(&profile), Some("small"));
}

#[test]
fn test_last_display_aspect_wins() {
    let output = "\
+ title 1:
  + size: 720x480, pixel aspect: 8/9, display aspect: 1.33, 29.970 fps
+ title 2:
  + size: 720x480, pixel aspect: 32/27, display aspect: 2.35, 23.976 fps
";
    let report = ScanReport::parse(output);
    assert_eq!(report.display_aspect, Some(2.35));
}

#[test]
fn test_lines_without_marker_are_ignored() {
    let output = "\
display aspect: 1.33
audio tracks:
  1, Japanese
  + subtitle tracks:
  + 1, English
";
    let report = ScanReport::parse(output);
    assert_eq!(report.display_aspect, None);
    assert!(report.audio_tracks.is_empty());
    assert_eq!(report.subtitle_tracks, vec!["+ 1, English"]);
}

#[test]
fn test_no_japanese_tracks_falls_back_to_first() {
    let output = "\
+ title 1:
  + size: 720x576, pixel aspect: 16/15, display aspect: 1.33, 25.000 fps
  + audio tracks:
    + 1, English (AC3) (5.1 ch) (iso639-2: eng)
    + 2, French (AC3) (5.1 ch) (iso639-2: fra)
  + subtitle tracks:
    + 1, English (VOBSUB) (iso639-2: eng)
";
    let report = ScanReport::parse(output);
    let settings = report.detect_settings(&Settings::default(), &EncodeProfile::default());

    assert_eq!(settings.ratio, "tv-hq");
    assert_eq!(settings.audio_track, 1);
    assert_eq!(settings.subtitle_track, 1);
    // A subtitle track exists, so it is burned even without a Japanese match.
    assert!(settings.burn_subtitles);
}

#[test]
fn test_empty_report_uses_defaults() {
    let base = Settings {
        subtitle_track: 4,
        burn_subtitles: true,
        audio_track: 3,
        quality: 1.5,
        test: true,
        ..Settings::default()
    };
    let settings = ScanReport::parse("").detect_settings(&base, &EncodeProfile::default());

    assert_eq!(settings.ratio, "tv-hq");
    assert!(settings.constant_quality);
    assert_eq!(settings.audio_track, 1);
    assert_eq!(settings.subtitle_track, 1);
    assert!(!settings.burn_subtitles);
    // Untouched by detection.
    assert_eq!(settings.quality, 1.5);
    assert!(settings.test);
}

#[test]
fn test_japanese_only_in_subtitles() {
    let output = "\
+ title 1:
  + audio tracks:
    + 1, English (AAC) (iso639-2: eng)
  + subtitle tracks:
    + 1, English (SRT) (iso639-2: eng)
    + 2, Japanese (SRT) (iso639-2: jpn)
    + 3, Japanese (SSA) (iso639-2: jpn)
";
    let report = ScanReport::parse(output);
    assert_eq!(report.japanese_audio_track(), Some(1));
    assert_eq!(report.japanese_subtitle_track(), Some(2));
}
