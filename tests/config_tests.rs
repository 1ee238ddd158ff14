use std::time::Duration;

use gallery_lightbox::config::{Configuration, PointerClass};

#[test]
fn empty_document_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.pointer, PointerClass::Fine);
    assert_eq!(cfg.hero_duration(), Duration::from_millis(280));
    assert_eq!(cfg.slide_duration(), Duration::from_millis(300));
    assert_eq!(cfg.frame_interval(), Duration::from_millis(16));
    assert_eq!(cfg.thumbnail_step, 3);
    assert_eq!(cfg.gallery.manifest_file, "gallery.json");
}

#[test]
fn coarse_pointer_shortens_animations() {
    let yaml = r#"
pointer: coarse
hero:
  coarse-duration-ms: 150
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.hero_duration(), Duration::from_millis(150));
    assert_eq!(cfg.slide_duration(), Duration::from_millis(180));
}

#[test]
fn parse_gesture_thresholds() {
    let yaml = r#"
gesture:
  min-distance-px: 60
  viewport-fraction: 0.25
  velocity-px-per-ms: 0.3
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert!((cfg.gesture.distance_threshold(100.0) - 60.0).abs() < f64::EPSILON);
    assert!((cfg.gesture.distance_threshold(1000.0) - 250.0).abs() < 1e-9);
    assert!((cfg.gesture.commit_guard_ms - 80.0).abs() < f64::EPSILON);
}

#[test]
fn unknown_keys_are_rejected() {
    let yaml = r#"
hero:
  durationms: 100
"#;
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn invalid_values_fail_validation() {
    for yaml in [
        "gesture: { viewport-fraction: 1.5 }",
        "hero: { duration-ms: 0 }",
        "hero: { easing: [1.5, 0.0, 0.2, 1.0] }",
        "zoom: { min-ratio: 4.0, max-ratio: 2.0 }",
        "thumbnail-step: 0",
        "gallery: { image-extensions: [] }",
        "gallery: { manifest-file: 'a/b.json' }",
    ] {
        let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.validated().is_err(), "{yaml} should be rejected");
    }
}

#[test]
fn from_yaml_file_reads_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.yaml");
    std::fs::write(&path, "frame-interval-ms: 8\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.frame_interval(), Duration::from_millis(8));
}
