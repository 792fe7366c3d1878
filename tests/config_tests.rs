use std::time::Duration;

use torque_slideshow::config::{Configuration, DEFAULT_ALLOWED_EXTENSIONS, WidgetConfig};

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
widgets:
  - id: "module_0"
    config:
      data-dir-paths: ["/photos", "  "]
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.heartbeat_tick, Duration::from_millis(1500));
    assert_eq!(cfg.transition_speed, Duration::from_secs(3));
    assert_eq!(cfg.event_capacity, 64);
    assert!(cfg.shuffle_seed.is_none());

    let widget = &cfg.widgets[0];
    assert_eq!(widget.id, "module_0");
    assert_eq!(widget.config.data_dir_paths, vec!["/photos", "  "]);
    assert_eq!(widget.config.refresh_interval_ms, 60_000);
    assert!(!widget.config.show_header);
    assert!(widget.config.randomize_images);
    assert!(widget.config.randomize_animations);
    assert_eq!(
        widget.config.allowed_extensions,
        DEFAULT_ALLOWED_EXTENSIONS
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
    );
}

#[test]
fn parse_full_widget_options() {
    let yaml = r#"
heartbeat-tick: 500ms
transition-speed: 1s
shuffle-seed: 7
event-capacity: 8
widgets:
  - id: left
    config:
      refresh-interval-ms: 5000
      data-dir-paths: ["/a", "/b"]
      allowed-extensions: [".png"]
      show-header: true
      randomize-images: false
      randomize-animations: false
  - id: right
    config:
      refreshIntervalMs: 9000
      showHeader: true
"#;
    let cfg = serde_yaml::from_str::<Configuration>(yaml)
        .unwrap()
        .validated()
        .unwrap();
    assert_eq!(cfg.heartbeat_tick, Duration::from_millis(500));
    assert_eq!(cfg.transition_speed, Duration::from_secs(1));
    assert_eq!(cfg.shuffle_seed, Some(7));
    assert_eq!(cfg.event_capacity, 8);

    let left = &cfg.widgets[0].config;
    assert_eq!(left.refresh_interval(), Duration::from_secs(5));
    assert_eq!(left.allowed_extensions, vec![".png"]);
    assert!(left.show_header && !left.randomize_images && !left.randomize_animations);

    // camelCase, as sent on the wire, is accepted too.
    let right = &cfg.widgets[1].config;
    assert_eq!(right.refresh_interval_ms, 9000);
    assert!(right.show_header);
}

#[test]
fn from_yaml_file_reads_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.yaml");
    std::fs::write(&path, "widgets:\n  - id: w\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap().validated().unwrap();
    assert_eq!(cfg.widgets.len(), 1);
}

#[test]
fn validation_rejects_bad_values() {
    let cases = [
        ("widgets: []\n", "at least one widget"),
        ("widgets:\n  - id: a\n  - id: a\n", "duplicate widget id"),
        ("widgets:\n  - id: '  '\n", "must not be blank"),
        (
            "widgets:\n  - id: a\n    config:\n      refresh-interval-ms: 0\n",
            "refresh-interval-ms",
        ),
        ("heartbeat-tick: 0s\nwidgets:\n  - id: a\n", "heartbeat-tick"),
        ("event-capacity: 0\nwidgets:\n  - id: a\n", "event-capacity"),
    ];
    for (yaml, needle) in cases {
        let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
        let err = cfg.validated().unwrap_err();
        assert!(
            err.to_string().contains(needle),
            "{yaml:?}: expected '{needle}' in '{err}'"
        );
    }
}

#[test]
fn widget_config_defaults_match_the_widget_defaults() {
    let config = WidgetConfig::default();
    assert_eq!(config.refresh_interval(), Duration::from_secs(60));
    assert!(config.data_dir_paths.is_empty());
    assert_eq!(config.allowed_extensions.len(), 12);
}
