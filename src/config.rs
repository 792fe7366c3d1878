use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Image suffixes accepted when a widget does not name its own.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    ".apng", ".png", ".avif", ".gif", ".jpg", ".jpeg", ".jfif", ".pjpeg", ".pjp", ".png", ".svg",
    ".webp",
];

/// Per-widget options. Travels inside every request so the helper always
/// acts on the configuration the widget currently holds.
///
/// The wire form uses camelCase names; the YAML file also accepts kebab-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    /// Minimum time between two displayed images, in milliseconds.
    #[serde(alias = "refresh-interval-ms")]
    pub refresh_interval_ms: u64,
    /// Directories scanned recursively. Blank entries are ignored.
    #[serde(alias = "data-dir-paths")]
    pub data_dir_paths: Vec<String>,
    /// Case-sensitive filename suffixes, dot included.
    #[serde(alias = "allowed-extensions")]
    pub allowed_extensions: Vec<String>,
    /// Show the current file name as the widget header.
    #[serde(alias = "show-header")]
    pub show_header: bool,
    /// Shuffle the file list after every scan.
    #[serde(alias = "randomize-images")]
    pub randomize_images: bool,
    /// Shuffle the transition lists once at startup.
    #[serde(alias = "randomize-animations")]
    pub randomize_animations: bool,
}

impl WidgetConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 60 * 1000,
            data_dir_paths: Vec::new(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            show_header: false,
            randomize_images: true,
            randomize_animations: true,
        }
    }
}

/// One configured widget instance.
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetInstance {
    /// Client id used to route helper responses back to this widget.
    pub id: String,
    #[serde(default)]
    pub config: WidgetConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Fixed heartbeat period; refreshes happen on the first tick past the
    /// widget's refresh interval.
    #[serde(with = "humantime_serde")]
    pub heartbeat_tick: Duration,
    /// Duration handed to the renderer for entry/exit transitions.
    #[serde(with = "humantime_serde")]
    pub transition_speed: Duration,
    /// Optional deterministic seed for image and animation shuffles.
    pub shuffle_seed: Option<u64>,
    /// Depth of the helper's outbound event channel.
    pub event_capacity: usize,
    /// Widget instances served by this process.
    pub widgets: Vec<WidgetInstance>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.heartbeat_tick.is_zero(),
            "heartbeat-tick must be greater than zero"
        );
        ensure!(
            self.event_capacity > 0,
            "event-capacity must be greater than zero"
        );
        ensure!(!self.widgets.is_empty(), "at least one widget is required");

        let mut ids = HashSet::new();
        for widget in &self.widgets {
            ensure!(!widget.id.trim().is_empty(), "widget id must not be blank");
            ensure!(
                ids.insert(widget.id.as_str()),
                "duplicate widget id '{}'",
                widget.id
            );
            ensure!(
                widget.config.refresh_interval_ms > 0,
                "widget '{}': refresh-interval-ms must be greater than zero",
                widget.id
            );
        }
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            heartbeat_tick: Duration::from_millis(1500),
            transition_speed: Duration::from_secs(3),
            shuffle_seed: None,
            event_capacity: 64,
            widgets: Vec::new(),
        }
    }
}
