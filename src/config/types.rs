use contactsheet_common::{AcquisitionMode, MarkKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub annotations: AnnotationConfig,

    #[serde(default)]
    pub layout: LayoutConfig,
}

impl Config {
    /// Acquisition mode in effect: the configured one, or the natural mode for
    /// the source (listings carry metadata, files and links do not).
    pub fn acquisition_mode(&self) -> AcquisitionMode {
        self.metadata.mode.unwrap_or(match self.source.kind {
            SourceKind::Remote => AcquisitionMode::Prefetched,
            SourceKind::Local | SourceKind::Drive => AcquisitionMode::OnDemand,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// JSON listing endpoint with inline metadata.
    Remote,
    /// Directory of sequentially named image files.
    #[default]
    Local,
    /// Shared-drive share links.
    Drive,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
            Self::Drive => write!(f, "drive"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Listing endpoint for the remote source
    #[serde(default)]
    pub listing_url: Option<String>,

    /// Upper bound on photos taken from a listing (default: 500)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_local_dir")]
    pub local_dir: Option<PathBuf>,

    #[serde(default)]
    pub drive_urls: Vec<String>,
}

fn default_max_results() -> usize {
    500
}

fn default_local_dir() -> Option<PathBuf> {
    Some(PathBuf::from("photos"))
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            listing_url: None,
            max_results: default_max_results(),
            local_dir: default_local_dir(),
            drive_urls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// Force an acquisition mode instead of deriving it from the source
    #[serde(default)]
    pub mode: Option<AcquisitionMode>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnnotationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Share of photos that receive a mark (default: 0.30)
    #[serde(default = "default_selection_fraction")]
    pub selection_fraction: f64,

    /// Pause between dequeuing a job and drawing it (default: 1000ms)
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_draw_min")]
    pub draw_duration_min_ms: u64,

    #[serde(default = "default_draw_max")]
    pub draw_duration_max_ms: u64,

    #[serde(default = "default_mark_kinds")]
    pub mark_kinds: Vec<MarkKind>,

    #[serde(default)]
    pub visibility: VisibilityOptions,
}

fn default_true() -> bool {
    true
}

fn default_selection_fraction() -> f64 {
    0.30
}

fn default_settle_delay() -> u64 {
    1000
}

fn default_draw_min() -> u64 {
    200
}

fn default_draw_max() -> u64 {
    500
}

fn default_mark_kinds() -> Vec<MarkKind> {
    MarkKind::ALL.to_vec()
}

impl AnnotationConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn draw_duration_min(&self) -> Duration {
        Duration::from_millis(self.draw_duration_min_ms)
    }

    pub fn draw_duration_max(&self) -> Duration {
        Duration::from_millis(self.draw_duration_max_ms)
    }
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            selection_fraction: default_selection_fraction(),
            settle_delay_ms: default_settle_delay(),
            draw_duration_min_ms: default_draw_min(),
            draw_duration_max_ms: default_draw_max(),
            mark_kinds: default_mark_kinds(),
            visibility: VisibilityOptions::default(),
        }
    }
}

/// When a watched target counts as visible.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct VisibilityOptions {
    /// Fraction of the target that must intersect the viewport (default: 0.5)
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Pixels added to every side of the viewport before intersecting
    #[serde(default)]
    pub root_margin_px: f64,
}

fn default_threshold() -> f64 {
    0.5
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            root_margin_px: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayoutConfig {
    #[serde(default = "default_photos_per_row")]
    pub photos_per_row: usize,

    #[serde(default = "default_frame_width")]
    pub frame_width: f64,

    #[serde(default = "default_frame_height")]
    pub frame_height: f64,

    #[serde(default = "default_gap")]
    pub gap: f64,

    /// Viewport height used when simulating a scroll
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
}

fn default_photos_per_row() -> usize {
    6
}

fn default_frame_width() -> f64 {
    240.0
}

fn default_frame_height() -> f64 {
    160.0
}

fn default_gap() -> f64 {
    16.0
}

fn default_viewport_height() -> f64 {
    900.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            photos_per_row: default_photos_per_row(),
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            gap: default_gap(),
            viewport_height: default_viewport_height(),
        }
    }
}
