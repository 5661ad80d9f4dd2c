mod types;

pub use types::*;

use anyhow::{Context, Result};
use contactsheet_common::Error;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./contactsheet.toml", "~/.config/contactsheet/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    // Validate source
    match config.source.kind {
        SourceKind::Remote => {
            if config
                .source
                .listing_url
                .as_deref()
                .map_or(true, |url| url.trim().is_empty())
            {
                anyhow::bail!(Error::invalid_input("Remote source requires a listing_url"));
            }
        }
        SourceKind::Local => {
            let Some(dir) = &config.source.local_dir else {
                anyhow::bail!(Error::invalid_input("Local source requires a local_dir"));
            };
            if !dir.exists() {
                tracing::warn!("Photo directory does not exist: {:?}", dir);
            }
        }
        SourceKind::Drive => {
            if config.source.drive_urls.is_empty() {
                tracing::warn!("Drive source has no drive_urls; the sheet will be empty");
            }
        }
    }

    // Validate annotations
    let annotations = &config.annotations;
    if !(0.0..=1.0).contains(&annotations.selection_fraction) {
        anyhow::bail!(Error::invalid_input(format!(
            "selection_fraction must be between 0 and 1, got {}",
            annotations.selection_fraction
        )));
    }
    if annotations.draw_duration_min_ms > annotations.draw_duration_max_ms {
        anyhow::bail!(Error::invalid_input(format!(
            "draw_duration_min_ms ({}) exceeds draw_duration_max_ms ({})",
            annotations.draw_duration_min_ms,
            annotations.draw_duration_max_ms
        )));
    }
    if annotations.mark_kinds.is_empty() {
        anyhow::bail!(Error::invalid_input("mark_kinds cannot be empty"));
    }
    if !(0.0..=1.0).contains(&annotations.visibility.threshold) {
        anyhow::bail!(Error::invalid_input(format!(
            "visibility threshold must be between 0 and 1, got {}",
            annotations.visibility.threshold
        )));
    }

    // Validate layout
    let layout = &config.layout;
    if layout.photos_per_row == 0 {
        anyhow::bail!(Error::invalid_input("photos_per_row cannot be 0"));
    }
    if layout.frame_width <= 0.0 || layout.frame_height <= 0.0 || layout.viewport_height <= 0.0 {
        anyhow::bail!(Error::invalid_input("Frame and viewport dimensions must be positive"));
    }
    if layout.gap < 0.0 {
        anyhow::bail!(Error::invalid_input("Layout gap cannot be negative"));
    }

    Ok(())
}
