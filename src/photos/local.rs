//! Local directory source for sequentially named assets.
//!
//! Files such as `photo (1).jpg`, `photo (2).jpg`, ... are ordered by their
//! trailing number, then by name. Metadata is left for on-demand extraction.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use contactsheet_common::paths::{is_image_file, sequence_number};
use contactsheet_common::PhotoId;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{Photo, PhotoSource};

/// Photo source reading image files from one directory (not recursive).
pub struct LocalDirectorySource {
    dir: PathBuf,
}

impl LocalDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl PhotoSource for LocalDirectorySource {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load(&self) -> Result<Vec<Photo>> {
        let dir = self.dir.clone();
        let photos = tokio::task::spawn_blocking(move || scan_directory(&dir))
            .await
            .context("Directory scan task panicked")??;

        info!(dir = ?self.dir, count = photos.len(), "Loaded photos from directory");
        Ok(photos)
    }
}

/// Enumerate image files in `dir`, in sequence order, with ids assigned.
pub fn scan_directory(dir: &Path) -> Result<Vec<Photo>> {
    if !dir.is_dir() {
        anyhow::bail!("Photo directory not found: {:?}", dir);
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read directory {:?}", dir))?;
        let path = entry.path();
        if entry.file_type().is_file() && is_image_file(path) {
            files.push(path.to_path_buf());
        } else {
            debug!(path = ?path, "Skipping non-image entry");
        }
    }

    files.sort_by(|a, b| {
        sequence_number(a)
            .unwrap_or(u32::MAX)
            .cmp(&sequence_number(b).unwrap_or(u32::MAX))
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });

    Ok(files
        .into_iter()
        .enumerate()
        .map(|(index, path)| photo_for_file(index, &path))
        .collect())
}

fn photo_for_file(index: usize, path: &Path) -> Photo {
    let mut photo = Photo::new(PhotoId::from_index(index), path.to_string_lossy());
    photo.filename = path.file_name().map(|n| n.to_string_lossy().into_owned());

    match image::image_dimensions(path) {
        Ok((width, height)) => {
            photo.width = Some(width);
            photo.height = Some(height);
        }
        Err(e) => warn!(path = ?path, error = %e, "Could not read image dimensions"),
    }

    photo
}
