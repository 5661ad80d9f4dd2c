//! The contact sheet: an ordered photo arena tied to a metadata resolver.
//!
//! [`ContactSheet`] is the context object the front end works through. It
//! owns the photo set for one load, keyed by [`PhotoId`], and shares one
//! [`MetadataResolver`] so the grid and the detail view see the same cached
//! records.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;
use contactsheet_common::{Error, MetadataState, PhotoId};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::metadata::{Exif, MetadataResolver, NOT_AVAILABLE};
use crate::photos::{Photo, PhotoSource};

/// Maximum number of concurrent resolutions in [`ContactSheet::resolve_all`].
const RESOLVE_CONCURRENCY: usize = 8;

const LOADING_DETAILS: &str = "Loading EXIF details...";
const PENDING_SEGMENT: &str = "ISO... SS... F/...";
const PENDING_ISO: &str = "...";
const PENDING_SHUTTER: &str = "SS...";
const PENDING_APERTURE: &str = "F/...";

/// Contact-sheet label for a grid position: `1, 1A, 2, 2A, ...`.
///
/// # Examples
///
/// ```
/// use contactsheet::sheet::frame_number;
///
/// assert_eq!(frame_number(0), "1");
/// assert_eq!(frame_number(1), "1A");
/// assert_eq!(frame_number(4), "3");
/// ```
pub fn frame_number(index: usize) -> String {
    let number = index / 2 + 1;
    if index % 2 == 0 {
        number.to_string()
    } else {
        format!("{number}A")
    }
}

fn shown(value: &str, placeholder: &'static str) -> String {
    if value.is_empty() || value == NOT_AVAILABLE {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// Inline `ISO <iso> - <shutter> - <aperture>` text for a resolved record.
pub fn info_segment(exif: &Exif) -> String {
    format!(
        "ISO {} - {} - {}",
        shown(&exif.iso_display, PENDING_ISO),
        shown(&exif.shutter_display, PENDING_SHUTTER),
        shown(&exif.aperture_display, PENDING_APERTURE)
    )
}

/// Compact `<aperture> · <shutter>` text for narrow layouts.
pub fn mobile_summary(exif: &Exif) -> String {
    format!(
        "{} · {}",
        shown(&exif.aperture_display, PENDING_APERTURE),
        shown(&exif.shutter_display, PENDING_SHUTTER)
    )
}

/// Labeled metadata rows for one photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub photo_id: PhotoId,
    pub frame_number: String,
    pub source_ref: String,
    pub state: MetadataState,
    /// `None` while metadata is still loading.
    pub rows: Option<Vec<(String, String)>>,
}

impl DetailView {
    pub fn header(&self) -> String {
        format!("FRAME {} - DETAILS", self.frame_number)
    }

    /// Plain-text rendering: header, then one `Label: value` row per field.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.header());
        match &self.rows {
            Some(rows) => {
                for (label, value) in rows {
                    let _ = writeln!(out, "{label}: {value}");
                }
            }
            None => {
                let _ = writeln!(out, "{LOADING_DETAILS}");
            }
        }
        out
    }
}

/// Ordered photos plus the shared resolver.
pub struct ContactSheet {
    photos: Vec<Photo>,
    index: HashMap<PhotoId, usize>,
    resolver: Arc<MetadataResolver>,
}

impl ContactSheet {
    pub fn new(photos: Vec<Photo>, resolver: Arc<MetadataResolver>) -> Self {
        let index = photos
            .iter()
            .enumerate()
            .map(|(i, photo)| (photo.id, i))
            .collect();
        Self {
            photos,
            index,
            resolver,
        }
    }

    /// Load the photo set from `source`, discarding any previously cached
    /// metadata.
    pub async fn load(source: &dyn PhotoSource, resolver: Arc<MetadataResolver>) -> Result<Self> {
        let photos = source.load().await?;
        resolver.reset();
        info!(
            source = source.name(),
            count = photos.len(),
            mode = %resolver.mode(),
            "Contact sheet loaded"
        );
        Ok(Self::new(photos, resolver))
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn ids(&self) -> Vec<PhotoId> {
        self.photos.iter().map(|p| p.id).collect()
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn photo(&self, id: PhotoId) -> Option<&Photo> {
        self.index.get(&id).map(|&i| &self.photos[i])
    }

    pub fn resolver(&self) -> &Arc<MetadataResolver> {
        &self.resolver
    }

    /// Frame label for a photo, from its grid position.
    pub fn frame_label(&self, id: PhotoId) -> Option<String> {
        self.index.get(&id).map(|&i| frame_number(i))
    }

    pub fn metadata_state(&self, id: PhotoId) -> MetadataState {
        self.resolver.state(id)
    }

    /// The record if it can be produced without waiting.
    fn exif_now(&self, id: PhotoId) -> Option<Exif> {
        self.photo(id).and_then(|photo| self.resolver.resolve_now(photo))
    }

    /// Inline info text; placeholders while metadata is unresolved.
    pub fn info_segment(&self, id: PhotoId) -> String {
        self.exif_now(id)
            .map_or_else(|| PENDING_SEGMENT.to_string(), |exif| info_segment(&exif))
    }

    pub fn mobile_summary(&self, id: PhotoId) -> String {
        self.exif_now(id).map_or_else(
            || format!("{PENDING_APERTURE} · {PENDING_SHUTTER}"),
            |exif| mobile_summary(&exif),
        )
    }

    /// Resolve a photo's metadata, waiting for extraction if needed.
    pub async fn resolve(&self, id: PhotoId) -> contactsheet_common::Result<Exif> {
        let photo = self
            .photo(id)
            .ok_or_else(|| Error::not_found(format!("photo {id}")))?;
        Ok(self.resolver.resolve(photo).await)
    }

    /// Detail view with the current rows, or the loading state.
    pub fn detail_now(&self, id: PhotoId) -> contactsheet_common::Result<DetailView> {
        let photo = self
            .photo(id)
            .ok_or_else(|| Error::not_found(format!("photo {id}")))?;
        let exif = self.resolver.resolve_now(photo);
        Ok(self.detail_view(photo, exif.as_ref()))
    }

    /// Detail view after resolving the photo's metadata.
    pub async fn detail(&self, id: PhotoId) -> contactsheet_common::Result<DetailView> {
        let photo = self
            .photo(id)
            .ok_or_else(|| Error::not_found(format!("photo {id}")))?;
        let exif = self.resolver.resolve(photo).await;
        Ok(self.detail_view(photo, Some(&exif)))
    }

    fn detail_view(&self, photo: &Photo, exif: Option<&Exif>) -> DetailView {
        DetailView {
            photo_id: photo.id,
            frame_number: self.frame_label(photo.id).unwrap_or_default(),
            source_ref: photo.source_ref.clone(),
            state: self.resolver.state(photo.id),
            rows: exif.map(|exif| {
                exif.rows()
                    .iter()
                    .map(|(label, value)| (label.to_string(), value.to_string()))
                    .collect()
            }),
        }
    }

    /// Resolve every photo eagerly. Records come back in grid order.
    pub async fn resolve_all(&self) -> Vec<Exif> {
        let permits = Arc::new(Semaphore::new(RESOLVE_CONCURRENCY));
        let mut tasks = JoinSet::new();

        for (i, photo) in self.photos.iter().enumerate() {
            let photo = photo.clone();
            let resolver = Arc::clone(&self.resolver);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                (i, resolver.resolve(&photo).await)
            });
        }

        let mut records = vec![Exif::not_available(); self.photos.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((i, exif)) => records[i] = exif,
                Err(e) => warn!(error = %e, "Metadata task failed"),
            }
        }

        let failed = self
            .photos
            .iter()
            .filter(|p| self.resolver.state(p.id) == MetadataState::Failed)
            .count();
        info!(count = records.len(), failed, "Resolved metadata for all photos");
        records
    }
}
