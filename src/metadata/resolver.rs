//! Per-photo metadata resolution with a convergent cache.
//!
//! The [`MetadataResolver`] hides which acquisition mode is in use. In
//! pre-fetched mode resolution is a pure transform of the data attached to the
//! photo record; in on-demand mode the first request triggers a tag extraction
//! through the configured [`TagExtractor`]. Either way every photo resolves
//! exactly once: concurrent requests for the same photo share one in-flight
//! resolution and every later call returns the cached [`Resolution`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contactsheet_common::{AcquisitionMode, ExtractionError, MetadataState, PhotoId};
use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::extractor::TagExtractor;
use super::format::normalize;
use super::raw::PrefetchedExif;
use super::record::Exif;
use crate::photos::Photo;

/// Why a resolved record carries sentinel fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataIssue {
    /// The source carried no usable tags.
    Unavailable,
    /// The asset or its tag block could not be read.
    ExtractionFailed(ExtractionError),
}

/// Terminal outcome of resolving one photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub state: MetadataState,
    pub exif: Exif,
    pub issue: Option<MetadataIssue>,
}

impl Resolution {
    fn resolved(exif: Exif) -> Self {
        Self {
            state: MetadataState::Resolved,
            exif,
            issue: None,
        }
    }

    fn unavailable() -> Self {
        Self {
            state: MetadataState::Resolved,
            exif: Exif::not_available(),
            issue: Some(MetadataIssue::Unavailable),
        }
    }

    fn failed(error: ExtractionError) -> Self {
        Self {
            state: MetadataState::Failed,
            exif: Exif::read_error(),
            issue: Some(MetadataIssue::ExtractionFailed(error)),
        }
    }

    /// Resolve pre-fetched metadata without any I/O.
    pub fn from_prefetched(prefetched: Option<&PrefetchedExif>) -> Self {
        let Some(prefetched) = prefetched else {
            return Self::unavailable();
        };

        match (&prefetched.raw, &prefetched.summary) {
            (Some(raw), _) if !raw.is_empty() => Self::resolved(normalize(raw)),
            (_, Some(summary)) => Self::resolved(Exif::from_summary(summary)),
            _ => Self::unavailable(),
        }
    }
}

enum Acquisition {
    Prefetched,
    OnDemand(Arc<dyn TagExtractor>),
}

/// Resolves and caches normalized EXIF records keyed by [`PhotoId`].
pub struct MetadataResolver {
    acquisition: Acquisition,
    cache: DashMap<PhotoId, Arc<OnceCell<Resolution>>>,
    extractions: AtomicUsize,
}

impl MetadataResolver {
    /// Resolver for photos whose metadata came with the listing.
    pub fn prefetched() -> Self {
        Self::with_acquisition(Acquisition::Prefetched)
    }

    /// Resolver that extracts tags from each asset on first request.
    pub fn on_demand(extractor: Arc<dyn TagExtractor>) -> Self {
        Self::with_acquisition(Acquisition::OnDemand(extractor))
    }

    /// Resolver for the configured mode.
    pub fn for_mode(mode: AcquisitionMode, extractor: Arc<dyn TagExtractor>) -> Self {
        match mode {
            AcquisitionMode::Prefetched => Self::prefetched(),
            AcquisitionMode::OnDemand => Self::on_demand(extractor),
        }
    }

    fn with_acquisition(acquisition: Acquisition) -> Self {
        Self {
            acquisition,
            cache: DashMap::new(),
            extractions: AtomicUsize::new(0),
        }
    }

    /// The acquisition mode this resolver was built for.
    pub fn mode(&self) -> AcquisitionMode {
        match self.acquisition {
            Acquisition::Prefetched => AcquisitionMode::Prefetched,
            Acquisition::OnDemand(_) => AcquisitionMode::OnDemand,
        }
    }

    /// Resolve a photo to its display record.
    ///
    /// Never fails: unreadable assets produce a read-error record.
    pub async fn resolve(&self, photo: &Photo) -> Exif {
        self.resolution(photo).await.exif
    }

    /// Resolve a photo and return the full outcome.
    pub async fn resolution(&self, photo: &Photo) -> Resolution {
        let cell = self.cell(photo.id);
        cell.get_or_init(|| self.derive(photo)).await.clone()
    }

    /// Resolve without waiting.
    ///
    /// Returns the cached record, or resolves immediately in pre-fetched mode.
    /// In on-demand mode an unresolved photo yields `None`.
    pub fn resolve_now(&self, photo: &Photo) -> Option<Exif> {
        let cell = self.cell(photo.id);
        if let Some(resolution) = cell.get() {
            return Some(resolution.exif.clone());
        }

        match self.acquisition {
            Acquisition::Prefetched => {
                let resolution = Resolution::from_prefetched(photo.prefetched.as_ref());
                let exif = resolution.exif.clone();
                // A concurrent async resolution may already own the cell.
                let _ = cell.set(resolution);
                Some(cell.get().map_or(exif, |r| r.exif.clone()))
            }
            Acquisition::OnDemand(_) => None,
        }
    }

    /// Current state of a photo's metadata.
    pub fn state(&self, id: PhotoId) -> MetadataState {
        self.cached(id)
            .map_or(MetadataState::Unresolved, |resolution| resolution.state)
    }

    /// Cached outcome for a photo, if resolution has completed.
    pub fn cached(&self, id: PhotoId) -> Option<Resolution> {
        self.cache.get(&id).and_then(|cell| cell.get().cloned())
    }

    /// Number of tag extractions started so far.
    pub fn extraction_count(&self) -> usize {
        self.extractions.load(Ordering::Relaxed)
    }

    /// Forget every cached resolution (the photo set was rebuilt).
    pub fn reset(&self) {
        self.cache.clear();
    }

    fn cell(&self, id: PhotoId) -> Arc<OnceCell<Resolution>> {
        Arc::clone(&self.cache.entry(id).or_default())
    }

    async fn derive(&self, photo: &Photo) -> Resolution {
        match &self.acquisition {
            Acquisition::Prefetched => {
                let resolution = Resolution::from_prefetched(photo.prefetched.as_ref());
                if resolution.issue.is_some() {
                    debug!(photo_id = %photo.id, "No pre-fetched metadata; using placeholders");
                }
                resolution
            }
            Acquisition::OnDemand(extractor) => {
                self.extractions.fetch_add(1, Ordering::Relaxed);
                debug!(photo_id = %photo.id, source = %photo.source_ref, "Extracting tags");

                match extractor.extract(&photo.source_ref).await {
                    Ok(raw) if raw.is_empty() => Resolution {
                        state: MetadataState::Resolved,
                        exif: normalize(&raw),
                        issue: Some(MetadataIssue::Unavailable),
                    },
                    Ok(raw) => Resolution::resolved(normalize(&raw)),
                    Err(e) => {
                        warn!(
                            photo_id = %photo.id,
                            source = %photo.source_ref,
                            error = %e,
                            "Metadata extraction failed; showing error placeholders"
                        );
                        Resolution::failed(e)
                    }
                }
            }
        }
    }
}
