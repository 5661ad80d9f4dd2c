//! Camera metadata acquisition and normalization.
//!
//! Photos carry raw EXIF tags in one of two ways: pre-fetched alongside the
//! listing, or embedded in the asset itself and extracted on first request.
//! Both paths converge on the same normalized [`Exif`] record.
//!
//! # Module layout
//!
//! - [`raw`] -- Raw tag values as they arrive from sources.
//! - [`format`] -- Display rules (shutter, aperture, lens, camera, ISO).
//! - [`record`] -- The normalized [`Exif`] record.
//! - [`extractor`] -- Loading assets and parsing their tag block.
//! - [`resolver`] -- Per-photo resolution with a convergent cache.

pub mod extractor;
pub mod format;
pub mod raw;
pub mod record;
pub mod resolver;

pub use extractor::{parse_tag_block, AssetTagExtractor, TagExtractor};
pub use format::{normalize, NOT_AVAILABLE, READ_ERROR};
pub use raw::{ListingExif, PrefetchedExif, RawExif, RawValue};
pub use record::Exif;
pub use resolver::{MetadataIssue, MetadataResolver, Resolution};
