//! On-demand extraction of raw tags from an image asset.
//!
//! Extraction has two phases that fail independently: loading the asset bytes
//! (filesystem or HTTP), then parsing the embedded tag block. The
//! [`TagExtractor`] trait is the seam the resolver depends on; the
//! [`AssetTagExtractor`] is the real implementation.

use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use contactsheet_common::ExtractionError;
use exif::{In, Reader, Tag, Value};
use tracing::debug;

use super::raw::{RawExif, RawValue};

/// Async trait for anything that can turn a photo's source locator into raw
/// tags.
#[async_trait]
pub trait TagExtractor: Send + Sync {
    /// Load the asset at `source_ref` and read its tag block.
    async fn extract(&self, source_ref: &str) -> Result<RawExif, ExtractionError>;
}

/// Extractor that reads local files or downloads remote assets.
#[derive(Debug, Clone, Default)]
pub struct AssetTagExtractor {
    client: reqwest::Client,
}

impl AssetTagExtractor {
    /// Create an extractor with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn load(&self, source_ref: &str) -> Result<Vec<u8>, ExtractionError> {
        if source_ref.starts_with("http://") || source_ref.starts_with("https://") {
            let response = self
                .client
                .get(source_ref)
                .send()
                .await
                .map_err(|e| ExtractionError::load(source_ref, e.to_string()))?
                .error_for_status()
                .map_err(|e| ExtractionError::load(source_ref, e.to_string()))?;

            let bytes = response
                .bytes()
                .await
                .map_err(|e| ExtractionError::load(source_ref, e.to_string()))?;
            return Ok(bytes.to_vec());
        }

        let path = source_ref.strip_prefix("file://").unwrap_or(source_ref);
        tokio::fs::read(Path::new(path))
            .await
            .map_err(|e| ExtractionError::load(source_ref, e.to_string()))
    }
}

#[async_trait]
impl TagExtractor for AssetTagExtractor {
    async fn extract(&self, source_ref: &str) -> Result<RawExif, ExtractionError> {
        let bytes = self.load(source_ref).await?;
        debug!(source = %source_ref, bytes = bytes.len(), "Loaded asset for tag extraction");
        parse_tag_block(&bytes)
    }
}

/// Parse the tag block embedded in JPEG, TIFF, HEIF, PNG or WebP bytes.
///
/// A container without any tag block is a parse failure.
pub fn parse_tag_block(bytes: &[u8]) -> Result<RawExif, ExtractionError> {
    let mut cursor = Cursor::new(bytes);
    let exif = Reader::new()
        .read_from_container(&mut cursor)
        .map_err(|e| ExtractionError::parse(e.to_string()))?;

    let read = |tag: Tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|field| raw_value(&field.value))
    };

    Ok(RawExif {
        iso: read(Tag::PhotographicSensitivity),
        exposure_time: read(Tag::ExposureTime),
        f_number: read(Tag::FNumber),
        aperture_value: read(Tag::ApertureValue),
        make: read(Tag::Make),
        model: read(Tag::Model),
        lens_model: read(Tag::LensModel),
        lens: None,
        focal_length: read(Tag::FocalLength),
    })
}

/// First component of a tag value, keeping rationals as rationals.
fn raw_value(value: &Value) -> Option<RawValue> {
    match value {
        Value::Ascii(parts) => parts.first().map(|bytes| {
            let text = String::from_utf8_lossy(bytes);
            RawValue::text(text.trim_end_matches('\0').trim())
        }),
        Value::Rational(parts) => parts
            .first()
            .map(|r| RawValue::rational(i64::from(r.num), i64::from(r.denom))),
        Value::SRational(parts) => parts
            .first()
            .map(|r| RawValue::rational(i64::from(r.num), i64::from(r.denom))),
        Value::Short(parts) => parts.first().map(|v| RawValue::Number(f64::from(*v))),
        Value::Long(parts) => parts.first().map(|v| RawValue::Number(f64::from(*v))),
        Value::Byte(parts) => parts.first().map(|v| RawValue::Number(f64::from(*v))),
        Value::SShort(parts) => parts.first().map(|v| RawValue::Number(f64::from(*v))),
        Value::SLong(parts) => parts.first().map(|v| RawValue::Number(f64::from(*v))),
        Value::Float(parts) => parts.first().map(|v| RawValue::Number(f64::from(*v))),
        Value::Double(parts) => parts.first().map(|v| RawValue::Number(*v)),
        _ => None,
    }
}
