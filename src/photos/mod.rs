//! Photo records and the sources that produce them.
//!
//! A [`PhotoSource`] yields the ordered photo set for one load. Ids are
//! assigned by position (index + 1) and are the sole join key between the
//! grid, the metadata resolver and the annotation scheduler.
//!
//! - [`listing`] -- Remote JSON listing with inline metadata.
//! - [`local`] -- Directory of sequentially named image files.
//! - [`drive`] -- Shared-drive share links rewritten to thumbnail URLs.

pub mod drive;
pub mod listing;
pub mod local;

use anyhow::Result;
use async_trait::async_trait;
use contactsheet_common::PhotoId;
use serde::Serialize;

use crate::config::{Config, SourceKind};
use crate::metadata::PrefetchedExif;

pub use drive::{convert_drive_url, DriveLinkSource};
pub use listing::RemoteListingSource;
pub use local::LocalDirectorySource;

/// One photograph on the sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photo {
    pub id: PhotoId,
    /// URL or filesystem path of the asset.
    pub source_ref: String,
    pub filename: Option<String>,
    /// Identifier assigned by the media host, if any.
    pub remote_id: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Metadata that arrived with the record.
    pub prefetched: Option<PrefetchedExif>,
}

impl Photo {
    pub fn new(id: PhotoId, source_ref: impl Into<String>) -> Self {
        Self {
            id,
            source_ref: source_ref.into(),
            filename: None,
            remote_id: None,
            width: None,
            height: None,
            prefetched: None,
        }
    }

    /// Name to show for the photo: the filename, else the last path segment.
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or_else(|| {
            self.source_ref
                .rsplit(['/', '\\'])
                .find(|segment| !segment.is_empty())
                .unwrap_or(&self.source_ref)
        })
    }
}

/// Anything that can produce the photo set for a sheet.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Load every photo, in display order, with ids already assigned.
    async fn load(&self) -> Result<Vec<Photo>>;
}

/// Build the source described by the configuration.
pub fn source_from_config(config: &Config, client: reqwest::Client) -> Result<Box<dyn PhotoSource>> {
    let source = &config.source;
    Ok(match source.kind {
        SourceKind::Remote => {
            let url = source
                .listing_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("Remote source requires a listing_url"))?;
            Box::new(RemoteListingSource::with_client(client, url, source.max_results))
        }
        SourceKind::Local => {
            let dir = source
                .local_dir
                .clone()
                .ok_or_else(|| anyhow::anyhow!("Local source requires a local_dir"))?;
            Box::new(LocalDirectorySource::new(dir))
        }
        SourceKind::Drive => Box::new(DriveLinkSource::new(source.drive_urls.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let mut photo = Photo::new(PhotoId::new(1), "https://cdn.example/portfolio/roll-1/12.jpg");
        assert_eq!(photo.display_name(), "12.jpg");

        photo.filename = Some("DSCF0042.JPG".into());
        assert_eq!(photo.display_name(), "DSCF0042.JPG");

        let bare = Photo::new(PhotoId::new(2), "13.jpg");
        assert_eq!(bare.display_name(), "13.jpg");
    }

    #[test]
    fn test_source_from_config() {
        let client = reqwest::Client::new();

        let config = Config::default();
        assert_eq!(source_from_config(&config, client.clone()).unwrap().name(), "local");

        let mut config = Config::default();
        config.source.kind = SourceKind::Remote;
        assert!(source_from_config(&config, client.clone()).is_err());

        config.source.listing_url = Some("https://example.com/api/images".into());
        assert_eq!(source_from_config(&config, client.clone()).unwrap().name(), "remote");

        config.source.kind = SourceKind::Drive;
        assert_eq!(source_from_config(&config, client).unwrap().name(), "drive");
    }
}
