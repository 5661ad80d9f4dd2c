//! Remote listing source.
//!
//! The listing endpoint returns every photo in one call, each entry already
//! carrying a summary block and the raw tags read server-side:
//!
//! ```json
//! {"images": [{"id": "...", "src": "...", "width": 4000, "height": 2667,
//!   "filename": "...", "public_id": "...",
//!   "exif": {"iso": "...", "shutter": "...", "fStop": "...", "model": "...", "lens": "..."},
//!   "exifRaw": {"ExposureTime": 0.004, "FNumber": 2}}]}
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use contactsheet_common::{Error, PhotoId};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{Photo, PhotoSource};
use crate::metadata::{ListingExif, PrefetchedExif, RawExif};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    images: Vec<ListingImage>,
}

/// Listing ids arrive as strings or bare numbers depending on the host.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingId {
    Number(i64),
    Text(String),
}

impl From<ListingId> for String {
    fn from(id: ListingId) -> Self {
        match id {
            ListingId::Number(n) => n.to_string(),
            ListingId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListingImage {
    #[serde(default)]
    id: Option<ListingId>,
    src: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    public_id: Option<String>,
    #[serde(default)]
    exif: Option<ListingExif>,
    #[serde(default, rename = "exifRaw")]
    exif_raw: Option<RawExif>,
}

impl ListingImage {
    fn into_photo(self, index: usize) -> Photo {
        Photo {
            id: PhotoId::from_index(index),
            source_ref: self.src,
            filename: self.filename,
            remote_id: self.id.map(String::from).or(self.public_id),
            width: self.width,
            height: self.height,
            prefetched: PrefetchedExif::from_parts(self.exif, self.exif_raw),
        }
    }
}

/// Photo source backed by a JSON listing endpoint.
pub struct RemoteListingSource {
    client: reqwest::Client,
    url: String,
    max_results: usize,
}

impl RemoteListingSource {
    pub fn new(url: impl Into<String>, max_results: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, url, max_results))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>, max_results: usize) -> Self {
        Self {
            client,
            url: url.into(),
            max_results,
        }
    }
}

#[async_trait]
impl PhotoSource for RemoteListingSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load(&self) -> Result<Vec<Photo>> {
        debug!(url = %self.url, "Fetching photo listing");

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Listing request failed: {}", self.url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!(Error::http(format!(
                "Listing request returned {}: {}",
                status,
                body.trim()
            )));
        }

        let listing: ListingResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse listing from {}", self.url))?;

        let total = listing.images.len();
        if total > self.max_results {
            warn!(
                total,
                max_results = self.max_results,
                "Listing exceeds max_results; truncating"
            );
        }

        let photos: Vec<Photo> = listing
            .images
            .into_iter()
            .take(self.max_results)
            .enumerate()
            .map(|(index, image)| image.into_photo(index))
            .collect();

        info!(count = photos.len(), "Loaded photos from listing");
        Ok(photos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RawValue;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(body: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/images"))
            .respond_with(body)
            .mount(&server)
            .await;
        server
    }

    fn listing_body() -> serde_json::Value {
        json!({
            "images": [
                {
                    "id": "a1",
                    "src": "https://cdn.example/1.jpg",
                    "width": 4000,
                    "height": 2667,
                    "filename": "roll1_01",
                    "public_id": "portfolio/roll1_01",
                    "exif": {"iso": "400", "shutter": "1/250", "fStop": "f/2", "model": "X100V", "lens": "N/A"},
                    "exifRaw": {"ExposureTime": 0.004, "FNumber": 2, "Model": "X100V"}
                },
                {
                    "id": "a2",
                    "src": "https://cdn.example/2.jpg",
                    "exifRaw": null
                },
                {
                    "src": "https://cdn.example/3.jpg",
                    "public_id": "portfolio/roll1_03"
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_load_listing() {
        let server = serve(ResponseTemplate::new(200).set_body_json(listing_body())).await;
        let source = RemoteListingSource::new(format!("{}/api/images", server.uri()), 500).unwrap();

        let photos = source.load().await.unwrap();
        assert_eq!(photos.len(), 3);

        let first = &photos[0];
        assert_eq!(first.id, PhotoId::new(1));
        assert_eq!(first.remote_id.as_deref(), Some("a1"));
        assert_eq!(first.width, Some(4000));
        let prefetched = first.prefetched.as_ref().unwrap();
        assert_eq!(
            prefetched.raw.as_ref().unwrap().f_number,
            Some(RawValue::Number(2.0))
        );
        assert_eq!(
            prefetched.summary.as_ref().unwrap().f_stop,
            Some(RawValue::text("f/2"))
        );

        assert!(photos[1].prefetched.is_none());
        assert_eq!(photos[2].id, PhotoId::new(3));
        assert_eq!(photos[2].remote_id.as_deref(), Some("portfolio/roll1_03"));
    }

    #[tokio::test]
    async fn test_listing_is_truncated() {
        let server = serve(ResponseTemplate::new(200).set_body_json(listing_body())).await;
        let source = RemoteListingSource::new(format!("{}/api/images", server.uri()), 2).unwrap();

        let photos = source.load().await.unwrap();
        assert_eq!(photos.len(), 2);
    }

    #[tokio::test]
    async fn test_listing_error_status() {
        let server = serve(ResponseTemplate::new(500).set_body_string("Failed to fetch images")).await;
        let source = RemoteListingSource::new(format!("{}/api/images", server.uri()), 500).unwrap();

        let err = source.load().await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("Failed to fetch images"));
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Http(_))));
    }

    #[tokio::test]
    async fn test_listing_numeric_ids() {
        let body = json!({
            "images": [
                {"id": 17, "src": "https://cdn.example/17.jpg"},
                {"id": "b2", "src": "https://cdn.example/b2.jpg"},
                {"id": null, "src": "https://cdn.example/3.jpg", "public_id": "roll/3"}
            ]
        });
        let server = serve(ResponseTemplate::new(200).set_body_json(body)).await;
        let source = RemoteListingSource::new(format!("{}/api/images", server.uri()), 500).unwrap();

        let photos = source.load().await.unwrap();
        assert_eq!(photos.len(), 3);
        assert_eq!(photos[0].remote_id.as_deref(), Some("17"));
        assert_eq!(photos[1].remote_id.as_deref(), Some("b2"));
        assert_eq!(photos[2].remote_id.as_deref(), Some("roll/3"));
    }

    #[tokio::test]
    async fn test_listing_malformed_body() {
        let server = serve(ResponseTemplate::new(200).set_body_string("<html>")).await;
        let source = RemoteListingSource::new(format!("{}/api/images", server.uri()), 500).unwrap();

        let err = source.load().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse listing"));
    }
}
