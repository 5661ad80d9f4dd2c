//! Shared-drive link source.
//!
//! Share links (`https://drive.google.com/file/d/<ID>/view?usp=sharing`) do
//! not serve image bytes. They are rewritten to the thumbnail endpoint, which
//! does.

use std::sync::OnceLock;

use anyhow::Result;
use async_trait::async_trait;
use contactsheet_common::PhotoId;
use regex::Regex;
use tracing::{info, warn};

use super::{Photo, PhotoSource};

const THUMBNAIL_WIDTH: &str = "w800";

fn share_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/file/d/([A-Za-z0-9_-]+)").expect("valid share link pattern"))
}

/// Rewrite a share link to a directly loadable thumbnail URL.
///
/// Thumbnail links and unrecognized URLs are returned unchanged.
///
/// # Examples
///
/// ```
/// use contactsheet::photos::convert_drive_url;
///
/// assert_eq!(
///     convert_drive_url("https://drive.google.com/file/d/abc123/view?usp=sharing"),
///     "https://drive.google.com/thumbnail?id=abc123&sz=w800"
/// );
/// ```
pub fn convert_drive_url(url: &str) -> String {
    if let Some(captures) = share_link_pattern().captures(url) {
        return format!(
            "https://drive.google.com/thumbnail?id={}&sz={THUMBNAIL_WIDTH}",
            &captures[1]
        );
    }

    if !url.contains("thumbnail?id=") {
        warn!(url, "Unrecognized drive URL; using it as-is");
    }
    url.to_string()
}

/// Photo source over a fixed list of shared-drive links.
pub struct DriveLinkSource {
    urls: Vec<String>,
}

impl DriveLinkSource {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }
}

#[async_trait]
impl PhotoSource for DriveLinkSource {
    fn name(&self) -> &'static str {
        "drive"
    }

    async fn load(&self) -> Result<Vec<Photo>> {
        let photos: Vec<Photo> = self
            .urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .enumerate()
            .map(|(index, url)| Photo::new(PhotoId::from_index(index), convert_drive_url(url)))
            .collect();

        info!(count = photos.len(), "Loaded photos from drive links");
        Ok(photos)
    }
}
