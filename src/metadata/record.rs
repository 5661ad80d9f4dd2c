//! The normalized EXIF record shown next to each frame.

use serde::{Deserialize, Serialize};

use super::format::{self, NOT_AVAILABLE, READ_ERROR};
use super::raw::ListingExif;

/// Normalized camera metadata for one photo.
///
/// Every field is a display string. Missing data is [`NOT_AVAILABLE`] and
/// unreadable assets are [`READ_ERROR`]; no field is ever empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exif {
    pub camera_model: String,
    pub lens_description: String,
    pub aperture_display: String,
    pub iso_display: String,
    pub shutter_display: String,
}

impl Exif {
    /// A record with every field set to `sentinel`.
    pub fn filled(sentinel: &str) -> Self {
        Self {
            camera_model: sentinel.to_string(),
            lens_description: sentinel.to_string(),
            aperture_display: sentinel.to_string(),
            iso_display: sentinel.to_string(),
            shutter_display: sentinel.to_string(),
        }
    }

    /// Record for a photo with no metadata at all.
    pub fn not_available() -> Self {
        Self::filled(NOT_AVAILABLE)
    }

    /// Record for a photo whose asset or tag block could not be read.
    pub fn read_error() -> Self {
        Self::filled(READ_ERROR)
    }

    /// Record built from a listing's pre-formatted summary block.
    ///
    /// The summary's shutter goes through the shutter rule again so decimal
    /// exposure times still render as fractions.
    pub fn from_summary(summary: &ListingExif) -> Self {
        Self {
            camera_model: format::camera_display(None, summary.model.as_ref()),
            lens_description: format::lens_display(summary.lens.as_ref(), None),
            aperture_display: summary
                .f_stop
                .as_ref()
                .filter(|v| !v.is_blank())
                .map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string()),
            iso_display: format::iso_display(summary.iso.as_ref()),
            shutter_display: format::shutter_display(summary.shutter.as_ref()),
        }
    }

    /// Labeled rows in detail-view order.
    pub fn rows(&self) -> [(&'static str, &str); 5] {
        [
            ("Camera", self.camera_model.as_str()),
            ("Lens", self.lens_description.as_str()),
            ("Aperture", self.aperture_display.as_str()),
            ("ISO", self.iso_display.as_str()),
            ("Shutter", self.shutter_display.as_str()),
        ]
    }

    /// `true` when every field is the read-error sentinel.
    pub fn is_read_error(&self) -> bool {
        self.rows().iter().all(|(_, value)| *value == READ_ERROR)
    }
}

impl Default for Exif {
    fn default() -> Self {
        Self::not_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::raw::RawValue;

    #[test]
    fn test_sentinel_records() {
        let na = Exif::not_available();
        assert!(na.rows().iter().all(|(_, v)| *v == NOT_AVAILABLE));
        assert!(!na.is_read_error());

        let err = Exif::read_error();
        assert!(err.is_read_error());
        assert_ne!(na, err);
    }

    #[test]
    fn test_from_summary() {
        let summary = ListingExif {
            iso: Some(RawValue::text("400")),
            shutter: Some(RawValue::text("0.008")),
            f_stop: Some(RawValue::text("f/2")),
            model: Some(RawValue::text("X100V")),
            lens: Some(RawValue::text("N/A")),
        };

        let exif = Exif::from_summary(&summary);
        assert_eq!(exif.camera_model, "X100V");
        assert_eq!(exif.lens_description, "N/A");
        assert_eq!(exif.aperture_display, "f/2");
        assert_eq!(exif.iso_display, "400");
        assert_eq!(exif.shutter_display, "1/125");
    }

    #[test]
    fn test_from_empty_summary() {
        assert_eq!(Exif::from_summary(&ListingExif::default()), Exif::not_available());
    }

    #[test]
    fn test_rows_order() {
        let labels: Vec<&str> = Exif::not_available().rows().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["Camera", "Lens", "Aperture", "ISO", "Shutter"]);
    }
}
