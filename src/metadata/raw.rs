//! Raw, un-normalized metadata as it arrives from photo sources.
//!
//! Tag values come in three shapes: JSON numbers, strings (which may hold a
//! ratio such as `"1/250"`), and rationals read from a binary tag block.
//! [`RawValue`] keeps the original shape so the normalization rules can tell
//! an already-formatted fraction apart from a decimal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single raw tag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A plain number.
    Number(f64),
    /// Free text, possibly a ratio (`"28/10"`) or a decimal (`"0.004"`).
    Text(String),
    /// A numerator/denominator pair.
    Rational { numerator: i64, denominator: i64 },
}

impl RawValue {
    /// Build a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Build a rational value.
    pub fn rational(numerator: i64, denominator: i64) -> Self {
        Self::Rational {
            numerator,
            denominator,
        }
    }

    /// `true` for empty or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    /// Numeric value, dividing rationals and ratio strings.
    ///
    /// A zero denominator yields `0.0`. Text that is neither a decimal nor a
    /// ratio has no numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value).filter(|v| v.is_finite()),
            Self::Rational {
                numerator,
                denominator,
            } => Some(divide(*numerator as f64, *denominator as f64)),
            Self::Text(text) => parse_decimal(text).or_else(|| parse_ratio(text)),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{}", text.trim()),
            Self::Rational {
                numerator,
                denominator,
            } => write!(f, "{numerator}/{denominator}"),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Divide, mapping a zero denominator to zero instead of infinity.
pub(crate) fn divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Parse a plain decimal string.
pub(crate) fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a `numerator/denominator` string.
pub(crate) fn parse_ratio(text: &str) -> Option<f64> {
    let (numerator, denominator) = text.trim().split_once('/')?;
    let numerator = parse_decimal(numerator)?;
    let denominator = parse_decimal(denominator)?;
    Some(divide(numerator, denominator))
}

/// Raw EXIF tags, keyed by their standard tag names.
///
/// This is the `exifRaw` block of a listing entry, and also what the tag
/// extractor produces from an asset's binary tag block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExif {
    #[serde(
        rename = "ISOSpeedRatings",
        alias = "PhotographicSensitivity",
        alias = "ISO",
        skip_serializing_if = "Option::is_none"
    )]
    pub iso: Option<RawValue>,

    #[serde(rename = "ExposureTime", skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<RawValue>,

    #[serde(rename = "FNumber", skip_serializing_if = "Option::is_none")]
    pub f_number: Option<RawValue>,

    #[serde(rename = "ApertureValue", skip_serializing_if = "Option::is_none")]
    pub aperture_value: Option<RawValue>,

    #[serde(rename = "Make", skip_serializing_if = "Option::is_none")]
    pub make: Option<RawValue>,

    #[serde(rename = "Model", skip_serializing_if = "Option::is_none")]
    pub model: Option<RawValue>,

    #[serde(rename = "LensModel", skip_serializing_if = "Option::is_none")]
    pub lens_model: Option<RawValue>,

    #[serde(rename = "Lens", skip_serializing_if = "Option::is_none")]
    pub lens: Option<RawValue>,

    #[serde(rename = "FocalLength", skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<RawValue>,
}

impl RawExif {
    /// `true` when no tag carries a usable value.
    pub fn is_empty(&self) -> bool {
        [
            &self.iso,
            &self.exposure_time,
            &self.f_number,
            &self.aperture_value,
            &self.make,
            &self.model,
            &self.lens_model,
            &self.lens,
            &self.focal_length,
        ]
        .iter()
        .all(|field| field.as_ref().map_or(true, RawValue::is_blank))
    }
}

/// The pre-formatted summary block a listing call attaches to each entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingExif {
    pub iso: Option<RawValue>,
    pub shutter: Option<RawValue>,
    #[serde(rename = "fStop")]
    pub f_stop: Option<RawValue>,
    pub model: Option<RawValue>,
    pub lens: Option<RawValue>,
}

/// Metadata attached to a photo record before any resolution happens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefetchedExif {
    /// Server-formatted summary fields.
    pub summary: Option<ListingExif>,
    /// Raw tags, preferred over the summary when present.
    pub raw: Option<RawExif>,
}

impl PrefetchedExif {
    /// `None` when neither block is present.
    pub fn from_parts(summary: Option<ListingExif>, raw: Option<RawExif>) -> Option<Self> {
        if summary.is_none() && raw.is_none() {
            None
        } else {
            Some(Self { summary, raw })
        }
    }
}
