//! Typed photo identifier.
//!
//! Photos are numbered in load order starting at 1. The number is stable for
//! the lifetime of a loaded sheet and is the only key shared between rendered
//! targets and photo data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier for a photo within a loaded contact sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(u32);

impl PhotoId {
    /// Wrap a raw photo number.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// ID for the photo at zero-based `index` in load order.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    /// Return the raw photo number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Zero-based position in load order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0.saturating_sub(1) as usize
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhotoId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}

impl From<u32> for PhotoId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<PhotoId> for u32 {
    fn from(id: PhotoId) -> Self {
        id.0
    }
}
