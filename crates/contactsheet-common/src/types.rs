//! Core type definitions for marks, metadata resolution, and acquisition.
//!
//! All enums are serialized in lowercase (snake case for multi-word variants)
//! so they can be written directly in configuration files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shape of a highlighter mark drawn over a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    /// A closed, hand-drawn loop around the frame.
    Circle,
    /// A single curved stroke beneath the frame.
    Underline,
    /// A jittered box around the frame.
    Square,
}

impl MarkKind {
    /// Every mark kind, in declaration order.
    pub const ALL: [MarkKind; 3] = [MarkKind::Circle, MarkKind::Underline, MarkKind::Square];
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circle => write!(f, "circle"),
            Self::Underline => write!(f, "underline"),
            Self::Square => write!(f, "square"),
        }
    }
}

impl FromStr for MarkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "circle" => Ok(Self::Circle),
            "underline" => Ok(Self::Underline),
            "square" => Ok(Self::Square),
            other => Err(format!("unknown mark kind: {other}")),
        }
    }
}

/// Resolution state of a photo's metadata.
///
/// Transitions exactly once, from `Unresolved` to one of the terminal states.
/// A `Failed` photo still carries a fully populated (sentinel) record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataState {
    /// No resolution has completed yet.
    Unresolved,
    /// Metadata was read (possibly with "not available" fields).
    Resolved,
    /// The asset or its tag block could not be read.
    Failed,
}

impl MetadataState {
    /// Whether resolution has completed, successfully or not.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

impl fmt::Display for MetadataState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => write!(f, "unresolved"),
            Self::Resolved => write!(f, "resolved"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// How raw metadata reaches the resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionMode {
    /// Metadata arrives attached to the photo record from a listing call.
    #[default]
    Prefetched,
    /// Metadata is read from the asset's tag block on first request.
    OnDemand,
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefetched => write!(f, "prefetched"),
            Self::OnDemand => write!(f, "on_demand"),
        }
    }
}
