//! Contactsheet-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across contactsheet:
//!
//! - **Typed IDs**: A sequential [`PhotoId`] used as the join key between
//!   rendered targets and photo data
//! - **Core Types**: Enums for mark kinds, metadata states, and acquisition modes
//! - **Path Utilities**: Functions to detect image files and sequence numbers
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use contactsheet_common::{Error, MarkKind, PhotoId, Result};
//! use contactsheet_common::paths::is_image_file;
//! use std::path::Path;
//!
//! // Photo IDs are assigned in load order, starting at 1
//! let photo_id = PhotoId::from_index(0);
//! assert_eq!(photo_id.get(), 1);
//!
//! // Mark kinds
//! assert_eq!(MarkKind::ALL.len(), 3);
//!
//! // Check file types
//! assert!(is_image_file(Path::new("frame-01.jpg")));
//!
//! // Use common error types
//! fn example() -> Result<()> {
//!     Err(Error::not_found("photo"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, ExtractionError, Result};
pub use ids::*;
pub use types::*;
