//! Contactsheet - digital contact sheet core
//!
//! This library crate exposes the metadata pipeline, the photo sources and the
//! annotation scheduler for the binary and for integration testing.

pub mod annotate;
pub mod config;
pub mod metadata;
pub mod photos;
pub mod sheet;
