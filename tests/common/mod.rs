//! Shared fixtures for integration tests.
//!
//! Provides [`TestHarness`], a scratch directory of sequentially numbered
//! photos, plus helpers for writing tagged TIFF assets and config files.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use tempfile::TempDir;

/// Scratch directory holding photo assets and an optional config file.
pub struct TestHarness {
    pub dir: TempDir,
}

impl TestHarness {
    /// Create an empty harness.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// Create a harness with `count` untagged PNGs named `1.png`..`count.png`.
    pub fn with_pngs(count: u32) -> Self {
        let harness = Self::new();
        for n in 1..=count {
            harness.write_png(&format!("{n}.png"));
        }
        harness
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a small solid PNG with no embedded tags.
    pub fn write_png(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        image::RgbImage::from_pixel(8, 6, image::Rgb([200, 180, 40]))
            .save(&path)
            .expect("failed to write png");
        path
    }

    /// Write a TIFF carrying the sample camera tags.
    pub fn write_tagged_tiff(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, tagged_tiff()).expect("failed to write tiff");
        path
    }

    /// Write `contactsheet.toml` pointing a local source at this directory.
    pub fn write_local_config(&self, extra: &str) -> PathBuf {
        let body = format!(
            "[source]\nkind = \"local\"\nlocal_dir = {:?}\n\n{extra}",
            self.dir.path().display().to_string()
        );
        self.write_config(&body)
    }

    pub fn write_config(&self, body: &str) -> PathBuf {
        let path = self.dir.path().join("contactsheet.toml");
        std::fs::write(&path, body).expect("failed to write config");
        path
    }
}

/// Little-endian TIFF with FUJIFILM X100V tags: 1/250s, f/2, ISO 640, 23mm.
pub fn tagged_tiff() -> Vec<u8> {
    let fields = [
        Field {
            tag: Tag::Make,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"FUJIFILM".to_vec()]),
        },
        Field {
            tag: Tag::Model,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"X100V".to_vec()]),
        },
        Field {
            tag: Tag::ExposureTime,
            ifd_num: In::PRIMARY,
            value: Value::Rational(vec![Rational { num: 1, denom: 250 }]),
        },
        Field {
            tag: Tag::FNumber,
            ifd_num: In::PRIMARY,
            value: Value::Rational(vec![Rational { num: 20, denom: 10 }]),
        },
        Field {
            tag: Tag::PhotographicSensitivity,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![640]),
        },
        Field {
            tag: Tag::FocalLength,
            ifd_num: In::PRIMARY,
            value: Value::Rational(vec![Rational { num: 23, denom: 1 }]),
        },
    ];

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, true).expect("failed to encode tiff");
    buf.into_inner()
}
