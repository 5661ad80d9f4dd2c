//! Display rules turning raw tag values into contact-sheet strings.
//!
//! Every function here returns a display string; absent or blank input
//! produces [`NOT_AVAILABLE`]. None of them can fail.

use super::raw::{RawExif, RawValue};
use super::record::Exif;

/// Sentinel for a tag that is not present in the source data.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel for a field whose asset or tag block could not be read.
pub const READ_ERROR: &str = "Error";

fn present(value: Option<&RawValue>) -> Option<&RawValue> {
    value.filter(|v| !v.is_blank())
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// ISO passes through unchanged.
pub fn iso_display(raw: Option<&RawValue>) -> String {
    present(raw).map_or_else(not_available, |v| v.to_string())
}

/// Exposure time in seconds as `1/<n>` below one second, `<n>s` otherwise.
///
/// # Examples
///
/// ```
/// use contactsheet::metadata::format::shutter_from_seconds;
///
/// assert_eq!(shutter_from_seconds(0.004), "1/250");
/// assert_eq!(shutter_from_seconds(2.4), "2s");
/// ```
pub fn shutter_from_seconds(seconds: f64) -> String {
    if seconds > 0.0 && seconds < 1.0 {
        let denominator = (1.0 / seconds).round();
        if denominator > 0.0 {
            return format!("1/{}", denominator as i64);
        }
    }
    format!("{}s", seconds.round() as i64)
}

/// Shutter speed from a raw exposure-time value.
///
/// A fraction string that does not lead with `0` is already in display form
/// and is returned verbatim. Values without a numeric reading fall back to
/// their text.
pub fn shutter_display(raw: Option<&RawValue>) -> String {
    let Some(raw) = present(raw) else {
        return not_available();
    };

    if let RawValue::Text(text) = raw {
        let text = text.trim();
        if text.contains('/') && !text.starts_with('0') {
            return text.to_string();
        }
    }

    match raw.as_f64() {
        Some(seconds) => shutter_from_seconds(seconds),
        None => raw.to_string(),
    }
}

/// Aperture from a direct f-number, falling back to an APEX aperture value.
///
/// The APEX branch is best-effort: the value is shown to one decimal place
/// rather than converted through `2^(Av/2)`.
pub fn aperture_display(f_number: Option<&RawValue>, aperture_value: Option<&RawValue>) -> String {
    if let Some(display) = present(f_number).and_then(f_number_display) {
        return display;
    }

    present(aperture_value)
        .and_then(RawValue::as_f64)
        .filter(|v| *v > 0.0)
        .map_or_else(not_available, |v| format!("f/{v:.1}"))
}

fn f_number_display(raw: &RawValue) -> Option<String> {
    match raw {
        RawValue::Text(text) if text.contains('/') => {
            let text = text.trim();
            if text.to_lowercase().starts_with("f/") {
                return Some(text.to_string());
            }
            raw.as_f64()
                .filter(|v| *v > 0.0)
                .map(|v| format!("f/{v}"))
        }
        RawValue::Text(text) => Some(format!("f/{}", text.trim())),
        _ => raw
            .as_f64()
            .filter(|v| *v > 0.0)
            .map(|v| format!("f/{v}")),
    }
}

/// Camera as `make model`, either part alone, or the sentinel.
pub fn camera_display(make: Option<&RawValue>, model: Option<&RawValue>) -> String {
    match (present(make), present(model)) {
        (Some(make), Some(model)) => format!("{make} {model}"),
        (Some(only), None) | (None, Some(only)) => only.to_string(),
        (None, None) => not_available(),
    }
}

/// Lens from an explicit lens tag, else a focal-length label.
pub fn lens_display(lens: Option<&RawValue>, focal_length: Option<&RawValue>) -> String {
    if let Some(lens) = present(lens) {
        return lens.to_string();
    }

    match present(focal_length) {
        Some(focal) => match focal.as_f64() {
            Some(mm) if mm > 0.0 => format!("{mm}mm"),
            Some(_) => not_available(),
            None => {
                let text = focal.to_string();
                if text.ends_with("mm") {
                    text
                } else {
                    format!("{text}mm")
                }
            }
        },
        None => not_available(),
    }
}

/// Normalize a full raw tag set.
pub fn normalize(raw: &RawExif) -> Exif {
    Exif {
        camera_model: camera_display(raw.make.as_ref(), raw.model.as_ref()),
        lens_description: lens_display(
            raw.lens_model.as_ref().or(raw.lens.as_ref()),
            raw.focal_length.as_ref(),
        ),
        aperture_display: aperture_display(raw.f_number.as_ref(), raw.aperture_value.as_ref()),
        iso_display: iso_display(raw.iso.as_ref()),
        shutter_display: shutter_display(raw.exposure_time.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> RawValue {
        RawValue::text(value)
    }

    #[test]
    fn test_shutter_sub_second() {
        for (seconds, expected) in [
            (0.004, "1/250"),
            (0.5, "1/2"),
            (1.0 / 60.0, "1/60"),
            (0.0333, "1/30"),
            (0.9, "1/1"),
        ] {
            assert_eq!(shutter_from_seconds(seconds), expected, "t = {seconds}");
        }
    }

    #[test]
    fn test_shutter_long_exposure() {
        assert_eq!(shutter_from_seconds(1.0), "1s");
        assert_eq!(shutter_from_seconds(2.5), "3s");
        assert_eq!(shutter_from_seconds(30.0), "30s");
        assert_eq!(shutter_from_seconds(0.0), "0s");
    }

    #[test]
    fn test_shutter_sub_second_property() {
        let mut t = 0.0001;
        while t < 1.0 {
            assert_eq!(shutter_from_seconds(t), format!("1/{}", (1.0 / t).round() as i64));
            t += 0.0173;
        }
    }

    #[test]
    fn test_shutter_fraction_passthrough() {
        assert_eq!(shutter_display(Some(&text("1/250"))), "1/250");
        assert_eq!(shutter_display(Some(&text("1/0"))), "1/0");
        assert_eq!(shutter_display(Some(&text("10/1"))), "10/1");
    }

    #[test]
    fn test_shutter_leading_zero_is_reparsed() {
        assert_eq!(shutter_display(Some(&text("0.004"))), "1/250");
        assert_eq!(shutter_display(Some(&text("0/0"))), "0s");
    }

    #[test]
    fn test_shutter_rational_and_zero_denominator() {
        assert_eq!(shutter_display(Some(&RawValue::rational(1, 125))), "1/125");
        assert_eq!(shutter_display(Some(&RawValue::rational(4, 1))), "4s");
        assert_eq!(shutter_display(Some(&RawValue::rational(1, 0))), "0s");
    }

    #[test]
    fn test_shutter_fallbacks() {
        assert_eq!(shutter_display(Some(&text("bulb"))), "bulb");
        assert_eq!(shutter_display(Some(&text(""))), NOT_AVAILABLE);
        assert_eq!(shutter_display(None), NOT_AVAILABLE);
    }

    #[test]
    fn test_aperture_f_number() {
        assert_eq!(aperture_display(Some(&RawValue::Number(1.8)), None), "f/1.8");
        assert_eq!(aperture_display(Some(&RawValue::Number(8.0)), None), "f/8");
        assert_eq!(aperture_display(Some(&RawValue::rational(28, 10)), None), "f/2.8");
        assert_eq!(aperture_display(Some(&text("5.6")), None), "f/5.6");
        assert_eq!(aperture_display(Some(&text("f/4")), None), "f/4");
    }

    #[test]
    fn test_aperture_apex_fallback() {
        assert_eq!(aperture_display(None, Some(&text("4/1"))), "f/4.0");
        assert_eq!(aperture_display(None, Some(&RawValue::Number(2.97))), "f/3.0");
        assert_eq!(aperture_display(None, Some(&RawValue::rational(7, 2))), "f/3.5");
        // A zero f-number (manual lens) falls through to the APEX value.
        assert_eq!(
            aperture_display(Some(&RawValue::rational(0, 0)), Some(&text("4/1"))),
            "f/4.0"
        );
    }

    #[test]
    fn test_aperture_missing() {
        assert_eq!(aperture_display(None, None), NOT_AVAILABLE);
        assert_eq!(aperture_display(None, Some(&text("wide open"))), NOT_AVAILABLE);
        assert_eq!(aperture_display(None, Some(&text("4/0"))), NOT_AVAILABLE);
    }

    #[test]
    fn test_iso() {
        assert_eq!(iso_display(Some(&RawValue::Number(400.0))), "400");
        assert_eq!(iso_display(Some(&text("3200"))), "3200");
        assert_eq!(iso_display(None), NOT_AVAILABLE);
    }

    #[test]
    fn test_camera() {
        assert_eq!(
            camera_display(Some(&text("FUJIFILM")), Some(&text("X100V"))),
            "FUJIFILM X100V"
        );
        assert_eq!(camera_display(None, Some(&text("X100V"))), "X100V");
        assert_eq!(camera_display(Some(&text("Leica")), None), "Leica");
        assert_eq!(camera_display(Some(&text(" ")), None), NOT_AVAILABLE);
    }

    #[test]
    fn test_lens() {
        assert_eq!(
            lens_display(Some(&text("XF23mmF2 R WR")), Some(&RawValue::Number(23.0))),
            "XF23mmF2 R WR"
        );
        assert_eq!(lens_display(None, Some(&RawValue::Number(35.0))), "35mm");
        assert_eq!(lens_display(None, Some(&RawValue::rational(505, 10))), "50.5mm");
        assert_eq!(lens_display(None, Some(&text("85 mm"))), "85 mm");
        assert_eq!(lens_display(None, None), NOT_AVAILABLE);
    }

    #[test]
    fn test_normalize_full() {
        let raw = RawExif {
            iso: Some(RawValue::Number(200.0)),
            exposure_time: Some(RawValue::rational(1, 500)),
            f_number: Some(RawValue::rational(16, 10)),
            make: Some(text("Canon")),
            model: Some(text("EOS R6")),
            lens_model: Some(text("RF50mm F1.8 STM")),
            ..Default::default()
        };

        let exif = normalize(&raw);
        assert_eq!(exif.camera_model, "Canon EOS R6");
        assert_eq!(exif.lens_description, "RF50mm F1.8 STM");
        assert_eq!(exif.aperture_display, "f/1.6");
        assert_eq!(exif.iso_display, "200");
        assert_eq!(exif.shutter_display, "1/500");
    }

    #[test]
    fn test_normalize_uses_lens_tag_when_lens_model_missing() {
        let raw = RawExif {
            lens: Some(text("Summicron 35")),
            ..Default::default()
        };
        assert_eq!(normalize(&raw).lens_description, "Summicron 35");
    }

    #[test]
    fn test_normalize_empty_and_malformed() {
        let empty = normalize(&RawExif::default());
        assert_eq!(empty, Exif::not_available());

        let malformed = RawExif {
            iso: Some(text("")),
            exposure_time: Some(text("??")),
            f_number: Some(RawValue::rational(0, 0)),
            aperture_value: Some(text("open")),
            focal_length: Some(RawValue::Number(-1.0)),
            ..Default::default()
        };
        let exif = normalize(&malformed);
        assert_eq!(exif.iso_display, NOT_AVAILABLE);
        assert_eq!(exif.shutter_display, "??");
        assert_eq!(exif.aperture_display, NOT_AVAILABLE);
        assert_eq!(exif.lens_description, NOT_AVAILABLE);
        assert!(exif.rows().iter().all(|(_, value)| !value.is_empty()));
    }
}
