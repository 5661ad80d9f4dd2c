//! Highlighter mark geometry.
//!
//! Marks are drawn in a 100x100 overlay box stretched over the photo. Every
//! call produces fresh geometry with bounded jitter so no two marks look the
//! same.

use std::f64::consts::PI;
use std::fmt::Write as _;
use std::time::Duration;

use contactsheet_common::{MarkKind, PhotoId};
use kurbo::{BezPath, Point, Shape};
use rand::Rng;

/// Side of the square overlay view box.
pub const VIEW_BOX: f64 = 100.0;

pub const HIGHLIGHTER_COLOR: &str = "#FFFD77";
pub const HIGHLIGHTER_OPACITY: f64 = 0.6;

const CENTER: Point = Point::new(VIEW_BOX / 2.0, VIEW_BOX / 2.0);
const CIRCLE_SEGMENTS: usize = 20;
const CIRCLE_RADIUS: f64 = 45.0;
const SQUARE_MARGIN: f64 = 15.0;
const SQUARE_SIZE: f64 = 70.0;
const SQUARE_JITTER: f64 = 8.0;
const PERIMETER_ACCURACY: f64 = 1e-3;

/// Uniform offset in `[-amount / 2, amount / 2)`.
fn jitter<R: Rng + ?Sized>(rng: &mut R, amount: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * amount
}

/// Stroke appearance of a mark.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: &'static str,
    pub opacity: f64,
    pub width: f64,
    pub line_cap: &'static str,
    pub line_join: &'static str,
}

impl StrokeStyle {
    /// Translucent yellow highlighter, 8 to 12 units wide.
    pub fn highlighter<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let width = 8.0 + rng.gen::<f64>() * 4.0;
        Self {
            color: HIGHLIGHTER_COLOR,
            opacity: HIGHLIGHTER_OPACITY,
            width: (width * 10.0).round() / 10.0,
            line_cap: "round",
            line_join: "round",
        }
    }
}

/// Fresh geometry for a mark of the given kind.
pub fn mark_path<R: Rng + ?Sized>(kind: MarkKind, rng: &mut R) -> BezPath {
    match kind {
        MarkKind::Circle => circle_path(rng),
        MarkKind::Underline => underline_path(rng),
        MarkKind::Square => square_path(rng),
    }
}

/// Closed polygon wobbling around a circle.
fn circle_path<R: Rng + ?Sized>(rng: &mut R) -> BezPath {
    let base_radius = CIRCLE_RADIUS + jitter(rng, 4.0);
    let mut path = BezPath::new();

    for i in 0..=CIRCLE_SEGMENTS {
        let angle = (i as f64 / CIRCLE_SEGMENTS as f64) * 2.0 * PI;
        let radius = base_radius + jitter(rng, 4.0);
        let angle = angle + jitter(rng, PI / CIRCLE_SEGMENTS as f64 / 4.0);
        let point = Point::new(
            CENTER.x + radius * angle.cos() + jitter(rng, 2.0),
            CENTER.y + radius * angle.sin() + jitter(rng, 2.0),
        );

        if i == 0 {
            path.move_to(point);
        } else {
            path.line_to(point);
        }
    }

    path.close_path();
    path
}

/// One cubic stroke across the lower part of the box.
fn underline_path<R: Rng + ?Sized>(rng: &mut R) -> BezPath {
    let start_x = 10.0 + rng.gen::<f64>() * 15.0;
    let end_x = 90.0 - rng.gen::<f64>() * 15.0;
    let y = 80.0 + rng.gen::<f64>() * 10.0;
    let span = end_x - start_x;

    let cp1 = Point::new(start_x + span * 0.25 + jitter(rng, 20.0), y + jitter(rng, 15.0));
    let cp2 = Point::new(start_x + span * 0.75 + jitter(rng, 20.0), y + jitter(rng, 15.0));

    let mut path = BezPath::new();
    path.move_to(Point::new(start_x, y));
    path.curve_to(cp1, cp2, Point::new(end_x, y));
    path
}

/// Jittered quadrilateral inset from the box edges.
fn square_path<R: Rng + ?Sized>(rng: &mut R) -> BezPath {
    let near = SQUARE_MARGIN;
    let far = SQUARE_MARGIN + SQUARE_SIZE;
    let corners = [(near, near), (far, near), (far, far), (near, far)];

    let mut path = BezPath::new();
    for (i, (x, y)) in corners.into_iter().enumerate() {
        let point = Point::new(x + jitter(rng, SQUARE_JITTER), y + jitter(rng, SQUARE_JITTER));
        if i == 0 {
            path.move_to(point);
        } else {
            path.line_to(point);
        }
    }
    path.close_path();
    path
}

/// A single draw instruction issued to a render surface.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub photo_id: PhotoId,
    pub kind: MarkKind,
    pub path: BezPath,
    pub style: StrokeStyle,
    /// Delay before the stroke starts. Always zero for scheduled marks.
    pub delay: Duration,
    pub duration: Duration,
    /// Total stroke length, used for the dash-offset reveal.
    pub length: f64,
}

impl DrawCommand {
    /// Generate a new mark for `photo_id`.
    pub fn generate<R: Rng + ?Sized>(
        photo_id: PhotoId,
        kind: MarkKind,
        duration: Duration,
        rng: &mut R,
    ) -> Self {
        let path = mark_path(kind, rng);
        let style = StrokeStyle::highlighter(rng);
        let length = path.perimeter(PERIMETER_ACCURACY);

        Self {
            photo_id,
            kind,
            path,
            style,
            delay: Duration::ZERO,
            duration,
            length,
        }
    }

    /// SVG path data (`d` attribute).
    pub fn path_data(&self) -> String {
        self.path.to_svg()
    }

    /// Standalone SVG overlay that reveals the stroke over `duration`.
    pub fn to_svg_document(&self) -> String {
        let length = format!("{:.2}", self.length);
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {VIEW_BOX} {VIEW_BOX}" preserveAspectRatio="none">"#
        );
        let _ = writeln!(
            svg,
            r#"  <path data-photo-id="{id}" data-mark="{kind}" d="{d}" fill="none" stroke="{color}" stroke-opacity="{opacity}" stroke-width="{width}" stroke-linecap="{cap}" stroke-linejoin="{join}" stroke-dasharray="{length}" stroke-dashoffset="{length}">"#,
            id = self.photo_id,
            kind = self.kind,
            d = self.path_data(),
            color = self.style.color,
            opacity = self.style.opacity,
            width = self.style.width,
            cap = self.style.line_cap,
            join = self.style.line_join,
        );
        let _ = writeln!(
            svg,
            r#"    <animate attributeName="stroke-dashoffset" from="{length}" to="0" begin="{begin}s" dur="{dur}s" fill="freeze" />"#,
            begin = self.delay.as_secs_f64(),
            dur = self.duration.as_secs_f64(),
        );
        svg.push_str("  </path>\n</svg>\n");
        svg
    }
}
