//! Glyph coverage masks.
//!
//! A glyph is rendered into a mask the size of the whole canvas, centred on
//! its ink bounding box and then lifted slightly above centre. Outlines come
//! either from a font file or from one of the builtin vector shapes, so an
//! icon can be rendered on machines without the designer's fonts.

use crate::error::StyleError;
use anyhow::{Context, Result};
use image::{GrayImage, Luma};
use rusttype::{point, Font, Rect, Scale};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Builtin outlines, drawn in em units with y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Eighth note (♪)
    Note,
    /// Bold geometric "M"
    Monogram,
}

/// What to draw in the middle of the icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphSpec {
    /// Text rendered when a font is supplied
    pub text: String,
    /// Font size as a fraction of the canvas
    pub scale: f32,
    /// Upward nudge as a fraction of the canvas
    pub lift: f32,
    /// Outline used when no font is supplied
    pub shape: Shape,
}

impl Default for GlyphSpec {
    fn default() -> Self {
        Self {
            text: "♪".to_string(),
            scale: 0.9,
            lift: 0.02,
            shape: Shape::Note,
        }
    }
}

/// A loaded TrueType/OpenType face.
pub struct FontFace {
    font: Font<'static>,
}

impl FontFace {
    /// Load a font file; `index` selects the face inside a collection (.ttc).
    pub fn load(path: &Path, index: u32) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read font {}", path.display()))?;
        let font = Font::try_from_vec_and_index(bytes, index).with_context(|| {
            format!("Failed to parse face {index} of font {}", path.display())
        })?;
        Ok(Self { font })
    }
}

/// Render the glyph for `spec` into a `size`×`size` coverage mask.
pub fn glyph_mask(spec: &GlyphSpec, size: u32, font: Option<&FontFace>) -> Result<GrayImage> {
    let lift_px = (size as f32 * spec.lift) as i32;
    match font {
        Some(face) => font_mask(face, spec, size, lift_px),
        None => Ok(shape_mask(spec.shape, spec.scale * size as f32, size, lift_px)),
    }
}

/// Top-left corner that centres an ink box of `width`×`height` on the canvas.
fn centered_origin(size: u32, width: i32, height: i32, lift_px: i32) -> (i32, i32) {
    let size = size as i32;
    (
        (size - width).div_euclid(2),
        (size - height).div_euclid(2) - lift_px,
    )
}

fn font_mask(face: &FontFace, spec: &GlyphSpec, size: u32, lift_px: i32) -> Result<GrayImage> {
    let scale = Scale::uniform(spec.scale * size as f32);
    let ascent = face.font.v_metrics(scale).ascent;
    let glyphs: Vec<_> = face
        .font
        .layout(&spec.text, scale, point(0.0, ascent))
        .collect();

    let ink = glyphs
        .iter()
        .filter_map(|glyph| glyph.pixel_bounding_box())
        .reduce(|a, b| Rect {
            min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
            max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
        })
        .ok_or_else(|| StyleError::EmptyGlyph(spec.text.clone()))?;

    let (origin_x, origin_y) = centered_origin(size, ink.width(), ink.height(), lift_px);
    let (dx, dy) = (origin_x - ink.min.x, origin_y - ink.min.y);

    let mut mask = GrayImage::new(size, size);
    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let x = bb.min.x + gx as i32 + dx;
                let y = bb.min.y + gy as i32 + dy;
                if x >= 0 && y >= 0 && (x as u32) < size && (y as u32) < size {
                    let pixel = mask.get_pixel_mut(x as u32, y as u32);
                    pixel[0] = pixel[0].max((v * 255.0).round() as u8);
                }
            });
        }
    }

    tracing::debug!(text = %spec.text, width = ink.width(), height = ink.height(), "rendered font glyph");
    Ok(mask)
}

enum Primitive {
    Polygon(Vec<(f32, f32)>),
    Ellipse {
        center: (f32, f32),
        radii: (f32, f32),
        rotation_deg: f32,
    },
}

const NOTE_STEM: &[(f32, f32)] = &[(0.215, 0.02), (0.26, 0.02), (0.26, 0.53), (0.215, 0.53)];

/// Points per flag edge; enough that the curve shows no corners at 1024px.
const FLAG_SEGMENTS: usize = 24;

fn cubic(p: [(f32, f32); 4], t: f32) -> (f32, f32) {
    let u = 1.0 - t;
    let w = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
    p.iter()
        .zip(w)
        .fold((0.0, 0.0), |(x, y), (&(px, py), w)| (x + px * w, y + py * w))
}

/// Flag of the eighth note: an outer curve from the top of the stem down to
/// the tip, then an inner curve back up to the stem.
fn note_flag() -> Vec<(f32, f32)> {
    let outer = [(0.26, 0.02), (0.29, 0.10), (0.54, 0.20), (0.40, 0.44)];
    let inner = [(0.40, 0.44), (0.42, 0.30), (0.34, 0.21), (0.26, 0.18)];

    let mut points: Vec<(f32, f32)> = (0..=FLAG_SEGMENTS)
        .map(|i| cubic(outer, i as f32 / FLAG_SEGMENTS as f32))
        .collect();
    points.extend((1..=FLAG_SEGMENTS).map(|i| cubic(inner, i as f32 / FLAG_SEGMENTS as f32)));
    points
}

const MONOGRAM_M: &[(f32, f32)] = &[
    (0.0, 0.72),
    (0.0, 0.0),
    (0.17, 0.0),
    (0.33, 0.46),
    (0.49, 0.0),
    (0.66, 0.0),
    (0.66, 0.72),
    (0.53, 0.72),
    (0.53, 0.22),
    (0.385, 0.62),
    (0.275, 0.62),
    (0.13, 0.22),
    (0.13, 0.72),
];

impl Shape {
    fn primitives(self) -> Vec<Primitive> {
        match self {
            Shape::Note => vec![
                Primitive::Ellipse {
                    center: (0.13, 0.53),
                    radii: (0.13, 0.09),
                    rotation_deg: -20.0,
                },
                Primitive::Polygon(NOTE_STEM.to_vec()),
                Primitive::Polygon(note_flag()),
            ],
            Shape::Monogram => vec![Primitive::Polygon(MONOGRAM_M.to_vec())],
        }
    }
}

impl Primitive {
    fn bounds(&self) -> [f32; 4] {
        match self {
            Primitive::Polygon(points) => points.iter().fold(
                [f32::MAX, f32::MAX, f32::MIN, f32::MIN],
                |[x0, y0, x1, y1], &(x, y)| [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
            ),
            Primitive::Ellipse {
                center: (cx, cy),
                radii: (rx, ry),
                rotation_deg,
            } => {
                let (sin, cos) = rotation_deg.to_radians().sin_cos();
                let half_w = ((rx * cos).powi(2) + (ry * sin).powi(2)).sqrt();
                let half_h = ((rx * sin).powi(2) + (ry * cos).powi(2)).sqrt();
                [cx - half_w, cy - half_h, cx + half_w, cy + half_h]
            }
        }
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        match self {
            Primitive::Polygon(points) => polygon_contains(points, x, y),
            Primitive::Ellipse {
                center: (cx, cy),
                radii: (rx, ry),
                rotation_deg,
            } => {
                let (sin, cos) = rotation_deg.to_radians().sin_cos();
                let (dx, dy) = (x - cx, y - cy);
                let u = dx * cos + dy * sin;
                let v = -dx * sin + dy * cos;
                (u / rx).powi(2) + (v / ry).powi(2) <= 1.0
            }
        }
    }
}

// Even-odd rule
fn polygon_contains(points: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

const SUBSAMPLES: u32 = 4;

fn shape_mask(shape: Shape, em: f32, size: u32, lift_px: i32) -> GrayImage {
    let primitives = shape.primitives();
    let [x0, y0, x1, y1] = primitives.iter().map(Primitive::bounds).fold(
        [f32::MAX, f32::MAX, f32::MIN, f32::MIN],
        |[ax0, ay0, ax1, ay1], [bx0, by0, bx1, by1]| {
            [ax0.min(bx0), ay0.min(by0), ax1.max(bx1), ay1.max(by1)]
        },
    );

    let ink_width = (x1 - x0) * em;
    let ink_height = (y1 - y0) * em;
    let (origin_x, origin_y) = centered_origin(
        size,
        ink_width.round() as i32,
        ink_height.round() as i32,
        lift_px,
    );

    let mut mask = GrayImage::new(size, size);
    let x_start = origin_x.max(0) as u32;
    let y_start = origin_y.max(0) as u32;
    let x_end = ((origin_x as f32 + ink_width).ceil() as i64 + 1).clamp(0, size as i64) as u32;
    let y_end = ((origin_y as f32 + ink_height).ceil() as i64 + 1).clamp(0, size as i64) as u32;
    let step = 1.0 / SUBSAMPLES as f32;

    for y in y_start..y_end {
        for x in x_start..x_end {
            let mut hits = 0;
            for sy in 0..SUBSAMPLES {
                for sx in 0..SUBSAMPLES {
                    let px = x as f32 + (sx as f32 + 0.5) * step;
                    let py = y as f32 + (sy as f32 + 0.5) * step;
                    let u = (px - origin_x as f32) / em + x0;
                    let v = (py - origin_y as f32) / em + y0;
                    if primitives.iter().any(|p| p.contains(u, v)) {
                        hits += 1;
                    }
                }
            }
            if hits > 0 {
                let coverage = hits * 255 / (SUBSAMPLES * SUBSAMPLES);
                mask.put_pixel(x, y, Luma([coverage as u8]));
            }
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink_box(mask: &GrayImage) -> Option<(u32, u32, u32, u32)> {
        let mut found: Option<(u32, u32, u32, u32)> = None;
        for (x, y, p) in mask.enumerate_pixels() {
            if p[0] > 0 {
                found = Some(match found {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        found
    }

    fn spec(shape: Shape, lift: f32) -> GlyphSpec {
        GlyphSpec {
            text: "x".to_string(),
            scale: 0.6,
            lift,
            shape,
        }
    }

    #[test]
    fn test_builtin_shapes_are_centered() {
        for shape in [Shape::Note, Shape::Monogram] {
            let mask = glyph_mask(&spec(shape, 0.0), 200, None).unwrap();
            let (x0, y0, x1, y1) = ink_box(&mask).expect("shape should have ink");
            let cx = (x0 + x1) as f32 / 2.0;
            let cy = (y0 + y1) as f32 / 2.0;
            assert!((cx - 100.0).abs() <= 2.0, "{shape:?} x centre {cx}");
            assert!((cy - 100.0).abs() <= 2.0, "{shape:?} y centre {cy}");
        }
    }

    #[test]
    fn test_lift_moves_glyph_up() {
        let flat = glyph_mask(&spec(Shape::Monogram, 0.0), 200, None).unwrap();
        let lifted = glyph_mask(&spec(Shape::Monogram, 0.05), 200, None).unwrap();
        let (_, flat_top, _, _) = ink_box(&flat).unwrap();
        let (_, lifted_top, _, _) = ink_box(&lifted).unwrap();
        assert_eq!(flat_top - lifted_top, 10);
    }

    #[test]
    fn test_monogram_has_solid_strokes_and_a_notch() {
        let mask = glyph_mask(&spec(Shape::Monogram, 0.0), 200, None).unwrap();
        let (x0, y0, x1, y1) = ink_box(&mask).unwrap();
        // Left leg is solid
        assert_eq!(mask.get_pixel(x0 + 3, (y0 + y1) / 2)[0], 255);
        // Top centre sits inside the V notch
        assert_eq!(mask.get_pixel((x0 + x1) / 2, y0 + 2)[0], 0);
    }

    #[test]
    fn test_note_flag_curve_is_smooth() {
        let flag = note_flag();
        assert_eq!(flag.len(), 2 * FLAG_SEGMENTS + 1);
        assert_eq!(flag[FLAG_SEGMENTS], (0.40, 0.44));

        // Along each edge the outline never turns by more than a few degrees
        for edge in [&flag[..=FLAG_SEGMENTS], &flag[FLAG_SEGMENTS..]] {
            for w in edge.windows(3) {
                let (ax, ay) = (w[1].0 - w[0].0, w[1].1 - w[0].1);
                let (bx, by) = (w[2].0 - w[1].0, w[2].1 - w[1].1);
                let turn = (ax * by - ay * bx).atan2(ax * bx + ay * by).to_degrees();
                assert!(turn.abs() < 12.0, "corner of {turn} degrees at {:?}", w[1]);
            }
        }
    }

    #[test]
    fn test_polygon_contains() {
        let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert!(polygon_contains(&square, 0.5, 0.5));
        assert!(!polygon_contains(&square, 1.5, 0.5));
    }

    fn fixture_font() -> FontFace {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("DejaVuSansMono-Bold.ttf");
        FontFace::load(&path, 0).unwrap()
    }

    fn text(text: &str, lift: f32) -> GlyphSpec {
        GlyphSpec {
            text: text.to_string(),
            scale: 0.6,
            lift,
            shape: Shape::Monogram,
        }
    }

    #[test]
    fn test_font_text_is_centered_on_its_ink() {
        let font = fixture_font();
        let mask = glyph_mask(&text("M", 0.0), 200, Some(&font)).unwrap();
        let (x0, y0, x1, y1) = ink_box(&mask).expect("M should have ink");
        let cx = (x0 + x1) as f32 / 2.0;
        let cy = (y0 + y1) as f32 / 2.0;
        assert!((cx - 100.0).abs() <= 2.0, "x centre {cx}");
        assert!((cy - 100.0).abs() <= 2.0, "y centre {cy}");
        // Cap height of a 120px font, not a builtin outline
        assert!(y1 - y0 > 60 && y1 - y0 < 120, "ink height {}", y1 - y0);
    }

    #[test]
    fn test_font_text_is_lifted() {
        let font = fixture_font();
        let flat = glyph_mask(&text("M", 0.0), 200, Some(&font)).unwrap();
        let lifted = glyph_mask(&text("M", 0.05), 200, Some(&font)).unwrap();
        let (fx0, flat_top, _, _) = ink_box(&flat).unwrap();
        let (lx0, lifted_top, _, _) = ink_box(&lifted).unwrap();
        assert_eq!(flat_top - lifted_top, 10);
        assert_eq!(fx0, lx0);
    }

    #[test]
    fn test_font_text_without_ink_is_an_error() {
        let font = fixture_font();
        for blank in [" ", ""] {
            let err = glyph_mask(&text(blank, 0.0), 64, Some(&font)).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<StyleError>(), Some(StyleError::EmptyGlyph(t)) if t == blank),
                "{blank:?}: {err}"
            );
        }
    }

    #[test]
    fn test_font_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FontFace::load(&dir.path().join("missing.ttf"), 0).is_err());

        let junk = dir.path().join("junk.ttf");
        std::fs::write(&junk, b"definitely not a font").unwrap();
        assert!(FontFace::load(&junk, 0).is_err());
    }
}
