//! Pixel primitives for building an icon out of layers.
//!
//! Every colour image here is straight-alpha RGBA8. Shapes are produced as
//! single-channel coverage masks (`GrayImage`, 0 = empty, 255 = fully covered)
//! so that blurring and clipping only ever touch one channel; a mask becomes
//! colour when it is painted onto the canvas with [`paint_mask`].

use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One stop of a multi-stop colour ramp. `offset` runs from 0.0 to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: [u8; 4],
}

fn lerp_channel(from: u8, to: u8, t: f32) -> u8 {
    (from as f32 + (to as f32 - from as f32) * t) as u8
}

/// Per-channel linear interpolation, truncating like an integer cast.
pub fn lerp(from: Rgba<u8>, to: Rgba<u8>, t: f32) -> Rgba<u8> {
    Rgba([
        lerp_channel(from[0], to[0], t),
        lerp_channel(from[1], to[1], t),
        lerp_channel(from[2], to[2], t),
        lerp_channel(from[3], to[3], t),
    ])
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Linear gradient across a square canvas.
///
/// `angle_deg` rotates the gradient axis; 0 runs from `from` at the top to
/// `to` at the bottom.
pub fn linear_gradient(size: u32, from: Rgba<u8>, to: Rgba<u8>, angle_deg: f32) -> RgbaImage {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    let extent = size as f32;
    let half = extent / 2.0;

    RgbaImage::from_fn(size, size, |x, y| {
        let nx = (x as f32 - half) / extent;
        let ny = (y as f32 - half) / extent;
        let t = (nx * sin_a + ny * cos_a + 0.5).clamp(0.0, 1.0);
        lerp(from, to, t)
    })
}

/// Radial gradient eased with smoothstep, `inner` at `center` and `outer`
/// from `radius` outwards. `center` and `radius` are in pixels.
pub fn radial_gradient(
    size: u32,
    center: (f32, f32),
    radius: f32,
    inner: Rgba<u8>,
    outer: Rgba<u8>,
) -> RgbaImage {
    let (cx, cy) = center;

    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let distance = (dx * dx + dy * dy).sqrt();
        let t = if radius > 0.0 {
            (distance / radius).min(1.0)
        } else {
            1.0
        };
        lerp(inner, outer, smoothstep(t))
    })
}

/// Colour of a multi-stop ramp at `t`. Stops must be sorted by offset.
pub fn ramp_color(stops: &[ColorStop], t: f32) -> Rgba<u8> {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Rgba([0, 0, 0, 0]),
    };

    if t <= first.offset {
        return Rgba(first.color);
    }

    for pair in stops.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);
        if t < end.offset {
            let span = end.offset - start.offset;
            let local = if span > 0.0 {
                (t - start.offset) / span
            } else {
                0.0
            };
            return lerp(Rgba(start.color), Rgba(end.color), local);
        }
    }

    Rgba(last.color)
}

/// Vertical position of row `y` on a ramp covering the whole canvas height.
pub fn row_offset(y: u32, height: u32) -> f32 {
    if height <= 1 {
        0.0
    } else {
        y as f32 / (height - 1) as f32
    }
}

/// Film-grain noise: one random offset in `[-amount, amount]` per pixel,
/// shared by the three colour channels. Alpha is left alone.
pub fn add_noise<R: Rng + ?Sized>(image: &mut RgbaImage, amount: u8, rng: &mut R) {
    if amount == 0 {
        return;
    }
    let amount = i16::from(amount);

    for pixel in image.pixels_mut() {
        let noise = rng.gen_range(-amount..=amount);
        for channel in pixel.0.iter_mut().take(3) {
            *channel = (i16::from(*channel) + noise).clamp(0, 255) as u8;
        }
    }
}

/// Porter-Duff "over" for straight-alpha pixels.
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let src_a = f32::from(src[3]) / 255.0;
    if src_a <= 0.0 {
        return;
    }
    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    for c in 0..3 {
        let mixed = (f32::from(src[c]) * src_a + f32::from(dst[c]) * dst_a * (1.0 - src_a)) / out_a;
        dst[c] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Composite a layer of the same size over `dst`.
pub fn composite(dst: &mut RgbaImage, layer: &RgbaImage) {
    for (dst, src) in dst.pixels_mut().zip(layer.pixels()) {
        blend_over(dst, *src);
    }
}

fn scale_alpha(alpha: u8, coverage: u8) -> u8 {
    ((u16::from(alpha) * u16::from(coverage) + 127) / 255) as u8
}

/// Paint a solid colour through a coverage mask.
pub fn paint_mask(dst: &mut RgbaImage, mask: &GrayImage, color: Rgba<u8>) {
    paint_mask_with(dst, mask, |_, _| color);
}

/// Paint through a coverage mask with a colour chosen per pixel.
pub fn paint_mask_with<F>(dst: &mut RgbaImage, mask: &GrayImage, mut paint: F)
where
    F: FnMut(u32, u32) -> Rgba<u8>,
{
    for (x, y, coverage) in mask.enumerate_pixels() {
        let coverage = coverage[0];
        if coverage == 0 || x >= dst.width() || y >= dst.height() {
            continue;
        }

        let mut src = paint(x, y);
        src[3] = scale_alpha(src[3], coverage);
        if src[3] == 0 {
            continue;
        }
        blend_over(dst.get_pixel_mut(x, y), src);
    }
}

/// Gaussian blur of a coverage mask.
///
/// Wide blurs run on a downscaled copy that is scaled back up afterwards.
pub fn blur_mask(mask: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return mask.clone();
    }

    let factor = (sigma / 4.0).floor() as u32;
    if factor < 2 {
        return imageops::blur(mask, sigma);
    }

    let (width, height) = mask.dimensions();
    let small = imageops::resize(
        mask,
        (width / factor).max(1),
        (height / factor).max(1),
        imageops::FilterType::Triangle,
    );
    let blurred = imageops::blur(&small, sigma / factor as f32);
    imageops::resize(&blurred, width, height, imageops::FilterType::Triangle)
}

/// Coverage intersection of two masks of the same size.
pub fn multiply_masks(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let other = if x < b.width() && y < b.height() {
            b.get_pixel(x, y)[0]
        } else {
            0
        };
        Luma([scale_alpha(a.get_pixel(x, y)[0], other)])
    })
}

/// Move a mask by whole pixels; uncovered area becomes empty.
pub fn shift_mask(mask: &GrayImage, dx: i32, dy: i32) -> GrayImage {
    let (width, height) = mask.dimensions();

    GrayImage::from_fn(width, height, |x, y| {
        let sx = i64::from(x) - i64::from(dx);
        let sy = i64::from(y) - i64::from(dy);
        if sx >= 0 && sy >= 0 && sx < i64::from(width) && sy < i64::from(height) {
            *mask.get_pixel(sx as u32, sy as u32)
        } else {
            Luma([0])
        }
    })
}

fn coverage_from_distance(signed_distance: f32) -> u8 {
    ((0.5 - signed_distance).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Anti-aliased filled ellipse inscribed in `bounds = [x0, y0, x1, y1]`
/// (pixels). The box may extend past the canvas edges.
pub fn ellipse_mask(size: u32, bounds: [f32; 4]) -> GrayImage {
    let [x0, y0, x1, y1] = bounds;
    let cx = (x0 + x1) / 2.0;
    let cy = (y0 + y1) / 2.0;
    let rx = ((x1 - x0) / 2.0).abs();
    let ry = ((y1 - y0) / 2.0).abs();

    if rx <= 0.0 || ry <= 0.0 {
        return GrayImage::new(size, size);
    }

    let min_radius = rx.min(ry);
    GrayImage::from_fn(size, size, |x, y| {
        let u = (x as f32 + 0.5 - cx) / rx;
        let v = (y as f32 + 0.5 - cy) / ry;
        let distance = ((u * u + v * v).sqrt() - 1.0) * min_radius;
        Luma([coverage_from_distance(distance)])
    })
}

/// Anti-aliased rounded rectangle filling the canvas minus `inset` pixels on
/// every side.
pub fn rounded_rect_mask(size: u32, inset: f32, radius: f32) -> GrayImage {
    let center = size as f32 / 2.0;
    let half = (center - inset).max(0.0);
    let radius = radius.clamp(0.0, half);

    GrayImage::from_fn(size, size, |x, y| {
        let qx = (x as f32 + 0.5 - center).abs() - (half - radius);
        let qy = (y as f32 + 0.5 - center).abs() - (half - radius);
        let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
        let inside = qx.max(qy).min(0.0);
        Luma([coverage_from_distance(outside + inside - radius)])
    })
}

/// Thin rounded-rectangle ring along the canvas border.
pub fn rim_mask(size: u32, thickness: f32, corner_radius: f32) -> GrayImage {
    let outer = rounded_rect_mask(size, 0.0, corner_radius);
    let inner = rounded_rect_mask(size, thickness, (corner_radius - thickness).max(1.0));

    GrayImage::from_fn(size, size, |x, y| {
        let outer = outer.get_pixel(x, y)[0];
        let inner = inner.get_pixel(x, y)[0];
        Luma([outer.saturating_sub(inner)])
    })
}
