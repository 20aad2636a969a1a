use crate::canvas::{
    add_noise, blur_mask, composite, ellipse_mask, linear_gradient, multiply_masks, paint_mask,
    paint_mask_with, radial_gradient, ramp_color, rim_mask, row_offset, shift_mask,
};
use crate::glyph::{glyph_mask, FontFace};
use crate::style::{GlyphFill, IconStyle, RadialGlow, REFERENCE_SIZE};
use anyhow::{Context, Result};
use image::{ImageOutputFormat, Rgba, RgbaImage};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    fs::{create_dir_all, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

/// Everything `generate` needs to write a batch of icons.
#[derive(Debug)]
pub struct GenerateOptions {
    pub output: PathBuf,
    pub size: u32,
    pub styles: Vec<IconStyle>,
    pub font: Option<PathBuf>,
    pub font_index: u32,
    pub seed: Option<u64>,
}

/// Scale a length given in reference pixels to the render size.
fn reference_px(value: f32, size: u32) -> f32 {
    value * size as f32 / REFERENCE_SIZE as f32
}

fn glow_layer(glow: &RadialGlow, size: u32) -> RgbaImage {
    let extent = size as f32;
    radial_gradient(
        size,
        (glow.center[0] * extent, glow.center[1] * extent),
        glow.radius * extent,
        Rgba(glow.inner),
        Rgba(glow.outer),
    )
}

/// Render one icon, bottom layer first.
pub fn render_icon<R: Rng + ?Sized>(
    style: &IconStyle,
    size: u32,
    font: Option<&FontFace>,
    rng: &mut R,
) -> Result<RgbaImage> {
    style.validate()?;
    let extent = size as f32;

    // Background and ambient light
    let bg = &style.background;
    let mut canvas = linear_gradient(size, Rgba(bg.from), Rgba(bg.to), bg.angle_deg);
    for glow in &style.glows {
        composite(&mut canvas, &glow_layer(glow, size));
    }
    add_noise(&mut canvas, style.noise, rng);

    let glass = &style.glass;
    let [x0, y0, x1, y1] = glass.bounds;
    let glass_mask = ellipse_mask(size, [x0 * extent, y0 * extent, x1 * extent, y1 * extent]);
    paint_mask(
        &mut canvas,
        &blur_mask(&glass_mask, glass.blur * extent),
        Rgba(glass.color),
    );

    // Glyph
    let glyph = glyph_mask(&style.glyph, size, font)?;

    let shadow = &style.shadow;
    let shadow_mask = shift_mask(
        &glyph,
        reference_px(shadow.offset[0], size).round() as i32,
        reference_px(shadow.offset[1], size).round() as i32,
    );
    paint_mask(
        &mut canvas,
        &blur_mask(&shadow_mask, reference_px(shadow.blur, size)),
        Rgba(shadow.color),
    );

    let bloom = &style.bloom;
    paint_mask(
        &mut canvas,
        &blur_mask(&glyph, reference_px(bloom.blur, size)),
        Rgba(bloom.color),
    );

    match &style.fill {
        GlyphFill::Solid { color } => paint_mask(&mut canvas, &glyph, Rgba(*color)),
        GlyphFill::Vertical { stops } => paint_mask_with(&mut canvas, &glyph, |_, y| {
            ramp_color(stops, row_offset(y, size))
        }),
    }

    for light in &style.inner_lights {
        let shifted = shift_mask(&glyph, 0, reference_px(light.offset_y, size).round() as i32);
        let blurred = blur_mask(&shifted, reference_px(light.blur, size));
        paint_mask(&mut canvas, &multiply_masks(&blurred, &glyph), Rgba(light.color));
    }

    // Finish
    composite(&mut canvas, &glow_layer(&style.vignette, size));

    let rim = &style.rim;
    let rim_mask = rim_mask(
        size,
        reference_px(rim.thickness, size),
        style.corner_radius * extent,
    );
    paint_mask(
        &mut canvas,
        &blur_mask(&rim_mask, reference_px(rim.blur, size)),
        Rgba(rim.color),
    );

    Ok(canvas)
}

/// File name for a rendered style, e.g. `ticket_icon_1024.png`.
pub fn icon_file_name(style: &IconStyle, size: u32) -> String {
    format!("{}_icon_{size}.png", style.name)
}

/// Render every requested style and write them into the output directory.
pub fn generate(opts: &GenerateOptions) -> Result<Vec<PathBuf>> {
    if opts.size == 0 {
        anyhow::bail!("Icon size must be at least 1 pixel");
    }

    create_dir_all(&opts.output).context("Can't create output directory")?;

    let font = opts
        .font
        .as_deref()
        .map(|path| FontFace::load(path, opts.font_index))
        .transpose()?;

    let seed = opts.seed.unwrap_or_else(|| rand::thread_rng().gen());
    tracing::info!(seed, size = opts.size, "rendering icons");

    let mut written = Vec::new();
    for style in &opts.styles {
        println!("Generating {} icon...", style.name);

        let mut rng = StdRng::seed_from_u64(seed);
        let icon = render_icon(style, opts.size, font.as_ref(), &mut rng)
            .with_context(|| format!("Failed to render {} icon", style.name))?;

        let path = opts.output.join(icon_file_name(style, opts.size));
        save_png(&icon, &path)?;
        println!("✓ {} icon saved: {}", style.name, path.display());
        written.push(path);
    }

    Ok(written)
}

pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create PNG file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    image
        .write_to(&mut writer, ImageOutputFormat::Png)
        .context("Failed to write PNG")?;
    Ok(())
}
