use crate::canvas::composite;
use crate::contents_json::{write_contents_json, ImageEntry};
use crate::targets::{Format, Manifest, TargetGroup};
use anyhow::{Context, Result};
use icns::{IconFamily, IconType};
use image::{
    codecs::{
        ico::{IcoEncoder, IcoFrame},
        png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    },
    imageops::FilterType,
    ColorType, DynamicImage, ImageEncoder, Rgba, RgbaImage,
};
use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Standard frames of a Windows icon.
const ICO_SIZES: [u32; 6] = [16, 24, 32, 48, 64, 256];

/// Apple icon family entries as (pixels, ostype).
const ICNS_ENTRIES: [(u32, &str); 10] = [
    (16, "is32"),
    (32, "ic11"),
    (32, "il32"),
    (64, "ic12"),
    (128, "ic07"),
    (256, "ic13"),
    (256, "ic08"),
    (512, "ic14"),
    (512, "ic09"),
    (1024, "ic10"),
];

#[derive(Debug)]
pub struct ApplyOptions {
    /// Square source image
    pub source: PathBuf,
    /// Directory the target paths are relative to
    pub project: PathBuf,
    pub manifest: Manifest,
    /// Group names to write; empty writes every group
    pub groups: Vec<String>,
    pub contents_json: bool,
    /// Backdrop for groups that must be opaque
    pub background: Rgba<u8>,
}

/// Files written by [`apply_icons`], in the order they were written.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub written: Vec<PathBuf>,
}

pub fn apply_icons(opts: &ApplyOptions) -> Result<ApplyReport> {
    opts.manifest.validate()?;
    let groups = opts.manifest.select(&opts.groups)?;
    let source = load_image(&opts.source)?;

    tracing::info!(
        source = %opts.source.display(),
        project = %opts.project.display(),
        groups = groups.len(),
        "applying icons"
    );

    let mut report = ApplyReport::default();
    for group in groups {
        println!("\n{}:", group.name);

        let flattened;
        let base = if group.flatten {
            flattened = flatten(&source, opts.background);
            &flattened
        } else {
            &source
        };

        for target in &group.targets {
            let out_path = opts.project.join(&target.path);
            if let Some(parent) = out_path.parent() {
                create_dir_all(parent)
                    .with_context(|| format!("Can't create directory {}", parent.display()))?;
            }

            match target.format {
                Format::Png => write_resized_png(base, target.size, &out_path)?,
                Format::Ico => write_ico(base, target.size, &out_path)?,
                Format::Icns => write_icns(base, target.size, &out_path)?,
            }
            println!("  {0}x{0} → {1}", target.size, target.path);
            report.written.push(out_path);
        }

        if opts.contents_json {
            for (dir, images) in catalog_entries(group) {
                let path = write_contents_json(&opts.project.join(&dir), images)?;
                println!("  ✓ Generated {}", dir.join("Contents.json").display());
                report.written.push(path);
            }
        }
    }

    Ok(report)
}

fn load_image(path: &Path) -> Result<DynamicImage> {
    let source = image::open(path)
        .with_context(|| format!("Failed to load image {}", path.display()))?;

    // Ensure the image is square
    if source.width() != source.height() {
        anyhow::bail!(
            "Source image must be square (width == height), got {}x{}",
            source.width(),
            source.height()
        );
    }

    Ok(source)
}

/// Composite the source onto an opaque background colour.
fn flatten(source: &DynamicImage, background: Rgba<u8>) -> DynamicImage {
    let Rgba([r, g, b, _]) = background;
    let mut canvas = RgbaImage::from_pixel(source.width(), source.height(), Rgba([r, g, b, 255]));
    composite(&mut canvas, &source.to_rgba8());
    DynamicImage::ImageRgba8(canvas)
}

/// Asset catalog entries per icon set directory, in target order.
fn catalog_entries(group: &TargetGroup) -> Vec<(PathBuf, Vec<ImageEntry>)> {
    let mut dirs: Vec<(PathBuf, Vec<ImageEntry>)> = Vec::new();

    for target in group.targets.iter().filter(|t| !t.catalog.is_empty()) {
        let path = Path::new(&target.path);
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let entries = target.catalog.iter().map(|slot| ImageEntry {
            filename: filename.clone(),
            idiom: slot.idiom.clone(),
            scale: slot.scale.clone(),
            size: slot.size.clone(),
            role: slot.role.clone(),
        });

        match dirs.iter_mut().find(|(existing, _)| *existing == dir) {
            Some((_, images)) => images.extend(entries),
            None => dirs.push((dir, entries.collect())),
        }
    }

    dirs
}

fn resized_rgba(source: &DynamicImage, size: u32) -> RgbaImage {
    source
        .resize_exact(size, size, FilterType::Lanczos3)
        .to_rgba8()
}

fn write_resized_png(source: &DynamicImage, size: u32, path: &Path) -> Result<()> {
    let rgba_image = resized_rgba(source, size);
    let file = File::create(path)
        .with_context(|| format!("Failed to create PNG file {}", path.display()))?;
    let mut out_file = BufWriter::new(file);
    write_png(rgba_image.as_raw(), &mut out_file, size)?;
    out_file.flush()?;
    Ok(())
}

fn write_ico(source: &DynamicImage, size: u32, path: &Path) -> Result<()> {
    let mut sizes: Vec<u32> = ICO_SIZES.into_iter().filter(|&s| s <= size).collect();
    if sizes.is_empty() {
        sizes.push(size);
    }

    let mut frames = Vec::new();
    for frame_size in sizes {
        let rgba_image = resized_rgba(source, frame_size);

        // Only the 256px layer can be compressed according to the ico specs
        if frame_size == 256 {
            let mut buf = Vec::new();
            write_png(rgba_image.as_raw(), &mut buf, frame_size)?;
            frames.push(IcoFrame::with_encoded(
                buf,
                frame_size,
                frame_size,
                ColorType::Rgba8,
            )?);
        } else {
            frames.push(IcoFrame::as_png(
                rgba_image.as_raw(),
                frame_size,
                frame_size,
                ColorType::Rgba8,
            )?);
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create icon file {}", path.display()))?;
    let mut out_file = BufWriter::new(file);
    IcoEncoder::new(&mut out_file).encode_images(&frames)?;
    out_file.flush()?;
    Ok(())
}

fn write_icns(source: &DynamicImage, size: u32, path: &Path) -> Result<()> {
    let entries: Vec<_> = ICNS_ENTRIES.iter().filter(|(s, _)| *s <= size).collect();
    if entries.is_empty() {
        anyhow::bail!("ICNS target {} needs a size of at least 16", path.display());
    }

    let mut family = IconFamily::new();
    for &&(entry_size, ostype) in &entries {
        let rgba_image = resized_rgba(source, entry_size);
        let mut buf = Vec::new();
        write_png(rgba_image.as_raw(), &mut buf, entry_size)?;
        let image = icns::Image::read_png(&buf[..])?;

        let icon_type = ostype
            .parse()
            .ok()
            .and_then(IconType::from_ostype)
            .with_context(|| format!("Unknown icns type {ostype}"))?;
        family
            .add_icon_with_type(&image, icon_type)
            .with_context(|| format!("Can't add {ostype} to Icns Family"))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create icon file {}", path.display()))?;
    let mut out_file = BufWriter::new(file);
    family.write(&mut out_file)?;
    out_file.flush()?;
    Ok(())
}

// Encode image data as PNG with compression
fn write_png<W: Write>(image_data: &[u8], w: W, size: u32) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(w, CompressionType::Best, PngFilterType::Adaptive);
    encoder.write_image(image_data, size, size, ColorType::Rgba8)?;
    Ok(())
}
