use app_icon_kit::apply::{apply_icons, ApplyOptions};
use app_icon_kit::error::ManifestError;
use app_icon_kit::targets::{Format, Manifest, Target, TargetGroup};
use image::{GenericImageView, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a gradient source icon whose left half is fully transparent
fn create_source_image(path: &Path, size: u32) {
    let mut image = RgbaImage::new(size, size);

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let red = (255.0 * x as f32 / size as f32) as u8;
        let green = (255.0 * y as f32 / size as f32) as u8;
        let alpha = if x < size / 2 { 0 } else { 255 };
        *pixel = Rgba([red, green, 128, alpha]);
    }

    image.save(path).expect("Failed to save source image");
}

fn options(temp: &TempDir, manifest: Manifest, groups: &[&str]) -> ApplyOptions {
    let source = temp.path().join("source.png");
    create_source_image(&source, 128);

    ApplyOptions {
        source,
        project: temp.path().join("project"),
        manifest,
        groups: groups.iter().map(|g| g.to_string()).collect(),
        contents_json: false,
        background: Rgba([255, 255, 255, 255]),
    }
}

fn dimensions(path: &Path) -> (u32, u32) {
    image::open(path)
        .unwrap_or_else(|e| panic!("Failed to open {}: {e}", path.display()))
        .dimensions()
}

#[test]
fn test_web_icons_are_resized_into_place() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let opts = options(&temp, Manifest::flutter(), &["web"]);

    let report = apply_icons(&opts).expect("apply should succeed");
    assert_eq!(report.written.len(), 5);

    let web = opts.project.join("web");
    assert_eq!(dimensions(&web.join("favicon.png")), (16, 16));
    assert_eq!(dimensions(&web.join("icons/Icon-192.png")), (192, 192));
    assert_eq!(dimensions(&web.join("icons/Icon-512.png")), (512, 512));
    assert_eq!(dimensions(&web.join("icons/Icon-maskable-192.png")), (192, 192));
    assert_eq!(dimensions(&web.join("icons/Icon-maskable-512.png")), (512, 512));

    // Nothing outside the selected group
    assert!(!opts.project.join("android").exists());

    // Web icons keep their transparency
    let favicon = image::open(web.join("favicon.png")).unwrap().to_rgba8();
    assert_eq!(favicon.get_pixel(0, 8)[3], 0);
}

#[test]
fn test_android_launcher_icons() {
    let temp = TempDir::new().unwrap();
    let opts = options(&temp, Manifest::flutter(), &["android"]);
    apply_icons(&opts).unwrap();

    let res = opts.project.join("android/app/src/main/res");
    for (density, size) in [
        ("mdpi", 48),
        ("hdpi", 72),
        ("xhdpi", 96),
        ("xxhdpi", 144),
        ("xxxhdpi", 192),
    ] {
        let icon = res.join(format!("mipmap-{density}")).join("ic_launcher.png");
        assert_eq!(dimensions(&icon), (size, size), "{density}");
    }
}

#[test]
fn test_ios_icons_are_opaque_with_contents_json() {
    let temp = TempDir::new().unwrap();
    let mut opts = options(&temp, Manifest::flutter(), &["ios"]);
    opts.contents_json = true;

    let report = apply_icons(&opts).unwrap();
    // 15 PNGs plus the catalog
    assert_eq!(report.written.len(), 16);

    let set = opts
        .project
        .join("ios/Runner/Assets.xcassets/AppIcon.appiconset");
    let marketing = image::open(set.join("Icon-App-1024x1024@1x.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(marketing.dimensions(), (1024, 1024));
    assert!(marketing.pixels().all(|p| p[3] == 255));
    // Transparent half shows the white background
    assert_eq!(*marketing.get_pixel(10, 10), Rgba([255, 255, 255, 255]));

    assert_eq!(dimensions(&set.join("Icon-App-83.5x83.5@2x.png")), (167, 167));

    let json = std::fs::read_to_string(set.join("Contents.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let images = parsed["images"].as_array().unwrap();
    assert_eq!(images.len(), 19);
    assert_eq!(parsed["info"]["version"], 1);
    for image in images {
        let filename = image["filename"].as_str().unwrap();
        assert!(set.join(filename).exists(), "{filename} listed but missing");
        assert!(image["idiom"].is_string());
        assert!(image["scale"].is_string());
        assert!(image["size"].is_string());
    }
}

#[test]
fn test_custom_manifest_with_ico_and_icns() {
    let manifest = Manifest {
        groups: vec![TargetGroup {
            name: "desktop".to_string(),
            flatten: false,
            targets: vec![
                Target {
                    path: "assets/icon.ico".to_string(),
                    size: 256,
                    format: Format::Ico,
                    catalog: Vec::new(),
                },
                Target {
                    path: "assets/icon.icns".to_string(),
                    size: 64,
                    format: Format::Icns,
                    catalog: Vec::new(),
                },
                Target {
                    path: "assets/32x32.png".to_string(),
                    size: 32,
                    format: Format::Png,
                    catalog: Vec::new(),
                },
            ],
        }],
    };

    let temp = TempDir::new().unwrap();
    let opts = options(&temp, manifest, &[]);
    let report = apply_icons(&opts).unwrap();
    assert_eq!(report.written.len(), 3);

    let assets = opts.project.join("assets");
    // The ICO decoder picks the largest frame
    assert_eq!(dimensions(&assets.join("icon.ico")), (256, 256));
    assert_eq!(dimensions(&assets.join("32x32.png")), (32, 32));

    let icns_bytes = std::fs::read(assets.join("icon.icns")).unwrap();
    assert_eq!(&icns_bytes[..4], b"icns");
    let family = icns::IconFamily::read(&icns_bytes[..]).expect("valid icns");
    assert!(family.elements.len() >= 4);
}

#[test]
fn test_non_square_source_is_rejected() {
    let temp = TempDir::new().unwrap();
    let mut opts = options(&temp, Manifest::flutter(), &["web"]);
    let wide = temp.path().join("wide.png");
    RgbaImage::new(64, 32).save(&wide).unwrap();
    opts.source = wide;

    let err = apply_icons(&opts).unwrap_err();
    assert!(err.to_string().contains("must be square"));
    assert!(!opts.project.exists());
}

#[test]
fn test_unknown_group_is_rejected() {
    let temp = TempDir::new().unwrap();
    let opts = options(&temp, Manifest::flutter(), &["watchos"]);

    let err = apply_icons(&opts).unwrap_err();
    let manifest_err = err
        .downcast_ref::<ManifestError>()
        .expect("should be a manifest error");
    assert!(matches!(manifest_err, ManifestError::UnknownGroup { .. }));
}

#[test]
fn test_missing_source_reports_path() {
    let temp = TempDir::new().unwrap();
    let mut opts = options(&temp, Manifest::flutter(), &["web"]);
    opts.source = PathBuf::from("does/not/exist.png");

    let err = apply_icons(&opts).unwrap_err();
    assert!(format!("{err:#}").contains("does/not/exist.png"));
}
