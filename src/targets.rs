//! Where each platform expects its icons, and at which pixel sizes.
//!
//! The builtin tables follow the layout of a Flutter project; a JSON
//! manifest with the same shape can describe any other layout.

use crate::error::ManifestError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    path::{Component, Path},
};

/// Groups written when no platform is picked explicitly.
pub const DEFAULT_GROUPS: [&str; 4] = ["ios", "android", "macos", "web"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Png,
    /// Windows icon with every standard frame up to the target size
    Ico,
    /// macOS icon family with every standard entry up to the target size
    Icns,
}

/// One slot of an Apple asset catalog filled by a target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSlot {
    pub idiom: String,
    pub size: String,
    pub scale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Path relative to the project directory
    pub path: String,
    pub size: u32,
    #[serde(default)]
    pub format: Format,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalog: Vec<CatalogSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    pub name: String,
    /// Composite onto an opaque background before resizing
    #[serde(default)]
    pub flatten: bool,
    pub targets: Vec<Target>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub groups: Vec<TargetGroup>,
}

fn png(path: String, size: u32) -> Target {
    Target {
        path,
        size,
        format: Format::Png,
        catalog: Vec::new(),
    }
}

fn slot(idiom: &str, size: &str, scale: u32) -> CatalogSlot {
    CatalogSlot {
        idiom: idiom.to_string(),
        size: size.to_string(),
        scale: format!("{scale}x"),
        role: None,
    }
}

const IOS_DIR: &str = "ios/Runner/Assets.xcassets/AppIcon.appiconset";
const MACOS_DIR: &str = "macos/Runner/Assets.xcassets/AppIcon.appiconset";

// (points, scale, pixels, idioms sharing the file)
const IOS_ICONS: &[(&str, u32, u32, &[&str])] = &[
    ("1024x1024", 1, 1024, &["ios-marketing"]),
    ("20x20", 1, 20, &["ipad"]),
    ("20x20", 2, 40, &["iphone", "ipad"]),
    ("20x20", 3, 60, &["iphone"]),
    ("29x29", 1, 29, &["iphone", "ipad"]),
    ("29x29", 2, 58, &["iphone", "ipad"]),
    ("29x29", 3, 87, &["iphone"]),
    ("40x40", 1, 40, &["ipad"]),
    ("40x40", 2, 80, &["iphone", "ipad"]),
    ("40x40", 3, 120, &["iphone"]),
    ("60x60", 2, 120, &["iphone"]),
    ("60x60", 3, 180, &["iphone"]),
    ("76x76", 1, 76, &["ipad"]),
    ("76x76", 2, 152, &["ipad"]),
    ("83.5x83.5", 2, 167, &["ipad"]),
];

// (pixels, catalog slots as (points, scale))
const MACOS_ICONS: &[(u32, &[(&str, u32)])] = &[
    (16, &[("16x16", 1)]),
    (32, &[("16x16", 2), ("32x32", 1)]),
    (64, &[("32x32", 2)]),
    (128, &[("128x128", 1)]),
    (256, &[("128x128", 2), ("256x256", 1)]),
    (512, &[("256x256", 2), ("512x512", 1)]),
    (1024, &[("512x512", 2)]),
];

const ANDROID_DENSITIES: &[(&str, u32)] = &[
    ("mdpi", 48),
    ("hdpi", 72),
    ("xhdpi", 96),
    ("xxhdpi", 144),
    ("xxxhdpi", 192),
];

const WEB_ICONS: &[(&str, u32)] = &[
    ("favicon.png", 16),
    ("icons/Icon-192.png", 192),
    ("icons/Icon-512.png", 512),
    ("icons/Icon-maskable-192.png", 192),
    ("icons/Icon-maskable-512.png", 512),
];

fn ios_group() -> TargetGroup {
    let targets = IOS_ICONS
        .iter()
        .map(|&(points, scale, pixels, idioms)| Target {
            catalog: idioms.iter().map(|idiom| slot(idiom, points, scale)).collect(),
            ..png(format!("{IOS_DIR}/Icon-App-{points}@{scale}x.png"), pixels)
        })
        .collect();

    TargetGroup {
        name: "ios".to_string(),
        flatten: true,
        targets,
    }
}

fn macos_group() -> TargetGroup {
    let targets = MACOS_ICONS
        .iter()
        .map(|&(pixels, slots)| Target {
            catalog: slots
                .iter()
                .map(|&(points, scale)| slot("mac", points, scale))
                .collect(),
            ..png(format!("{MACOS_DIR}/app_icon_{pixels}.png"), pixels)
        })
        .collect();

    TargetGroup {
        name: "macos".to_string(),
        flatten: false,
        targets,
    }
}

fn android_group() -> TargetGroup {
    let targets = ANDROID_DENSITIES
        .iter()
        .map(|&(density, size)| {
            png(
                format!("android/app/src/main/res/mipmap-{density}/ic_launcher.png"),
                size,
            )
        })
        .collect();

    TargetGroup {
        name: "android".to_string(),
        flatten: false,
        targets,
    }
}

fn web_group() -> TargetGroup {
    TargetGroup {
        name: "web".to_string(),
        flatten: false,
        targets: WEB_ICONS
            .iter()
            .map(|&(path, size)| png(format!("web/{path}"), size))
            .collect(),
    }
}

fn windows_group() -> TargetGroup {
    TargetGroup {
        name: "windows".to_string(),
        flatten: false,
        targets: vec![Target {
            format: Format::Ico,
            ..png("windows/runner/resources/app_icon.ico".to_string(), 256)
        }],
    }
}

impl Manifest {
    /// Icon locations of a Flutter project.
    pub fn flutter() -> Self {
        Self {
            groups: vec![
                ios_group(),
                android_group(),
                macos_group(),
                web_group(),
                windows_group(),
            ],
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest: Manifest = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut group_names = HashSet::new();
        let mut paths = HashSet::new();

        for group in &self.groups {
            if !group_names.insert(group.name.as_str()) {
                return Err(ManifestError::DuplicateGroup(group.name.clone()));
            }

            for target in &group.targets {
                if target.size == 0 {
                    return Err(ManifestError::ZeroSize {
                        path: target.path.clone(),
                    });
                }

                let path = Path::new(&target.path);
                if path.has_root() || path.is_absolute() {
                    return Err(ManifestError::AbsolutePath(target.path.clone()));
                }
                if path.components().any(|c| c == Component::ParentDir) {
                    return Err(ManifestError::EscapingPath(target.path.clone()));
                }
                if !paths.insert(target.path.as_str()) {
                    return Err(ManifestError::DuplicatePath(target.path.clone()));
                }
            }
        }

        Ok(())
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Groups named in `names`, in manifest order. An empty list selects
    /// every group.
    pub fn select(&self, names: &[String]) -> Result<Vec<&TargetGroup>, ManifestError> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.groups.iter().any(|g| &g.name == *name))
        {
            return Err(ManifestError::UnknownGroup {
                name: unknown.clone(),
                available: self.group_names().join(", "),
            });
        }

        Ok(self
            .groups
            .iter()
            .filter(|g| names.is_empty() || names.contains(&g.name))
            .collect())
    }
}
