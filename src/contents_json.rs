//! Contents.json data model for Apple's Asset Catalog format
//!
//! An `AppIcon.appiconset` directory carries a Contents.json that tells Xcode
//! which PNG fills which slot (device idiom, point size, scale). The same
//! structures serve both the iOS and the macOS catalogs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root structure of a Contents.json file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContentsFile {
    /// One entry per catalog slot; several slots may share a file
    pub images: Vec<ImageEntry>,

    /// Versioning and authorship information
    pub info: Info,
}

/// Individual slot within an app icon set
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageEntry {
    /// File name inside the icon set directory
    pub filename: String,

    /// The device type (e.g., "iphone", "ipad", "mac", "ios-marketing")
    pub idiom: String,

    /// The scale factor (e.g., "1x", "2x", "3x")
    pub scale: String,

    /// The size of the slot in points (e.g., "29x29", "83.5x83.5")
    pub size: String,

    /// The role of the icon (e.g., "notificationCenter", "appLauncher")
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
}

/// Versioning and authorship information for the asset catalog
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Info {
    /// The format version of the asset catalog (always 1)
    pub version: u8,

    /// The tool that authored the asset catalog
    pub author: String,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            version: 1,
            author: "app-icon-kit".to_string(),
        }
    }
}

impl ContentsFile {
    pub fn new(images: Vec<ImageEntry>) -> Self {
        Self {
            images,
            info: Info::default(),
        }
    }
}

/// Writes `Contents.json` into `dir` and returns its path.
pub fn write_contents_json(dir: &Path, images: Vec<ImageEntry>) -> Result<PathBuf> {
    let contents = ContentsFile::new(images);
    let json =
        serde_json::to_string_pretty(&contents).context("Failed to serialize Contents.json")?;

    let path = dir.join("Contents.json");
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
