//! Icon designs.
//!
//! An [`IconStyle`] lists every layer of an icon. Positions and radii are
//! fractions of the canvas; blur radii, offsets and line thicknesses are
//! "reference pixels" measured on a 1024×1024 canvas and scaled to the
//! actual render size. Styles are plain serde data so a design can be tuned
//! in a JSON file without recompiling.

use crate::canvas::ColorStop;
use crate::error::StyleError;
use crate::glyph::{GlyphSpec, Shape};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canvas size the reference-pixel lengths were designed on.
pub const REFERENCE_SIZE: u32 = 1024;

/// Names accepted by [`IconStyle::preset`].
pub const PRESETS: [&str; 2] = ["ticket", "admin"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearFill {
    pub from: [u8; 4],
    pub to: [u8; 4],
    pub angle_deg: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialGlow {
    pub center: [f32; 2],
    pub radius: f32,
    pub inner: [u8; 4],
    pub outer: [u8; 4],
}

/// Soft highlight ellipse across the top of the icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glass {
    /// `[x0, y0, x1, y1]`, may extend past the canvas
    pub bounds: [f32; 4],
    pub color: [u8; 4],
    /// Blur radius as a fraction of the canvas
    pub blur: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropShadow {
    pub offset: [f32; 2],
    pub blur: f32,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bloom {
    pub blur: f32,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlyphFill {
    Solid { color: [u8; 4] },
    /// Ramp running down the full canvas height
    Vertical { stops: Vec<ColorStop> },
}

/// Light or shade drawn from a shifted copy of the glyph and clipped back
/// inside the glyph, giving an embossed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InnerLight {
    pub offset_y: f32,
    pub blur: f32,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RimLight {
    pub thickness: f32,
    pub color: [u8; 4],
    pub blur: f32,
}

// Layer defaults are the ticket design, so a style file only lists what it changes.

impl Default for LinearFill {
    fn default() -> Self {
        Self {
            from: [52, 10, 22, 255],
            to: [14, 3, 8, 255],
            angle_deg: 15.0,
        }
    }
}

impl Default for RadialGlow {
    fn default() -> Self {
        Self {
            center: [0.5, 0.5],
            radius: 0.65,
            inner: [0, 0, 0, 0],
            outer: [0, 0, 0, 55],
        }
    }
}

impl Default for Glass {
    fn default() -> Self {
        Self {
            bounds: [0.05, -0.35, 0.95, 0.32],
            color: [255, 255, 255, 22],
            blur: 0.07,
        }
    }
}

impl Default for DropShadow {
    fn default() -> Self {
        Self {
            offset: [5.0, 8.0],
            blur: 14.0,
            color: [0, 0, 0, 100],
        }
    }
}

impl Default for Bloom {
    fn default() -> Self {
        Self {
            blur: 20.0,
            color: [255, 220, 230, 35],
        }
    }
}

impl Default for InnerLight {
    fn default() -> Self {
        Self {
            offset_y: -3.0,
            blur: 5.0,
            color: [255, 255, 255, 50],
        }
    }
}

impl Default for RimLight {
    fn default() -> Self {
        Self {
            thickness: 2.0,
            color: [255, 200, 210, 18],
            blur: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconStyle {
    pub name: String,
    pub background: LinearFill,
    pub glows: Vec<RadialGlow>,
    pub noise: u8,
    pub glass: Glass,
    pub glyph: GlyphSpec,
    pub shadow: DropShadow,
    pub bloom: Bloom,
    pub fill: GlyphFill,
    pub inner_lights: Vec<InnerLight>,
    pub vignette: RadialGlow,
    pub rim: RimLight,
    /// Corner radius of the rim as a fraction of the canvas
    pub corner_radius: f32,
}

impl Default for IconStyle {
    fn default() -> Self {
        Self::ticket()
    }
}

fn glow(center: [f32; 2], radius: f32, inner: [u8; 4]) -> RadialGlow {
    RadialGlow {
        center,
        radius,
        inner,
        outer: [0, 0, 0, 0],
    }
}

impl IconStyle {
    /// Look up a builtin design by name.
    pub fn preset(name: &str) -> Result<Self, StyleError> {
        match name {
            "ticket" => Ok(Self::ticket()),
            "admin" => Ok(Self::admin()),
            _ => Err(StyleError::UnknownPreset(name.to_string())),
        }
    }

    /// Rich burgundy with a white eighth note.
    pub fn ticket() -> Self {
        Self {
            name: "ticket".to_string(),
            background: LinearFill::default(),
            glows: vec![
                glow([0.42, 0.32], 0.6, [170, 35, 60, 90]),
                glow([0.2, 0.12], 0.4, [200, 60, 85, 50]),
                glow([0.75, 0.88], 0.5, [5, 0, 2, 70]),
                glow([0.15, 0.85], 0.4, [100, 20, 40, 25]),
            ],
            noise: 4,
            glass: Glass::default(),
            glyph: GlyphSpec::default(),
            shadow: DropShadow::default(),
            bloom: Bloom::default(),
            fill: GlyphFill::Solid {
                color: [255, 252, 250, 250],
            },
            inner_lights: vec![InnerLight::default()],
            vignette: RadialGlow::default(),
            rim: RimLight::default(),
            corner_radius: 0.22,
        }
    }

    /// Near-black violet with a gold "M" monogram.
    pub fn admin() -> Self {
        Self {
            name: "admin".to_string(),
            background: LinearFill {
                from: [28, 20, 35, 255],
                to: [8, 5, 12, 255],
                angle_deg: 20.0,
            },
            glows: vec![
                glow([0.48, 0.42], 0.5, [110, 18, 42, 65]),
                glow([0.35, 0.15], 0.45, [120, 80, 30, 30]),
                glow([0.7, 0.9], 0.5, [3, 0, 5, 60]),
            ],
            noise: 3,
            glass: Glass {
                bounds: [0.08, -0.32, 0.92, 0.30],
                color: [255, 255, 255, 18],
                blur: 0.06,
            },
            glyph: GlyphSpec {
                text: "M".to_string(),
                scale: 0.55,
                lift: 0.015,
                shape: Shape::Monogram,
            },
            shadow: DropShadow {
                offset: [5.0, 8.0],
                blur: 14.0,
                color: [0, 0, 0, 110],
            },
            bloom: Bloom {
                blur: 22.0,
                color: [220, 180, 100, 30],
            },
            fill: GlyphFill::Vertical {
                stops: vec![
                    ColorStop { offset: 0.0, color: [255, 230, 170, 255] },
                    ColorStop { offset: 0.3, color: [235, 195, 120, 255] },
                    ColorStop { offset: 0.7, color: [215, 165, 85, 255] },
                    ColorStop { offset: 1.0, color: [190, 140, 65, 255] },
                ],
            },
            inner_lights: vec![
                InnerLight {
                    offset_y: -2.0,
                    blur: 4.0,
                    color: [255, 245, 220, 60],
                },
                InnerLight {
                    offset_y: 2.0,
                    blur: 3.0,
                    color: [0, 0, 0, 35],
                },
            ],
            vignette: RadialGlow::default(),
            rim: RimLight {
                thickness: 2.0,
                color: [220, 180, 120, 14],
                blur: 2.0,
            },
            corner_radius: 0.22,
        }
    }

    /// Load a style from JSON. Fields left out keep the ticket design.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read style {}", path.display()))?;
        let style: IconStyle = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse style {}", path.display()))?;
        style.validate()?;
        Ok(style)
    }

    pub fn validate(&self) -> Result<(), StyleError> {
        // The name becomes part of the output file name
        let name = self.name.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(StyleError::InvalidName(self.name.clone()));
        }

        let positive = |what: &'static str, value: f32| {
            if value > 0.0 {
                Ok(())
            } else {
                Err(StyleError::NonPositive {
                    style: self.name.clone(),
                    what,
                    value,
                })
            }
        };

        positive("glyph scale", self.glyph.scale)?;
        positive("vignette radius", self.vignette.radius)?;
        for glow in &self.glows {
            positive("glow radius", glow.radius)?;
        }

        if let GlyphFill::Vertical { stops } = &self.fill {
            if stops.is_empty() {
                return Err(StyleError::EmptyStops {
                    style: self.name.clone(),
                });
            }
            let in_range = stops.iter().all(|s| (0.0..=1.0).contains(&s.offset));
            let sorted = stops.windows(2).all(|w| w[0].offset <= w[1].offset);
            if !in_range || !sorted {
                return Err(StyleError::UnsortedStops {
                    style: self.name.clone(),
                });
            }
        }

        Ok(())
    }
}
