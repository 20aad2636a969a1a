/// Problems with an icon style, whether built in or loaded from JSON.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("unknown preset: {0}. Available presets: ticket, admin")]
    UnknownPreset(String),

    #[error("style name {0:?} must be a plain file name without path separators or \"..\"")]
    InvalidName(String),

    #[error("style {style}: {what} must be positive, got {value}")]
    NonPositive {
        style: String,
        what: &'static str,
        value: f32,
    },

    #[error("style {style}: gradient fill needs at least one colour stop")]
    EmptyStops { style: String },

    #[error("style {style}: colour stops must be sorted by offset within 0.0..=1.0")]
    UnsortedStops { style: String },

    #[error("glyph {0:?} has no visible ink")]
    EmptyGlyph(String),
}

/// Problems with a packaging manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("target {path}: size must be at least 1 pixel")]
    ZeroSize { path: String },

    #[error("target {0}: path must be relative to the project directory")]
    AbsolutePath(String),

    #[error("target {0}: path must not leave the project directory")]
    EscapingPath(String),

    #[error("target {0} is listed more than once")]
    DuplicatePath(String),

    #[error("group {0} is defined more than once")]
    DuplicateGroup(String),

    #[error("unknown target group: {name}. Available groups: {available}")]
    UnknownGroup { name: String, available: String },
}
