//! Tile format table.

use std::fmt;

use serde::Serialize;

/// The renderer implementation a tile format is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Aggregated frame data, encoded as JSON or binary.
    Frames,
    /// Raster tiles painted from the aggregated frames.
    Png,
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererKind::Frames => f.write_str("frames"),
            RendererKind::Png => f.write_str("png"),
        }
    }
}

/// Supported tile formats and their renderers.
pub const FORMATS: [(&str, RendererKind); 5] = [
    ("torque.json", RendererKind::Frames),
    ("torque.bin", RendererKind::Frames),
    ("json.torque", RendererKind::Frames),
    ("png", RendererKind::Png),
    ("torque.png", RendererKind::Png),
];

/// Looks up the renderer serving `format`.
///
/// # Example
///
/// ```rust
/// use torque_config::render::{renderer_for, RendererKind};
///
/// assert_eq!(renderer_for("json.torque"), Some(RendererKind::Frames));
/// assert_eq!(renderer_for("mvt"), None);
/// ```
pub fn renderer_for(format: &str) -> Option<RendererKind> {
    FORMATS
        .iter()
        .find(|(name, _)| *name == format)
        .map(|(_, kind)| *kind)
}

/// Every supported format name, in table order.
pub fn supported_formats() -> Vec<&'static str> {
    FORMATS.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_formats() {
        for format in ["torque.json", "torque.bin", "json.torque"] {
            assert_eq!(renderer_for(format), Some(RendererKind::Frames));
        }
    }

    #[test]
    fn test_png_formats() {
        assert_eq!(renderer_for("png"), Some(RendererKind::Png));
        assert_eq!(renderer_for("torque.png"), Some(RendererKind::Png));
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(renderer_for("PNG"), None);
        assert_eq!(renderer_for(""), None);
        assert_eq!(renderer_for("grid.json"), None);
    }

    #[test]
    fn test_supported_formats_lists_table() {
        assert_eq!(supported_formats().len(), FORMATS.len());
        assert!(supported_formats().contains(&"torque.bin"));
    }
}
