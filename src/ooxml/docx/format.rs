//! Shared formatting types for DOCX (used in both reading and writing).
//!
//! Each type maps a friendly enumeration to the token the WordprocessingML
//! schema expects, and back.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use std::path::Path;

/// Paragraph alignment options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphAlignment {
    Left,
    Center,
    Right,
    Justify,
}

impl ParagraphAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "both",
        }
    }

    pub(crate) fn from_xml(s: &str) -> Option<Self> {
        match s {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "both" | "distribute" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Horizontal placement of a whole table (`w:tblPr/w:jc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAlignment {
    Left,
    Center,
    Right,
}

impl TableAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    pub(crate) fn from_xml(s: &str) -> Option<Self> {
        match s {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Vertical placement of content inside a cell (`w:vAlign`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellVerticalAlignment {
    Top,
    Center,
    Bottom,
}

impl CellVerticalAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }

    pub(crate) fn from_xml(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Self::Top),
            "center" => Some(Self::Center),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Border styles for tables and cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableBorderStyle {
    None,
    Single,
    Thick,
    Double,
    Dotted,
    Dashed,
    DotDash,
    DotDotDash,
}

impl TableBorderStyle {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Single => "single",
            Self::Thick => "thick",
            Self::Double => "double",
            Self::Dotted => "dotted",
            Self::Dashed => "dashed",
            Self::DotDash => "dotDash",
            Self::DotDotDash => "dotDotDash",
        }
    }

    pub(crate) fn from_xml(s: &str) -> Option<Self> {
        match s {
            "none" | "nil" => Some(Self::None),
            "single" => Some(Self::Single),
            "thick" => Some(Self::Thick),
            "double" => Some(Self::Double),
            "dotted" => Some(Self::Dotted),
            "dashed" => Some(Self::Dashed),
            "dotDash" => Some(Self::DotDash),
            "dotDotDash" => Some(Self::DotDotDash),
            _ => None,
        }
    }
}

/// Vertical merge marker of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalMerge {
    /// First cell of a vertically merged group; its content is what shows.
    Restart,
    /// Cell covered by the `Restart` cell above it.
    Continue,
}

impl VerticalMerge {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Restart => "restart",
            Self::Continue => "continue",
        }
    }

    /// An absent `w:val` means `continue`.
    pub(crate) fn from_xml(s: Option<&str>) -> Self {
        match s {
            Some("restart") => Self::Restart,
            _ => Self::Continue,
        }
    }
}

/// Table and cell widths (`w:tblW`, `w:tcW`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableWidth {
    Auto,
    /// Fiftieths of a percent: 5000 is 100%.
    Pct(u32),
    /// Twentieths of a point.
    Dxa(u32),
}

impl TableWidth {
    /// Full text width.
    pub const FULL: TableWidth = TableWidth::Pct(5000);

    pub(crate) fn value(&self) -> u32 {
        match self {
            Self::Auto => 0,
            Self::Pct(w) | Self::Dxa(w) => *w,
        }
    }

    pub(crate) fn unit(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Pct(_) => "pct",
            Self::Dxa(_) => "dxa",
        }
    }

    pub(crate) fn from_xml(w: u32, unit: Option<&str>) -> Self {
        match unit {
            Some("pct") => Self::Pct(w),
            Some("auto") | Some("nil") => Self::Auto,
            _ => Self::Dxa(w),
        }
    }
}

/// Raster formats accepted for embedded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Format from a file extension (case-insensitive, no leading period).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Format inferred from a path's extension.
    ///
    /// # Errors
    /// [`OoxmlError::UnsupportedFormat`] for anything outside
    /// png/jpg/jpeg/gif/bmp/tiff.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| {
            OoxmlError::UnsupportedFormat(if ext.is_empty() {
                path.display().to_string()
            } else {
                ext.to_string()
            })
        })
    }

    /// Format from a MIME type, as stored in `[Content_Types].xml`.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            ct::PNG => Some(Self::Png),
            ct::JPEG | "image/jpg" => Some(Self::Jpeg),
            ct::GIF => Some(Self::Gif),
            ct::BMP => Some(Self::Bmp),
            ct::TIFF => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Detect image format from byte signature.
    pub fn detect_from_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if data.starts_with(b"BM") {
            Some(Self::Bmp)
        } else if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            Some(Self::Tiff)
        } else {
            None
        }
    }

    /// Extension used for the media partname.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => ct::PNG,
            Self::Jpeg => ct::JPEG,
            Self::Gif => ct::GIF,
            Self::Bmp => ct::BMP,
            Self::Tiff => ct::TIFF,
        }
    }
}

/// Check a `RRGGBB` hex color (or `auto`) as used by `w:color` and `w:shd/@w:fill`.
pub(crate) fn validate_color(color: &str) -> Result<()> {
    if color == "auto" || (color.len() == 6 && color.bytes().all(|b| b.is_ascii_hexdigit())) {
        Ok(())
    } else {
        Err(OoxmlError::InvalidArgument(format!(
            "color must be six hex digits, got {:?}",
            color
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_format_from_extension() {
        for ext in ["png", "PNG", "jpg", "JPEG", "gif", "bmp", "tiff"] {
            assert!(ImageFormat::from_extension(ext).is_some(), "{ext}");
        }
        assert_eq!(ImageFormat::from_extension("tif"), None);
        assert_eq!(ImageFormat::from_extension("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("svg"), None);
        assert_eq!(ImageFormat::from_extension("webp"), None);
    }

    #[test]
    fn test_image_format_from_path() {
        assert_eq!(
            ImageFormat::from_path(Path::new("photos/cat.Jpg")).unwrap(),
            ImageFormat::Jpeg
        );
        assert!(matches!(
            ImageFormat::from_path(Path::new("diagram.svg")),
            Err(OoxmlError::UnsupportedFormat(ext)) if ext == "svg"
        ));
        assert!(matches!(
            ImageFormat::from_path(Path::new("README")),
            Err(OoxmlError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_detect_from_bytes() {
        assert_eq!(
            ImageFormat::detect_from_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::detect_from_bytes(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect_from_bytes(b"hello"), None);
    }

    #[test]
    fn test_tokens() {
        assert_eq!(ParagraphAlignment::Justify.as_str(), "both");
        assert_eq!(ParagraphAlignment::from_xml("both"), Some(ParagraphAlignment::Justify));
        assert_eq!(TableBorderStyle::from_xml("nil"), Some(TableBorderStyle::None));
        assert_eq!(VerticalMerge::from_xml(None), VerticalMerge::Continue);
        assert_eq!(VerticalMerge::from_xml(Some("restart")), VerticalMerge::Restart);
        assert_eq!(TableWidth::FULL.unit(), "pct");
        assert_eq!(TableWidth::FULL.value(), 5000);
        assert_eq!(TableWidth::from_xml(2000, None), TableWidth::Dxa(2000));
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("D9E2F3").is_ok());
        assert!(validate_color("auto").is_ok());
        assert!(matches!(validate_color("#fff"), Err(OoxmlError::InvalidArgument(_))));
        assert!(validate_color("GGGGGG").is_err());
    }
}
