/// Enumerations shared by the style catalog and the section properties.
use std::fmt;

/// Page layout orientation (`w:pgSz/@w:orient`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WdOrientation {
    #[default]
    Portrait,
    Landscape,
}

impl WdOrientation {
    #[inline]
    pub const fn to_xml(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }

    #[inline]
    pub fn from_xml(s: &str) -> Option<Self> {
        match s {
            "portrait" => Some(Self::Portrait),
            "landscape" => Some(Self::Landscape),
            _ => None,
        }
    }
}

/// The element a style applies to (`w:style/@w:type`).
///
/// # Examples
///
/// ```rust
/// use docsmith::ooxml::docx::enums::WdStyleType;
///
/// assert_eq!(WdStyleType::Table.to_xml(), "table");
/// assert_eq!(WdStyleType::from_xml("character"), Some(WdStyleType::Character));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WdStyleType {
    /// A missing `w:type` means paragraph.
    #[default]
    Paragraph,
    Character,
    Table,
    List,
}

impl WdStyleType {
    #[inline]
    pub const fn to_xml(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Character => "character",
            Self::Table => "table",
            Self::List => "numbering",
        }
    }

    #[inline]
    pub fn from_xml(s: &str) -> Option<Self> {
        match s {
            "paragraph" => Some(Self::Paragraph),
            "character" => Some(Self::Character),
            "table" => Some(Self::Table),
            "numbering" => Some(Self::List),
            _ => None,
        }
    }
}

impl fmt::Display for WdStyleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Paragraph => "Paragraph",
            Self::Character => "Character",
            Self::Table => "Table",
            Self::List => "List",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_conversion() {
        assert_eq!(WdOrientation::Landscape.to_xml(), "landscape");
        assert_eq!(WdOrientation::from_xml("portrait"), Some(WdOrientation::Portrait));
        assert_eq!(WdOrientation::from_xml("sideways"), None);
    }

    #[test]
    fn test_style_type_conversion() {
        assert_eq!(WdStyleType::default(), WdStyleType::Paragraph);
        assert_eq!(WdStyleType::List.to_xml(), "numbering");
        assert_eq!(WdStyleType::from_xml("table"), Some(WdStyleType::Table));
        assert_eq!(WdStyleType::Table.to_string(), "Table");
    }
}
