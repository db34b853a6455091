/// Page setup written to the body's trailing `w:sectPr`.
use crate::common::unit::inches_to_twips;
use crate::ooxml::docx::enums::WdOrientation;
use std::fmt::Write as FmtWrite;

/// Section properties including page setup and margins.
///
/// All lengths are in twips (1440 per inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionProperties {
    pub page_width: u32,
    pub page_height: u32,
    pub orientation: WdOrientation,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub margin_right: u32,
    /// Header distance from the top edge
    pub header_distance: u32,
    /// Footer distance from the bottom edge
    pub footer_distance: u32,
}

impl Default for SectionProperties {
    fn default() -> Self {
        // US Letter, one-inch margins
        Self {
            page_width: 12240,
            page_height: 15840,
            orientation: WdOrientation::Portrait,
            margin_top: 1440,
            margin_bottom: 1440,
            margin_left: 1440,
            margin_right: 1440,
            header_distance: 720,
            footer_distance: 720,
        }
    }
}

impl SectionProperties {
    /// US Letter (8.5" x 11").
    pub fn letter() -> Self {
        Self::default()
    }

    /// A4 (210mm x 297mm).
    pub fn a4() -> Self {
        Self {
            page_width: 11906,
            page_height: 16838,
            ..Default::default()
        }
    }

    /// US Legal (8.5" x 14").
    pub fn legal() -> Self {
        Self {
            page_height: 20160,
            ..Default::default()
        }
    }

    /// Landscape orientation; the long edge becomes the width.
    pub fn landscape(mut self) -> Self {
        if self.orientation == WdOrientation::Portrait {
            std::mem::swap(&mut self.page_width, &mut self.page_height);
        }
        self.orientation = WdOrientation::Landscape;
        self
    }

    /// Set margins in inches.
    pub fn margins(mut self, top: f64, bottom: f64, left: f64, right: f64) -> Self {
        self.margin_top = inches_to_twips(top);
        self.margin_bottom = inches_to_twips(bottom);
        self.margin_left = inches_to_twips(left);
        self.margin_right = inches_to_twips(right);
        self
    }

    /// Width between the left and right margins.
    pub fn text_width(&self) -> u32 {
        self.page_width
            .saturating_sub(self.margin_left)
            .saturating_sub(self.margin_right)
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> std::fmt::Result {
        xml.push_str("<w:sectPr>");
        write!(xml, r#"<w:pgSz w:w="{}" w:h="{}""#, self.page_width, self.page_height)?;
        if self.orientation == WdOrientation::Landscape {
            xml.push_str(r#" w:orient="landscape""#);
        }
        xml.push_str("/>");
        write!(
            xml,
            r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="0"/>"#,
            self.margin_top,
            self.margin_right,
            self.margin_bottom,
            self.margin_left,
            self.header_distance,
            self.footer_distance
        )?;
        xml.push_str("</w:sectPr>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_text_width() {
        let section = SectionProperties::letter();
        assert_eq!(section.text_width(), 9360);
    }

    #[test]
    fn test_landscape_swaps_once() {
        let section = SectionProperties::a4().landscape().landscape();
        assert_eq!((section.page_width, section.page_height), (16838, 11906));
        assert_eq!(section.orientation, WdOrientation::Landscape);
    }

    #[test]
    fn test_margins() {
        let section = SectionProperties::legal().margins(1.0, 1.0, 0.75, 0.75);
        assert_eq!(section.margin_left, 1080);
        assert_eq!(section.page_height, 20160);
        assert_eq!(section.text_width(), 12240 - 2160);
    }

    #[test]
    fn test_sect_pr_xml() {
        let mut xml = String::new();
        SectionProperties::letter().landscape().to_xml(&mut xml).unwrap();
        assert!(xml.starts_with(r#"<w:sectPr><w:pgSz w:w="15840" w:h="12240" w:orient="landscape"/>"#));
        assert!(xml.contains(r#"w:top="1440""#));
    }
}
