/// Inline image drawings for DOCX documents.
use crate::common::unit::{emu_to_px, px_to_emu};
use crate::common::xml::escape_xml;
use std::fmt::Write as FmtWrite;

/// An inline picture anchored in a run.
///
/// The payload lives in the document's media registry; the drawing only
/// carries the relationship id that points at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub(crate) r_id: String,
    /// Unique `wp:docPr/@id` within the document
    pub(crate) id: u32,
    pub(crate) width_emu: i64,
    pub(crate) height_emu: i64,
    pub(crate) description: String,
}

impl InlineImage {
    /// Drawing sized in pixels (1 px = 9525 EMU).
    pub(crate) fn from_pixels(r_id: String, id: u32, width_px: u32, height_px: u32) -> Self {
        Self {
            r_id,
            id,
            width_emu: px_to_emu(width_px),
            height_emu: px_to_emu(height_px),
            description: String::new(),
        }
    }

    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Extent as `(cx, cy)` in EMU.
    pub fn extent_emu(&self) -> (i64, i64) {
        (self.width_emu, self.height_emu)
    }

    pub fn extent_px(&self) -> (u32, u32) {
        (emu_to_px(self.width_emu), emu_to_px(self.height_emu))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> std::fmt::Result {
        let desc = escape_xml(&self.description);
        let (cx, cy) = (self.width_emu, self.height_emu);

        write!(
            xml,
            r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{id}" name="Picture {id}" descr="{desc}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:nvPicPr><pic:cNvPr id="{id}" name="Picture {id}" descr="{desc}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{r_id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#,
            id = self.id,
            r_id = escape_xml(&self.r_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_extent() {
        let image = InlineImage::from_pixels("rId4".into(), 1, 100, 50);
        assert_eq!(image.extent_emu(), (952_500, 476_250));
        assert_eq!(image.extent_px(), (100, 50));
    }

    #[test]
    fn test_drawing_xml() {
        let mut image = InlineImage::from_pixels("rId7".into(), 3, 100, 100);
        image.set_description("Chart \"Q1\"");
        let mut xml = String::new();
        image.to_xml(&mut xml).unwrap();

        assert!(xml.contains(r#"<wp:extent cx="952500" cy="952500"/>"#));
        assert!(xml.contains(r#"<a:blip r:embed="rId7"/>"#));
        assert!(xml.contains(r#"<wp:docPr id="3" name="Picture 3" descr="Chart &quot;Q1&quot;"/>"#));
        assert!(xml.starts_with("<w:drawing>") && xml.ends_with("</w:drawing>"));
    }
}
