/// Run types and implementation for DOCX documents.
use crate::common::xml::escape_text;
use std::fmt::Write as FmtWrite;

use super::field::MutableField;
use super::image::InlineImage;

/// Run content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunContent {
    /// Plain text
    Text(String),
    /// Tab character
    Tab,
    /// Line break
    Break,
    /// Page break
    PageBreak,
    /// One piece of a complex field
    Field(MutableField),
    /// Inline picture
    Drawing(InlineImage),
}

/// A mutable run.
///
/// Runs carry one piece of content and character formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableRun {
    pub(crate) content: RunContent,
    pub(crate) properties: RunProperties,
}

impl MutableRun {
    pub fn new(content: RunContent) -> Self {
        Self {
            content,
            properties: RunProperties::default(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(RunContent::Text(text.into()))
    }

    pub fn field(field: MutableField) -> Self {
        Self::new(RunContent::Field(field))
    }

    #[inline]
    pub fn content(&self) -> &RunContent {
        &self.content
    }

    /// Literal text of the run; field instructions contribute nothing.
    pub fn get_text(&self) -> &str {
        match &self.content {
            RunContent::Text(s) => s,
            RunContent::Tab => "\t",
            RunContent::Break => "\n",
            _ => "",
        }
    }

    pub fn image(&self) -> Option<&InlineImage> {
        match &self.content {
            RunContent::Drawing(image) => Some(image),
            _ => None,
        }
    }

    /// Make the text bold.
    pub fn bold(&mut self, bold: bool) -> &mut Self {
        self.properties.bold = Some(bold);
        self
    }

    /// Make the text italic.
    pub fn italic(&mut self, italic: bool) -> &mut Self {
        self.properties.italic = Some(italic);
        self
    }

    /// Set font size in half-points (e.g., 24 = 12pt).
    pub fn font_size(&mut self, size: u32) -> &mut Self {
        self.properties.font_size = Some(size);
        self
    }

    /// Set text color using hex RGB (e.g., "FF0000" for red).
    pub fn color(&mut self, color: &str) -> &mut Self {
        self.properties.color = Some(color.to_string());
        self
    }

    #[inline]
    pub fn properties(&self) -> &RunProperties {
        &self.properties
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> std::fmt::Result {
        xml.push_str("<w:r>");
        self.properties.to_xml(xml)?;

        match &self.content {
            RunContent::Text(text) => {
                write!(xml, r#"<w:t xml:space="preserve">{}</w:t>"#, escape_text(text))?;
            },
            RunContent::Tab => xml.push_str("<w:tab/>"),
            RunContent::Break => xml.push_str("<w:br/>"),
            RunContent::PageBreak => xml.push_str(r#"<w:br w:type="page"/>"#),
            RunContent::Field(field) => field.to_xml(xml)?,
            RunContent::Drawing(image) => image.to_xml(xml)?,
        }

        xml.push_str("</w:r>");
        Ok(())
    }
}

/// Run properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProperties {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Half-points
    pub font_size: Option<u32>,
    pub color: Option<String>,
}

impl RunProperties {
    pub(crate) fn has_properties(&self) -> bool {
        self.bold.is_some()
            || self.italic.is_some()
            || self.font_size.is_some()
            || self.color.is_some()
    }

    fn to_xml(&self, xml: &mut String) -> std::fmt::Result {
        if !self.has_properties() {
            return Ok(());
        }

        xml.push_str("<w:rPr>");
        match self.bold {
            Some(true) => xml.push_str("<w:b/>"),
            Some(false) => xml.push_str(r#"<w:b w:val="0"/>"#),
            None => {},
        }
        match self.italic {
            Some(true) => xml.push_str("<w:i/>"),
            Some(false) => xml.push_str(r#"<w:i w:val="0"/>"#),
            None => {},
        }
        if let Some(ref color) = self.color {
            write!(xml, r#"<w:color w:val="{}"/>"#, color)?;
        }
        if let Some(size) = self.font_size {
            write!(xml, r#"<w:sz w:val="{}"/><w:szCs w:val="{}"/>"#, size, size)?;
        }
        xml.push_str("</w:rPr>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_xml(run: &MutableRun) -> String {
        let mut xml = String::new();
        run.to_xml(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_text_run() {
        let xml = to_xml(&MutableRun::text("Fish & chips"));
        assert_eq!(xml, r#"<w:r><w:t xml:space="preserve">Fish &amp; chips</w:t></w:r>"#);
    }

    #[test]
    fn test_run_formatting() {
        let mut run = MutableRun::text("Total");
        run.bold(true).italic(false).font_size(28).color("2F5496");
        let xml = to_xml(&run);
        assert!(xml.contains(
            r#"<w:rPr><w:b/><w:i w:val="0"/><w:color w:val="2F5496"/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr>"#
        ));
    }

    #[test]
    fn test_special_content() {
        assert!(to_xml(&MutableRun::new(RunContent::PageBreak)).contains(r#"<w:br w:type="page"/>"#));
        assert!(to_xml(&MutableRun::new(RunContent::Tab)).contains("<w:tab/>"));
        assert!(to_xml(&MutableRun::field(MutableField::End)).contains("fldCharType=\"end\""));
    }

    #[test]
    fn test_field_runs_have_no_text() {
        let run = MutableRun::field(MutableField::instruction(" SEQ Table "));
        assert_eq!(run.get_text(), "");
        assert_eq!(MutableRun::new(RunContent::Tab).get_text(), "\t");
    }
}
