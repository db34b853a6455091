/// Style writer support for DOCX documents.
///
/// This module provides the style definitions written to `styles.xml` and the
/// catalog a document keeps them in.
use crate::common::xml::escape_xml;
use crate::ooxml::docx::enums::WdStyleType;
use crate::ooxml::docx::template::XML_DECLARATION;
use crate::ooxml::error::{OoxmlError, Result};
use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fmt::Write as FmtWrite;
use std::ops::Range;

/// A mutable style definition for writing.
///
/// Styles are referenced by id from paragraphs (`w:pStyle`) and tables
/// (`w:tblStyle`).
///
/// # Examples
///
/// ```rust
/// use docsmith::ooxml::docx::writer::MutableStyle;
/// use docsmith::ooxml::docx::enums::WdStyleType;
///
/// let mut style = MutableStyle::new("Note", "Note", WdStyleType::Paragraph);
/// style.set_based_on(Some("Normal".to_string()));
/// style.set_font_size(Some(18)); // 9pt (half-points)
/// style.set_italic(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableStyle {
    /// Style identifier (e.g., "Heading1")
    style_id: String,
    /// UI-visible name (e.g., "heading 1")
    name: String,
    style_type: WdStyleType,
    /// Whether this is the default style for its type
    is_default: bool,
    is_custom: bool,
    based_on: Option<String>,
    /// Style applied to the paragraph following this one
    next: Option<String>,
    priority: Option<i32>,
    is_quick_style: bool,
    is_hidden: bool,
    /// Outline level (0-based) used by TOC `\u`
    outline_level: Option<u8>,
    keep_next: bool,
    space_before: Option<u32>,
    space_after: Option<u32>,
    font_name: Option<String>,
    /// Font size in half-points (e.g., 24 = 12pt)
    font_size: Option<u32>,
    bold: bool,
    italic: bool,
    /// Font color (RGB hex format, e.g., "FF0000" for red)
    color: Option<String>,
}

impl MutableStyle {
    pub fn new(
        style_id: impl Into<String>,
        name: impl Into<String>,
        style_type: WdStyleType,
    ) -> Self {
        Self {
            style_id: style_id.into(),
            name: name.into(),
            style_type,
            is_default: false,
            is_custom: true,
            based_on: None,
            next: None,
            priority: None,
            is_quick_style: false,
            is_hidden: false,
            outline_level: None,
            keep_next: false,
            space_before: None,
            space_after: None,
            font_name: None,
            font_size: None,
            bold: false,
            italic: false,
            color: None,
        }
    }

    #[inline]
    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn style_type(&self) -> WdStyleType {
        self.style_type
    }

    pub fn set_default(&mut self, is_default: bool) {
        self.is_default = is_default;
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn set_custom(&mut self, is_custom: bool) {
        self.is_custom = is_custom;
    }

    pub fn set_based_on(&mut self, based_on: Option<String>) {
        self.based_on = based_on;
    }

    #[inline]
    pub fn based_on(&self) -> Option<&str> {
        self.based_on.as_deref()
    }

    pub fn set_next(&mut self, next: Option<String>) {
        self.next = next;
    }

    #[inline]
    pub fn next(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn set_priority(&mut self, priority: Option<i32>) {
        self.priority = priority;
    }

    pub fn set_quick_style(&mut self, is_quick_style: bool) {
        self.is_quick_style = is_quick_style;
    }

    pub fn set_hidden(&mut self, is_hidden: bool) {
        self.is_hidden = is_hidden;
    }

    pub fn set_outline_level(&mut self, level: Option<u8>) {
        self.outline_level = level;
    }

    pub fn set_keep_next(&mut self, keep_next: bool) {
        self.keep_next = keep_next;
    }

    pub fn set_space_before(&mut self, twips: Option<u32>) {
        self.space_before = twips;
    }

    pub fn set_space_after(&mut self, twips: Option<u32>) {
        self.space_after = twips;
    }

    pub fn set_font_name(&mut self, font_name: Option<String>) {
        self.font_name = font_name;
    }

    pub fn set_font_size(&mut self, font_size: Option<u32>) {
        self.font_size = font_size;
    }

    #[inline]
    pub fn font_size(&self) -> Option<u32> {
        self.font_size
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }

    #[inline]
    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.italic = italic;
    }

    #[inline]
    pub fn italic(&self) -> bool {
        self.italic
    }

    pub fn set_color(&mut self, color: Option<String>) {
        self.color = color;
    }

    #[inline]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub(crate) fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(512);

        write!(
            &mut xml,
            r#"<w:style w:type="{}""#,
            self.style_type.to_xml()
        )?;
        if self.is_default {
            xml.push_str(r#" w:default="1""#);
        }
        if self.is_custom {
            xml.push_str(r#" w:customStyle="1""#);
        }
        write!(&mut xml, r#" w:styleId="{}">"#, escape_xml(&self.style_id))?;

        write!(&mut xml, r#"<w:name w:val="{}"/>"#, escape_xml(&self.name))?;
        if let Some(ref based_on) = self.based_on {
            write!(&mut xml, r#"<w:basedOn w:val="{}"/>"#, escape_xml(based_on))?;
        }
        if let Some(ref next) = self.next {
            write!(&mut xml, r#"<w:next w:val="{}"/>"#, escape_xml(next))?;
        }
        if let Some(priority) = self.priority {
            write!(&mut xml, r#"<w:uiPriority w:val="{}"/>"#, priority)?;
        }
        if self.is_hidden {
            xml.push_str("<w:semiHidden/><w:unhideWhenUsed/>");
        }
        if self.is_quick_style {
            xml.push_str("<w:qFormat/>");
        }

        if self.style_type == WdStyleType::Paragraph
            && (self.keep_next
                || self.space_before.is_some()
                || self.space_after.is_some()
                || self.outline_level.is_some())
        {
            xml.push_str("<w:pPr>");
            if self.keep_next {
                xml.push_str("<w:keepNext/><w:keepLines/>");
            }
            if self.space_before.is_some() || self.space_after.is_some() {
                xml.push_str("<w:spacing");
                if let Some(before) = self.space_before {
                    write!(&mut xml, r#" w:before="{}""#, before)?;
                }
                if let Some(after) = self.space_after {
                    write!(&mut xml, r#" w:after="{}""#, after)?;
                }
                xml.push_str("/>");
            }
            if let Some(level) = self.outline_level {
                write!(&mut xml, r#"<w:outlineLvl w:val="{}"/>"#, level)?;
            }
            xml.push_str("</w:pPr>");
        }

        let has_run_props = self.font_name.is_some()
            || self.font_size.is_some()
            || self.bold
            || self.italic
            || self.color.is_some();
        if has_run_props {
            xml.push_str("<w:rPr>");
            if let Some(ref font_name) = self.font_name {
                write!(
                    &mut xml,
                    r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
                    escape_xml(font_name)
                )?;
            }
            if self.bold {
                xml.push_str("<w:b/><w:bCs/>");
            }
            if self.italic {
                xml.push_str("<w:i/><w:iCs/>");
            }
            if let Some(ref color) = self.color {
                write!(&mut xml, r#"<w:color w:val="{}"/>"#, escape_xml(color))?;
            }
            if let Some(size) = self.font_size {
                write!(&mut xml, r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, size)?;
            }
            xml.push_str("</w:rPr>");
        }

        if self.style_type == WdStyleType::Table {
            xml.push_str(concat!(
                r#"<w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar>"#,
                r#"<w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/>"#,
                r#"<w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/>"#,
                "</w:tblCellMar></w:tblPr>"
            ));
        }

        xml.push_str("</w:style>");
        Ok(xml)
    }

    /// "Normal", the default paragraph style.
    pub fn normal() -> Self {
        let mut style = Self::new("Normal", "Normal", WdStyleType::Paragraph);
        style.set_default(true);
        style.set_custom(false);
        style.set_quick_style(true);
        style
    }

    /// "HeadingN" for `level` 1-9: bold accent-colored text shrinking by level,
    /// with outline level `level - 1` so TOC fields pick it up.
    pub fn heading(level: u8) -> Self {
        let level = level.clamp(1, 9);
        let mut style = Self::new(
            format!("Heading{}", level),
            format!("heading {}", level),
            WdStyleType::Paragraph,
        );
        style.set_custom(false);
        style.set_based_on(Some("Normal".to_string()));
        style.set_next(Some("Normal".to_string()));
        style.set_priority(Some(9));
        style.set_quick_style(true);
        style.set_keep_next(true);
        style.set_space_before(Some(if level == 1 { 480 } else { 200 }));
        style.set_outline_level(Some(level - 1));
        style.set_bold(true);
        style.set_font_size(Some(28u32.saturating_sub(2 * (u32::from(level) - 1)).max(20)));
        style.set_color(Some("2F5496".to_string()));
        style
    }

    /// "Caption": small gray italic text used under tables and figures.
    pub fn caption() -> Self {
        let mut style = Self::new("Caption", "caption", WdStyleType::Paragraph);
        style.set_custom(false);
        style.set_based_on(Some("Normal".to_string()));
        style.set_next(Some("Normal".to_string()));
        style.set_priority(Some(35));
        style.set_quick_style(true);
        style.set_space_after(Some(200));
        style.set_italic(true);
        style.set_font_size(Some(20));
        style.set_color(Some("595959".to_string()));
        style
    }

    /// "TableNormal", the default table style.
    pub fn table_normal() -> Self {
        let mut style = Self::new("TableNormal", "Normal Table", WdStyleType::Table);
        style.set_default(true);
        style.set_custom(false);
        style.set_priority(Some(99));
        style.set_hidden(true);
        style
    }
}

/// Generate a complete styles.xml document from a list of styles.
pub fn generate_styles_xml(styles: &[MutableStyle]) -> Result<String> {
    let mut xml = String::with_capacity(4096);

    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    );
    xml.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );

    xml.push_str("<w:docDefaults>");
    xml.push_str("<w:rPrDefault><w:rPr>");
    xml.push_str(r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/>"#);
    xml.push_str(r#"<w:sz w:val="22"/><w:szCs w:val="22"/>"#);
    xml.push_str("</w:rPr></w:rPrDefault>");
    xml.push_str(r#"<w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault>"#);
    xml.push_str("</w:docDefaults>");

    for style in styles {
        xml.push_str(&style.to_xml()?);
    }

    xml.push_str("</w:styles>");
    Ok(xml)
}

/// The style definitions of a document.
///
/// A catalog is either generated from [`MutableStyle`]s or imported verbatim
/// from another package's `styles.xml`. Importing replaces the catalog
/// wholesale; styles added afterwards are spliced into the imported XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleCatalog {
    kind: CatalogKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CatalogKind {
    Generated(Vec<MutableStyle>),
    Imported { xml: String, ids: Vec<String> },
}

impl StyleCatalog {
    /// Normal, Heading1, Caption and TableNormal.
    pub fn defaults() -> Self {
        Self {
            kind: CatalogKind::Generated(vec![
                MutableStyle::normal(),
                MutableStyle::heading(1),
                MutableStyle::caption(),
                MutableStyle::table_normal(),
            ]),
        }
    }

    /// Catalog backed by an existing `styles.xml`.
    pub fn from_styles_xml(xml: impl Into<String>) -> Result<Self> {
        let xml = xml.into();
        let ids = style_spans(&xml)?.into_iter().map(|(id, _)| id).collect::<Vec<_>>();
        debug!("Imported style catalog with {} styles", ids.len());
        Ok(Self {
            kind: CatalogKind::Imported { xml, ids },
        })
    }

    pub fn is_imported(&self) -> bool {
        matches!(self.kind, CatalogKind::Imported { .. })
    }

    /// Add a style, replacing any style with the same id.
    pub fn add_style(&mut self, style: MutableStyle) -> Result<()> {
        if style.style_id().is_empty() {
            return Err(OoxmlError::InvalidArgument("style id must not be empty".to_string()));
        }

        match &mut self.kind {
            CatalogKind::Generated(styles) => {
                match styles.iter_mut().find(|s| s.style_id() == style.style_id()) {
                    Some(existing) => *existing = style,
                    None => styles.push(style),
                }
            },
            CatalogKind::Imported { xml, ids } => {
                let style_xml = style.to_xml()?;
                if let Some((_, span)) = style_spans(xml)?
                    .into_iter()
                    .find(|(id, _)| id == style.style_id())
                {
                    xml.replace_range(span, "");
                } else {
                    ids.push(style.style_id().to_string());
                }
                let end = xml.rfind("</w:styles>").ok_or_else(|| {
                    OoxmlError::Xml("styles part has no closing w:styles tag".to_string())
                })?;
                xml.insert_str(end, &style_xml);
            },
        }
        Ok(())
    }

    pub fn has_style(&self, style_id: &str) -> bool {
        self.style_ids().contains(&style_id)
    }

    pub fn style_ids(&self) -> Vec<&str> {
        match &self.kind {
            CatalogKind::Generated(styles) => styles.iter().map(MutableStyle::style_id).collect(),
            CatalogKind::Imported { ids, .. } => ids.iter().map(String::as_str).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.kind {
            CatalogKind::Generated(styles) => styles.len(),
            CatalogKind::Imported { ids, .. } => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The styles.xml content.
    pub fn to_xml(&self) -> Result<String> {
        match &self.kind {
            CatalogKind::Generated(styles) => generate_styles_xml(styles),
            CatalogKind::Imported { xml, .. } => Ok(xml.clone()),
        }
    }
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Byte span of every `w:style` element, keyed by style id.
fn style_spans(xml: &str) -> Result<Vec<(String, Range<usize>)>> {
    let mut reader = Reader::from_str(xml);
    let mut spans = Vec::new();

    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:style" => {
                let id = style_id_attr(&e)?;
                reader.read_to_end(e.name())?;
                if let Some(id) = id {
                    spans.push((id, start..reader.buffer_position() as usize));
                }
            },
            Event::Empty(e) if e.name().as_ref() == b"w:style" => {
                if let Some(id) = style_id_attr(&e)? {
                    spans.push((id, start..reader.buffer_position() as usize));
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(spans)
}

fn style_id_attr(e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"w:styleId" {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE_STYLES: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
        "\n",
        r#"<w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/><w:rPr><w:i/></w:rPr></w:style>"#,
        "</w:styles>"
    );

    #[test]
    fn test_default_catalog() {
        let catalog = StyleCatalog::defaults();
        assert_eq!(catalog.style_ids(), vec!["Normal", "Heading1", "Caption", "TableNormal"]);
        assert!(!catalog.is_imported());

        let xml = catalog.to_xml().unwrap();
        assert!(xml.contains(r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal">"#));
        assert!(xml.contains(r#"<w:style w:type="table" w:default="1" w:styleId="TableNormal">"#));
    }

    #[test]
    fn test_heading_and_caption_formatting() {
        let heading = MutableStyle::heading(1);
        assert!(heading.bold());
        assert_eq!(heading.font_size(), Some(28));
        assert_eq!(heading.color(), Some("2F5496"));
        assert_eq!(MutableStyle::heading(3).style_id(), "Heading3");
        assert_eq!(MutableStyle::heading(9).font_size(), Some(20));

        let caption = MutableStyle::caption();
        assert!(caption.italic());
        assert_eq!(caption.font_size(), Some(20));

        let xml = heading.to_xml().unwrap();
        assert!(xml.contains(r#"<w:outlineLvl w:val="0"/>"#));
        assert!(xml.contains(r#"<w:sz w:val="28"/>"#));
    }

    #[test]
    fn test_imported_catalog() {
        let catalog = StyleCatalog::from_styles_xml(TEMPLATE_STYLES).unwrap();
        assert!(catalog.is_imported());
        assert_eq!(catalog.style_ids(), vec!["Normal", "Quote"]);
        assert!(!catalog.has_style("Heading1"));
        assert_eq!(catalog.to_xml().unwrap(), TEMPLATE_STYLES);
    }

    #[test]
    fn test_add_style_splices_into_imported_xml() {
        let mut catalog = StyleCatalog::from_styles_xml(TEMPLATE_STYLES).unwrap();
        catalog.add_style(MutableStyle::caption()).unwrap();

        let mut quote = MutableStyle::new("Quote", "Quote", WdStyleType::Paragraph);
        quote.set_bold(true);
        catalog.add_style(quote).unwrap();

        assert_eq!(catalog.style_ids(), vec!["Normal", "Quote", "Caption"]);
        let xml = catalog.to_xml().unwrap();
        assert_eq!(xml.matches(r#"w:styleId="Quote""#).count(), 1);
        assert!(xml.contains("<w:b/>"));
        assert!(xml.ends_with("</w:style></w:styles>"));

        let reparsed = StyleCatalog::from_styles_xml(xml).unwrap();
        assert_eq!(reparsed.len(), 3);
    }

    #[test]
    fn test_add_style_replaces_generated() {
        let mut catalog = StyleCatalog::defaults();
        let mut normal = MutableStyle::normal();
        normal.set_font_size(Some(24));
        catalog.add_style(normal).unwrap();
        catalog.add_style(MutableStyle::heading(2)).unwrap();

        assert_eq!(catalog.len(), 5);
        assert!(catalog.has_style("Heading2"));
        assert!(catalog.to_xml().unwrap().contains(r#"<w:sz w:val="24"/>"#));
        assert!(catalog
            .add_style(MutableStyle::new("", "Nameless", WdStyleType::Paragraph))
            .is_err());
    }
}
