/// Document writer implementation for DOCX.
use crate::formula::MathNode;
use crate::ooxml::docx::format::{ImageFormat, ParagraphAlignment};
use crate::ooxml::docx::package::Package;
use crate::ooxml::docx::reader;
use crate::ooxml::docx::template::{
    DOCUMENT_NAMESPACES, XML_DECLARATION, default_app_props_xml, default_core_props_xml,
    default_font_table_xml, settings_xml,
};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as RT};
use crate::ooxml::opc::{OpcPackage, PackURI, Part};
use log::{debug, info, warn};
use std::fmt::Write as FmtWrite;
use std::path::Path;

use super::field::{MutableField, seq_instruction};
use super::image::InlineImage;
use super::paragraph::MutableParagraph;
use super::relmap::RelationshipMapper;
use super::run::{MutableRun, RunContent};
use super::section::SectionProperties;
use super::style::{MutableStyle, StyleCatalog};
use super::table::{CellVerticalAlignment, MutableTable, TableAlignment, TableBorder};
use super::toc::TableOfContents;

const DOCUMENT_PARTNAME: &str = "/word/document.xml";

/// Handle to a paragraph of the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParagraphId(pub(crate) usize);

/// Handle to a table of the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(pub(crate) usize);

/// Block-level body content, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyElement {
    Paragraph(MutableParagraph),
    Table(MutableTable),
}

/// Parts cloned verbatim from a template or a reopened package.
#[derive(Debug, Clone, Default)]
pub(crate) struct ImportedParts {
    pub(crate) numbering: Option<Vec<u8>>,
    pub(crate) theme: Option<Vec<u8>>,
    pub(crate) font_table: Option<Vec<u8>>,
}

/// A Word document generation session.
///
/// Every builder call appends to the body; nothing is written until
/// [`save`](Self::save) or [`to_bytes`](Self::to_bytes), which build every
/// part in memory first.
///
/// # Examples
///
/// ```rust
/// use docsmith::MutableDocument;
///
/// let mut doc = MutableDocument::new();
/// doc.add_paragraph("Results", Some("Heading1"))?;
/// let table = doc.create_table(2, 2, None)?;
/// doc.set_cell_text(table, 0, 0, "Name", None)?;
/// doc.add_caption("Participants", "Table")?;
///
/// let bytes = doc.to_bytes()?;
/// assert!(bytes.starts_with(b"PK"));
/// # Ok::<(), docsmith::OoxmlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MutableDocument {
    pub(crate) body: Vec<BodyElement>,
    pub(crate) styles: StyleCatalog,
    pub(crate) imported: ImportedParts,
    pub(crate) relmap: RelationshipMapper,
    pub(crate) section: SectionProperties,
    pub(crate) update_fields: bool,
    /// Next `wp:docPr/@id`
    pub(crate) next_drawing_id: u32,
}

impl MutableDocument {
    /// Create an empty document with the default style catalog.
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            styles: StyleCatalog::defaults(),
            imported: ImportedParts::default(),
            relmap: RelationshipMapper::new(),
            section: SectionProperties::default(),
            update_fields: false,
            next_drawing_id: 1,
        }
    }

    /// Reopen a .docx file as a session.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        reader::read_package(&Package::open(path)?)
    }

    /// Reopen a .docx package held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        reader::read_package(&Package::from_bytes(data)?)
    }

    // ---------------------------------------------------------------------
    // Styles
    // ---------------------------------------------------------------------

    /// Reset the catalog to Normal, Heading1, Caption and TableNormal.
    pub fn register_default_styles(&mut self) {
        self.styles = StyleCatalog::defaults();
    }

    /// Replace the style catalog with the styles part of `path`, and take
    /// its numbering, theme and font table parts when present.
    ///
    /// Styles added before this call are lost.
    ///
    /// # Errors
    /// - [`OoxmlError::PackageNotFound`] when `path` does not exist
    /// - [`OoxmlError::MissingStyles`] when the template has no styles part
    pub fn import_styles_from<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let template = Package::open(path)?;
        let styles = template
            .related_part(RT::STYLES)?
            .ok_or_else(|| OoxmlError::MissingStyles(path.display().to_string()))?;
        let catalog = StyleCatalog::from_styles_xml(styles.xml()?)?;

        let blob = |reltype: &str| -> Result<Option<Vec<u8>>> {
            Ok(template.related_part(reltype)?.map(|part| part.blob().to_vec()))
        };
        let numbering = blob(RT::NUMBERING)?;
        let theme = blob(RT::THEME)?;
        let font_table = blob(RT::FONT_TABLE)?;

        info!(
            "Imported {} styles from {}",
            catalog.len(),
            path.display()
        );
        self.styles = catalog;
        if numbering.is_some() {
            self.imported.numbering = numbering;
        }
        if theme.is_some() {
            self.imported.theme = theme;
        }
        if font_table.is_some() {
            self.imported.font_table = font_table;
        }
        Ok(())
    }

    /// Add a style, replacing any style with the same id.
    pub fn add_style(&mut self, style: MutableStyle) -> Result<()> {
        self.styles.add_style(style)
    }

    pub fn has_style(&self, style_id: &str) -> bool {
        self.styles.has_style(style_id)
    }

    pub fn style_ids(&self) -> Vec<&str> {
        self.styles.style_ids()
    }

    #[inline]
    pub fn styles(&self) -> &StyleCatalog {
        &self.styles
    }

    // ---------------------------------------------------------------------
    // Paragraphs and fields
    // ---------------------------------------------------------------------

    fn push_paragraph(&mut self, para: MutableParagraph) -> ParagraphId {
        self.body.push(BodyElement::Paragraph(para));
        ParagraphId(self.body.len() - 1)
    }

    /// Append a paragraph holding one run of `text`.
    pub fn add_paragraph(&mut self, text: &str, style: Option<&str>) -> Result<ParagraphId> {
        Ok(self.push_paragraph(MutableParagraph::with_text(text, style)))
    }

    /// Append a paragraph styled `Heading{level}`.
    ///
    /// # Errors
    /// [`OoxmlError::InvalidArgument`] unless `level` is 1-9.
    pub fn add_heading(&mut self, text: &str, level: u8) -> Result<ParagraphId> {
        if !(1..=9).contains(&level) {
            return Err(OoxmlError::InvalidArgument(format!(
                "heading level must be 1-9, got {}",
                level
            )));
        }
        let style = format!("Heading{}", level);
        self.add_paragraph(text, Some(&style))
    }

    pub fn add_page_break(&mut self) -> Result<ParagraphId> {
        let mut para = MutableParagraph::new();
        para.add_run(MutableRun::new(RunContent::PageBreak));
        Ok(self.push_paragraph(para))
    }

    /// Append a caption: `"{label} "`, a `SEQ {label}` field, then `": {text}"`.
    ///
    /// The sequence number is left to the consuming word processor.
    ///
    /// # Errors
    /// [`OoxmlError::InvalidArgument`] when `label` is empty or contains whitespace.
    pub fn add_caption(&mut self, text: &str, label: &str) -> Result<ParagraphId> {
        if label.is_empty() || label.chars().any(char::is_whitespace) {
            return Err(OoxmlError::InvalidArgument(format!(
                "caption label must be a single word, got {:?}",
                label
            )));
        }

        let mut para = MutableParagraph::new();
        para.set_style(Some("Caption"));
        para.add_run_with_text(&format!("{} ", label))
            .add_run(MutableRun::field(MutableField::begin()))
            .add_run(MutableRun::field(MutableField::instruction(seq_instruction(label))))
            .add_run(MutableRun::field(MutableField::End))
            .add_run_with_text(&format!(": {}", text));
        Ok(self.push_paragraph(para))
    }

    /// Append a Heading1 `title` and a TOC field covering heading levels 1-3.
    ///
    /// Returns the handle of the field paragraph.
    pub fn add_table_of_contents(&mut self, title: &str) -> Result<ParagraphId> {
        self.add_table_of_contents_with(title, &TableOfContents::default())
    }

    pub fn add_table_of_contents_with(
        &mut self,
        title: &str,
        toc: &TableOfContents,
    ) -> Result<ParagraphId> {
        self.add_paragraph(title, Some("Heading1"))?;
        Ok(self.push_paragraph(toc.to_paragraph()))
    }

    /// Ask the consumer to recompute SEQ and TOC fields when the file opens.
    pub fn set_update_fields_on_open(&mut self, update: bool) {
        self.update_fields = update;
    }

    #[inline]
    pub fn update_fields_on_open(&self) -> bool {
        self.update_fields
    }

    pub fn set_alignment(&mut self, id: ParagraphId, alignment: ParagraphAlignment) -> Result<()> {
        self.paragraph_at_mut(id)?.set_alignment(Some(alignment));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Body access
    // ---------------------------------------------------------------------

    #[inline]
    pub fn body(&self) -> &[BodyElement] {
        &self.body
    }

    pub fn paragraph(&self, id: ParagraphId) -> Option<&MutableParagraph> {
        match self.body.get(id.0)? {
            BodyElement::Paragraph(para) => Some(para),
            BodyElement::Table(_) => None,
        }
    }

    pub fn paragraph_mut(&mut self, id: ParagraphId) -> Option<&mut MutableParagraph> {
        match self.body.get_mut(id.0)? {
            BodyElement::Paragraph(para) => Some(para),
            BodyElement::Table(_) => None,
        }
    }

    pub fn table(&self, id: TableId) -> Option<&MutableTable> {
        match self.body.get(id.0)? {
            BodyElement::Table(table) => Some(table),
            BodyElement::Paragraph(_) => None,
        }
    }

    pub fn table_mut(&mut self, id: TableId) -> Option<&mut MutableTable> {
        match self.body.get_mut(id.0)? {
            BodyElement::Table(table) => Some(table),
            BodyElement::Paragraph(_) => None,
        }
    }

    /// Body paragraphs with their handles, in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = (ParagraphId, &MutableParagraph)> {
        self.body.iter().enumerate().filter_map(|(i, element)| match element {
            BodyElement::Paragraph(para) => Some((ParagraphId(i), para)),
            BodyElement::Table(_) => None,
        })
    }

    /// Body tables with their handles, in document order.
    pub fn tables(&self) -> impl Iterator<Item = (TableId, &MutableTable)> {
        self.body.iter().enumerate().filter_map(|(i, element)| match element {
            BodyElement::Table(table) => Some((TableId(i), table)),
            BodyElement::Paragraph(_) => None,
        })
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    fn paragraph_at_mut(&mut self, id: ParagraphId) -> Result<&mut MutableParagraph> {
        self.paragraph_mut(id)
            .ok_or_else(|| OoxmlError::InvalidArgument(format!("no paragraph at body index {}", id.0)))
    }

    fn table_at(&self, id: TableId) -> Result<&MutableTable> {
        self.table(id)
            .ok_or_else(|| OoxmlError::InvalidArgument(format!("no table at body index {}", id.0)))
    }

    fn table_at_mut(&mut self, id: TableId) -> Result<&mut MutableTable> {
        self.table_mut(id)
            .ok_or_else(|| OoxmlError::InvalidArgument(format!("no table at body index {}", id.0)))
    }

    // ---------------------------------------------------------------------
    // Tables
    // ---------------------------------------------------------------------

    /// Append a `rows` x `cols` table of empty cells, full width, with single
    /// borders and columns sharing the text width equally.
    ///
    /// # Errors
    /// [`OoxmlError::InvalidDimension`] when `rows` or `cols` is zero.
    pub fn create_table(&mut self, rows: usize, cols: usize, style: Option<&str>) -> Result<TableId> {
        let col_width = if cols == 0 {
            0
        } else {
            self.section.text_width() / cols as u32
        };
        let mut table = MutableTable::new(rows, cols, col_width)?;
        table.set_style(style);
        self.body.push(BodyElement::Table(table));
        debug!("Created {}x{} table", rows, cols);
        Ok(TableId(self.body.len() - 1))
    }

    pub fn set_cell_text(
        &mut self,
        table: TableId,
        row: usize,
        col: usize,
        text: &str,
        style: Option<&str>,
    ) -> Result<()> {
        self.table_at_mut(table)?.set_cell_text(row, col, text, style)
    }

    pub fn cell_text(&self, table: TableId, row: usize, col: usize) -> Result<String> {
        self.table_at(table)?.cell_text(row, col)
    }

    pub fn merge_cells(
        &mut self,
        table: TableId,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> Result<()> {
        self.table_at_mut(table)?
            .merge_cells(start_row, start_col, end_row, end_col)
    }

    pub fn set_table_borders(&mut self, table: TableId, border: TableBorder) -> Result<()> {
        self.table_at_mut(table)?.set_borders(border)
    }

    pub fn set_table_alignment(&mut self, table: TableId, alignment: TableAlignment) -> Result<()> {
        self.table_at_mut(table)?.set_alignment(alignment);
        Ok(())
    }

    pub fn set_column_width(&mut self, table: TableId, col: usize, twips: u32) -> Result<()> {
        self.table_at_mut(table)?.set_column_width(col, twips)
    }

    pub fn apply_alternating_row_shading(
        &mut self,
        table: TableId,
        even: &str,
        odd: &str,
        header: Option<&str>,
    ) -> Result<()> {
        self.table_at_mut(table)?
            .apply_alternating_row_shading(even, odd, header)
    }

    pub fn set_header_row(&mut self, table: TableId, color: &str) -> Result<()> {
        self.table_at_mut(table)?.set_header_row(color)
    }

    pub fn set_row_height(&mut self, table: TableId, row: usize, twips: u32) -> Result<()> {
        self.table_at_mut(table)?.set_row_height(row, twips)
    }

    pub fn set_cell_shading(&mut self, table: TableId, row: usize, col: usize, color: &str) -> Result<()> {
        self.table_at_mut(table)?.set_cell_shading(row, col, color)
    }

    pub fn set_cell_vertical_alignment(
        &mut self,
        table: TableId,
        row: usize,
        col: usize,
        alignment: CellVerticalAlignment,
    ) -> Result<()> {
        self.table_at_mut(table)?
            .set_cell_vertical_alignment(row, col, alignment)
    }

    // ---------------------------------------------------------------------
    // Math
    // ---------------------------------------------------------------------

    /// Append one display equation built from `nodes`.
    pub fn add_equation(&mut self, nodes: Vec<MathNode>) -> Result<ParagraphId> {
        if nodes.is_empty() {
            return Err(OoxmlError::InvalidArgument("equation has no content".to_string()));
        }
        let mut para = MutableParagraph::new();
        para.add_math(nodes);
        Ok(self.push_paragraph(para))
    }

    pub fn add_fraction(&mut self, numerator: &str, denominator: &str) -> Result<ParagraphId> {
        self.add_equation(vec![MathNode::fraction(numerator, denominator)])
    }

    /// Square root, or the `degree`-th root when given.
    pub fn add_radical(&mut self, base: &str, degree: Option<&str>) -> Result<ParagraphId> {
        self.add_equation(vec![MathNode::radical(base, degree)])
    }

    pub fn add_superscript(&mut self, base: &str, exponent: &str) -> Result<ParagraphId> {
        self.add_equation(vec![MathNode::superscript(base, exponent)])
    }

    pub fn add_subscript(&mut self, base: &str, subscript: &str) -> Result<ParagraphId> {
        self.add_equation(vec![MathNode::subscript(base, subscript)])
    }

    /// Integral sign with optional limits; empty limits are omitted.
    pub fn add_integral(&mut self, integrand: &str, lower: &str, upper: &str) -> Result<ParagraphId> {
        self.add_equation(vec![MathNode::integral(integrand, lower, upper)])
    }

    /// Matrix of `rows` x `cols` cells, one `values` entry per row.
    ///
    /// # Errors
    /// [`OoxmlError::DimensionMismatch`] when `values` is not `rows` rows of
    /// `cols` values; nothing is appended.
    pub fn add_matrix<S: AsRef<str>>(
        &mut self,
        rows: usize,
        cols: usize,
        values: &[Vec<S>],
    ) -> Result<ParagraphId> {
        let matrix = MathNode::matrix(rows, cols, values)?;
        self.add_equation(vec![matrix])
    }

    pub fn add_parentheses(&mut self, content: &str, open: &str, close: &str) -> Result<ParagraphId> {
        self.add_equation(vec![MathNode::parentheses(content, open, close)])
    }

    // ---------------------------------------------------------------------
    // Images
    // ---------------------------------------------------------------------

    /// Append a paragraph holding the image at `path`, sized in pixels.
    ///
    /// # Errors
    /// - [`OoxmlError::UnsupportedFormat`] for an unknown extension
    /// - [`OoxmlError::Io`] when the file cannot be read
    pub fn insert_image<P: AsRef<Path>>(
        &mut self,
        path: P,
        width_px: u32,
        height_px: u32,
    ) -> Result<ParagraphId> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)?;
        let data = std::fs::read(path)?;
        let id = self.insert_image_from_bytes(data, format, width_px, height_px)?;

        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && let Some(image) = self.drawing_mut(id)
        {
            image.set_description(name);
        }
        Ok(id)
    }

    /// Append a paragraph holding an image payload already in memory.
    pub fn insert_image_from_bytes(
        &mut self,
        data: Vec<u8>,
        format: ImageFormat,
        width_px: u32,
        height_px: u32,
    ) -> Result<ParagraphId> {
        if width_px == 0 || height_px == 0 {
            return Err(OoxmlError::InvalidArgument(format!(
                "image extent must be positive, got {}x{} px",
                width_px, height_px
            )));
        }

        let r_id = self.relmap.add_image(data, format)?;
        let image = InlineImage::from_pixels(r_id, self.next_drawing_id, width_px, height_px);
        self.next_drawing_id += 1;

        let mut para = MutableParagraph::new();
        para.add_run(MutableRun::new(RunContent::Drawing(image)));
        Ok(self.push_paragraph(para))
    }

    fn drawing_mut(&mut self, id: ParagraphId) -> Option<&mut InlineImage> {
        self.paragraph_mut(id)?
            .runs_mut()
            .find_map(|run| match &mut run.content {
                RunContent::Drawing(image) => Some(image),
                _ => None,
            })
    }

    /// Payload behind an image relationship id.
    pub fn image_data(&self, r_id: &str) -> Option<&[u8]> {
        self.relmap.image_data(r_id)
    }

    // ---------------------------------------------------------------------
    // Section
    // ---------------------------------------------------------------------

    #[inline]
    pub fn section(&self) -> &SectionProperties {
        &self.section
    }

    pub fn section_mut(&mut self) -> &mut SectionProperties {
        &mut self.section
    }

    pub fn set_section(&mut self, section: SectionProperties) {
        self.section = section;
    }

    // ---------------------------------------------------------------------
    // Serialization
    // ---------------------------------------------------------------------

    /// The `word/document.xml` content.
    pub fn to_document_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096 + self.body.len() * 256);
        xml.push_str(XML_DECLARATION);
        write!(&mut xml, "<w:document {}><w:body>", DOCUMENT_NAMESPACES)?;

        for element in &self.body {
            match element {
                BodyElement::Paragraph(para) => para.to_xml(&mut xml)?,
                BodyElement::Table(table) => table.to_xml(&mut xml)?,
            }
        }

        self.section.to_xml(&mut xml)?;
        xml.push_str("</w:body></w:document>");
        Ok(xml)
    }

    /// Build the complete package in memory.
    ///
    /// # Errors
    /// [`OoxmlError::InvalidRelationship`] when the document references a
    /// relationship id that does not exist, or a relationship targets a part
    /// that is not in the package.
    pub fn to_package(&self) -> Result<OpcPackage> {
        self.warn_dangling_styles();

        let mut relmap = self.relmap.clone();
        relmap.relate(RT::STYLES, "styles.xml");
        relmap.relate(RT::SETTINGS, "settings.xml");
        relmap.relate(RT::FONT_TABLE, "fontTable.xml");
        if self.imported.numbering.is_some() {
            relmap.relate(RT::NUMBERING, "numbering.xml");
        }
        if self.imported.theme.is_some() {
            relmap.relate(RT::THEME, "theme/theme1.xml");
        }

        let mut main = Part::new(
            PackURI::new(DOCUMENT_PARTNAME)?,
            ct::WML_DOCUMENT_MAIN,
            self.to_document_xml()?.into_bytes(),
        );
        main.set_rels(relmap.rels().clone());

        let dangling = main.dangling_rel_refs();
        if !dangling.is_empty() {
            return Err(OoxmlError::InvalidRelationship(format!(
                "document.xml references undefined relationship ids: {}",
                dangling.join(", ")
            )));
        }

        let mut pkg = OpcPackage::new();
        for media in relmap.media() {
            pkg.add_part(Part::new(
                PackURI::new(media.partname.as_str())?,
                media.content_type.as_str(),
                media.data.clone(),
            ));
        }

        let mut add_xml_part = |partname: &str, content_type: &str, blob: Vec<u8>| -> Result<()> {
            pkg.add_part(Part::new(PackURI::new(partname)?, content_type, blob));
            Ok(())
        };
        add_xml_part("/word/styles.xml", ct::WML_STYLES, self.styles.to_xml()?.into_bytes())?;
        add_xml_part(
            "/word/settings.xml",
            ct::WML_SETTINGS,
            settings_xml(self.update_fields).into_bytes(),
        )?;
        add_xml_part(
            "/word/fontTable.xml",
            ct::WML_FONT_TABLE,
            self.imported
                .font_table
                .clone()
                .unwrap_or_else(|| default_font_table_xml().as_bytes().to_vec()),
        )?;
        if let Some(ref numbering) = self.imported.numbering {
            add_xml_part("/word/numbering.xml", ct::WML_NUMBERING, numbering.clone())?;
        }
        if let Some(ref theme) = self.imported.theme {
            add_xml_part("/word/theme/theme1.xml", ct::OFC_THEME, theme.clone())?;
        }
        add_xml_part(
            "/docProps/core.xml",
            ct::OPC_CORE_PROPERTIES,
            default_core_props_xml().as_bytes().to_vec(),
        )?;
        add_xml_part(
            "/docProps/app.xml",
            ct::OFC_EXTENDED_PROPERTIES,
            default_app_props_xml().as_bytes().to_vec(),
        )?;

        for rel in main.rels().iter().filter(|rel| !rel.is_external()) {
            let target = rel.target_partname()?;
            if !pkg.contains_part(&target) {
                return Err(OoxmlError::InvalidRelationship(format!(
                    "{} targets missing part {}",
                    rel.r_id(),
                    target
                )));
            }
        }

        let main_partname = main.partname().clone();
        pkg.add_part(main);
        pkg.relate_to(&main_partname, RT::OFFICE_DOCUMENT);
        pkg.relate_to(&PackURI::new("/docProps/core.xml")?, RT::CORE_PROPERTIES);
        pkg.relate_to(&PackURI::new("/docProps/app.xml")?, RT::EXTENDED_PROPERTIES);

        debug!(
            "Built package: {} parts, {} body elements, {} images",
            pkg.part_count(),
            self.body.len(),
            relmap.media().len()
        );
        Ok(pkg)
    }

    /// Serialize to the bytes of a .docx file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_package()?.to_bytes()?)
    }

    /// Write the document to `path` in one step.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn warn_dangling_styles(&self) {
        let mut refs: Vec<&str> = Vec::new();
        for element in &self.body {
            match element {
                BodyElement::Paragraph(para) => refs.extend(para.style()),
                BodyElement::Table(table) => {
                    refs.extend(table.style());
                    refs.extend(table.paragraphs().filter_map(MutableParagraph::style));
                },
            }
        }
        refs.sort_unstable();
        refs.dedup();

        for style in refs.into_iter().filter(|s| !self.styles.has_style(s)) {
            warn!("Style '{}' is referenced but not defined; it renders as default", style);
        }
    }
}

impl Default for MutableDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::writer::table::VerticalMerge;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn paragraph_contents(doc: &MutableDocument, id: ParagraphId) -> Vec<RunContent> {
        doc.paragraph(id)
            .unwrap()
            .runs()
            .map(|run| run.content().clone())
            .collect()
    }

    #[test]
    fn test_add_paragraph() {
        let mut doc = MutableDocument::new();
        let id = doc.add_paragraph("Hello & welcome", Some("Heading1")).unwrap();
        assert_eq!(doc.paragraph(id).unwrap().text(), "Hello & welcome");
        assert_eq!(doc.paragraph(id).unwrap().style(), Some("Heading1"));
        assert_eq!(doc.paragraph_count(), 1);

        let xml = doc.to_document_xml().unwrap();
        assert!(xml.contains("Hello &amp; welcome"));
        assert!(xml.ends_with("</w:sectPr></w:body></w:document>"));
    }

    #[test]
    fn test_heading_levels() {
        let mut doc = MutableDocument::new();
        let id = doc.add_heading("Method", 2).unwrap();
        assert_eq!(doc.paragraph(id).unwrap().style(), Some("Heading2"));
        assert!(matches!(doc.add_heading("x", 0), Err(OoxmlError::InvalidArgument(_))));
        assert!(matches!(doc.add_heading("x", 10), Err(OoxmlError::InvalidArgument(_))));
        assert_eq!(doc.paragraph_count(), 1);
    }

    #[test]
    fn test_caption_field_sequence() {
        let mut doc = MutableDocument::new();
        let id = doc.add_caption("Sales by region", "Table").unwrap();

        assert_eq!(
            paragraph_contents(&doc, id),
            vec![
                RunContent::Text("Table ".to_string()),
                RunContent::Field(MutableField::Begin { dirty: true }),
                RunContent::Field(MutableField::Instruction(r" SEQ Table \* ARABIC ".to_string())),
                RunContent::Field(MutableField::End),
                RunContent::Text(": Sales by region".to_string()),
            ]
        );
        assert_eq!(doc.paragraph(id).unwrap().style(), Some("Caption"));
        assert!(doc.add_caption("x", "").is_err());
        assert!(doc.add_caption("x", "Big Table").is_err());
    }

    #[test]
    fn test_table_of_contents() {
        let mut doc = MutableDocument::new();
        let id = doc.add_table_of_contents("Contents").unwrap();
        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.paragraph(ParagraphId(0)).unwrap().style(), Some("Heading1"));

        let contents = paragraph_contents(&doc, id);
        assert_eq!(
            contents[1],
            RunContent::Field(MutableField::Instruction(r#" TOC \o "1-3" \h \z \u "#.to_string()))
        );
        assert_eq!(contents[2], RunContent::Field(MutableField::Separate));
        assert_eq!(contents[4], RunContent::Field(MutableField::End));
    }

    #[test]
    fn test_create_table_uses_text_width() {
        let mut doc = MutableDocument::new();
        let table = doc.create_table(2, 4, Some("TableNormal")).unwrap();
        let t = doc.table(table).unwrap();
        assert_eq!(t.grid(), &[2340, 2340, 2340, 2340]);
        assert_eq!(t.style(), Some("TableNormal"));
        assert!(matches!(
            doc.create_table(0, 2, None),
            Err(OoxmlError::InvalidDimension { .. })
        ));
        assert_eq!(doc.table_count(), 1);
    }

    #[test]
    fn test_table_operations_through_handle() {
        let mut doc = MutableDocument::new();
        let table = doc.create_table(3, 3, None).unwrap();
        doc.set_cell_text(table, 1, 1, "mid", None).unwrap();
        assert_eq!(doc.cell_text(table, 1, 1).unwrap(), "mid");

        doc.merge_cells(table, 0, 0, 2, 0).unwrap();
        let t = doc.table(table).unwrap();
        assert_eq!(t.cell(0, 0).unwrap().properties().vertical_merge, Some(VerticalMerge::Restart));
        assert_eq!(t.cell(2, 0).unwrap().properties().vertical_merge, Some(VerticalMerge::Continue));

        assert!(matches!(
            doc.merge_cells(table, 2, 0, 1, 0),
            Err(OoxmlError::InvalidRange { .. })
        ));
        assert!(matches!(
            doc.set_cell_text(table, 5, 0, "x", None),
            Err(OoxmlError::IndexOutOfRange { .. })
        ));

        let para = doc.add_paragraph("not a table", None).unwrap();
        assert!(matches!(
            doc.set_cell_text(TableId(para.0), 0, 0, "x", None),
            Err(OoxmlError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_matrix_mismatch_appends_nothing() {
        let mut doc = MutableDocument::new();
        let err = doc.add_matrix(2, 2, &[vec!["a", "b"], vec!["c"]]).unwrap_err();
        assert!(matches!(err, OoxmlError::DimensionMismatch { expected: 2, actual: 1 }));
        let ragged = doc.add_matrix(2, 2, &[vec!["a", "b", "c"], vec!["d"]]).unwrap_err();
        assert!(matches!(ragged, OoxmlError::DimensionMismatch { expected: 2, actual: 3 }));
        assert!(doc.body().is_empty());

        let id = doc.add_matrix(2, 2, &[vec!["a", "b"], vec!["c", "d"]]).unwrap();
        let math: Vec<_> = doc.paragraph(id).unwrap().math().collect();
        assert_eq!(math[0][0].matrix_shape(), Some((2, 2)));
        assert_eq!(math[0][0].text(), "abcd");
    }

    #[test]
    fn test_math_builders_are_independent_paragraphs() {
        let mut doc = MutableDocument::new();
        doc.add_fraction("a + b", "2").unwrap();
        doc.add_radical("x", Some("3")).unwrap();
        doc.add_superscript("e", "x").unwrap();
        doc.add_subscript("a", "n").unwrap();
        doc.add_integral("x dx", "0", "1").unwrap();
        doc.add_parentheses("x + 1", "[", "]").unwrap();
        assert_eq!(doc.paragraph_count(), 6);
        assert!(doc.add_equation(Vec::new()).is_err());

        let xml = doc.to_document_xml().unwrap();
        assert_eq!(xml.matches("<m:oMathPara>").count(), 6);
    }

    #[test]
    fn test_image_extent_and_relationship() {
        let mut doc = MutableDocument::new();
        let id = doc
            .insert_image_from_bytes(PNG_BYTES.to_vec(), ImageFormat::Png, 100, 50)
            .unwrap();
        let image = doc.paragraph(id).unwrap().runs().find_map(MutableRun::image).unwrap();
        assert_eq!(image.extent_emu(), (952_500, 476_250));
        assert_eq!(doc.image_data(image.r_id()), Some(PNG_BYTES));

        assert!(doc
            .insert_image_from_bytes(PNG_BYTES.to_vec(), ImageFormat::Png, 0, 10)
            .is_err());
    }

    #[test]
    fn test_insert_image_unsupported_extension() {
        let mut doc = MutableDocument::new();
        assert!(matches!(
            doc.insert_image("diagram.svg", 10, 10),
            Err(OoxmlError::UnsupportedFormat(_))
        ));
        assert!(doc.body().is_empty());
    }

    #[test]
    fn test_insert_image_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, PNG_BYTES).unwrap();

        let mut doc = MutableDocument::new();
        let id = doc.insert_image(&path, 100, 100).unwrap();
        let image = doc.paragraph(id).unwrap().runs().find_map(MutableRun::image).unwrap();
        assert_eq!(image.description(), "logo.png");
    }

    #[test]
    fn test_package_parts() {
        let mut doc = MutableDocument::new();
        doc.add_paragraph("Body", None).unwrap();
        doc.insert_image_from_bytes(PNG_BYTES.to_vec(), ImageFormat::Png, 10, 10)
            .unwrap();
        doc.set_update_fields_on_open(true);

        let pkg = doc.to_package().unwrap();
        for name in [
            "/word/document.xml",
            "/word/styles.xml",
            "/word/settings.xml",
            "/word/fontTable.xml",
            "/word/media/image1.png",
            "/docProps/core.xml",
            "/docProps/app.xml",
        ] {
            assert!(pkg.contains_part(&PackURI::new(name).unwrap()), "missing {}", name);
        }
        assert!(!pkg.contains_part(&PackURI::new("/word/numbering.xml").unwrap()));

        let settings = pkg.part(&PackURI::new("/word/settings.xml").unwrap()).unwrap();
        assert!(settings.xml().unwrap().contains(r#"<w:updateFields w:val="true"/>"#));

        let main = pkg.main_document_part().unwrap();
        assert!(pkg.related_part(main, RT::STYLES).is_some());
        assert!(main.dangling_rel_refs().is_empty());
    }

    #[test]
    fn test_dangling_relationship_rejected() {
        let mut doc = MutableDocument::new();
        let mut para = MutableParagraph::new();
        para.add_run(MutableRun::new(RunContent::Drawing(InlineImage::from_pixels(
            "rId99".to_string(),
            1,
            10,
            10,
        ))));
        doc.push_paragraph(para);

        assert!(matches!(
            doc.to_bytes(),
            Err(OoxmlError::InvalidRelationship(_))
        ));
    }

    #[test]
    fn test_import_styles_replaces_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("template.docx");

        let mut template = MutableDocument::new();
        template
            .add_style(MutableStyle::new("Abstract", "Abstract", Default::default()))
            .unwrap();
        template.save(&template_path).unwrap();

        let mut doc = MutableDocument::new();
        doc.add_style(MutableStyle::heading(2)).unwrap();
        doc.import_styles_from(&template_path).unwrap();

        assert!(doc.has_style("Abstract"));
        assert!(doc.has_style("Caption"));
        assert!(!doc.has_style("Heading2"));
        assert!(doc.styles().is_imported());
    }

    #[test]
    fn test_import_styles_errors() {
        let mut doc = MutableDocument::new();
        assert!(matches!(
            doc.import_styles_from("/nonexistent/template.docx"),
            Err(OoxmlError::PackageNotFound(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.docx");
        let mut opc = OpcPackage::new();
        let partname = PackURI::new(DOCUMENT_PARTNAME).unwrap();
        opc.add_part(Part::new(partname.clone(), ct::WML_DOCUMENT_MAIN, b"<w:document/>".to_vec()));
        opc.relate_to(&partname, RT::OFFICE_DOCUMENT);
        opc.save(&path).unwrap();

        assert!(matches!(
            doc.import_styles_from(&path),
            Err(OoxmlError::MissingStyles(_))
        ));
        assert!(!doc.styles().is_imported());
    }

    #[test]
    fn test_alignment_and_page_break() {
        let mut doc = MutableDocument::new();
        let id = doc.add_paragraph("Centered", None).unwrap();
        doc.set_alignment(id, ParagraphAlignment::Center).unwrap();
        doc.add_page_break().unwrap();
        doc.set_section(SectionProperties::a4().landscape());

        let xml = doc.to_document_xml().unwrap();
        assert!(xml.contains(r#"<w:jc w:val="center"/>"#));
        assert!(xml.contains(r#"<w:br w:type="page"/>"#));
        assert!(xml.contains(r#"w:orient="landscape""#));
    }
}
