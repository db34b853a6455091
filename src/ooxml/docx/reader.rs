/// Loading an existing `word/document.xml` back into a generation session.
///
/// The body is read in one forward pass. Paragraphs, runs, fields, drawings,
/// math zones, tables and the trailing section properties become writer nodes;
/// wrappers such as hyperlinks, smart tags and content controls are flattened,
/// and constructs the writer cannot express are skipped with a warning.
use crate::common::xml::{resolve_entity, unescape_xml};
use crate::formula::omml::OmmlParser;
use crate::ooxml::docx::enums::WdOrientation;
use crate::ooxml::docx::format::{
    CellVerticalAlignment, ImageFormat, ParagraphAlignment, TableAlignment, TableBorderStyle, TableWidth,
    VerticalMerge,
};
use crate::ooxml::docx::package::Package;
use crate::ooxml::docx::writer::doc::{BodyElement, ImportedParts, MutableDocument};
use crate::ooxml::docx::writer::image::InlineImage;
use crate::ooxml::docx::writer::paragraph::MutableParagraph;
use crate::ooxml::docx::writer::run::{MutableRun, RunContent, RunProperties};
use crate::ooxml::docx::writer::section::SectionProperties;
use crate::ooxml::docx::writer::style::StyleCatalog;
use crate::ooxml::docx::writer::table::{
    CellProperties, MutableCell, MutableRow, MutableTable, TableBorder,
};
use crate::ooxml::docx::writer::field::MutableField;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as RT;
use log::{debug, info, warn};
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;

/// Build a session from an opened package.
pub(crate) fn read_package(package: &Package) -> Result<MutableDocument> {
    let main = package.main_part()?;
    let mut doc = MutableDocument::new();

    let mut section = None;
    BodyReader::new(main.xml()?).read_document(&mut doc.body, &mut section)?;
    if let Some(section) = section {
        doc.section = section;
    }

    adopt_images(package, &mut doc)?;

    match package.related_part(RT::STYLES)? {
        Some(part) => doc.styles = StyleCatalog::from_styles_xml(part.xml()?)?,
        None => debug!("Package has no styles part; keeping the default catalog"),
    }

    let blob = |reltype: &str| -> Result<Option<Vec<u8>>> {
        Ok(package.related_part(reltype)?.map(|part| part.blob().to_vec()))
    };
    doc.imported = ImportedParts {
        numbering: blob(RT::NUMBERING)?,
        theme: blob(RT::THEME)?,
        font_table: blob(RT::FONT_TABLE)?,
    };

    if let Some(settings) = package.related_part(RT::SETTINGS)? {
        doc.update_fields = updates_fields(settings.blob());
    }

    info!(
        "Loaded document: {} paragraphs, {} tables, {} images",
        doc.paragraph_count(),
        doc.table_count(),
        doc.relmap.media().len()
    );
    Ok(doc)
}

/// Load the payload of every drawing; drawings whose payload is missing are dropped.
fn adopt_images(package: &Package, doc: &mut MutableDocument) -> Result<()> {
    let main = package.main_part()?;
    let MutableDocument {
        body,
        relmap,
        next_drawing_id,
        ..
    } = doc;

    let mut r_ids: Vec<String> = Vec::new();
    for para in paragraphs_mut(body) {
        for run in para.runs() {
            if let Some(image) = run.image() {
                *next_drawing_id = (*next_drawing_id).max(image.id + 1);
                if !r_ids.iter().any(|r| r == image.r_id()) {
                    r_ids.push(image.r_id().to_string());
                }
            }
        }
    }

    for r_id in &r_ids {
        let Some(rel) = main.rels().get(r_id) else {
            warn!("Drawing references unknown relationship {}; dropped", r_id);
            continue;
        };
        if rel.is_external() {
            warn!("Linked image {} is not embedded; dropped", rel.target_ref());
            continue;
        }
        let partname = rel.target_partname()?;
        let Ok(part) = package.opc_package().part(&partname) else {
            warn!("Image part {} is missing; dropped", partname);
            continue;
        };
        let format = ImageFormat::from_mime_type(part.content_type())
            .or_else(|| ImageFormat::detect_from_bytes(part.blob()));
        let Some(format) = format else {
            warn!("Image part {} has unsupported type {}; dropped", partname, part.content_type());
            continue;
        };
        relmap.adopt_image(
            r_id,
            rel.target_ref(),
            partname.as_str(),
            format.mime_type(),
            part.blob().to_vec(),
        );
    }

    for para in paragraphs_mut(body) {
        para.retain_drawings(|r_id| relmap.image_data(r_id).is_some());
    }
    Ok(())
}

fn paragraphs_mut(body: &mut [BodyElement]) -> impl Iterator<Item = &mut MutableParagraph> {
    body.iter_mut().flat_map(|element| {
        let (para, table) = match element {
            BodyElement::Paragraph(para) => (Some(para), None),
            BodyElement::Table(table) => (None, Some(table.paragraphs_mut())),
        };
        para.into_iter().chain(table.into_iter().flatten())
    })
}

/// `w:updateFields` present and not switched off.
fn updates_fields(settings: &[u8]) -> bool {
    let Some(start) = memmem::find(settings, b"<w:updateFields") else {
        return false;
    };
    let rest = &settings[start..];
    let end = memchr::memchr(b'>', rest).unwrap_or(rest.len());
    let tag = &rest[..end];
    !(memmem::find(tag, br#""false""#).is_some()
        || memmem::find(tag, br#""0""#).is_some()
        || memmem::find(tag, br#""off""#).is_some())
}

struct BodyReader<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> BodyReader<'a> {
    fn new(xml: &'a str) -> Self {
        Self {
            reader: Reader::from_str(xml),
        }
    }

    fn read_document(
        &mut self,
        body: &mut Vec<BodyElement>,
        section: &mut Option<SectionProperties>,
    ) -> Result<()> {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == b"w:body" => {
                    self.read_blocks(body, section)?;
                },
                Event::Eof => break,
                _ => {},
            }
        }
        debug!("Read {} body elements", body.len());
        Ok(())
    }

    /// Block content up to the end tag of the current container.
    fn read_blocks(
        &mut self,
        blocks: &mut Vec<BodyElement>,
        section: &mut Option<SectionProperties>,
    ) -> Result<()> {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:p" => blocks.push(BodyElement::Paragraph(self.read_paragraph()?)),
                    b"w:tbl" => blocks.push(BodyElement::Table(self.read_table()?)),
                    b"w:sectPr" => *section = Some(self.read_section()?),
                    b"w:sdt" | b"w:sdtContent" | b"w:customXml" => {
                        self.read_blocks(blocks, section)?
                    },
                    _ => {
                        self.reader.read_to_end(e.name())?;
                    },
                },
                Event::Empty(e) if e.name().as_ref() == b"w:p" => {
                    blocks.push(BodyElement::Paragraph(MutableParagraph::new()));
                },
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }
    }

    fn read_paragraph(&mut self) -> Result<MutableParagraph> {
        let mut para = MutableParagraph::new();
        self.read_inline(&mut para)?;
        Ok(para)
    }

    /// Paragraph-level content up to the end tag of the current element.
    fn read_inline(&mut self, para: &mut MutableParagraph) -> Result<()> {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:pPr" => self.read_paragraph_props(para)?,
                    b"w:r" => self.read_run(para)?,
                    b"m:oMathPara" | b"m:oMath" => {
                        let nodes = OmmlParser::new(&mut self.reader).parse_contents()?;
                        if !nodes.is_empty() {
                            para.add_math(nodes);
                        }
                    },
                    b"w:hyperlink" => {
                        if attr(&e, b"r:id")?.is_some() {
                            warn!("External hyperlink target dropped; its text is kept");
                        }
                        self.read_inline(para)?;
                    },
                    b"w:smartTag" | b"w:ins" | b"w:sdt" | b"w:sdtContent" | b"w:fldSimple"
                    | b"w:customXml" => self.read_inline(para)?,
                    _ => {
                        self.reader.read_to_end(e.name())?;
                    },
                },
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }
    }

    fn read_paragraph_props(&mut self, para: &mut MutableParagraph) -> Result<()> {
        self.visit_children(|e, depth| {
            if depth != 0 {
                return Ok(());
            }
            match e.name().as_ref() {
                b"w:pStyle" => para.set_style(attr(e, b"w:val")?.as_deref()),
                b"w:jc" => {
                    para.set_alignment(
                        attr(e, b"w:val")?
                            .as_deref()
                            .and_then(ParagraphAlignment::from_xml),
                    );
                },
                _ => {},
            }
            Ok(())
        })
    }

    /// One `w:r`; every content item becomes its own run carrying the run's properties.
    fn read_run(&mut self, para: &mut MutableParagraph) -> Result<()> {
        let mut props = RunProperties::default();
        let push = |para: &mut MutableParagraph, content: RunContent, props: &RunProperties| {
            para.add_run(MutableRun {
                content,
                properties: props.clone(),
            });
        };

        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:rPr" => props = self.read_run_props()?,
                    b"w:t" => {
                        let text = self.read_text()?;
                        push(para, RunContent::Text(text), &props);
                    },
                    b"w:instrText" => {
                        let text = self.read_text()?;
                        push(para, RunContent::Field(MutableField::Instruction(text)), &props);
                    },
                    b"w:fldChar" => {
                        if let Some(field) = field_char(&e)? {
                            push(para, RunContent::Field(field), &props);
                        }
                        self.reader.read_to_end(e.name())?;
                    },
                    b"w:drawing" => {
                        if let Some(image) = self.read_drawing()? {
                            push(para, RunContent::Drawing(image), &props);
                        }
                    },
                    name => {
                        if matches!(name, b"w:pict" | b"w:object") {
                            warn!("Legacy VML content skipped");
                        }
                        self.reader.read_to_end(e.name())?;
                    },
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"w:tab" => push(para, RunContent::Tab, &props),
                    b"w:cr" => push(para, RunContent::Break, &props),
                    b"w:br" => {
                        let content = match attr(&e, b"w:type")?.as_deref() {
                            Some("page") => RunContent::PageBreak,
                            _ => RunContent::Break,
                        };
                        push(para, content, &props);
                    },
                    b"w:fldChar" => {
                        if let Some(field) = field_char(&e)? {
                            push(para, RunContent::Field(field), &props);
                        }
                    },
                    _ => {},
                },
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }
    }

    fn read_run_props(&mut self) -> Result<RunProperties> {
        let mut props = RunProperties::default();
        self.visit_children(|e, depth| {
            if depth != 0 {
                return Ok(());
            }
            match e.name().as_ref() {
                b"w:b" => props.bold = Some(on_off(attr(e, b"w:val")?.as_deref())),
                b"w:i" => props.italic = Some(on_off(attr(e, b"w:val")?.as_deref())),
                b"w:sz" => props.font_size = attr(e, b"w:val")?.as_deref().and_then(parse_u32),
                b"w:color" => props.color = attr(e, b"w:val")?,
                _ => {},
            }
            Ok(())
        })?;
        Ok(props)
    }

    /// Character data of the current element, entities resolved.
    fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => text.push_str(&unescape_xml(std::str::from_utf8(&t)?)),
                Event::CData(t) => text.push_str(std::str::from_utf8(&t)?),
                Event::GeneralRef(r) => {
                    if let Some(ch) = resolve_entity(std::str::from_utf8(&r)?) {
                        text.push(ch);
                    }
                },
                Event::Start(e) => {
                    self.reader.read_to_end(e.name())?;
                },
                Event::End(_) => return Ok(text),
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }
    }

    /// Inline or anchored picture; anchored pictures come back inline.
    fn read_drawing(&mut self) -> Result<Option<InlineImage>> {
        let mut r_id = None;
        let mut id = 0u32;
        let mut extent = (0i64, 0i64);
        let mut description = String::new();

        self.visit_children(|e, _| {
            match e.name().as_ref() {
                b"wp:anchor" => debug!("Anchored drawing read as inline"),
                b"wp:extent" => {
                    extent = (
                        attr(e, b"cx")?.as_deref().and_then(parse_i64).unwrap_or(0),
                        attr(e, b"cy")?.as_deref().and_then(parse_i64).unwrap_or(0),
                    );
                },
                b"wp:docPr" => {
                    id = attr(e, b"id")?.as_deref().and_then(parse_u32).unwrap_or(0);
                    description = attr(e, b"descr")?.unwrap_or_default();
                },
                b"a:blip" => r_id = attr(e, b"r:embed")?,
                _ => {},
            }
            Ok(())
        })?;

        Ok(r_id.map(|r_id| InlineImage {
            r_id,
            id,
            width_emu: extent.0,
            height_emu: extent.1,
            description,
        }))
    }

    fn read_table(&mut self) -> Result<MutableTable> {
        let mut table = MutableTable::empty();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:tblPr" => self.read_table_props(&mut table)?,
                    b"w:tblGrid" => {
                        let grid = &mut table.grid;
                        self.visit_children(|e, _| {
                            if e.name().as_ref() == b"w:gridCol" {
                                grid.push(attr(e, b"w:w")?.as_deref().and_then(parse_u32).unwrap_or(0));
                            }
                            Ok(())
                        })?;
                    },
                    b"w:tr" => {
                        let row = self.read_row()?;
                        table.push_row(row);
                    },
                    _ => {
                        self.reader.read_to_end(e.name())?;
                    },
                },
                Event::End(_) => return Ok(table),
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }
    }

    fn read_table_props(&mut self, table: &mut MutableTable) -> Result<()> {
        let mut in_borders = false;
        self.visit_children(|e, depth| {
            let name = e.name();
            if depth == 0 {
                in_borders = name.as_ref() == b"w:tblBorders";
            }
            match (depth, name.as_ref()) {
                (0, b"w:tblStyle") => table.set_style(attr(e, b"w:val")?.as_deref()),
                (0, b"w:tblW") => {
                    let w = attr(e, b"w:w")?.as_deref().and_then(parse_u32).unwrap_or(0);
                    table.width = TableWidth::from_xml(w, attr(e, b"w:type")?.as_deref());
                },
                (0, b"w:jc") => {
                    table.alignment = attr(e, b"w:val")?.as_deref().and_then(TableAlignment::from_xml);
                },
                (1, _) if in_borders => {
                    let edge = std::str::from_utf8(name.local_name().into_inner())?;
                    let style = attr(e, b"w:val")?.as_deref().and_then(TableBorderStyle::from_xml);
                    if let (Some(slot), Some(style)) = (table.borders.edge_mut(edge), style) {
                        *slot = Some(TableBorder {
                            style,
                            size: attr(e, b"w:sz")?.as_deref().and_then(parse_u32).unwrap_or(0),
                            color: attr(e, b"w:color")?.unwrap_or_else(|| "auto".to_string()),
                        });
                    }
                },
                _ => {},
            }
            Ok(())
        })
    }

    fn read_row(&mut self) -> Result<MutableRow> {
        let mut row = MutableRow::new(0);
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:trPr" => {
                        let (header, height) = (&mut row.header, &mut row.height);
                        self.visit_children(|e, depth| {
                            match (depth, e.name().as_ref()) {
                                (0, b"w:tblHeader") => *header = on_off(attr(e, b"w:val")?.as_deref()),
                                (0, b"w:trHeight") => {
                                    *height = attr(e, b"w:val")?.as_deref().and_then(parse_u32)
                                },
                                _ => {},
                            }
                            Ok(())
                        })?;
                    },
                    b"w:tc" => {
                        let cell = self.read_cell()?;
                        row.push_cell(cell);
                    },
                    _ => {
                        self.reader.read_to_end(e.name())?;
                    },
                },
                Event::End(_) => return Ok(row),
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }
    }

    fn read_cell(&mut self) -> Result<MutableCell> {
        let mut cell = MutableCell {
            paragraphs: SmallVec::new(),
            properties: CellProperties::default(),
        };

        loop {
            match self.reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:tcPr" => {
                        let props = &mut cell.properties;
                        self.visit_children(|e, depth| read_cell_prop(props, e, depth))?;
                    },
                    b"w:p" => {
                        let para = self.read_paragraph()?;
                        cell.push_paragraph(para);
                    },
                    b"w:tbl" => {
                        warn!("Nested table skipped");
                        self.reader.read_to_end(e.name())?;
                    },
                    _ => {
                        self.reader.read_to_end(e.name())?;
                    },
                },
                Event::Empty(e) if e.name().as_ref() == b"w:p" => {
                    cell.push_paragraph(MutableParagraph::new());
                },
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }

        if cell.paragraphs.is_empty() {
            cell.push_paragraph(MutableParagraph::new());
        }
        Ok(cell)
    }

    fn read_section(&mut self) -> Result<SectionProperties> {
        let mut section = SectionProperties::default();
        self.visit_children(|e, depth| {
            if depth != 0 {
                return Ok(());
            }
            let twips = |key: &[u8]| -> Result<Option<u32>> {
                Ok(attr(e, key)?.as_deref().and_then(parse_u32))
            };
            match e.name().as_ref() {
                b"w:pgSz" => {
                    section.page_width = twips(b"w:w")?.unwrap_or(section.page_width);
                    section.page_height = twips(b"w:h")?.unwrap_or(section.page_height);
                    section.orientation = attr(e, b"w:orient")?
                        .as_deref()
                        .and_then(WdOrientation::from_xml)
                        .unwrap_or_default();
                },
                b"w:pgMar" => {
                    section.margin_top = twips(b"w:top")?.unwrap_or(section.margin_top);
                    section.margin_bottom = twips(b"w:bottom")?.unwrap_or(section.margin_bottom);
                    section.margin_left = twips(b"w:left")?.unwrap_or(section.margin_left);
                    section.margin_right = twips(b"w:right")?.unwrap_or(section.margin_right);
                    section.header_distance = twips(b"w:header")?.unwrap_or(section.header_distance);
                    section.footer_distance = twips(b"w:footer")?.unwrap_or(section.footer_distance);
                },
                b"w:headerReference" | b"w:footerReference" => {
                    warn!("Headers and footers are not kept");
                },
                _ => {},
            }
            Ok(())
        })?;
        Ok(section)
    }

    /// Visit every element nested in the current one with its depth below it,
    /// consuming the current element's end tag.
    fn visit_children(
        &mut self,
        mut visit: impl FnMut(&BytesStart<'_>, usize) -> Result<()>,
    ) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => {
                    visit(&e, depth)?;
                    depth += 1;
                },
                Event::Empty(e) => visit(&e, depth)?,
                Event::End(_) => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                },
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }
    }
}

fn read_cell_prop(props: &mut CellProperties, e: &BytesStart<'_>, depth: usize) -> Result<()> {
    if depth != 0 {
        return Ok(());
    }
    match e.name().as_ref() {
        b"w:tcW" => {
            let w = attr(e, b"w:w")?.as_deref().and_then(parse_u32).unwrap_or(0);
            props.width = Some(TableWidth::from_xml(w, attr(e, b"w:type")?.as_deref()));
        },
        b"w:gridSpan" => {
            props.grid_span = attr(e, b"w:val")?.as_deref().and_then(parse_u32).unwrap_or(1).max(1);
        },
        b"w:vMerge" => {
            props.vertical_merge = Some(VerticalMerge::from_xml(attr(e, b"w:val")?.as_deref()));
        },
        b"w:shd" => props.shading = attr(e, b"w:fill")?,
        b"w:vAlign" => {
            props.vertical_alignment = attr(e, b"w:val")?
                .as_deref()
                .and_then(CellVerticalAlignment::from_xml);
        },
        _ => {},
    }
    Ok(())
}

fn field_char(e: &BytesStart<'_>) -> Result<Option<MutableField>> {
    Ok(match attr(e, b"w:fldCharType")?.as_deref() {
        Some("begin") => Some(MutableField::Begin {
            dirty: attr(e, b"w:dirty")?.as_deref().is_some_and(|v| on_off(Some(v))),
        }),
        Some("separate") => Some(MutableField::Separate),
        Some("end") => Some(MutableField::End),
        _ => None,
    })
}

/// Unescaped value of the attribute with qualified name `key`.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// ST_OnOff: a missing value means on.
fn on_off(value: Option<&str>) -> bool {
    !matches!(value, Some("0" | "false" | "off"))
}

fn parse_u32(s: &str) -> Option<u32> {
    atoi_simd::parse::<u32, false, false>(s.as_bytes()).ok()
}

fn parse_i64(s: &str) -> Option<i64> {
    atoi_simd::parse::<i64, false, false>(s.as_bytes()).ok()
}

fn unexpected_eof() -> OoxmlError {
    OoxmlError::Xml("unexpected end of document.xml".to_string())
}
