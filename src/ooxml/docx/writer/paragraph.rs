/// Paragraph types and implementation for DOCX documents.
use crate::common::xml::escape_xml;
use crate::formula::MathNode;
use crate::formula::omml::write_math_paragraph;
use std::fmt::Write as FmtWrite;

pub use super::super::format::ParagraphAlignment;
use super::run::{MutableRun, RunContent};

/// Paragraph content element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphElement {
    Run(MutableRun),
    /// A display equation (`m:oMathPara`)
    Math(Vec<MathNode>),
}

/// A mutable paragraph.
///
/// Paragraphs contain runs and equations in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutableParagraph {
    pub(crate) style: Option<String>,
    pub(crate) alignment: Option<ParagraphAlignment>,
    pub(crate) elements: Vec<ParagraphElement>,
}

impl MutableParagraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paragraph holding one run of `text`, optionally styled.
    pub fn with_text(text: &str, style: Option<&str>) -> Self {
        let mut para = Self::new();
        para.style = style.map(str::to_string);
        para.add_run_with_text(text);
        para
    }

    pub fn add_run(&mut self, run: MutableRun) -> &mut Self {
        self.elements.push(ParagraphElement::Run(run));
        self
    }

    pub fn add_run_with_text(&mut self, text: &str) -> &mut Self {
        self.add_run(MutableRun::text(text))
    }

    pub fn add_math(&mut self, nodes: Vec<MathNode>) {
        self.elements.push(ParagraphElement::Math(nodes));
    }

    pub fn set_style(&mut self, style_id: Option<&str>) {
        self.style = style_id.map(str::to_string);
    }

    #[inline]
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn set_alignment(&mut self, alignment: Option<ParagraphAlignment>) {
        self.alignment = alignment;
    }

    #[inline]
    pub fn alignment(&self) -> Option<ParagraphAlignment> {
        self.alignment
    }

    #[inline]
    pub fn elements(&self) -> &[ParagraphElement] {
        &self.elements
    }

    pub fn runs(&self) -> impl Iterator<Item = &MutableRun> {
        self.elements.iter().filter_map(|e| match e {
            ParagraphElement::Run(run) => Some(run),
            ParagraphElement::Math(_) => None,
        })
    }

    pub(crate) fn runs_mut(&mut self) -> impl Iterator<Item = &mut MutableRun> {
        self.elements.iter_mut().filter_map(|e| match e {
            ParagraphElement::Run(run) => Some(run),
            ParagraphElement::Math(_) => None,
        })
    }

    /// Equations of the paragraph.
    pub fn math(&self) -> impl Iterator<Item = &[MathNode]> {
        self.elements.iter().filter_map(|e| match e {
            ParagraphElement::Math(nodes) => Some(nodes.as_slice()),
            ParagraphElement::Run(_) => None,
        })
    }

    /// Concatenated literal text, excluding field instructions and equations.
    pub fn text(&self) -> String {
        self.runs().map(MutableRun::get_text).collect()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Drop drawing runs whose relationship id fails `keep`.
    pub(crate) fn retain_drawings(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.elements.retain(|e| match e {
            ParagraphElement::Run(MutableRun {
                content: RunContent::Drawing(image),
                ..
            }) => keep(image.r_id()),
            _ => true,
        });
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> std::fmt::Result {
        xml.push_str("<w:p>");

        if self.style.is_some() || self.alignment.is_some() {
            xml.push_str("<w:pPr>");
            if let Some(ref style) = self.style {
                write!(xml, r#"<w:pStyle w:val="{}"/>"#, escape_xml(style))?;
            }
            if let Some(alignment) = self.alignment {
                write!(xml, r#"<w:jc w:val="{}"/>"#, alignment.as_str())?;
            }
            xml.push_str("</w:pPr>");
        }

        for element in &self.elements {
            match element {
                ParagraphElement::Run(run) => run.to_xml(xml)?,
                ParagraphElement::Math(nodes) => write_math_paragraph(nodes, xml),
            }
        }

        xml.push_str("</w:p>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::writer::field::MutableField;

    fn to_xml(para: &MutableParagraph) -> String {
        let mut xml = String::new();
        para.to_xml(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_styled_paragraph() {
        let mut para = MutableParagraph::with_text("Results", Some("Heading1"));
        para.set_alignment(Some(ParagraphAlignment::Center));
        let xml = to_xml(&para);
        assert!(xml.starts_with(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="center"/></w:pPr><w:r>"#
        ));
        assert_eq!(para.text(), "Results");
    }

    #[test]
    fn test_empty_paragraph() {
        assert_eq!(to_xml(&MutableParagraph::new()), "<w:p></w:p>");
    }

    #[test]
    fn test_text_skips_field_codes() {
        let mut para = MutableParagraph::new();
        para.add_run_with_text("Figure ");
        para.add_run(MutableRun::field(MutableField::begin()));
        para.add_run(MutableRun::field(MutableField::instruction(" SEQ Figure ")));
        para.add_run(MutableRun::field(MutableField::End));
        para.add_run_with_text(": Layout");
        assert_eq!(para.text(), "Figure : Layout");
        assert_eq!(para.runs().count(), 5);
    }

    #[test]
    fn test_math_element() {
        let mut para = MutableParagraph::new();
        para.add_math(vec![MathNode::fraction("1", "2")]);
        let xml = to_xml(&para);
        assert!(xml.starts_with("<w:p><m:oMathPara><m:oMath><m:f>"));
        assert_eq!(para.math().count(), 1);
        assert_eq!(para.text(), "");
    }
}
