/// Table of Contents support for DOCX documents.
///
/// A TOC is a complex field; the consuming word processor builds the entries
/// from heading paragraphs when the field is updated.
use super::field::MutableField;
use super::paragraph::MutableParagraph;
use super::run::MutableRun;
use std::fmt::Write as FmtWrite;

const DEFAULT_PLACEHOLDER: &str = "Right-click and choose Update Field to build the table of contents.";

/// A table of contents (TOC) field.
///
/// # Examples
///
/// ```rust
/// use docsmith::ooxml::docx::writer::TableOfContents;
///
/// let toc = TableOfContents::new();
/// assert_eq!(toc.build_field_instruction(), r#" TOC \o "1-3" \h \z \u "#);
///
/// let toc = TableOfContents::new().heading_levels(1, 2).hyperlinks(false);
/// assert_eq!(toc.build_field_instruction(), r#" TOC \o "1-2" \z \u "#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOfContents {
    /// Starting heading level (default: 1)
    start_level: u8,
    /// Ending heading level (default: 3)
    end_level: u8,
    /// `\h`: entries are hyperlinks
    hyperlinks: bool,
    /// `\z`: hide tab leader and page numbers in Web Layout view
    hide_in_web_layout: bool,
    /// `\u`: include paragraphs by outline level
    use_outline_levels: bool,
    /// Literal field result shown until the field is updated
    placeholder: String,
}

impl TableOfContents {
    pub fn new() -> Self {
        Self {
            start_level: 1,
            end_level: 3,
            hyperlinks: true,
            hide_in_web_layout: true,
            use_outline_levels: true,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    /// Heading levels to include, each clamped to 1-9.
    pub fn heading_levels(mut self, start: u8, end: u8) -> Self {
        self.start_level = start.clamp(1, 9);
        self.end_level = end.clamp(self.start_level, 9);
        self
    }

    pub fn hyperlinks(mut self, enabled: bool) -> Self {
        self.hyperlinks = enabled;
        self
    }

    pub fn hide_in_web_layout(mut self, enabled: bool) -> Self {
        self.hide_in_web_layout = enabled;
        self
    }

    pub fn use_outline_levels(mut self, enabled: bool) -> Self {
        self.use_outline_levels = enabled;
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }

    #[inline]
    pub fn start_level(&self) -> u8 {
        self.start_level
    }

    #[inline]
    pub fn end_level(&self) -> u8 {
        self.end_level
    }

    #[inline]
    pub fn placeholder_text(&self) -> &str {
        &self.placeholder
    }

    /// Build the TOC field instruction string.
    ///
    /// Format: ` TOC \o "1-3" \h \z \u `
    pub fn build_field_instruction(&self) -> String {
        let mut instruction = String::with_capacity(32);
        // Writing to a String cannot fail.
        let _ = write!(
            instruction,
            r#" TOC \o "{}-{}""#,
            self.start_level, self.end_level
        );
        if self.hyperlinks {
            instruction.push_str(r" \h");
        }
        if self.hide_in_web_layout {
            instruction.push_str(r" \z");
        }
        if self.use_outline_levels {
            instruction.push_str(r" \u");
        }
        instruction.push(' ');
        instruction
    }

    /// Paragraph holding the whole field: begin, instruction, separate,
    /// placeholder text, end.
    pub(crate) fn to_paragraph(&self) -> MutableParagraph {
        let mut para = MutableParagraph::new();
        para.add_run(MutableRun::field(MutableField::begin()))
            .add_run(MutableRun::field(MutableField::instruction(
                self.build_field_instruction(),
            )))
            .add_run(MutableRun::field(MutableField::Separate))
            .add_run_with_text(&self.placeholder)
            .add_run(MutableRun::field(MutableField::End));
        para
    }
}

impl Default for TableOfContents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::writer::run::RunContent;

    #[test]
    fn test_default_instruction() {
        assert_eq!(
            TableOfContents::default().build_field_instruction(),
            " TOC \\o \"1-3\" \\h \\z \\u "
        );
    }

    #[test]
    fn test_switches() {
        let toc = TableOfContents::new()
            .heading_levels(2, 1)
            .hide_in_web_layout(false)
            .use_outline_levels(false);
        assert_eq!((toc.start_level(), toc.end_level()), (2, 2));
        assert_eq!(toc.build_field_instruction(), " TOC \\o \"2-2\" \\h ");
    }

    #[test]
    fn test_field_order() {
        let para = TableOfContents::new().placeholder("Update me").to_paragraph();
        let contents: Vec<_> = para.runs().map(MutableRun::content).collect();
        assert_eq!(contents.len(), 5);
        assert!(matches!(contents[0], RunContent::Field(MutableField::Begin { dirty: true })));
        assert!(matches!(contents[1], RunContent::Field(MutableField::Instruction(_))));
        assert!(matches!(contents[2], RunContent::Field(MutableField::Separate)));
        assert_eq!(contents[3], &RunContent::Text("Update me".to_string()));
        assert!(matches!(contents[4], RunContent::Field(MutableField::End)));
        assert_eq!(para.text(), "Update me");
    }
}
