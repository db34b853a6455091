/// Complex field characters for DOCX documents.
use crate::common::xml::escape_text;
use std::fmt::Write as FmtWrite;

/// One piece of a complex field.
///
/// A field is spread over several runs: `Begin`, one or more `Instruction`s,
/// an optional `Separate` followed by the cached result runs, and `End`.
/// The order is significant to the consuming word processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutableField {
    /// Field begin character; `dirty` asks the consumer to recompute the field
    Begin { dirty: bool },
    /// Field instruction text (e.g. ` SEQ Figure \* ARABIC `)
    Instruction(String),
    /// Separates the instruction from the cached result
    Separate,
    /// Field end character
    End,
}

impl MutableField {
    /// Begin character marked dirty.
    pub fn begin() -> Self {
        Self::Begin { dirty: true }
    }

    pub fn instruction(text: impl Into<String>) -> Self {
        Self::Instruction(text.into())
    }

    /// The instruction text, for `Instruction` pieces.
    pub fn instruction_text(&self) -> Option<&str> {
        match self {
            Self::Instruction(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, Self::Begin { dirty: true })
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> std::fmt::Result {
        match self {
            Self::Begin { dirty: true } => {
                xml.push_str(r#"<w:fldChar w:fldCharType="begin" w:dirty="true"/>"#)
            },
            Self::Begin { dirty: false } => xml.push_str(r#"<w:fldChar w:fldCharType="begin"/>"#),
            Self::Instruction(text) => write!(
                xml,
                r#"<w:instrText xml:space="preserve">{}</w:instrText>"#,
                escape_text(text)
            )?,
            Self::Separate => xml.push_str(r#"<w:fldChar w:fldCharType="separate"/>"#),
            Self::End => xml.push_str(r#"<w:fldChar w:fldCharType="end"/>"#),
        }
        Ok(())
    }
}

/// Instruction of a `SEQ` field numbering items of `label` in Arabic numerals.
pub fn seq_instruction(label: &str) -> String {
    format!(r" SEQ {} \* ARABIC ", label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_xml(field: &MutableField) -> String {
        let mut xml = String::new();
        field.to_xml(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_seq_instruction() {
        assert_eq!(seq_instruction("Figure"), r" SEQ Figure \* ARABIC ");
    }

    #[test]
    fn test_field_xml() {
        assert_eq!(
            to_xml(&MutableField::begin()),
            r#"<w:fldChar w:fldCharType="begin" w:dirty="true"/>"#
        );
        assert_eq!(
            to_xml(&MutableField::instruction(r#" TOC \o "1-3" "#)),
            r#"<w:instrText xml:space="preserve"> TOC \o "1-3" </w:instrText>"#
        );
        assert!(to_xml(&MutableField::Separate).contains(r#"w:fldCharType="separate""#));
        assert!(to_xml(&MutableField::End).contains(r#"w:fldCharType="end""#));
    }

    #[test]
    fn test_dirty_flag() {
        assert!(MutableField::begin().is_dirty());
        assert!(!MutableField::Begin { dirty: false }.is_dirty());
        assert!(!MutableField::End.is_dirty());
        assert_eq!(MutableField::instruction("PAGE").instruction_text(), Some("PAGE"));
    }
}
