//! Mutable document writer components for DOCX.
//!
//! This module provides the generation session and the body nodes it builds.

pub mod doc;
pub mod field;
pub mod image;
pub mod paragraph;
pub(crate) mod relmap;
pub mod run;
pub mod section;
pub mod style;
pub mod table;
pub mod toc;

// Re-export main document type
pub use doc::{BodyElement, MutableDocument, ParagraphId, TableId};

pub use field::{MutableField, seq_instruction};
pub use image::InlineImage;
pub use paragraph::{MutableParagraph, ParagraphElement};
pub use run::{MutableRun, RunContent, RunProperties};
pub use section::SectionProperties;
pub use style::{MutableStyle, StyleCatalog, generate_styles_xml};
pub use table::{CellProperties, MutableCell, MutableRow, MutableTable, TableBorder, TableBorders};
pub use toc::TableOfContents;
