//! Docsmith - programmatic generation of Word (.docx) documents
//!
//! This library builds OOXML WordprocessingML packages in memory and writes
//! them out in one step. A single [`MutableDocument`] is the generation
//! session: every builder call appends to its body, and nothing touches the
//! filesystem until [`MutableDocument::save`].
//!
//! # Features
//!
//! - **Styles**: a deterministic default catalog or a catalog cloned from a template
//! - **Paragraphs**: styled text, captions with `SEQ` fields, tables of contents
//! - **Tables**: borders, shading, header rows, horizontal/vertical/rectangular merges
//! - **Math**: Office Math (OMML) fractions, radicals, scripts, integrals, matrices
//! - **Images**: PNG/JPEG/GIF/BMP/TIFF payloads embedded with pixel-to-EMU sizing
//! - **Round trip**: reopen a produced package and keep editing it
//!
//! # Example
//!
//! ```no_run
//! use docsmith::MutableDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = MutableDocument::new();
//! doc.add_table_of_contents("Contents")?;
//! doc.add_paragraph("Quarterly figures", Some("Heading1"))?;
//!
//! let table = doc.create_table(3, 2, None)?;
//! doc.set_cell_text(table, 0, 0, "Region", None)?;
//! doc.set_header_row(table, "D9E2F3")?;
//! doc.merge_cells(table, 1, 0, 2, 0)?;
//! doc.add_caption("Sales by region", "Table")?;
//!
//! doc.add_fraction("a + b", "2")?;
//! doc.save("report.docx")?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod formula;
pub mod ooxml;

pub use formula::ast::MathNode;
pub use ooxml::docx::writer::MutableDocument;
pub use ooxml::error::{OoxmlError, Result};
