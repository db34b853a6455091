/// Word (.docx) document generation.
///
/// The module is organized around these key types:
/// - `MutableDocument`: a generation session owning the body, styles and media
/// - `MutableParagraph` / `MutableRun`: paragraph content with run formatting
/// - `MutableTable`: a rectangular grid with merges, widths and shading
/// - `Package`: an opened .docx package, used for templates and reopening
///
/// # Example
///
/// ```rust,no_run
/// use docsmith::ooxml::docx::MutableDocument;
///
/// // Reopen a saved report and append to it
/// let mut doc = MutableDocument::open("report.docx")?;
/// doc.add_heading("Appendix", 1)?;
/// let table = doc.create_table(2, 2, None)?;
/// doc.set_cell_text(table, 0, 0, "Key", None)?;
/// doc.save("report.docx")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod enums;
pub mod format;
pub mod package;
pub(crate) mod reader;
pub mod template;
pub mod writer;

pub use enums::{WdOrientation, WdStyleType};
pub use format::{
    CellVerticalAlignment, ImageFormat, ParagraphAlignment, TableAlignment, TableBorderStyle,
    TableWidth, VerticalMerge,
};
pub use package::Package;
pub use writer::{
    MutableDocument, MutableParagraph, MutableRun, MutableStyle, MutableTable, ParagraphId,
    SectionProperties, TableId, TableOfContents,
};
