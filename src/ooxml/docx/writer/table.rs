/// Table types and implementation for DOCX documents.
///
/// Cells are addressed positionally: `(row, col)` is the `col`-th `w:tc` of
/// the `row`-th `w:tr`, in insertion order. A horizontal merge removes cells
/// from a row, so the positions of later cells in that row shift left.
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use smallvec::{SmallVec, smallvec};
use std::fmt::Write as FmtWrite;

pub use super::super::format::{
    CellVerticalAlignment, TableAlignment, TableBorderStyle, TableWidth, VerticalMerge,
};
use super::super::format::validate_color;
use super::paragraph::MutableParagraph;
use super::run::MutableRun;

/// Border definition for table or cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBorder {
    /// Border style
    pub style: TableBorderStyle,
    /// Border width in eighths of a point (e.g., 8 = 1pt, 24 = 3pt)
    pub size: u32,
    /// Border color in hex RGB format (e.g., "FF0000" for red)
    pub color: String,
}

impl TableBorder {
    /// Single black line of `size` eighth-points.
    pub fn single(size: u32) -> Self {
        Self {
            style: TableBorderStyle::Single,
            size,
            color: "000000".to_string(),
        }
    }
}

impl Default for TableBorder {
    fn default() -> Self {
        Self::single(12)
    }
}

/// Table borders (all sides).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableBorders {
    pub top: Option<TableBorder>,
    pub left: Option<TableBorder>,
    pub bottom: Option<TableBorder>,
    pub right: Option<TableBorder>,
    pub inside_h: Option<TableBorder>,
    pub inside_v: Option<TableBorder>,
}

impl TableBorders {
    /// The same border on every edge, inner ones included.
    pub fn all(border: TableBorder) -> Self {
        Self {
            top: Some(border.clone()),
            left: Some(border.clone()),
            bottom: Some(border.clone()),
            right: Some(border.clone()),
            inside_h: Some(border.clone()),
            inside_v: Some(border),
        }
    }

    fn is_empty(&self) -> bool {
        self.edges().all(|(_, border)| border.is_none())
    }

    fn edges(&self) -> impl Iterator<Item = (&'static str, Option<&TableBorder>)> {
        [
            ("top", self.top.as_ref()),
            ("left", self.left.as_ref()),
            ("bottom", self.bottom.as_ref()),
            ("right", self.right.as_ref()),
            ("insideH", self.inside_h.as_ref()),
            ("insideV", self.inside_v.as_ref()),
        ]
        .into_iter()
    }

    pub(crate) fn edge_mut(&mut self, name: &str) -> Option<&mut Option<TableBorder>> {
        match name {
            "top" => Some(&mut self.top),
            "left" => Some(&mut self.left),
            "bottom" => Some(&mut self.bottom),
            "right" => Some(&mut self.right),
            "insideH" => Some(&mut self.inside_h),
            "insideV" => Some(&mut self.inside_v),
            _ => None,
        }
    }
}

/// Cell properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellProperties {
    /// Cell background color in hex RGB format
    pub shading: Option<String>,
    pub width: Option<TableWidth>,
    /// Number of grid columns the cell occupies
    pub grid_span: u32,
    pub vertical_merge: Option<VerticalMerge>,
    pub vertical_alignment: Option<CellVerticalAlignment>,
}

impl Default for CellProperties {
    fn default() -> Self {
        Self {
            shading: None,
            width: None,
            grid_span: 1,
            vertical_merge: None,
            vertical_alignment: None,
        }
    }
}

impl CellProperties {
    fn is_empty(&self) -> bool {
        self.shading.is_none()
            && self.width.is_none()
            && self.grid_span <= 1
            && self.vertical_merge.is_none()
            && self.vertical_alignment.is_none()
    }
}

/// A mutable table cell.
///
/// A cell always holds at least one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableCell {
    pub(crate) paragraphs: SmallVec<[MutableParagraph; 1]>,
    pub(crate) properties: CellProperties,
}

impl MutableCell {
    pub(crate) fn new() -> Self {
        Self {
            paragraphs: smallvec![MutableParagraph::new()],
            properties: CellProperties::default(),
        }
    }

    #[inline]
    pub fn paragraphs(&self) -> &[MutableParagraph] {
        &self.paragraphs
    }

    pub(crate) fn paragraphs_mut(&mut self) -> &mut [MutableParagraph] {
        &mut self.paragraphs
    }

    pub(crate) fn push_paragraph(&mut self, para: MutableParagraph) {
        self.paragraphs.push(para);
    }

    #[inline]
    pub fn properties(&self) -> &CellProperties {
        &self.properties
    }

    /// Text of every paragraph, joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(MutableParagraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_merge_continuation(&self) -> bool {
        self.properties.vertical_merge == Some(VerticalMerge::Continue)
    }

    /// Replace the content with a single paragraph.
    fn replace_content(&mut self, para: MutableParagraph) {
        self.paragraphs = smallvec![para];
    }

    fn clear(&mut self) {
        self.replace_content(MutableParagraph::new());
    }

    fn to_xml(&self, xml: &mut String) -> std::fmt::Result {
        xml.push_str("<w:tc>");

        let props = &self.properties;
        if !props.is_empty() {
            xml.push_str("<w:tcPr>");
            if let Some(width) = props.width {
                write!(xml, r#"<w:tcW w:w="{}" w:type="{}"/>"#, width.value(), width.unit())?;
            }
            if props.grid_span > 1 {
                write!(xml, r#"<w:gridSpan w:val="{}"/>"#, props.grid_span)?;
            }
            match props.vertical_merge {
                Some(VerticalMerge::Restart) => xml.push_str(r#"<w:vMerge w:val="restart"/>"#),
                Some(VerticalMerge::Continue) => xml.push_str("<w:vMerge/>"),
                None => {},
            }
            if let Some(ref fill) = props.shading {
                write!(xml, r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#, fill)?;
            }
            if let Some(align) = props.vertical_alignment {
                write!(xml, r#"<w:vAlign w:val="{}"/>"#, align.as_str())?;
            }
            xml.push_str("</w:tcPr>");
        }

        for para in &self.paragraphs {
            para.to_xml(xml)?;
        }

        xml.push_str("</w:tc>");
        Ok(())
    }
}

/// A mutable table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableRow {
    pub(crate) cells: Vec<MutableCell>,
    /// Repeat as header row on every page (`w:tblHeader`)
    pub(crate) header: bool,
    /// Minimum height in twips
    pub(crate) height: Option<u32>,
}

impl MutableRow {
    pub(crate) fn new(cols: usize) -> Self {
        Self {
            cells: (0..cols).map(|_| MutableCell::new()).collect(),
            header: false,
            height: None,
        }
    }

    #[inline]
    pub fn cells(&self) -> &[MutableCell] {
        &self.cells
    }

    pub(crate) fn push_cell(&mut self, cell: MutableCell) {
        self.cells.push(cell);
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_header(&self) -> bool {
        self.header
    }

    #[inline]
    pub fn height(&self) -> Option<u32> {
        self.height
    }

    fn to_xml(&self, xml: &mut String) -> std::fmt::Result {
        xml.push_str("<w:tr>");

        if self.header || self.height.is_some() {
            xml.push_str("<w:trPr>");
            if let Some(height) = self.height {
                write!(xml, r#"<w:trHeight w:val="{}"/>"#, height)?;
            }
            if self.header {
                xml.push_str("<w:tblHeader/>");
            }
            xml.push_str("</w:trPr>");
        }

        for cell in &self.cells {
            cell.to_xml(xml)?;
        }

        xml.push_str("</w:tr>");
        Ok(())
    }
}

/// A mutable table.
///
/// # Examples
///
/// ```rust
/// use docsmith::ooxml::docx::writer::MutableTable;
///
/// let mut table = MutableTable::new(3, 3, 3120)?;
/// table.merge_cells(0, 0, 1, 1)?;
/// assert_eq!(table.cell(0, 0)?.properties().grid_span, 2);
/// assert_eq!(table.cell_count(0)?, 2);
/// # Ok::<(), docsmith::OoxmlError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableTable {
    pub(crate) style: Option<String>,
    pub(crate) rows: Vec<MutableRow>,
    /// Grid column widths in twips
    pub(crate) grid: Vec<u32>,
    pub(crate) width: TableWidth,
    pub(crate) alignment: Option<TableAlignment>,
    pub(crate) borders: TableBorders,
}

impl MutableTable {
    /// Table of `rows` x `cols` empty cells, each grid column `col_width` twips wide,
    /// spanning the full text width with single borders.
    ///
    /// # Errors
    /// [`OoxmlError::InvalidDimension`] when `rows` or `cols` is zero.
    pub fn new(rows: usize, cols: usize, col_width: u32) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(OoxmlError::InvalidDimension { rows, cols });
        }
        Ok(Self {
            style: None,
            rows: (0..rows).map(|_| MutableRow::new(cols)).collect(),
            grid: vec![col_width; cols],
            width: TableWidth::FULL,
            alignment: None,
            borders: TableBorders::all(TableBorder::default()),
        })
    }

    /// Table with no rows, filled in by the document reader.
    pub(crate) fn empty() -> Self {
        Self {
            style: None,
            rows: Vec::new(),
            grid: Vec::new(),
            width: TableWidth::Auto,
            alignment: None,
            borders: TableBorders::default(),
        }
    }

    pub(crate) fn push_row(&mut self, row: MutableRow) {
        self.rows.push(row);
    }

    #[inline]
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn set_style(&mut self, style_id: Option<&str>) {
        self.style = style_id.map(str::to_string);
    }

    #[inline]
    pub fn rows(&self) -> &[MutableRow] {
        &self.rows
    }

    /// Get the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of grid columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.grid.len()
    }

    #[inline]
    pub fn grid(&self) -> &[u32] {
        &self.grid
    }

    #[inline]
    pub fn width(&self) -> TableWidth {
        self.width
    }

    #[inline]
    pub fn alignment(&self) -> Option<TableAlignment> {
        self.alignment
    }

    #[inline]
    pub fn borders(&self) -> &TableBorders {
        &self.borders
    }

    /// Number of cells currently in `row`.
    pub fn cell_count(&self, row: usize) -> Result<usize> {
        self.rows
            .get(row)
            .map(MutableRow::cell_count)
            .ok_or_else(|| self.out_of_range(row, 0))
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<&MutableCell> {
        self.check_cell(row, col)?;
        Ok(&self.rows[row].cells[col])
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut MutableCell> {
        self.check_cell(row, col)?;
        Ok(&mut self.rows[row].cells[col])
    }

    fn check_cell(&self, row: usize, col: usize) -> Result<()> {
        match self.rows.get(row) {
            Some(r) if col < r.cells.len() => Ok(()),
            _ => Err(self.out_of_range(row, col)),
        }
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row < self.rows.len() {
            Ok(())
        } else {
            Err(self.out_of_range(row, 0))
        }
    }

    fn out_of_range(&self, row: usize, col: usize) -> OoxmlError {
        OoxmlError::IndexOutOfRange {
            row,
            col,
            rows: self.rows.len(),
            cols: self.rows.get(row).map_or(self.grid.len(), MutableRow::cell_count),
        }
    }

    /// Replace a cell's content with one paragraph holding `text`.
    ///
    /// Text in a header row is bold.
    ///
    /// # Errors
    /// - [`OoxmlError::IndexOutOfRange`] for a cell outside the table
    /// - [`OoxmlError::InvalidArgument`] for a vertical-merge continuation cell,
    ///   which shows the content of the cell that starts the merge
    pub fn set_cell_text(
        &mut self,
        row: usize,
        col: usize,
        text: &str,
        style: Option<&str>,
    ) -> Result<()> {
        let header = self.rows.get(row).is_some_and(MutableRow::is_header);
        let cell = self.cell_mut(row, col)?;
        if cell.is_merge_continuation() {
            return Err(OoxmlError::InvalidArgument(format!(
                "cell ({}, {}) continues a vertical merge and cannot hold text",
                row, col
            )));
        }

        let mut run = MutableRun::text(text);
        if header {
            run.bold(true);
        }
        let mut para = MutableParagraph::new();
        para.set_style(style);
        para.add_run(run);
        cell.replace_content(para);
        Ok(())
    }

    pub fn cell_text(&self, row: usize, col: usize) -> Result<String> {
        Ok(self.cell(row, col)?.text())
    }

    /// Merge the rectangle `(start_row, start_col)..=(end_row, end_col)`.
    ///
    /// A single row merges horizontally: the first cell spans the grid columns
    /// of the range and the other cells are removed from the row. A single
    /// column merges vertically: the first cell restarts a vertical merge and
    /// the cells below continue it. A rectangle merges every row horizontally
    /// first, then the first column vertically.
    ///
    /// Continuation cells are cleared to one empty paragraph.
    ///
    /// # Errors
    /// - [`OoxmlError::InvalidRange`] when an end precedes its start
    /// - [`OoxmlError::IndexOutOfRange`] when the range leaves the table
    ///
    /// Nothing is modified on error.
    pub fn merge_cells(
        &mut self,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> Result<()> {
        if start_row > end_row || start_col > end_col {
            return Err(OoxmlError::InvalidRange {
                start_row,
                start_col,
                end_row,
                end_col,
            });
        }
        for row in start_row..=end_row {
            self.check_cell(row, end_col)?;
        }

        if start_col < end_col {
            for row in start_row..=end_row {
                self.merge_row(row, start_col, end_col);
            }
        }
        if start_row < end_row {
            self.merge_column(start_row, end_row, start_col);
        }
        Ok(())
    }

    fn merge_row(&mut self, row: usize, start_col: usize, end_col: usize) {
        let cells = &mut self.rows[row].cells;
        let span: u32 = cells[start_col..=end_col]
            .iter()
            .map(|c| c.properties.grid_span.max(1))
            .sum();
        cells[start_col].properties.grid_span = span;
        cells.drain(start_col + 1..=end_col);
    }

    fn merge_column(&mut self, start_row: usize, end_row: usize, col: usize) {
        self.rows[start_row].cells[col].properties.vertical_merge = Some(VerticalMerge::Restart);
        for row in start_row + 1..=end_row {
            let cell = &mut self.rows[row].cells[col];
            cell.properties.vertical_merge = Some(VerticalMerge::Continue);
            cell.clear();
        }
    }

    /// Set all table borders at once.
    pub fn set_borders(&mut self, border: TableBorder) -> Result<()> {
        validate_color(&border.color)?;
        self.borders = TableBorders::all(border);
        Ok(())
    }

    pub fn set_alignment(&mut self, alignment: TableAlignment) {
        self.alignment = Some(alignment);
    }

    pub fn set_width(&mut self, width: TableWidth) {
        self.width = width;
    }

    /// Set grid column `col` to `twips`, and the width of every cell that
    /// occupies exactly that column.
    pub fn set_column_width(&mut self, col: usize, twips: u32) -> Result<()> {
        if col >= self.grid.len() {
            return Err(OoxmlError::IndexOutOfRange {
                row: 0,
                col,
                rows: self.rows.len(),
                cols: self.grid.len(),
            });
        }

        self.grid[col] = twips;
        for row in &mut self.rows {
            let mut grid_col = 0usize;
            for cell in &mut row.cells {
                let span = cell.properties.grid_span.max(1) as usize;
                if grid_col == col && span == 1 {
                    cell.properties.width = Some(TableWidth::Dxa(twips));
                }
                grid_col += span;
                if grid_col > col {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Shade rows by parity: even rows get `even`, odd rows `odd`.
    ///
    /// With a `header` color, row 0 takes that color instead; parity is
    /// still counted from row 0, so row 1 is odd either way.
    pub fn apply_alternating_row_shading(
        &mut self,
        even: &str,
        odd: &str,
        header: Option<&str>,
    ) -> Result<()> {
        validate_color(even)?;
        validate_color(odd)?;
        if let Some(header) = header {
            validate_color(header)?;
        }

        for (index, row) in self.rows.iter_mut().enumerate() {
            let fill = match (index, header) {
                (0, Some(header)) => header,
                (i, _) if i % 2 == 0 => even,
                _ => odd,
            };
            for cell in &mut row.cells {
                cell.properties.shading = Some(fill.to_string());
            }
        }
        Ok(())
    }

    /// Mark row 0 as a repeating header row: shaded, with bold text.
    pub fn set_header_row(&mut self, color: &str) -> Result<()> {
        validate_color(color)?;
        let Some(row) = self.rows.first_mut() else {
            return Err(OoxmlError::InvalidDimension { rows: 0, cols: self.grid.len() });
        };

        row.header = true;
        for cell in &mut row.cells {
            cell.properties.shading = Some(color.to_string());
            for para in cell.paragraphs.iter_mut() {
                for run in para.runs_mut() {
                    run.bold(true);
                }
            }
        }
        Ok(())
    }

    /// Minimum row height in twips.
    pub fn set_row_height(&mut self, row: usize, twips: u32) -> Result<()> {
        self.check_row(row)?;
        self.rows[row].height = Some(twips);
        Ok(())
    }

    pub fn set_cell_shading(&mut self, row: usize, col: usize, color: &str) -> Result<()> {
        validate_color(color)?;
        self.cell_mut(row, col)?.properties.shading = Some(color.to_string());
        Ok(())
    }

    pub fn set_cell_vertical_alignment(
        &mut self,
        row: usize,
        col: usize,
        alignment: CellVerticalAlignment,
    ) -> Result<()> {
        self.cell_mut(row, col)?.properties.vertical_alignment = Some(alignment);
        Ok(())
    }

    pub(crate) fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut MutableParagraph> {
        self.rows
            .iter_mut()
            .flat_map(|row| row.cells.iter_mut())
            .flat_map(|cell| cell.paragraphs.iter_mut())
    }

    pub(crate) fn paragraphs(&self) -> impl Iterator<Item = &MutableParagraph> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .flat_map(|cell| cell.paragraphs.iter())
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> std::fmt::Result {
        xml.push_str("<w:tbl>");

        xml.push_str("<w:tblPr>");
        if let Some(ref style) = self.style {
            write!(xml, r#"<w:tblStyle w:val="{}"/>"#, escape_xml(style))?;
        }
        write!(
            xml,
            r#"<w:tblW w:w="{}" w:type="{}"/>"#,
            self.width.value(),
            self.width.unit()
        )?;
        if let Some(alignment) = self.alignment {
            write!(xml, r#"<w:jc w:val="{}"/>"#, alignment.as_str())?;
        }
        if !self.borders.is_empty() {
            xml.push_str("<w:tblBorders>");
            for (name, border) in self.borders.edges() {
                if let Some(border) = border {
                    write!(
                        xml,
                        r#"<w:{} w:val="{}" w:sz="{}" w:space="0" w:color="{}"/>"#,
                        name,
                        border.style.as_str(),
                        border.size,
                        border.color
                    )?;
                }
            }
            xml.push_str("</w:tblBorders>");
        }
        xml.push_str(r#"<w:tblLook w:val="04A0" w:firstRow="1" w:lastRow="0" w:firstColumn="1" w:lastColumn="0" w:noHBand="0" w:noVBand="1"/>"#);
        xml.push_str("</w:tblPr>");

        xml.push_str("<w:tblGrid>");
        for width in &self.grid {
            write!(xml, r#"<w:gridCol w:w="{}"/>"#, width)?;
        }
        xml.push_str("</w:tblGrid>");

        for row in &self.rows {
            row.to_xml(xml)?;
        }

        xml.push_str("</w:tbl>");
        Ok(())
    }
}
