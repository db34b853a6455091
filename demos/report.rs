//! Build a small technical report: headings, a table of contents, a summary
//! table with merged cells, an equation and an optional figure.
//!
//! ```text
//! cargo run --example report -- out.docx --template corporate.docx --image chart.png
//! ```

use std::path::PathBuf;

use clap::Parser;
use docsmith::formula::MathNode;
use docsmith::ooxml::docx::writer::TableBorder;
use docsmith::ooxml::docx::{
    CellVerticalAlignment, MutableStyle, ParagraphAlignment, SectionProperties, TableAlignment,
};
use docsmith::{MutableDocument, Result};

#[derive(Debug, Parser)]
#[clap(about = "Generate a sample report document")]
struct Args {
    /// Path of the .docx file to write
    #[clap(value_name = "OUTPUT")]
    output: PathBuf,

    /// Take styles, numbering and theme from an existing document
    #[clap(long, value_name = "DOCX")]
    template: Option<PathBuf>,

    /// Picture to insert as Figure 1
    #[clap(long, value_name = "IMAGE")]
    image: Option<PathBuf>,
}

fn build(args: &Args) -> Result<MutableDocument> {
    let mut doc = MutableDocument::new();
    if let Some(template) = &args.template {
        doc.import_styles_from(template)?;
    } else {
        doc.add_style(MutableStyle::heading(2))?;
    }
    doc.set_section(SectionProperties::a4().margins(1.0, 1.0, 0.9, 0.9));

    doc.add_table_of_contents("Contents")?;
    doc.add_page_break()?;

    doc.add_heading("Summary", 1)?;
    let intro = doc.add_paragraph(
        "Quarterly throughput per region, with the derived growth model below.",
        None,
    )?;
    doc.set_alignment(intro, ParagraphAlignment::Justify)?;

    let table = doc.create_table(4, 3, Some("TableNormal"))?;
    for (col, title) in ["Region", "Q1", "Q2"].into_iter().enumerate() {
        doc.set_cell_text(table, 0, col, title, None)?;
    }
    let rows = [("North", "120", "135"), ("South", "98", "110")];
    for (row, (region, q1, q2)) in rows.into_iter().enumerate() {
        doc.set_cell_text(table, row + 1, 0, region, None)?;
        doc.set_cell_text(table, row + 1, 1, q1, None)?;
        doc.set_cell_text(table, row + 1, 2, q2, None)?;
    }
    doc.set_cell_text(table, 3, 0, "Totals pending review", None)?;
    doc.merge_cells(table, 3, 0, 3, 2)?;
    doc.apply_alternating_row_shading(table, "FFFFFF", "F2F2F2", None)?;
    doc.set_header_row(table, "D9E2F3")?;
    doc.set_table_borders(table, TableBorder::single(4))?;
    doc.set_table_alignment(table, TableAlignment::Center)?;
    doc.set_column_width(table, 0, 2880)?;
    doc.set_row_height(table, 3, 480)?;
    doc.set_cell_shading(table, 3, 0, "FFF2CC")?;
    doc.set_cell_vertical_alignment(table, 3, 0, CellVerticalAlignment::Center)?;
    doc.add_caption("Throughput by region", "Table")?;

    doc.add_heading("Growth model", 2)?;
    doc.add_equation(vec![
        MathNode::run("g = "),
        MathNode::fraction("Q2 - Q1", "Q1"),
    ])?;
    doc.add_integral("g(t) dt", "0", "T")?;
    doc.add_radical("Q1 Q2", None)?;
    doc.add_superscript("e", "rt")?;
    doc.add_subscript("Q", "n")?;
    doc.add_parentheses("1 + g", "(", ")")?;
    doc.add_matrix(2, 2, &[vec!["1", "g"], vec!["0", "1"]])?;

    if let Some(image) = &args.image {
        doc.insert_image(image, 480, 270)?;
        doc.add_caption("Throughput trend", "Figure")?;
    }

    doc.set_update_fields_on_open(true);
    Ok(doc)
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let result = build(&args).and_then(|doc| doc.save(&args.output));
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
