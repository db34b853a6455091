// OMML serialization
//
// One recursive function covers every node variant. Math text runs carry the
// Cambria Math font so consumers that ignore the math font setting still render
// them with math glyphs.

use crate::common::xml::{escape_text, escape_xml};
use crate::formula::ast::MathNode;

const MATH_RUN_PROPERTIES: &str =
    r#"<w:rPr><w:rFonts w:ascii="Cambria Math" w:hAnsi="Cambria Math"/></w:rPr>"#;

/// Write a display equation: `<m:oMathPara><m:oMath>…</m:oMath></m:oMathPara>`.
pub fn write_math_paragraph(nodes: &[MathNode], xml: &mut String) {
    xml.push_str("<m:oMathPara><m:oMath>");
    write_nodes(nodes, xml);
    xml.push_str("</m:oMath></m:oMathPara>");
}

/// Write a node sequence without any wrapper.
pub fn write_nodes(nodes: &[MathNode], xml: &mut String) {
    for node in nodes {
        write_node(node, xml);
    }
}

/// Write `nodes` inside `<tag>…</tag>`, or `<tag/>` when empty.
fn write_slot(tag: &str, nodes: &[MathNode], xml: &mut String) {
    xml.push('<');
    xml.push_str(tag);
    if nodes.is_empty() {
        xml.push_str("/>");
        return;
    }
    xml.push('>');
    write_nodes(nodes, xml);
    xml.push_str("</");
    xml.push_str(tag);
    xml.push('>');
}

fn write_node(node: &MathNode, xml: &mut String) {
    match node {
        MathNode::Run(text) => {
            xml.push_str("<m:r>");
            xml.push_str(MATH_RUN_PROPERTIES);
            xml.push_str(r#"<m:t xml:space="preserve">"#);
            xml.push_str(&escape_text(text));
            xml.push_str("</m:t></m:r>");
        },
        MathNode::Fraction {
            numerator,
            denominator,
        } => {
            xml.push_str("<m:f>");
            write_slot("m:num", numerator, xml);
            write_slot("m:den", denominator, xml);
            xml.push_str("</m:f>");
        },
        MathNode::Radical { degree, base } => {
            xml.push_str("<m:rad>");
            match degree {
                Some(degree) => write_slot("m:deg", degree, xml),
                None => xml.push_str(r#"<m:radPr><m:degHide m:val="1"/></m:radPr><m:deg/>"#),
            }
            write_slot("m:e", base, xml);
            xml.push_str("</m:rad>");
        },
        MathNode::SuperScript { base, exponent } => {
            xml.push_str("<m:sSup>");
            write_slot("m:e", base, xml);
            write_slot("m:sup", exponent, xml);
            xml.push_str("</m:sSup>");
        },
        MathNode::SubScript { base, subscript } => {
            xml.push_str("<m:sSub>");
            write_slot("m:e", base, xml);
            write_slot("m:sub", subscript, xml);
            xml.push_str("</m:sSub>");
        },
        MathNode::Delimiter { open, close, body } => {
            xml.push_str(&format!(
                r#"<m:d><m:dPr><m:begChr m:val="{}"/><m:endChr m:val="{}"/></m:dPr>"#,
                escape_xml(open),
                escape_xml(close)
            ));
            write_slot("m:e", body, xml);
            xml.push_str("</m:d>");
        },
        MathNode::Matrix { rows } => {
            let cols = rows.first().map_or(0, Vec::len);
            xml.push_str(&format!(
                r#"<m:m><m:mPr><m:mcs><m:mc><m:mcPr><m:count m:val="{}"/><m:mcJc m:val="center"/></m:mcPr></m:mc></m:mcs></m:mPr>"#,
                cols
            ));
            for row in rows {
                xml.push_str("<m:mr>");
                for cell in row {
                    write_slot("m:e", cell, xml);
                }
                xml.push_str("</m:mr>");
            }
            xml.push_str("</m:m>");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_xml(node: MathNode) -> String {
        let mut xml = String::new();
        write_nodes(&[node], &mut xml);
        xml
    }

    #[test]
    fn test_fraction() {
        let xml = to_xml(MathNode::fraction("a", "b"));
        assert!(xml.starts_with("<m:f><m:num><m:r>"));
        assert!(xml.contains(r#"<m:t xml:space="preserve">a</m:t></m:r></m:num><m:den>"#));
        assert!(xml.ends_with("</m:den></m:f>"));
    }

    #[test]
    fn test_square_root_hides_degree() {
        let xml = to_xml(MathNode::radical("x", None));
        assert!(xml.starts_with(r#"<m:rad><m:radPr><m:degHide m:val="1"/></m:radPr><m:deg/><m:e>"#));

        let xml = to_xml(MathNode::radical("x", Some("3")));
        assert!(!xml.contains("degHide"));
        assert!(xml.contains(r#"<m:deg><m:r>"#));
    }

    #[test]
    fn test_delimiter_with_empty_glyphs() {
        let xml = to_xml(MathNode::parentheses("x", "", ""));
        assert!(xml.contains(r#"<m:begChr m:val=""/><m:endChr m:val=""/>"#));

        let xml = to_xml(MathNode::parentheses("x", "<", ">"));
        assert!(xml.contains(r#"<m:begChr m:val="&lt;"/><m:endChr m:val="&gt;"/>"#));
    }

    #[test]
    fn test_matrix_layout() {
        let node = MathNode::matrix(2, 3, &[vec!["1", "2", "3"], vec!["4", "5", "6"]]).unwrap();
        let xml = to_xml(node);
        assert!(xml.contains(r#"<m:count m:val="3"/>"#));
        assert_eq!(xml.matches("<m:mr>").count(), 2);
        assert_eq!(xml.matches("<m:e>").count(), 6);
    }

    #[test]
    fn test_math_paragraph_wrapper() {
        let mut xml = String::new();
        write_math_paragraph(&[MathNode::run("a<b")], &mut xml);
        assert!(xml.starts_with("<m:oMathPara><m:oMath><m:r>"));
        assert!(xml.contains("a&lt;b"));
        assert!(xml.contains("Cambria Math"));
        assert!(xml.ends_with("</m:oMath></m:oMathPara>"));
    }
}
