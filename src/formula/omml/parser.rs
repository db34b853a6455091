use crate::common::xml::{resolve_entity, unescape_xml};
use crate::formula::ast::MathNode;
use crate::formula::omml::error::OmmlError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;

type Result<T> = std::result::Result<T, OmmlError>;

// Prevent stack overflow on hostile nesting
const MAX_DEPTH: usize = 256;

/// Parse an OMML fragment (`m:oMathPara`, `m:oMath` or bare constructs) into nodes.
///
/// ```
/// use docsmith::formula::omml;
/// use docsmith::MathNode;
///
/// let nodes = omml::parse(r#"<m:oMath><m:sSup><m:e><m:r><m:t>x</m:t></m:r></m:e><m:sup><m:r><m:t>2</m:t></m:r></m:sup></m:sSup></m:oMath>"#).unwrap();
/// assert_eq!(nodes, vec![MathNode::superscript("x", "2")]);
/// ```
pub fn parse(xml: &str) -> Result<Vec<MathNode>> {
    let mut reader = Reader::from_str(xml);
    OmmlParser::new(&mut reader).parse_sequence(true)
}

/// OMML parser driving a borrowed reader.
///
/// Borrowing lets the document reader hand over in the middle of a paragraph
/// and resume after the math zone's end tag.
pub struct OmmlParser<'r, 'a> {
    reader: &'r mut Reader<&'a [u8]>,
    depth: usize,
}

/// Child slots (`m:num`, `m:e`, ...) and property values (`m:begChr`, ...) of one construct.
#[derive(Default)]
struct Slots {
    slots: SmallVec<[(Vec<u8>, Vec<MathNode>); 4]>,
    props: SmallVec<[(Vec<u8>, Option<String>); 4]>,
}

impl Slots {
    /// All nodes of every slot called `name`, concatenated.
    fn take(&mut self, name: &[u8]) -> Vec<MathNode> {
        let mut nodes = Vec::new();
        for (slot, children) in self.slots.iter_mut() {
            if slot.as_slice() == name {
                nodes.append(children);
            }
        }
        nodes
    }

    fn has_slot(&self, name: &[u8]) -> bool {
        self.slots.iter().any(|(slot, _)| slot.as_slice() == name)
    }

    /// `None` when absent, `Some(None)` when present without a value.
    fn prop(&self, name: &[u8]) -> Option<Option<&str>> {
        self.props
            .iter()
            .find(|(prop, _)| prop.as_slice() == name)
            .map(|(_, value)| value.as_deref())
    }

    /// On/off property: present without a value, or with `1`/`on`/`true`.
    fn flag(&self, name: &[u8]) -> bool {
        matches!(self.prop(name), Some(None | Some("1" | "on" | "true")))
    }

    fn glyph(&self, name: &[u8], default: &str) -> String {
        match self.prop(name) {
            Some(value) => value.unwrap_or_default().to_string(),
            None => default.to_string(),
        }
    }
}

impl<'r, 'a> OmmlParser<'r, 'a> {
    pub fn new(reader: &'r mut Reader<&'a [u8]>) -> Self {
        Self { reader, depth: 0 }
    }

    /// Nodes inside the element whose start tag was just read; consumes its end tag.
    pub fn parse_contents(&mut self) -> Result<Vec<MathNode>> {
        self.parse_sequence(false)
    }

    fn parse_sequence(&mut self, top_level: bool) -> Result<Vec<MathNode>> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(OmmlError::DepthLimitExceeded(MAX_DEPTH));
        }

        let mut nodes = Vec::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => self.parse_element(&e, &mut nodes)?,
                Event::End(_) if !top_level => break,
                Event::Eof if top_level => break,
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }

        self.depth -= 1;
        Ok(nodes)
    }

    fn parse_element(&mut self, e: &BytesStart<'a>, nodes: &mut Vec<MathNode>) -> Result<()> {
        match e.name().as_ref() {
            b"m:r" => nodes.push(MathNode::Run(self.parse_run()?)),
            b"m:f" => {
                let mut slots = self.parse_slots()?;
                nodes.push(MathNode::Fraction {
                    numerator: slots.take(b"m:num"),
                    denominator: slots.take(b"m:den"),
                });
            },
            b"m:rad" => {
                let mut slots = self.parse_slots()?;
                let degree = if slots.flag(b"m:degHide") || !slots.has_slot(b"m:deg") {
                    None
                } else {
                    Some(slots.take(b"m:deg"))
                };
                nodes.push(MathNode::Radical {
                    degree,
                    base: slots.take(b"m:e"),
                });
            },
            b"m:sSup" => {
                let mut slots = self.parse_slots()?;
                nodes.push(MathNode::SuperScript {
                    base: slots.take(b"m:e"),
                    exponent: slots.take(b"m:sup"),
                });
            },
            b"m:sSub" => {
                let mut slots = self.parse_slots()?;
                nodes.push(MathNode::SubScript {
                    base: slots.take(b"m:e"),
                    subscript: slots.take(b"m:sub"),
                });
            },
            b"m:sSubSup" => {
                let mut slots = self.parse_slots()?;
                nodes.push(MathNode::SuperScript {
                    base: vec![MathNode::SubScript {
                        base: slots.take(b"m:e"),
                        subscript: slots.take(b"m:sub"),
                    }],
                    exponent: slots.take(b"m:sup"),
                });
            },
            b"m:d" => {
                let mut slots = self.parse_slots()?;
                nodes.push(MathNode::Delimiter {
                    open: slots.glyph(b"m:begChr", "("),
                    close: slots.glyph(b"m:endChr", ")"),
                    body: slots.take(b"m:e"),
                });
            },
            b"m:m" => nodes.push(self.parse_matrix()?),
            name if name.ends_with(b"Pr") => {
                self.reader.read_to_end(e.name())?;
            },
            // Wrappers and constructs without a node of their own keep their content
            _ => nodes.extend(self.parse_sequence(false)?),
        }
        Ok(())
    }

    fn parse_run(&mut self) -> Result<String> {
        let mut text = String::new();
        let mut in_text = false;

        loop {
            match self.reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == b"m:t" => in_text = true,
                Event::Start(e) => {
                    self.reader.read_to_end(e.name())?;
                },
                Event::Text(t) if in_text => {
                    text.push_str(&unescape_xml(std::str::from_utf8(&t)?));
                },
                Event::CData(t) if in_text => text.push_str(std::str::from_utf8(&t)?),
                Event::GeneralRef(r) if in_text => {
                    if let Some(ch) = resolve_entity(std::str::from_utf8(&r)?) {
                        text.push(ch);
                    }
                },
                Event::End(e) if e.name().as_ref() == b"m:t" => in_text = false,
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }

        Ok(text)
    }

    fn parse_slots(&mut self) -> Result<Slots> {
        let mut slots = Slots::default();

        loop {
            match self.reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name().as_ref().to_vec();
                    if name.ends_with(b"Pr") {
                        self.parse_props(&mut slots)?;
                    } else {
                        let children = self.parse_sequence(false)?;
                        slots.slots.push((name, children));
                    }
                },
                Event::Empty(e) => {
                    let name = e.name().as_ref().to_vec();
                    if !name.ends_with(b"Pr") {
                        slots.slots.push((name, Vec::new()));
                    }
                },
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }

        Ok(slots)
    }

    /// Record the `m:val` of every element inside a property block.
    fn parse_props(&mut self, slots: &mut Slots) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.reader.read_event()? {
                Event::Start(e) => {
                    depth += 1;
                    slots.props.push((e.name().as_ref().to_vec(), val_attr(&e)?));
                },
                Event::Empty(e) => {
                    slots.props.push((e.name().as_ref().to_vec(), val_attr(&e)?));
                },
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }
        Ok(())
    }

    fn parse_matrix(&mut self) -> Result<MathNode> {
        let mut rows = Vec::new();

        loop {
            match self.reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == b"m:mr" => {
                    rows.push(self.parse_matrix_row()?);
                },
                Event::Empty(e) if e.name().as_ref() == b"m:mr" => rows.push(Vec::new()),
                Event::Start(e) => {
                    self.reader.read_to_end(e.name())?;
                },
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }

        Ok(MathNode::Matrix { rows })
    }

    fn parse_matrix_row(&mut self) -> Result<Vec<Vec<MathNode>>> {
        let mut cells = Vec::new();

        loop {
            match self.reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == b"m:e" => {
                    cells.push(self.parse_sequence(false)?);
                },
                Event::Empty(e) if e.name().as_ref() == b"m:e" => cells.push(Vec::new()),
                Event::Start(e) => {
                    self.reader.read_to_end(e.name())?;
                },
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
        }

        Ok(cells)
    }
}

fn val_attr(e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"val" {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn unexpected_eof() -> OmmlError {
    OmmlError::InvalidStructure("unexpected end of input inside a math zone".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::omml::writer::{write_math_paragraph, write_nodes};

    fn round_trip(nodes: Vec<MathNode>) {
        let mut xml = String::new();
        write_math_paragraph(&nodes, &mut xml);
        assert_eq!(parse(&xml).unwrap(), nodes, "{xml}");
    }

    #[test]
    fn test_round_trip_every_variant() {
        round_trip(vec![MathNode::fraction("a + b", "2")]);
        round_trip(vec![MathNode::radical("x", None)]);
        round_trip(vec![MathNode::radical("x", Some("3"))]);
        round_trip(vec![MathNode::superscript("e", "i\u{03C0}")]);
        round_trip(vec![MathNode::subscript("a", "n")]);
        round_trip(vec![MathNode::parentheses("x & y", "[", "]")]);
        round_trip(vec![MathNode::integral("f(x)dx", "0", "\u{221E}")]);
        round_trip(vec![
            MathNode::matrix(2, 2, &[vec!["a", "b"], vec!["c", "d"]]).unwrap(),
        ]);
    }

    #[test]
    fn test_nested_composition() {
        let node = MathNode::Fraction {
            numerator: vec![MathNode::superscript("x", "2"), MathNode::run("+1")],
            denominator: vec![MathNode::radical("y", None)],
        };
        round_trip(vec![node]);
    }

    #[test]
    fn test_word_authored_markup() {
        let xml = r#"<m:oMathPara><m:oMath><m:d><m:dPr><m:ctrlPr><w:rPr><w:i/></w:rPr></m:ctrlPr></m:dPr><m:e><m:r><w:rPr><w:rFonts w:ascii="Cambria Math"/></w:rPr><m:t>a &lt; b</m:t></m:r></m:e></m:d><m:sSubSup><m:e><m:r><m:t>x</m:t></m:r></m:e><m:sub><m:r><m:t>i</m:t></m:r></m:sub><m:sup><m:r><m:t>2</m:t></m:r></m:sup></m:sSubSup></m:oMath></m:oMathPara>"#;
        let nodes = parse(xml).unwrap();
        assert_eq!(
            nodes,
            vec![
                MathNode::parentheses("a < b", "(", ")"),
                MathNode::SuperScript {
                    base: vec![MathNode::subscript("x", "i")],
                    exponent: vec![MathNode::run("2")],
                },
            ]
        );
    }

    #[test]
    fn test_unknown_constructs_keep_text() {
        let xml = r#"<m:oMath><m:nary><m:naryPr><m:chr m:val="∑"/></m:naryPr><m:sub/><m:sup/><m:e><m:r><m:t>k</m:t></m:r></m:e></m:nary></m:oMath>"#;
        assert_eq!(parse(xml).unwrap(), vec![MathNode::run("k")]);
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        let mut xml = String::new();
        write_nodes(&[MathNode::fraction("1", "2")], &mut xml);
        let truncated = &xml[..xml.len() - "</m:f>".len()];
        assert!(parse(truncated).is_err());
    }
}
