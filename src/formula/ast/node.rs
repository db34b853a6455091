// Math node definitions

/// One node of an equation tree.
///
/// Slots (`numerator`, `base`, ...) hold sequences so that a slot can contain
/// several runs and nested constructs side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathNode {
    /// Literal math text (`m:r`)
    Run(String),

    /// Stacked fraction (`m:f`)
    Fraction {
        numerator: Vec<MathNode>,
        denominator: Vec<MathNode>,
    },

    /// Root (`m:rad`); `None` degree is a square root with the degree hidden
    Radical {
        degree: Option<Vec<MathNode>>,
        base: Vec<MathNode>,
    },

    /// Superscript (`m:sSup`)
    SuperScript {
        base: Vec<MathNode>,
        exponent: Vec<MathNode>,
    },

    /// Subscript (`m:sSub`)
    SubScript {
        base: Vec<MathNode>,
        subscript: Vec<MathNode>,
    },

    /// Delimited group (`m:d`); empty glyphs give an undecorated group
    Delimiter {
        open: String,
        close: String,
        body: Vec<MathNode>,
    },

    /// Matrix (`m:m`): rows of cells, each cell a node sequence
    Matrix { rows: Vec<Vec<Vec<MathNode>>> },
}

impl MathNode {
    /// Plain text of the tree in reading order, ignoring structure.
    ///
    /// ```
    /// use docsmith::MathNode;
    /// assert_eq!(MathNode::superscript("x", "2").text(), "x2");
    /// ```
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        fn all(nodes: &[MathNode], out: &mut String) {
            nodes.iter().for_each(|n| n.collect_text(out));
        }

        match self {
            Self::Run(text) => out.push_str(text),
            Self::Fraction {
                numerator,
                denominator,
            } => {
                all(numerator, out);
                all(denominator, out);
            },
            Self::Radical { degree, base } => {
                if let Some(degree) = degree {
                    all(degree, out);
                }
                all(base, out);
            },
            Self::SuperScript { base, exponent } => {
                all(base, out);
                all(exponent, out);
            },
            Self::SubScript { base, subscript } => {
                all(base, out);
                all(subscript, out);
            },
            Self::Delimiter { open, close, body } => {
                out.push_str(open);
                all(body, out);
                out.push_str(close);
            },
            Self::Matrix { rows } => {
                for cell in rows.iter().flatten() {
                    all(cell, out);
                }
            },
        }
    }

    /// Matrix shape as (rows, columns of the first row).
    pub fn matrix_shape(&self) -> Option<(usize, usize)> {
        match self {
            Self::Matrix { rows } => Some((rows.len(), rows.first().map_or(0, Vec::len))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_walks_every_slot() {
        let node = MathNode::Fraction {
            numerator: vec![MathNode::Radical {
                degree: Some(vec![MathNode::Run("3".into())]),
                base: vec![MathNode::Run("x".into())],
            }],
            denominator: vec![MathNode::Delimiter {
                open: "[".into(),
                close: "]".into(),
                body: vec![MathNode::Run("y".into())],
            }],
        };
        assert_eq!(node.text(), "3x[y]");
    }
}
