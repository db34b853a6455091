// Constructors for common equation shapes

use super::node::MathNode;
use crate::ooxml::error::{OoxmlError, Result};

/// Integral sign used by [`MathNode::integral`].
pub const INTEGRAL_SIGN: &str = "\u{222B}";

impl MathNode {
    pub fn run(text: impl Into<String>) -> Self {
        Self::Run(text.into())
    }

    pub fn fraction(numerator: &str, denominator: &str) -> Self {
        Self::Fraction {
            numerator: vec![Self::run(numerator)],
            denominator: vec![Self::run(denominator)],
        }
    }

    /// Square root when `degree` is `None` or empty, nth root otherwise.
    pub fn radical(base: &str, degree: Option<&str>) -> Self {
        Self::Radical {
            degree: degree
                .filter(|d| !d.is_empty())
                .map(|d| vec![Self::run(d)]),
            base: vec![Self::run(base)],
        }
    }

    pub fn superscript(base: &str, exponent: &str) -> Self {
        Self::SuperScript {
            base: vec![Self::run(base)],
            exponent: vec![Self::run(exponent)],
        }
    }

    pub fn subscript(base: &str, subscript: &str) -> Self {
        Self::SubScript {
            base: vec![Self::run(base)],
            subscript: vec![Self::run(subscript)],
        }
    }

    /// Delimited expression with configurable glyphs.
    pub fn parentheses(content: &str, open: &str, close: &str) -> Self {
        Self::Delimiter {
            open: open.to_string(),
            close: close.to_string(),
            body: vec![Self::run(content)],
        }
    }

    /// Integral composed from primitives: the sign, wrapped in a subscript for
    /// the lower limit and a superscript for the upper limit, followed by the
    /// integrand, all inside an undecorated group.
    ///
    /// Empty limits and an empty integrand are left out entirely.
    ///
    /// ```
    /// use docsmith::MathNode;
    /// let node = MathNode::integral("f(x)dx", "", "");
    /// assert_eq!(node.text(), "\u{222B}f(x)dx");
    /// ```
    pub fn integral(integrand: &str, lower: &str, upper: &str) -> Self {
        let mut operator = Self::run(INTEGRAL_SIGN);
        if !lower.is_empty() {
            operator = Self::SubScript {
                base: vec![operator],
                subscript: vec![Self::run(lower)],
            };
        }
        if !upper.is_empty() {
            operator = Self::SuperScript {
                base: vec![operator],
                exponent: vec![Self::run(upper)],
            };
        }

        let mut body = vec![operator];
        if !integrand.is_empty() {
            body.push(Self::run(integrand));
        }

        Self::Delimiter {
            open: String::new(),
            close: String::new(),
            body,
        }
    }

    /// Matrix of `rows` x `cols` text cells, read row-major from `values`.
    ///
    /// # Errors
    /// - [`OoxmlError::InvalidArgument`] when either dimension is zero
    /// - [`OoxmlError::DimensionMismatch`] when `values` does not hold `rows`
    ///   rows of `cols` values each
    pub fn matrix<S: AsRef<str>>(rows: usize, cols: usize, values: &[Vec<S>]) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(OoxmlError::InvalidArgument(format!(
                "matrix needs at least one row and column, got {}x{}",
                rows, cols
            )));
        }

        if values.len() != rows {
            return Err(OoxmlError::DimensionMismatch {
                expected: rows,
                actual: values.len(),
            });
        }
        if let Some(row) = values.iter().find(|row| row.len() != cols) {
            return Err(OoxmlError::DimensionMismatch {
                expected: cols,
                actual: row.len(),
            });
        }

        let rows = values
            .iter()
            .map(|row| row.iter().map(|v| vec![Self::run(v.as_ref())]).collect())
            .collect();
        Ok(Self::Matrix { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_with_limits() {
        let node = MathNode::integral("x dx", "0", "1");
        let MathNode::Delimiter { open, close, body } = &node else {
            panic!("integral is a delimiter group");
        };
        assert!(open.is_empty() && close.is_empty());
        assert_eq!(body.len(), 2);
        assert_eq!(
            body[0],
            MathNode::SuperScript {
                base: vec![MathNode::SubScript {
                    base: vec![MathNode::run(INTEGRAL_SIGN)],
                    subscript: vec![MathNode::run("0")],
                }],
                exponent: vec![MathNode::run("1")],
            }
        );
        assert_eq!(body[1], MathNode::run("x dx"));
    }

    #[test]
    fn test_integral_omits_empty_parts() {
        let node = MathNode::integral("", "", "b");
        let MathNode::Delimiter { body, .. } = node else {
            panic!("integral is a delimiter group");
        };
        assert_eq!(
            body,
            vec![MathNode::SuperScript {
                base: vec![MathNode::run(INTEGRAL_SIGN)],
                exponent: vec![MathNode::run("b")],
            }]
        );
    }

    #[test]
    fn test_matrix_row_major() {
        let node = MathNode::matrix(2, 2, &[vec!["a", "b"], vec!["c", "d"]]).unwrap();
        assert_eq!(node.matrix_shape(), Some((2, 2)));
        assert_eq!(node.text(), "abcd");
    }

    #[test]
    fn test_matrix_dimension_mismatch() {
        let err = MathNode::matrix(2, 2, &[vec!["a", "b", "c"]]).unwrap_err();
        assert!(matches!(
            err,
            OoxmlError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
        let ragged = MathNode::matrix(2, 2, &[vec!["a", "b", "c"], vec!["d"]]).unwrap_err();
        assert!(matches!(
            ragged,
            OoxmlError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert!(matches!(
            MathNode::matrix::<&str>(0, 2, &[]),
            Err(OoxmlError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_radical_empty_degree_is_square_root() {
        assert_eq!(MathNode::radical("x", Some("")), MathNode::radical("x", None));
        assert!(matches!(
            MathNode::radical("x", Some("3")),
            MathNode::Radical { degree: Some(_), .. }
        ));
    }
}
