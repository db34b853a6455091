/// OMML (Office Math Markup Language) support
///
/// [`writer`] turns a [`MathNode`](crate::formula::MathNode) tree into the
/// `m:` elements Word stores inside paragraphs, and [`parser`] reads them back.
/// Only the constructs the tree can express are recognized; anything else is
/// flattened into its text content.
///
/// Reference: https://devblogs.microsoft.com/math-in-office/officemath/
pub mod error;
pub mod parser;
pub mod writer;

pub use error::OmmlError;
pub use parser::{OmmlParser, parse};
pub use writer::{write_math_paragraph, write_nodes};
