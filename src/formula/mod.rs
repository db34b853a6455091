// Formula Module - Office Math construction and serialization
//
// Equations are built as a closed tree of `MathNode` values and serialized to
// OMML (Office Math Markup Language), the XML vocabulary Word uses for math
// zones. The same tree is recovered when a document is reopened.
//
// # Example
//
// ```
// use docsmith::formula::{MathNode, omml};
//
// let node = MathNode::fraction("a + b", "2");
// let mut xml = String::new();
// omml::write_math_paragraph(&[node.clone()], &mut xml);
// assert_eq!(omml::parse(&xml).unwrap(), vec![node]);
// ```

/// Math node tree and composed shapes (integrals, matrices, delimiters)
pub mod ast;
/// OMML writer and parser
pub mod omml;

pub use ast::MathNode;
