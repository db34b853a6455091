// Abstract Syntax Tree for Office Math
//
// A closed sum type with one recursive serializer. Any node may sit inside any
// container slot, so composite shapes such as integrals are built from the
// primitive variants instead of having variants of their own.

mod builder;
mod node;

pub use node::MathNode;
