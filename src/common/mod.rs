//! Common utilities shared by the package layer, the document writer and the
//! math serializer.

pub mod unit;
pub mod xml;

pub use unit::{EMUS_PER_INCH, EMUS_PER_PX, TWIPS_PER_INCH};
