//! XML text helpers.

mod escape;

pub use escape::{escape_text, escape_xml, resolve_entity, unescape_xml};
