//! Office Open XML (OOXML) WordprocessingML generation.
//!
//! # Architecture
//!
//! 1. **OPC Layer** (`opc`): package handling (ZIP, parts, relationships)
//! 2. **Errors** (`error`): the document-level error taxonomy
//! 3. **Word documents** (`docx`): the mutable document model, its XML
//!    serializer and the reader that loads existing packages back into it
//!
//! # Example
//!
//! ```rust,no_run
//! use docsmith::ooxml::docx::MutableDocument;
//!
//! let mut doc = MutableDocument::new();
//! doc.add_paragraph("Hello", None)?;
//! doc.save("hello.docx")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod docx;
pub mod error;
pub mod opc;

pub use error::{OoxmlError, Result};
pub use opc::{OpcPackage, PackURI};
