/// Open Packaging Conventions (OPC) implementation.
///
/// The container layer of a .docx file:
///
/// - Package structure (parts, relationships)
/// - Content type management
/// - ZIP-based physical packaging
///
/// Parts are plain blobs; the WordprocessingML layer parses and generates
/// their XML.
pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use error::OpcError;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::Part;
pub use rel::{Relationship, Relationships};
