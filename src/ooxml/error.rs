/// Error types for document generation.
use thiserror::Error;

/// Result type for OOXML operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for OOXML operations.
///
/// Every builder validates its arguments before touching the document, so an
/// error always leaves the body and its tables unchanged.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Null-like or otherwise invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Table created with zero rows or columns
    #[error("Invalid table dimensions: {rows} rows x {cols} columns")]
    InvalidDimension { rows: usize, cols: usize },

    /// Cell or column addressed beyond the current table bounds
    #[error("Cell ({row}, {col}) is out of range for a table of {rows} rows x {cols} columns")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Matrix value count does not match rows x columns
    #[error("Dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Merge range whose end precedes its start
    #[error("Invalid range: ({start_row}, {start_col}) .. ({end_row}, {end_col})")]
    InvalidRange {
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    },

    /// Image extension outside png/jpg/jpeg/gif/bmp/tiff
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Template package without a styles part
    #[error("Template has no styles part: {0}")]
    MissingStyles(String),

    /// Template or document path does not exist
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(crate::ooxml::opc::error::OpcError),

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Part not found
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Invalid content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// Invalid relationship
    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::ooxml::opc::error::OpcError> for OoxmlError {
    fn from(err: crate::ooxml::opc::error::OpcError) -> Self {
        use crate::ooxml::opc::error::OpcError;
        match err {
            OpcError::PackageNotFound(path) => OoxmlError::PackageNotFound(path),
            OpcError::PartNotFound(name) => OoxmlError::PartNotFound(name),
            other => OoxmlError::Opc(other),
        }
    }
}

impl From<quick_xml::Error> for OoxmlError {
    fn from(err: quick_xml::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OoxmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<std::fmt::Error> for OoxmlError {
    fn from(err: std::fmt::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for OoxmlError {
    fn from(err: std::str::Utf8Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::error::OpcError;

    #[test]
    fn test_package_not_found_surfaces_directly() {
        let err: OoxmlError = OpcError::PackageNotFound("t.docx".into()).into();
        assert!(matches!(err, OoxmlError::PackageNotFound(ref p) if p == "t.docx"));

        let err: OoxmlError = OpcError::XmlError("bad".into()).into();
        assert!(matches!(err, OoxmlError::Opc(_)));
    }

    #[test]
    fn test_messages() {
        let err = OoxmlError::IndexOutOfRange { row: 3, col: 1, rows: 2, cols: 2 };
        assert_eq!(
            err.to_string(),
            "Cell (3, 1) is out of range for a table of 2 rows x 2 columns"
        );
        let err = OoxmlError::DimensionMismatch { expected: 4, actual: 3 };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 4 values, got 3");
    }
}
