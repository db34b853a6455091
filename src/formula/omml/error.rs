use thiserror::Error;

/// Errors that can occur during OMML parsing
#[derive(Error, Debug)]
pub enum OmmlError {
    #[error("XML parsing error: {0}")]
    XmlError(String),

    #[error("Invalid OMML structure: {0}")]
    InvalidStructure(String),

    #[error("XML depth limit exceeded: {0}")]
    DepthLimitExceeded(usize),

    #[error("Text encoding error: {0}")]
    EncodingError(#[from] std::str::Utf8Error),
}

impl From<quick_xml::Error> for OmmlError {
    fn from(err: quick_xml::Error) -> Self {
        OmmlError::XmlError(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OmmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OmmlError::XmlError(err.to_string())
    }
}

impl From<OmmlError> for crate::ooxml::error::OoxmlError {
    fn from(err: OmmlError) -> Self {
        crate::ooxml::error::OoxmlError::Xml(err.to_string())
    }
}
