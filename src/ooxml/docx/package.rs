/// Package implementation for Word documents.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::part::Part;
use log::info;
use std::path::Path;

/// A Word (.docx) package.
///
/// Wraps an OPC package whose main part is a WordprocessingML document,
/// template or macro-enabled document.
///
/// # Examples
///
/// ```rust,no_run
/// use docsmith::ooxml::docx::Package;
/// use docsmith::ooxml::opc::constants::relationship_type as RT;
///
/// let pkg = Package::open("template.docx")?;
/// let has_styles = pkg.related_part(RT::STYLES)?.is_some();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    opc: OpcPackage,
}

impl Package {
    /// Open a .docx package from a file path.
    ///
    /// # Errors
    /// - [`OoxmlError::PackageNotFound`] when `path` does not exist
    /// - [`OoxmlError::InvalidContentType`] when the main part is not a Word document
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let package = Self::from_opc(OpcPackage::open(path)?)?;
        info!("Opened {} ({} parts)", path.display(), package.opc.part_count());
        Ok(package)
    }

    /// Load a .docx package from the bytes of a ZIP archive.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_part = opc
            .main_document_part()
            .map_err(|e| OoxmlError::PartNotFound(format!("main document part: {}", e)))?;

        match main_part.content_type() {
            ct::WML_DOCUMENT_MAIN | ct::WML_TEMPLATE_MAIN | ct::WML_DOCUMENT_MACRO_MAIN => {
                Ok(Self { opc })
            },
            other => Err(OoxmlError::InvalidContentType {
                expected: ct::WML_DOCUMENT_MAIN.to_string(),
                got: other.to_string(),
            }),
        }
    }

    /// The `word/document.xml` part.
    pub fn main_part(&self) -> Result<&Part> {
        Ok(self.opc.main_document_part()?)
    }

    /// Part related to the main document by `reltype`, if present.
    pub fn related_part(&self, reltype: &str) -> Result<Option<&Part>> {
        let main = self.main_part()?;
        Ok(self.opc.related_part(main, reltype))
    }

    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }

    pub fn into_opc(self) -> OpcPackage {
        self.opc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::relationship_type as RT;
    use crate::ooxml::opc::packuri::PackURI;

    fn package_with_main(content_type: &str) -> OpcPackage {
        let mut opc = OpcPackage::new();
        let partname = PackURI::new("/word/document.xml").unwrap();
        opc.add_part(Part::new(partname.clone(), content_type, b"<w:document/>".to_vec()));
        opc.relate_to(&partname, RT::OFFICE_DOCUMENT);
        opc
    }

    #[test]
    fn test_accepts_document_and_template() {
        let bytes = package_with_main(ct::WML_DOCUMENT_MAIN).to_bytes().unwrap();
        let pkg = Package::from_bytes(bytes).unwrap();
        assert_eq!(pkg.main_part().unwrap().partname().as_str(), "/word/document.xml");
        assert!(pkg.related_part(RT::STYLES).unwrap().is_none());

        let bytes = package_with_main(ct::WML_TEMPLATE_MAIN).to_bytes().unwrap();
        assert!(Package::from_bytes(bytes).is_ok());
    }

    #[test]
    fn test_rejects_other_main_part() {
        let bytes = package_with_main(ct::XML).to_bytes().unwrap();
        assert!(matches!(
            Package::from_bytes(bytes),
            Err(OoxmlError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Package::open("/nonexistent/template.docx"),
            Err(OoxmlError::PackageNotFound(_))
        ));
    }
}
