//! Package writer for OPC packages.
//!
//! Serializes an [`OpcPackage`] into ZIP bytes: `[Content_Types].xml` first,
//! then the package relationships, then every part followed by its `.rels`.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::error::Result;
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgWriter;
use std::collections::BTreeMap;
use std::path::Path;

/// Package writer that serializes an OPC package to a ZIP file.
pub struct PackageWriter;

impl PackageWriter {
    /// Write an OPC package to a file.
    ///
    /// The archive is fully built in memory before the file is created.
    pub fn write<P: AsRef<Path>>(path: P, package: &OpcPackage) -> Result<()> {
        let bytes = Self::to_bytes(package)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Serialize an OPC package to bytes.
    pub fn to_bytes(package: &OpcPackage) -> Result<Vec<u8>> {
        let mut phys_writer = PhysPkgWriter::new();

        let cti = ContentTypesItem::from_package(package);
        phys_writer.write(&PackURI::new(CONTENT_TYPES_URI)?, cti.to_xml().as_bytes())?;

        let package_uri = PackURI::new(PACKAGE_URI)?;
        phys_writer.write(&package_uri.rels_uri()?, package.rels().to_xml().as_bytes())?;

        for part in package.iter_parts() {
            phys_writer.write(part.partname(), part.blob())?;
            if !part.rels().is_empty() {
                phys_writer.write(&part.partname().rels_uri()?, part.rels().to_xml().as_bytes())?;
            }
        }

        phys_writer.finish()
    }
}

/// Default and Override entries of `[Content_Types].xml`.
struct ContentTypesItem {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypesItem {
    fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());

        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    fn from_package(package: &OpcPackage) -> Self {
        let mut cti = Self::new();
        for part in package.iter_parts() {
            cti.add_content_type(part.partname(), part.content_type());
        }
        cti
    }

    /// Media extensions get a Default entry; everything else an Override.
    fn add_content_type(&mut self, partname: &PackURI, content_type: &str) {
        let ext = partname.ext().to_ascii_lowercase();
        if Self::is_default_content_type(&ext, content_type) {
            self.defaults.insert(ext, content_type.to_string());
        } else {
            self.overrides
                .insert(partname.to_string(), content_type.to_string());
        }
    }

    fn is_default_content_type(ext: &str, content_type: &str) -> bool {
        matches!(
            (ext, content_type),
            ("rels", ct::OPC_RELATIONSHIPS)
                | ("xml", ct::XML)
                | ("png", ct::PNG)
                | ("jpg", ct::JPEG)
                | ("jpeg", ct::JPEG)
                | ("gif", ct::GIF)
                | ("bmp", ct::BMP)
                | ("tif", ct::TIFF)
                | ("tiff", ct::TIFF)
        )
    }

    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(2048);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Types xmlns=""#);
        xml.push_str(namespace::OPC_CONTENT_TYPES);
        xml.push_str(r#"">"#);

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            ));
        }
        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types_xml() {
        let mut cti = ContentTypesItem::new();
        cti.add_content_type(&PackURI::new("/word/media/image1.PNG").unwrap(), ct::PNG);
        cti.add_content_type(
            &PackURI::new("/word/document.xml").unwrap(),
            ct::WML_DOCUMENT_MAIN,
        );

        let xml = cti.to_xml();

        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(r#"<Default Extension="rels""#));
        assert!(xml.contains(&format!(
            r#"<Override PartName="/word/document.xml" ContentType="{}"/>"#,
            ct::WML_DOCUMENT_MAIN
        )));
    }
}
