/// In-memory OPC packages.
///
/// OpcPackage owns the package-level relationships and every part. Parts are
/// kept sorted by partname so serialization is deterministic.
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct OpcPackage {
    rels: Relationships,
    parts: BTreeMap<PackURI, Part>,
}

impl OpcPackage {
    /// Create a new empty OPC package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: BTreeMap::new(),
        }
    }

    /// Open an OPC package from a file.
    ///
    /// # Example
    /// ```no_run
    /// use docsmith::ooxml::opc::OpcPackage;
    ///
    /// let pkg = OpcPackage::open("template.docx").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut phys_reader = PhysPkgReader::open(path)?;
        Self::from_phys_reader(&mut phys_reader)
    }

    /// Load an OPC package from the bytes of a ZIP archive.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let mut phys_reader = PhysPkgReader::from_bytes(data)?;
        Self::from_phys_reader(&mut phys_reader)
    }

    fn from_phys_reader(phys_reader: &mut PhysPkgReader) -> Result<Self> {
        let (rels, parts) = PackageReader::from_phys_reader(phys_reader)?.into_parts();
        let mut package = Self {
            rels,
            parts: BTreeMap::new(),
        };
        for part in parts {
            package.add_part(part);
        }
        Ok(package)
    }

    /// The part the package-level `officeDocument` relationship points at.
    pub fn main_document_part(&self) -> Result<&Part> {
        self.part_by_reltype(relationship_type::OFFICE_DOCUMENT)
    }

    pub fn part(&self, partname: &PackURI) -> Result<&Part> {
        self.parts
            .get(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn part_mut(&mut self, partname: &PackURI) -> Result<&mut Part> {
        self.parts
            .get_mut(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Part targeted by the single package-level relationship of `reltype`.
    pub fn part_by_reltype(&self, reltype: &str) -> Result<&Part> {
        let partname = self.rels.part_with_reltype(reltype)?.target_partname()?;
        self.part(&partname)
    }

    /// Part targeted by `source`'s single relationship of `reltype`, if any.
    pub fn related_part(&self, source: &Part, reltype: &str) -> Option<&Part> {
        let partname = source
            .rels()
            .part_with_reltype(reltype)
            .ok()?
            .target_partname()
            .ok()?;
        self.parts.get(&partname)
    }

    /// Add a part, replacing any part with the same partname.
    pub fn add_part(&mut self, part: Part) {
        self.parts.insert(part.partname().clone(), part);
    }

    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname)
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Relate the package to a part, returning the (possibly existing) rId.
    pub fn relate_to(&mut self, partname: &PackURI, reltype: &str) -> String {
        let target_ref = partname.relative_ref(PACKAGE_URI);
        self.rels.get_or_add(reltype, &target_ref)
    }

    /// First unused partname for a `%d` template, e.g. `/word/media/image%d.png`.
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        (1..=self.parts.len() as u32 + 1)
            .map(|n| template.replace("%d", &n.to_string()))
            .find(|candidate| !self.parts.keys().any(|k| k.as_str() == candidate))
            .ok_or_else(|| OpcError::InvalidPackUri(format!("No free partname for {}", template)))
            .and_then(PackURI::new)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PackageWriter::write(path, self)
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn create_minimal_docx() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#).unwrap();

        writer.start_file("_rels/.rels", options).unwrap();
        writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#).unwrap();

        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(br#"<?xml version="1.0"?>
<document xmlns="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <body><p><t>Test</t></p></body>
</document>"#).unwrap();

        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_open_package() {
        let pkg = OpcPackage::from_bytes(create_minimal_docx()).unwrap();
        assert_eq!(pkg.part_count(), 1);

        let main_part = pkg.main_document_part().unwrap();
        assert_eq!(main_part.content_type(), ct::WML_DOCUMENT_MAIN);
        assert_eq!(main_part.partname().as_str(), "/word/document.xml");
    }

    #[test]
    fn test_write_and_reopen() {
        let mut pkg = OpcPackage::new();
        let doc_uri = PackURI::new("/word/document.xml").unwrap();
        let mut doc = Part::new(doc_uri.clone(), ct::WML_DOCUMENT_MAIN, b"<w:document/>".to_vec());

        let image_uri = pkg.next_partname("/word/media/image%d.png").unwrap();
        assert_eq!(image_uri.as_str(), "/word/media/image1.png");
        let r_id = doc.relate_to(&image_uri, relationship_type::IMAGE);
        pkg.add_part(Part::new(image_uri, ct::PNG, vec![0x89, b'P', b'N', b'G']));
        pkg.add_part(doc);
        pkg.relate_to(&doc_uri, relationship_type::OFFICE_DOCUMENT);

        assert_eq!(
            pkg.next_partname("/word/media/image%d.png").unwrap().as_str(),
            "/word/media/image2.png"
        );

        let reopened = OpcPackage::from_bytes(pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.part_count(), 2);
        let main = reopened.main_document_part().unwrap();
        let image_name = main.related_partname(&r_id).unwrap();
        let image = reopened.part(&image_name).unwrap();
        assert_eq!(image.content_type(), ct::PNG);
        assert_eq!(image.blob(), &[0x89, b'P', b'N', b'G']);
        assert!(reopened.related_part(main, relationship_type::IMAGE).is_some());
    }
}
