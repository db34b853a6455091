//! Physical (ZIP) layer of an OPC package.
//!
//! [`PhysPkgReader`] reads members of an existing archive by partname and
//! [`PhysPkgWriter`] builds a new archive in memory. Neither knows about
//! content types or relationships; that is the job of the package reader and
//! writer above them.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Physical package reader over an in-memory ZIP archive.
pub struct PhysPkgReader {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl PhysPkgReader {
    /// Open an OPC package from a file path.
    ///
    /// # Errors
    /// Returns [`OpcError::PackageNotFound`] if the file doesn't exist, and a
    /// ZIP error if it isn't a valid archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }

        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self { archive })
    }

    /// Binary content of the member backing `pack_uri`.
    pub fn blob_for(&mut self, pack_uri: &PackURI) -> Result<Vec<u8>> {
        self.try_blob_for(pack_uri)?
            .ok_or_else(|| OpcError::PartNotFound(pack_uri.to_string()))
    }

    /// Like [`blob_for`](Self::blob_for) but `None` when the member is absent.
    pub fn try_blob_for(&mut self, pack_uri: &PackURI) -> Result<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(pack_uri.membername()) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    pub fn content_types_xml(&mut self) -> Result<Vec<u8>> {
        self.blob_for(&PackURI::new(CONTENT_TYPES_URI)?)
    }

    /// The `.rels` XML for a source part, if the part has relationships.
    pub fn rels_xml_for(&mut self, source_uri: &PackURI) -> Result<Option<Vec<u8>>> {
        self.try_blob_for(&source_uri.rels_uri()?)
    }

    pub fn member_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }
}

/// Physical package writer producing a deflated ZIP archive in memory.
pub struct PhysPkgWriter {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Write one member.
    pub fn write(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        self.writer.start_file(pack_uri.membername(), self.options)?;
        self.writer.write_all(blob)?;
        Ok(())
    }

    /// Finish the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let mut writer = PhysPkgWriter::new();
        let uri = PackURI::new("/word/document.xml").unwrap();
        writer.write(&uri, b"<w:document/>").unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = PhysPkgReader::from_bytes(bytes).unwrap();
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.blob_for(&uri).unwrap(), b"<w:document/>");

        let missing = PackURI::new("/word/styles.xml").unwrap();
        assert!(reader.try_blob_for(&missing).unwrap().is_none());
        assert!(matches!(reader.blob_for(&missing), Err(OpcError::PartNotFound(_))));
        assert!(reader.rels_xml_for(&uri).unwrap().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let result = PhysPkgReader::open("/definitely/not/here.docx");
        assert!(matches!(result, Err(OpcError::PackageNotFound(_))));
    }

    #[test]
    fn test_garbage_is_not_a_package() {
        assert!(PhysPkgReader::from_bytes(b"not a zip".to_vec()).is_err());
    }
}
