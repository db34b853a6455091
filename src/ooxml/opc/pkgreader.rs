//! Low-level, read-only API to a serialized OPC package.
//!
//! Parses `[Content_Types].xml`, then walks the relationship graph from the
//! package relationships outwards, loading every reachable part together with
//! its own relationships.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::rel::Relationships;
use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// Content type lookup built from the Default and Override elements of
/// `[Content_Types].xml`.
#[derive(Debug, Default)]
pub(crate) struct ContentTypeMap {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    pub(crate) fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let is_default = match e.local_name().as_ref() {
                        b"Default" => Some(true),
                        b"Override" => Some(false),
                        _ => None,
                    };

                    if let Some(is_default) = is_default {
                        let mut key = None;
                        let mut content_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.as_ref() {
                                b"Extension" | b"PartName" => {
                                    key = Some(attr.unescape_value()?.into_owned());
                                },
                                b"ContentType" => {
                                    content_type = Some(attr.unescape_value()?.into_owned());
                                },
                                _ => {},
                            }
                        }

                        if let (Some(key), Some(ct)) = (key, content_type) {
                            if is_default {
                                map.defaults.insert(key.to_ascii_lowercase(), ct);
                            } else {
                                map.overrides.insert(key, ct);
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!("Content types parse error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Override for the partname first, then the default for its extension.
    pub(crate) fn get(&self, pack_uri: &PackURI) -> Result<&str> {
        if let Some(ct) = self.overrides.get(pack_uri.as_str()) {
            return Ok(ct);
        }
        self.defaults
            .get(&pack_uri.ext().to_ascii_lowercase())
            .map(String::as_str)
            .ok_or_else(|| OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}

/// Parts and package relationships loaded from a physical package.
pub struct PackageReader {
    pkg_rels: Relationships,
    parts: Vec<Part>,
}

impl PackageReader {
    pub fn from_phys_reader(phys_reader: &mut PhysPkgReader) -> Result<Self> {
        let content_types = ContentTypeMap::from_xml(&phys_reader.content_types_xml()?)?;
        let package_uri = PackURI::new(PACKAGE_URI)?;
        let pkg_rels = Self::load_rels(phys_reader, &package_uri)?;

        let mut parts = Vec::new();
        let mut visited: HashSet<PackURI> = HashSet::new();
        let mut work_queue: SmallVec<[PackURI; 16]> = SmallVec::new();

        Self::enqueue_targets(&pkg_rels, &mut visited, &mut work_queue);

        while let Some(partname) = work_queue.pop() {
            let Some(blob) = phys_reader.try_blob_for(&partname)? else {
                warn!("Relationship target {} is missing from the package", partname);
                continue;
            };
            let rels = Self::load_rels(phys_reader, &partname)?;
            Self::enqueue_targets(&rels, &mut visited, &mut work_queue);

            let content_type = content_types.get(&partname)?.to_string();
            debug!("Loaded part {} ({}, {} bytes)", partname, content_type, blob.len());

            let mut part = Part::new(partname, content_type, blob);
            part.set_rels(rels);
            parts.push(part);
        }

        Ok(Self { pkg_rels, parts })
    }

    fn load_rels(phys_reader: &mut PhysPkgReader, source_uri: &PackURI) -> Result<Relationships> {
        let base_uri = source_uri.base_uri().to_string();
        match phys_reader.rels_xml_for(source_uri)? {
            Some(xml) => Relationships::from_xml(base_uri, &xml),
            None => Ok(Relationships::new(base_uri)),
        }
    }

    fn enqueue_targets(
        rels: &Relationships,
        visited: &mut HashSet<PackURI>,
        work_queue: &mut SmallVec<[PackURI; 16]>,
    ) {
        for rel in rels.iter().filter(|rel| !rel.is_external()) {
            if let Ok(target) = rel.target_partname() {
                if visited.insert(target.clone()) {
                    work_queue.push(target);
                }
            }
        }
    }

    /// Take ownership of the loaded pieces.
    pub fn into_parts(self) -> (Relationships, Vec<Part>) {
        (self.pkg_rels, self.parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_map() {
        let xml = br#"<?xml version="1.0"?>
            <Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
                <Default Extension="xml" ContentType="application/xml"/>
                <Default Extension="PNG" ContentType="image/png"/>
                <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
            </Types>"#;

        let ct_map = ContentTypeMap::from_xml(xml).unwrap();

        let uri = PackURI::new("/test.xml").unwrap();
        assert_eq!(ct_map.get(&uri).unwrap(), "application/xml");

        let uri = PackURI::new("/word/media/image1.png").unwrap();
        assert_eq!(ct_map.get(&uri).unwrap(), "image/png");

        let uri = PackURI::new("/word/document.xml").unwrap();
        assert_eq!(
            ct_map.get(&uri).unwrap(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"
        );

        let uri = PackURI::new("/word/media/image1.emf").unwrap();
        assert!(ct_map.get(&uri).is_err());
    }
}
