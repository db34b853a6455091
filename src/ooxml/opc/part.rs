use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
/// Package parts.
///
/// A part is a named blob with a content type and its own relationship
/// collection. XML parts and binary media are stored the same way; callers
/// parse the blob when they need structure.
use memchr::memmem;

/// Attribute prefixes through which WordprocessingML content points at relationships.
const REL_REF_ATTRIBUTES: [&str; 3] = [r#"r:id=""#, r#"r:embed=""#, r#"r:link=""#];

#[derive(Debug, Clone)]
pub struct Part {
    partname: PackURI,
    content_type: String,
    blob: Vec<u8>,
    rels: Relationships,
}

impl Part {
    pub fn new(partname: PackURI, content_type: impl Into<String>, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type: content_type.into(),
            blob,
            rels,
        }
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Blob as UTF-8 text, for XML parts.
    pub fn xml(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.blob)?)
    }

    pub fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = blob;
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    pub fn set_rels(&mut self, rels: Relationships) {
        self.rels = rels;
    }

    /// Add or reuse a relationship to another part, returning its rId.
    pub fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        let target_ref = target.relative_ref(self.partname.base_uri());
        self.rels.get_or_add(reltype, &target_ref)
    }

    /// Absolute partname behind one of this part's relationship ids.
    pub fn related_partname(&self, r_id: &str) -> Result<PackURI> {
        self.rels
            .get(r_id)
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("{} in {}", r_id, self.partname)))?
            .target_partname()
    }

    /// Count references to a relationship ID in the part content.
    pub fn rel_ref_count(&self, r_id: &str) -> usize {
        REL_REF_ATTRIBUTES
            .iter()
            .map(|attr| {
                let pattern = format!(r#"{}{}""#, attr, r_id);
                memmem::Finder::new(pattern.as_bytes())
                    .find_iter(&self.blob)
                    .count()
            })
            .sum()
    }

    /// Relationship ids referenced from the content that have no entry in
    /// this part's relationship collection.
    pub fn dangling_rel_refs(&self) -> Vec<String> {
        let mut dangling = Vec::new();
        for attr in REL_REF_ATTRIBUTES {
            for start in memmem::find_iter(&self.blob, attr.as_bytes()) {
                let value_start = start + attr.len();
                let Some(len) = memchr::memchr(b'"', &self.blob[value_start..]) else {
                    continue;
                };
                let r_id = String::from_utf8_lossy(&self.blob[value_start..value_start + len]);
                if !self.rels.contains(&r_id) && !dangling.iter().any(|d| d == &r_id) {
                    dangling.push(r_id.into_owned());
                }
            }
        }
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_part(xml: &str) -> Part {
        Part::new(
            PackURI::new("/word/document.xml").unwrap(),
            "application/xml",
            xml.as_bytes().to_vec(),
        )
    }

    #[test]
    fn test_relate_to_uses_relative_target() {
        let mut part = document_part("<w:document/>");
        let media = PackURI::new("/word/media/image1.png").unwrap();
        let r_id = part.relate_to(&media, "image");
        assert_eq!(r_id, "rId1");
        assert_eq!(part.rels().get("rId1").unwrap().target_ref(), "media/image1.png");
        assert_eq!(part.related_partname("rId1").unwrap(), media);
        assert_eq!(part.relate_to(&media, "image"), "rId1");
    }

    #[test]
    fn test_rel_ref_count_and_dangling() {
        let mut part = document_part(r#"<a:blip r:embed="rId1"/><a:blip r:embed="rId1"/><w:hyperlink r:id="rId7"/>"#);
        part.relate_to(&PackURI::new("/word/media/image1.png").unwrap(), "image");

        assert_eq!(part.rel_ref_count("rId1"), 2);
        assert_eq!(part.rel_ref_count("rId7"), 1);
        assert_eq!(part.dangling_rel_refs(), vec!["rId7".to_string()]);
    }
}
