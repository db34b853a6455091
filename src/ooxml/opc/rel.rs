use crate::ooxml::opc::constants::{namespace, target_mode};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
/// Relationship-related objects for OPC packages.
///
/// Every part (and the package itself) owns one relationship collection,
/// serialized as its `_rels/*.rels` part. Content refers to other parts only
/// through the `rIdN` ids allocated here.
use quick_xml::Reader;
use quick_xml::events::Event;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    r_id: String,
    reltype: String,
    target_ref: String,
    base_uri: String,
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Relative part reference for internal relationships, URL for external ones.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Absolute partname of the target. Fails for external relationships.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(format!(
                "{} is external and has no target part",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref)
    }
}

/// Ordered collection of relationships from a single source.
///
/// Insertion order is kept so that a package written twice produces the same
/// `.rels` bytes.
#[derive(Debug, Clone)]
pub struct Relationships {
    base_uri: String,
    rels: Vec<Relationship>,
}

impl Relationships {
    /// Create an empty collection resolving targets against `base_uri`.
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: Vec::new(),
        }
    }

    /// Parse the contents of a `.rels` part.
    pub fn from_xml(base_uri: String, xml: &[u8]) -> Result<Self> {
        let mut rels = Self::new(base_uri);
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target = None;
                    let mut is_external = false;

                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Id" => r_id = Some(attr.unescape_value()?.into_owned()),
                            b"Type" => reltype = Some(attr.unescape_value()?.into_owned()),
                            b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                            b"TargetMode" => {
                                is_external = attr.unescape_value()?.as_ref() == target_mode::EXTERNAL;
                            },
                            _ => {},
                        }
                    }

                    match (r_id, reltype, target) {
                        (Some(r_id), Some(reltype), Some(target)) => {
                            rels.add_relationship(reltype, target, r_id, is_external);
                        },
                        _ => {
                            return Err(OpcError::XmlError(
                                "Relationship element missing Id, Type or Target".to_string(),
                            ));
                        },
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!("Relationships parse error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Add a relationship with an explicit id, replacing any entry with the same id.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) -> &Relationship {
        self.rels.retain(|rel| rel.r_id != r_id);
        self.rels.push(Relationship::new(
            r_id,
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        ));
        &self.rels[self.rels.len() - 1]
    }

    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id == r_id)
    }

    #[inline]
    pub fn contains(&self, r_id: &str) -> bool {
        self.get(r_id).is_some()
    }

    /// Return the id of the internal relationship of `reltype` to `target_ref`,
    /// creating it with the next free id when absent.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> String {
        if let Some(rel) = self.rels.iter().find(|rel| {
            !rel.is_external && rel.reltype == reltype && rel.target_ref == target_ref
        }) {
            return rel.r_id.clone();
        }

        let r_id = self.next_r_id();
        self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id.clone(), false);
        r_id
    }

    /// Next free id: `rId1`, `rId2`, ... filling gaps left by removed entries.
    pub fn next_r_id(&self) -> String {
        let mut used: Vec<u32> = self
            .rels
            .iter()
            .filter_map(|rel| {
                let digits = rel.r_id.strip_prefix("rId")?;
                atoi_simd::parse::<u32, false, false>(digits.as_bytes()).ok()
            })
            .collect();
        used.sort_unstable();

        let mut next = 1u32;
        for num in used {
            match num.cmp(&next) {
                std::cmp::Ordering::Equal => next += 1,
                std::cmp::Ordering::Greater => break,
                std::cmp::Ordering::Less => {},
            }
        }

        format!("rId{}", next)
    }

    /// The single relationship of a given type.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        let mut matching = self.rels.iter().filter(|rel| rel.reltype == reltype);
        match (matching.next(), matching.next()) {
            (Some(rel), None) => Ok(rel),
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "No relationship of type '{}'",
                reltype
            ))),
            (Some(_), Some(_)) => Err(OpcError::InvalidRelationship(format!(
                "Multiple relationships of type '{}'",
                reltype
            ))),
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        let pos = self.rels.iter().position(|rel| rel.r_id == r_id)?;
        Some(self.rels.remove(pos))
    }

    /// Serialize to the XML of a `.rels` part.
    pub fn to_xml(&self) -> String {
        use crate::common::xml::escape_xml;

        let mut xml = String::with_capacity(256 + self.rels.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Relationships xmlns=""#);
        xml.push_str(namespace::OPC_RELATIONSHIPS);
        xml.push_str(r#"">"#);

        for rel in &self.rels {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                escape_xml(rel.r_id()),
                escape_xml(rel.reltype()),
                escape_xml(rel.target_ref()),
                if rel.is_external() {
                    r#" TargetMode="External""#
                } else {
                    ""
                }
            ));
        }

        xml.push_str("</Relationships>");
        xml
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new("/".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_r_id_fills_gaps() {
        let mut rels = Relationships::new("/word".to_string());
        assert_eq!(rels.next_r_id(), "rId1");

        rels.add_relationship("t".into(), "a.xml".into(), "rId1".into(), false);
        rels.add_relationship("t".into(), "c.xml".into(), "rId3".into(), false);
        assert_eq!(rels.next_r_id(), "rId2");
    }

    #[test]
    fn test_get_or_add() {
        let mut rels = Relationships::new("/word".to_string());
        assert_eq!(rels.get_or_add("type1", "target1"), "rId1");
        assert_eq!(rels.get_or_add("type1", "target1"), "rId1");
        assert_eq!(rels.get_or_add("type1", "target2"), "rId2");
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_xml_round_trip() {
        let mut rels = Relationships::new("/word".to_string());
        rels.get_or_add("http://example.com/image", "media/image1.png");
        rels.add_relationship(
            "http://example.com/link".into(),
            "https://example.com/?a=1&b=2".into(),
            "rId9".into(),
            true,
        );

        let xml = rels.to_xml();
        assert!(xml.contains(r#"Target="https://example.com/?a=1&amp;b=2" TargetMode="External""#));

        let parsed = Relationships::from_xml("/word".to_string(), xml.as_bytes()).unwrap();
        assert_eq!(parsed.len(), 2);
        let image = parsed.get("rId1").unwrap();
        assert_eq!(image.target_partname().unwrap().as_str(), "/word/media/image1.png");
        let link = parsed.get("rId9").unwrap();
        assert!(link.is_external());
        assert_eq!(link.target_ref(), "https://example.com/?a=1&b=2");
        assert!(link.target_partname().is_err());
    }

    #[test]
    fn test_part_with_reltype() {
        let mut rels = Relationships::default();
        assert!(rels.part_with_reltype("t").is_err());
        rels.get_or_add("t", "a.xml");
        assert_eq!(rels.part_with_reltype("t").unwrap().r_id(), "rId1");
        rels.get_or_add("t", "b.xml");
        assert!(rels.part_with_reltype("t").is_err());
    }
}
