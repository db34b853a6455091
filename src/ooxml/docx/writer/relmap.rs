/// Relationship bookkeeping for the main document part.
///
/// Images are registered here first; the returned relationship id is what the
/// drawing XML embeds, so every `r:embed` written by the session has a
/// matching entry in `document.xml.rels`.
use crate::ooxml::docx::format::ImageFormat;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as RT;
use crate::ooxml::opc::rel::Relationships;
use log::debug;

/// An image payload destined for `word/media/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    pub r_id: String,
    /// Absolute partname, e.g. `/word/media/image1.png`
    pub partname: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Relationships of `word/document.xml` plus the media they point at.
#[derive(Debug, Clone)]
pub struct RelationshipMapper {
    rels: Relationships,
    media: Vec<MediaPart>,
}

impl RelationshipMapper {
    pub fn new() -> Self {
        Self {
            rels: Relationships::new("/word".to_string()),
            media: Vec::new(),
        }
    }

    /// Register image bytes under the next free `media/imageN.ext` name.
    pub fn add_image(&mut self, data: Vec<u8>, format: ImageFormat) -> Result<String> {
        if data.is_empty() {
            return Err(OoxmlError::InvalidArgument("image data is empty".to_string()));
        }

        let target = (1..=self.media.len() + 1)
            .map(|n| format!("media/image{}", n))
            .find(|target| {
                let stem = format!("/word/{}.", target);
                !self.media.iter().any(|m| m.partname.starts_with(&stem))
            })
            .map(|stem| format!("{}.{}", stem, format.extension()))
            .ok_or_else(|| OoxmlError::InvalidArgument("no free media partname".to_string()))?;

        let r_id = self.rels.get_or_add(RT::IMAGE, &target);
        debug!("Registered image {} as {}", target, r_id);
        self.media.push(MediaPart {
            r_id: r_id.clone(),
            partname: format!("/word/{}", target),
            content_type: format.mime_type().to_string(),
            data,
        });
        Ok(r_id)
    }

    /// Keep an image of a reopened document under its existing relationship id.
    pub(crate) fn adopt_image(
        &mut self,
        r_id: &str,
        target_ref: &str,
        partname: &str,
        content_type: &str,
        data: Vec<u8>,
    ) {
        if self.media.iter().any(|m| m.r_id == r_id) {
            return;
        }
        self.rels.add_relationship(
            RT::IMAGE.to_string(),
            target_ref.to_string(),
            r_id.to_string(),
            false,
        );
        self.media.push(MediaPart {
            r_id: r_id.to_string(),
            partname: partname.to_string(),
            content_type: content_type.to_string(),
            data,
        });
    }

    /// Relate the document to a fixed part such as `styles.xml`.
    pub fn relate(&mut self, reltype: &str, target: &str) -> String {
        self.rels.get_or_add(reltype, target)
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn media(&self) -> &[MediaPart] {
        &self.media
    }

    pub fn image_data(&self, r_id: &str) -> Option<&[u8]> {
        self.media
            .iter()
            .find(|m| m.r_id == r_id)
            .map(|m| m.data.as_slice())
    }
}

impl Default for RelationshipMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_image_allocates_names_and_ids() {
        let mut map = RelationshipMapper::new();
        let first = map.add_image(vec![1, 2, 3], ImageFormat::Png).unwrap();
        let second = map.add_image(vec![4, 5], ImageFormat::Jpeg).unwrap();

        assert_ne!(first, second);
        assert_eq!(map.media()[0].partname, "/word/media/image1.png");
        assert_eq!(map.media()[1].partname, "/word/media/image2.jpeg");
        assert_eq!(map.image_data(&second), Some(&[4u8, 5][..]));
        assert_eq!(map.rels().get(&first).unwrap().target_ref(), "media/image1.png");
    }

    #[test]
    fn test_empty_image_rejected() {
        let mut map = RelationshipMapper::new();
        assert!(matches!(
            map.add_image(Vec::new(), ImageFormat::Png),
            Err(OoxmlError::InvalidArgument(_))
        ));
        assert!(map.rels().is_empty());
    }

    #[test]
    fn test_adopted_image_keeps_id() {
        let mut map = RelationshipMapper::new();
        map.adopt_image("rId9", "media/image1.png", "/word/media/image1.png", "image/png", vec![0]);
        let added = map.add_image(vec![1], ImageFormat::Png).unwrap();

        assert_eq!(map.image_data("rId9"), Some(&[0u8][..]));
        assert_ne!(added, "rId9");
        assert_eq!(map.media()[1].partname, "/word/media/image2.png");

        map.add_image(vec![2], ImageFormat::Gif).unwrap();
        assert_eq!(map.media()[2].partname, "/word/media/image3.gif");
    }

    #[test]
    fn test_relate_is_idempotent() {
        let mut map = RelationshipMapper::new();
        let a = map.relate(RT::STYLES, "styles.xml");
        let b = map.relate(RT::STYLES, "styles.xml");
        assert_eq!(a, b);
        assert_eq!(map.rels().len(), 1);
    }
}
