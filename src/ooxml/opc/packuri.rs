/// Part names inside an OPC package.
///
/// A PackURI is the absolute, slash-rooted name of a part (`/word/document.xml`).
/// Relationship targets are stored relative to the source part's directory and
/// are resolved into PackURIs with [`PackURI::from_rel_ref`].
use crate::ooxml::opc::error::{OpcError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Create a new PackURI. The URI must begin with a forward slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(OpcError::InvalidPackUri(format!(
                "PackURI must begin with slash, got '{}'",
                uri
            )));
        }
        Ok(PackURI { uri })
    }

    /// Resolve a relationship target (`media/image1.png`, `../customXml/item1.xml`)
    /// against the directory of its source part (`/word`).
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self> {
        // Absolute targets ignore the base
        if relative_ref.starts_with('/') {
            return Self::new(normalize(relative_ref));
        }
        let joined = if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(normalize(&joined))
    }

    /// Directory portion: `/word` for `/word/document.xml`, `/` for top-level parts.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Final path segment, e.g. `document.xml`.
    pub fn filename(&self) -> &str {
        self.uri
            .rfind('/')
            .map(|pos| &self.uri[pos + 1..])
            .unwrap_or("")
    }

    /// Extension without the leading period, e.g. `xml`.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        filename
            .rfind('.')
            .map(|pos| &filename[pos + 1..])
            .unwrap_or("")
    }

    /// Zip member name (leading slash stripped).
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Reference to this part relative to `base_uri`, as written in a `.rels` Target.
    ///
    /// `/word/media/image1.png` relative to `/word` is `media/image1.png`.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();
        let common = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<&str> = vec![".."; from.len() - common];
        segments.extend_from_slice(&to[common..]);
        segments.join("/")
    }

    /// The `.rels` part holding this part's relationships:
    /// `/word/_rels/document.xml.rels` for `/word/document.xml`, `/_rels/.rels` for `/`.
    pub fn rels_uri(&self) -> Result<PackURI> {
        let base_uri = self.base_uri();
        if base_uri == "/" {
            Self::new(format!("/_rels/{}.rels", self.filename()))
        } else {
            Self::new(format!("{}/_rels/{}.rels", base_uri, self.filename()))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

/// Collapse `.` and `..` segments of a slash-rooted path.
fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            _ => parts.push(segment),
        }
    }
    format!("/{}", parts.join("/"))
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packuri_new() {
        assert!(PackURI::new("/word/document.xml").is_ok());
        assert!(PackURI::new("word/document.xml").is_err());
    }

    #[test]
    fn test_components() {
        let uri = PackURI::new("/word/media/image3.png").unwrap();
        assert_eq!(uri.base_uri(), "/word/media");
        assert_eq!(uri.filename(), "image3.png");
        assert_eq!(uri.ext(), "png");
        assert_eq!(uri.membername(), "word/media/image3.png");

        let root = PackURI::new("/").unwrap();
        assert_eq!(root.base_uri(), "/");
        assert_eq!(root.filename(), "");
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/word", "media/image1.png").unwrap();
        assert_eq!(uri.as_str(), "/word/media/image1.png");

        let uri = PackURI::from_rel_ref("/word", "../docProps/core.xml").unwrap();
        assert_eq!(uri.as_str(), "/docProps/core.xml");

        let uri = PackURI::from_rel_ref("/", "word/document.xml").unwrap();
        assert_eq!(uri.as_str(), "/word/document.xml");

        let uri = PackURI::from_rel_ref("/word", "/word/styles.xml").unwrap();
        assert_eq!(uri.as_str(), "/word/styles.xml");
    }

    #[test]
    fn test_relative_ref() {
        let uri = PackURI::new("/word/media/image1.png").unwrap();
        assert_eq!(uri.relative_ref("/word"), "media/image1.png");
        assert_eq!(uri.relative_ref("/"), "word/media/image1.png");

        let uri = PackURI::new("/docProps/core.xml").unwrap();
        assert_eq!(uri.relative_ref("/word"), "../docProps/core.xml");
    }

    #[test]
    fn test_rels_uri() {
        let uri = PackURI::new("/word/document.xml").unwrap();
        assert_eq!(uri.rels_uri().unwrap().as_str(), "/word/_rels/document.xml.rels");

        let root = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(root.rels_uri().unwrap().as_str(), "/_rels/.rels");
    }
}
