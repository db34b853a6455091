//! Document template module.
//!
//! Minimal valid parts written alongside `document.xml` and `styles.xml` when a
//! session has not imported them from a template package.

/// Namespace declarations on the `w:document` root: WordprocessingML,
/// relationships, drawing anchors, DrawingML, pictures and Office Math.
pub const DOCUMENT_NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" "#,
    r#"xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math""#,
);

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Generate settings.xml, optionally asking the consumer to update fields on open.
pub fn settings_xml(update_fields_on_open: bool) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECLARATION);
    xml.push_str(r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math">"#);
    xml.push_str(r#"<w:zoom w:percent="100"/>"#);
    if update_fields_on_open {
        xml.push_str(r#"<w:updateFields w:val="true"/>"#);
    }
    xml.push_str(r#"<w:defaultTabStop w:val="720"/>"#);
    xml.push_str(r#"<w:characterSpacingControl w:val="doNotCompress"/>"#);
    xml.push_str(r#"<m:mathPr><m:mathFont m:val="Cambria Math"/><m:dispDef/><m:lMargin m:val="0"/><m:rMargin m:val="0"/><m:defJc m:val="centerGroup"/><m:intLim m:val="subSup"/><m:naryLim m:val="undOvr"/></m:mathPr>"#);
    xml.push_str(r#"<w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat>"#);
    xml.push_str("</w:settings>");
    xml
}

/// Generate a minimal valid fontTable.xml content.
pub fn default_font_table_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:fonts xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:font w:name="Calibri"><w:panose1 w:val="020F0502020204030204"/><w:charset w:val="00"/><w:family w:val="swiss"/><w:pitch w:val="variable"/></w:font>"#,
        r#"<w:font w:name="Times New Roman"><w:panose1 w:val="02020603050405020304"/><w:charset w:val="00"/><w:family w:val="roman"/><w:pitch w:val="variable"/></w:font>"#,
        r#"<w:font w:name="Cambria Math"><w:panose1 w:val="02040503050406030204"/><w:charset w:val="00"/><w:family w:val="roman"/><w:pitch w:val="variable"/></w:font>"#,
        "</w:fonts>"
    )
}

/// Generate a minimal valid core.xml (core properties) content.
pub fn default_core_props_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        "<dc:title></dc:title><dc:creator>docsmith</dc:creator><cp:revision>1</cp:revision>",
        "</cp:coreProperties>"
    )
}

/// Generate a minimal valid app.xml (extended properties) content.
pub fn default_app_props_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
        "<Application>docsmith</Application><DocSecurity>0</DocSecurity>",
        "</Properties>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_update_fields() {
        assert!(settings_xml(true).contains(r#"<w:updateFields w:val="true"/>"#));
        assert!(!settings_xml(false).contains("updateFields"));
    }

    #[test]
    fn test_namespaces_cover_math_and_drawings() {
        for prefix in ["xmlns:w=", "xmlns:r=", "xmlns:wp=", "xmlns:a=", "xmlns:pic=", "xmlns:m="] {
            assert!(DOCUMENT_NAMESPACES.contains(prefix), "{prefix}");
        }
    }
}
