//! Word-document packaging.
//!
//! Word-processing formats cannot host live script-rendered diagrams, so the
//! caller pre-rasterizes diagram mounts before the document reaches this
//! module. The HTML itself is carried into the OOXML container as an
//! alternative-format chunk, which word processors import on open.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::types::{Result, VaultError};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="html" ContentType="text/html"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>
"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>
"#;

const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>
    <w:altChunk r:id="htmlChunk"/>
    <w:sectPr>
      <w:pgSz w:w="11906" w:h="16838"/>
      <w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134"/>
    </w:sectPr>
  </w:body>
</w:document>
"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="htmlChunk" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/aFChunk" Target="chunk.html"/>
</Relationships>
"#;

/// Package a self-contained HTML document into DOCX bytes.
pub fn package_html(html: &str) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &str); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", DOCUMENT_XML),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/chunk.html", html),
    ];
    for (name, content) in parts {
        writer
            .start_file(name, options)
            .map_err(|e| VaultError::export(format!("docx packaging ({name}): {e}")))?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| VaultError::export(format!("docx packaging ({name}): {e}")))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| VaultError::export(format!("docx packaging: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_is_a_zip_with_ooxml_parts() {
        let bytes = package_html("<html><body>hi</body></html>").unwrap();
        // local file header magic
        assert_eq!(&bytes[..4], b"PK\x03\x04");

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"[Content_Types].xml".to_string()));
        assert!(names.contains(&"word/document.xml".to_string()));
        assert!(names.contains(&"word/chunk.html".to_string()));
    }

    #[test]
    fn test_chunk_carries_the_html() {
        let bytes = package_html("<p>unique-marker-1234</p>").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut chunk = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name("word/chunk.html").unwrap(),
            &mut chunk,
        )
        .unwrap();
        assert!(chunk.contains("unique-marker-1234"));
    }
}
