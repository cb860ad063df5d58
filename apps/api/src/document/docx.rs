use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::LoadError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts paragraph text from a DOCX container, one paragraph per line, in
/// document order. Paragraphs inside tables are included where they appear.
pub fn extract_text(data: &[u8]) -> Result<String, LoadError> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| LoadError::CorruptDocument(format!("DOCX is not a ZIP container: {e}")))?;

    let mut doc_xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| LoadError::CorruptDocument(format!("DOCX is missing {DOCUMENT_PART}")))?
        .read_to_string(&mut doc_xml)
        .map_err(|e| LoadError::CorruptDocument(format!("failed to read {DOCUMENT_PART}: {e}")))?;

    paragraphs_from_xml(&doc_xml).map(|paragraphs| paragraphs.join("\n"))
}

/// Walks WordprocessingML and collects the text of every `w:p`.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    // Nesting depth of open w:p elements; text boxes can nest paragraphs.
    let mut paragraph_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraph_depth += 1,
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" if paragraph_depth > 0 => current.push('\t'),
                b"br" | b"cr" if paragraph_depth > 0 => current.push('\n'),
                b"p" if paragraph_depth == 0 => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                    if paragraph_depth == 0 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e.unescape().map_err(|err| {
                    LoadError::CorruptDocument(format!("invalid text in {DOCUMENT_PART}: {err}"))
                })?;
                current.push_str(&text);
            }
            Ok(Event::CData(ref e)) if in_text => {
                current.push_str(&String::from_utf8_lossy(e));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(LoadError::CorruptDocument(format!(
                    "malformed {DOCUMENT_PART} at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    /// Wraps body XML in a minimal WordprocessingML document part.
    pub(crate) fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
        )
    }

    /// One `w:p` per line, each line as a single run.
    pub(crate) fn paragraphs_xml(lines: &[&str]) -> String {
        lines
            .iter()
            .map(|line| format!("<w:p><w:r><w:t xml:space=\"preserve\">{line}</w:t></w:r></w:p>"))
            .collect()
    }

    pub(crate) fn build_docx_with_part(part: &str, xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<?xml version=\"1.0\"?><Types/>").unwrap();
        writer.start_file(part, SimpleFileOptions::default()).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn build_docx(lines: &[&str]) -> Vec<u8> {
        build_docx_with_part(DOCUMENT_PART, &document_xml(&paragraphs_xml(lines)))
    }

    #[test]
    fn test_paragraphs_joined_in_document_order() {
        let docx = build_docx(&["Jane Doe", "jane.doe@example.com", "Skills: Python, SQL"]);
        let text = extract_text(&docx).unwrap();
        assert_eq!(text, "Jane Doe\njane.doe@example.com\nSkills: Python, SQL");
    }

    #[test]
    fn test_runs_within_paragraph_are_concatenated() {
        let body = "<w:p><w:r><w:t>Jane</w:t></w:r><w:r><w:t xml:space=\"preserve\"> Doe</w:t></w:r></w:p>";
        let docx = build_docx_with_part(DOCUMENT_PART, &document_xml(body));
        assert_eq!(extract_text(&docx).unwrap(), "Jane Doe");
    }

    #[test]
    fn test_tabs_breaks_and_entities() {
        let body = "<w:p><w:r><w:t>Phone</w:t><w:tab/><w:t>555</w:t><w:br/><w:t>R&amp;D</w:t></w:r></w:p>";
        let docx = build_docx_with_part(DOCUMENT_PART, &document_xml(body));
        assert_eq!(extract_text(&docx).unwrap(), "Phone\t555\nR&D");
    }

    #[test]
    fn test_empty_paragraphs_are_kept_as_blank_lines() {
        let body = format!("{}<w:p/>{}", paragraphs_xml(&["Top"]), paragraphs_xml(&["Bottom"]));
        let docx = build_docx_with_part(DOCUMENT_PART, &document_xml(&body));
        assert_eq!(extract_text(&docx).unwrap(), "Top\n\nBottom");
    }

    #[test]
    fn test_table_paragraphs_are_included_in_order() {
        let body = format!(
            "{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>{}",
            paragraphs_xml(&["Before"]),
            paragraphs_xml(&["Cell"]),
            paragraphs_xml(&["After"])
        );
        let docx = build_docx_with_part(DOCUMENT_PART, &document_xml(&body));
        assert_eq!(extract_text(&docx).unwrap(), "Before\nCell\nAfter");
    }

    #[test]
    fn test_non_zip_is_corrupt() {
        let err = extract_text(b"plain text pretending to be docx").unwrap_err();
        assert!(matches!(err, LoadError::CorruptDocument(ref m) if m.contains("ZIP")));
    }

    #[test]
    fn test_zip_without_document_part_is_corrupt() {
        let docx = build_docx_with_part("word/styles.xml", "<w:styles/>");
        let err = extract_text(&docx).unwrap_err();
        assert!(matches!(err, LoadError::CorruptDocument(ref m) if m.contains("missing")));
    }

    #[test]
    fn test_malformed_xml_is_corrupt() {
        let docx = build_docx_with_part(DOCUMENT_PART, "<w:document><w:body><w:p></w:body>");
        let err = extract_text(&docx).unwrap_err();
        assert!(matches!(err, LoadError::CorruptDocument(_)));
    }
}
