//! services/api/src/adapters/docx_text.rs
//!
//! Paragraph text extraction for Word (`.docx`) documents.
//!
//! A `.docx` file is a ZIP package; the body lives in `word/document.xml` as a
//! sequence of `<w:p>` paragraphs whose visible text sits in `<w:t>` runs.

use legal_qa_core::ports::ExtractionError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// Extracts paragraph text from a `.docx` held in memory, one line per
/// paragraph. Empty paragraphs produce empty lines.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let xml = read_main_part(bytes)?;
    let paragraphs = paragraphs_from_xml(&xml)?;
    Ok(paragraphs.join("\n"))
}

fn read_main_part(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::WordDocument(format!("not a valid package: {}", e)))?;
    let mut part = archive.by_name(MAIN_DOCUMENT_PART).map_err(|e| {
        ExtractionError::WordDocument(format!("missing {}: {}", MAIN_DOCUMENT_PART, e))
    })?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractionError::WordDocument(format!("unreadable {}: {}", MAIN_DOCUMENT_PART, e)))?;
    Ok(xml)
}

/// Elements whose content is not part of the surrounding paragraph: text box
/// bodies, and the legacy copy Word keeps of every drawing.
fn is_detached_content(local_name: &[u8]) -> bool {
    matches!(local_name, b"txbxContent" | b"Fallback")
}

fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;
    // Depth inside detached content; everything there is skipped.
    let mut detached = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            ExtractionError::WordDocument(format!(
                "malformed XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) if is_detached_content(e.local_name().as_ref()) => detached += 1,
            Event::End(e) if is_detached_content(e.local_name().as_ref()) => {
                detached = detached.saturating_sub(1);
            }
            Event::Eof => break,
            _ if detached > 0 => {}
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                // <w:p/> is a paragraph with no runs at all.
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_paragraph => current.push('\t'),
                b"br" | b"cr" if in_paragraph => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::WordDocument(e.to_string()))?;
                current.push_str(&text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    paragraphs.push(std::mem::take(&mut current));
                    in_paragraph = false;
                }
                _ => {}
            },
            _ => {}
        }
    }

    Ok(paragraphs)
}
