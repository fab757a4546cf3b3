//! Plain-text extraction for uploaded scroll documents.
//!
//! Dispatches on file extension. PDF text comes out page-concatenated,
//! `.docx` paragraphs are joined by newlines, and plain-text formats are
//! read as UTF-8 with undecodable bytes dropped. Unknown extensions and
//! extraction failures both degrade to an empty string at the public entry
//! point: ingestion never fails because a document was unreadable.

use std::io::{Cursor, Read};
use std::path::Path;

use anyhow::Context;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::utilities::errors::ExtractionError;

/// Extract plain text from an uploaded document, by extension.
///
/// Never fails: any extraction error is logged and yields `""`.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> String {
    match try_extract(file_name, bytes) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            let e = ExtractionError::Malformed(format!("{:#}", e));
            tracing::warn!(file = file_name, "{}", e);
            String::new()
        }
    }
}

fn try_extract(file_name: &str, bytes: &[u8]) -> Result<String, anyhow::Error> {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => pdf_text(bytes),
        "docx" => docx_text(bytes),
        "txt" | "md" | "rtf" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        _ => Ok(String::new()),
    }
}

fn pdf_text(bytes: &[u8]) -> Result<String, anyhow::Error> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| anyhow::anyhow!("pdf text extraction: {}", e))
}

/// Pull paragraph text out of the `word/document.xml` entry of a docx
/// archive. Text runs (`<w:t>`) are concatenated; each closed paragraph
/// (`</w:p>`) contributes a newline.
fn docx_text(bytes: &[u8]) -> Result<String, anyhow::Error> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("docx is not a zip archive")?;
    let mut document = archive
        .by_name("word/document.xml")
        .context("docx has no word/document.xml")?;
    let mut xml_bytes = Vec::new();
    document.read_to_end(&mut xml_bytes)?;
    let xml = String::from_utf8_lossy(&xml_bytes);

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"w:t" => in_run = false,
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Ok(Event::Text(t)) if in_run => {
                let chunk = t.unescape().context("bad entity in document.xml")?;
                text.push_str(&chunk);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e).context("malformed document.xml"),
        }
    }
    Ok(text)
}
