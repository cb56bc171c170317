use std::fs;
use std::io::BufReader;
use std::path::Path;

use quick_xml::events::Event;

use crate::error::{AppError, Result};

/// Extensions the scanner retains. Everything else is silently skipped.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &[".txt", ".md", ".py", ".json", ".csv", ".docx", ".pdf"];

pub fn is_supported(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension)
}

/// Lowercased extension with leading dot; empty when the path has none.
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Extracts textual content from a supported file. Extraction failure is
/// reported, never panics; the scanner records it in the file's summary.
pub fn extract_text(path: &Path, extension: &str) -> Result<String> {
    match extension {
        ".txt" | ".md" | ".py" | ".json" | ".csv" => read_text_file(path),
        ".docx" => read_docx_file(path),
        ".pdf" => read_pdf_file(path),
        other => Err(AppError::Extraction(format!(
            "unsupported file type: {other}"
        ))),
    }
}

fn read_text_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_pdf_file(path: &Path) -> Result<String> {
    pdf_extract::extract_text(path)
        .map_err(|e| AppError::Extraction(format!("pdf read failed: {e}")))
}

/// A docx is a zip archive; the body text lives in `word/document.xml`.
/// Text events are concatenated, with a newline per closed paragraph.
fn read_docx_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| AppError::Extraction(format!("docx open failed: {e}")))?;
    let document = archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::Extraction(format!("docx has no document body: {e}")))?;

    let mut reader = quick_xml::Reader::from_reader(BufReader::new(document));
    let mut out = String::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(text)) => {
                let unescaped = text
                    .unescape()
                    .map_err(|e| AppError::Extraction(format!("docx xml decode failed: {e}")))?;
                out.push_str(&unescaped);
            }
            Ok(Event::End(end)) if end.name().as_ref() == b"w:p" => out.push('\n'),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(AppError::Extraction(format!("docx xml parse failed: {e}")));
            }
        }
        buf.clear();
    }
    Ok(out)
}
