//! Document text extraction for uploaded resumes.

use std::panic;
use std::path::Path;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild};
use thiserror::Error;

use crate::text::clean::clean_text;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file format {0:?}, use PDF or DOCX")]
    UnsupportedFormat(String),

    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

/// The document formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Resolves the kind from a file name's extension, ignoring case.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }
}

/// Extracts and cleans the text of the document at `path`.
///
/// The format is chosen from the path's extension; anything other than
/// `.pdf` or `.docx` fails with [`ExtractionError::UnsupportedFormat`].
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let name = path.to_string_lossy();
    let kind = DocumentKind::from_file_name(&name)
        .ok_or_else(|| ExtractionError::UnsupportedFormat(name.to_string()))?;
    let bytes = std::fs::read(path)?;
    extract_bytes(kind, &bytes)
}

/// Same as [`extract_text`] for an in-memory document of a known kind.
pub fn extract_bytes(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractionError> {
    let raw = match kind {
        DocumentKind::Pdf => pdf_text(bytes)?,
        DocumentKind::Docx => docx_text(bytes)?,
    };
    Ok(clean_text(&raw))
}

fn pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    match panic::catch_unwind(|| pdf_pages(bytes)) {
        Ok(Ok(pages)) => Ok(pages.join("\n")),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ExtractionError::Pdf("parser aborted on malformed document".to_string())),
    }
}

/// Text of every page in page order; a page without text yields "".
fn pdf_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let pdf_error = |e: &dyn std::fmt::Display| ExtractionError::Pdf(e.to_string());
    let mut doc = pdf_extract::Document::load_mem(bytes).map_err(|e| pdf_error(&e))?;
    if doc.is_encrypted() {
        doc.decrypt("").map_err(|e| pdf_error(&e))?;
    }
    doc.get_pages()
        .keys()
        .map(|&page| -> Result<String, ExtractionError> {
            let mut text = String::new();
            let mut output = pdf_extract::PlainTextOutput::new(&mut text);
            pdf_extract::output_doc_page(&doc, &mut output, page).map_err(|e| pdf_error(&e))?;
            drop(output);
            Ok(text)
        })
        .collect()
}

fn docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            push_run_text(run, &mut text);
        }
    }
    text
}

fn push_run_text(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}
