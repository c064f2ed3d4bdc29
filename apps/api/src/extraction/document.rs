//! Turns an uploaded PDF or DOCX into plain text.

use std::sync::Arc;

use bytes::Bytes;
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The two accepted upload formats. Anything else is rejected at the upload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            PDF_MIME => Some(DocumentKind::Pdf),
            DOCX_MIME => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MIME,
            DocumentKind::Docx => DOCX_MIME,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF could not be parsed: {0}")]
    Pdf(String),

    #[error("DOCX could not be parsed: {0}")]
    Docx(String),

    #[error("Extraction task aborted: {0}")]
    Aborted(String),
}

/// Converts document bytes to text. Synchronous and CPU-bound; callers off the
/// async runtime should go through [`extract_off_runtime`].
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractionError>;
}

/// Default extractor: `pdf-extract` for PDF, `docx-rs` for DOCX.
pub struct DocumentTextExtractor;

impl TextExtractor for DocumentTextExtractor {
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractionError> {
        match kind {
            DocumentKind::Pdf => extract_pdf(bytes),
            DocumentKind::Docx => extract_docx(bytes),
        }
    }
}

/// Runs the extractor inside `spawn_blocking`. A parser panic surfaces as `Aborted`.
pub async fn extract_off_runtime(
    extractor: Arc<dyn TextExtractor>,
    bytes: Bytes,
    kind: DocumentKind,
) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extractor.extract(&bytes, kind))
        .await
        .map_err(|e| ExtractionError::Aborted(e.to_string()))?
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => push_paragraph(&mut text, paragraph),
            DocumentChild::Table(table) => push_table(&mut text, table),
            _ => {}
        }
    }
    Ok(text)
}

/// One line per paragraph, including runs nested in hyperlinks.
fn push_paragraph(text: &mut String, paragraph: &Paragraph) {
    push_paragraph_children(text, &paragraph.children);
    text.push('\n');
}

fn push_paragraph_children(text: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_paragraph_children(text, &link.children),
            _ => {}
        }
    }
}

/// Row by row, cell by cell. Nested tables are walked in place.
fn push_table(text: &mut String, table: &Table) {
    for TableChild::TableRow(row) in &table.rows {
        for TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => push_paragraph(text, paragraph),
                    TableCellContent::Table(inner) => push_table(text, inner),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn build_docx(lines: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};

    let mut docx = Docx::new();
    for line in lines {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)));
    }
    let mut cursor = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    cursor.into_inner()
}
