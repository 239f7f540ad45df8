//! PDF text extraction.
//!
//! Text is pulled page by page with `lopdf` and concatenated in page order.
//! Nothing structural survives: no page breaks, layout or headings.

use std::path::Path;

use lopdf::Document;
use review::DocumentText;
use tracing::{debug, instrument, warn};

use crate::DocumentError;

/// Extracts the text of every page of the PDF at `path`.
///
/// # Errors
///
/// - [`DocumentError::Io`] if the file cannot be read.
/// - [`DocumentError::InvalidPdf`] if the bytes are not a loadable PDF.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract_text(path: &Path) -> Result<DocumentText, DocumentError> {
    let bytes = std::fs::read(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract_text_from_bytes(&bytes).map_err(|e| match e {
        DocumentError::InvalidPdf { reason, .. } => DocumentError::InvalidPdf {
            path: Some(path.to_path_buf()),
            reason,
        },
        other => other,
    })
}

/// Extracts the text of every page of an in-memory PDF.
///
/// Pages whose content cannot be decoded contribute no text; they are logged
/// and skipped rather than failing the whole document.
///
/// # Errors
///
/// [`DocumentError::InvalidPdf`] if `bytes` is not a loadable PDF.
pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<DocumentText, DocumentError> {
    let doc = Document::load_mem(bytes).map_err(|e| DocumentError::InvalidPdf {
        path: None,
        reason: e.to_string(),
    })?;

    // get_pages is keyed by 1-based page number, so iteration is page order.
    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for &page_number in pages.keys() {
        match doc.extract_text(&[page_number]) {
            Ok(text) => texts.push(text),
            Err(e) => {
                warn!(page = page_number, error = %e, "Skipping page with undecodable text");
                texts.push(String::new());
            }
        }
    }

    let document = DocumentText::from_pages(texts);
    debug!(
        pages = document.page_count(),
        bytes = document.len(),
        "Extracted PDF text"
    );
    if document.is_blank() {
        warn!("PDF contains no extractable text");
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::pdf_with_pages;

    #[test]
    fn pages_are_concatenated_in_order() {
        let bytes = pdf_with_pages(&["Alpha exits", "Bravo stairs", "Charlie ramps"]);

        let doc = extract_text_from_bytes(&bytes).unwrap();

        assert_eq!(doc.page_count(), 3);
        let text = doc.as_str();
        let alpha = text.find("Alpha exits").unwrap();
        let bravo = text.find("Bravo stairs").unwrap();
        let charlie = text.find("Charlie ramps").unwrap();
        assert!(alpha < bravo && bravo < charlie, "text out of order: {text:?}");
    }

    #[test]
    fn extract_text_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.pdf");
        std::fs::write(&path, pdf_with_pages(&["Sheet A1"])).unwrap();

        let doc = extract_text(&path).unwrap();
        assert!(doc.as_str().contains("Sheet A1"));
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_text(&dir.path().join("absent.pdf")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }

    #[test]
    fn non_pdf_bytes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"just some text, not a pdf").unwrap();

        match extract_text(&path).unwrap_err() {
            DocumentError::InvalidPdf { path: Some(p), .. } => assert_eq!(p, path),
            other => panic!("expected invalid pdf, got {other:?}"),
        }
    }
}
