//! Document ingestion: turn an uploaded PDF, DOCX or TXT file into raw text.
//!
//! The format is decided from the filename extension before any bytes are
//! parsed, so unsupported uploads are rejected without touching the parsers.

pub mod docx;
pub mod error;
pub mod pdf;
pub mod txt;

use std::path::Path;

use clause_types::DocumentFormat;

pub use error::IngestError;

/// Raw text pulled out of an uploaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub format: DocumentFormat,
    pub text: String,
    /// Page count for PDFs, `None` for formats without pages
    pub pages: Option<u32>,
}

/// Work out the document format from a filename's extension.
pub fn detect_format(filename: &str) -> Result<DocumentFormat, IngestError> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocumentFormat::from_extension)
        .ok_or_else(|| IngestError::UnsupportedFormat(filename.to_string()))
}

/// Extract text from the bytes of a document of a known format.
///
/// Fails with [`IngestError::EmptyDocument`] when the document parses but
/// holds no text (for example a scanned PDF with no text layer).
pub fn extract_text(format: DocumentFormat, data: &[u8]) -> Result<ExtractedText, IngestError> {
    let (text, pages) = match format {
        DocumentFormat::Pdf => {
            let (text, pages) = pdf::extract_pdf_text(data)?;
            (text, Some(pages))
        }
        DocumentFormat::Docx => (docx::extract_docx_text(data)?, None),
        DocumentFormat::Txt => (txt::decode_text(data), None),
    };

    if text.trim().is_empty() {
        return Err(IngestError::EmptyDocument(format.as_str()));
    }

    tracing::info!(format = %format, chars = text.len(), ?pages, "document text extracted");
    Ok(ExtractedText { format, text, pages })
}

/// Detect, read and extract a document from disk.
pub fn extract_file(path: &Path) -> Result<ExtractedText, IngestError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let format = detect_format(name)?;
    let data = std::fs::read(path)?;
    extract_text(format, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("lease.PDF").unwrap(), DocumentFormat::Pdf);
        assert_eq!(detect_format("nda.final.docx").unwrap(), DocumentFormat::Docx);
        assert_eq!(detect_format("terms.txt").unwrap(), DocumentFormat::Txt);
    }

    #[test]
    fn test_detect_format_rejects_others() {
        for name in ["contract.doc", "scan.png", "README", ""] {
            assert!(
                matches!(detect_format(name), Err(IngestError::UnsupportedFormat(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_extract_txt() {
        let extracted = extract_text(DocumentFormat::Txt, b"1. Notice. Send it by post.").unwrap();
        assert_eq!(extracted.text, "1. Notice. Send it by post.");
        assert_eq!(extracted.pages, None);
    }

    #[test]
    fn test_extract_pdf_reports_pages() {
        let pdf = pdf::tests::build_pdf(&["1. Governing Law. The law of England applies."]);
        let extracted = extract_text(DocumentFormat::Pdf, &pdf).unwrap();
        assert_eq!(extracted.format, DocumentFormat::Pdf);
        assert_eq!(extracted.pages, Some(1));
        assert!(extracted.text.contains("Governing Law"));
    }

    #[test]
    fn test_whitespace_only_is_empty_document() {
        let result = extract_text(DocumentFormat::Txt, b"  \n\t \n");
        assert!(matches!(result, Err(IngestError::EmptyDocument("txt"))));
    }

    #[test]
    fn test_extract_docx_through_format_dispatch() {
        let docx = docx::tests::build_docx("<w:p><w:r><w:t>Governing law.</w:t></w:r></w:p>");
        let extracted = extract_text(DocumentFormat::Docx, &docx).unwrap();
        assert_eq!(extracted.text, "Governing law.");
        assert_eq!(extracted.format, DocumentFormat::Docx);
    }

    #[test]
    fn test_extract_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agreement.txt");
        std::fs::write(&path, "This Agreement is binding.").unwrap();
        let extracted = extract_file(&path).unwrap();
        assert_eq!(extracted.text, "This Agreement is binding.");
    }

    #[test]
    fn test_extract_file_checks_extension_before_reading() {
        let result = extract_file(Path::new("/definitely/not/here.xlsx"));
        assert!(matches!(result, Err(IngestError::UnsupportedFormat(_))));
    }
}
