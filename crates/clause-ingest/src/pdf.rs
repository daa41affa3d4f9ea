//! PDF text extraction using pdf-extract
//! Handles CID fonts and ToUnicode CMaps through the library

use std::panic::{self, AssertUnwindSafe};

use crate::IngestError;

/// Returns true when the buffer starts with the PDF magic bytes
pub fn looks_like_pdf(data: &[u8]) -> bool {
    data.len() > 4 && &data[0..4] == b"%PDF"
}

/// Extract text from all pages of a PDF.
///
/// Returns the concatenated text and the page count reported by the parser.
pub fn extract_pdf_text(data: &[u8]) -> Result<(String, u32), IngestError> {
    if !looks_like_pdf(data) {
        return Err(IngestError::Pdf("file does not start with a PDF header".into()));
    }

    // pdf-extract panics on some malformed font tables instead of returning an error
    let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(data)
    }))
    .map_err(|_| IngestError::Pdf("parser aborted on malformed content".into()))?;

    let text = extracted.map_err(|e| {
        let error_str = e.to_string();
        if error_str.contains("Identity-H") || error_str.contains("Unimplemented") {
            IngestError::Pdf(format!("unsupported font encoding: {}", error_str))
        } else {
            IngestError::Pdf(error_str)
        }
    })?;

    let page_count = match pdf_extract::Document::load_mem(data) {
        Ok(doc) => doc.get_pages().len() as u32,
        Err(_) => 1,
    };

    tracing::debug!(page_count, chars = text.len(), "extracted PDF text");
    Ok((text, page_count))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Document, Object, Stream, StringFormat};

    /// One-page PDF with a Helvetica text layer, one `Tj` per line
    pub(crate) fn build_pdf(lines: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));
        let resources = Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
        )]);

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("Td", vec![Object::Integer(0), Object::Integer(-16)]));
            }
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(line.as_bytes().to_vec(), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]));

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(1)),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_extracts_text_layer_and_page_count() {
        let pdf = build_pdf(&[
            "1. Confidentiality. The Recipient shall keep all information secret.",
            "2. Termination. Either party may terminate on notice.",
        ]);
        let (text, pages) = extract_pdf_text(&pdf).unwrap();
        assert_eq!(pages, 1);
        assert!(!text.trim().is_empty());
        assert!(text.contains("Confidentiality"), "{text:?}");
        assert!(text.contains("terminate"), "{text:?}");
    }

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let result = extract_pdf_text(b"Hello, this is plain text");
        assert!(matches!(result, Err(IngestError::Pdf(msg)) if msg.contains("PDF header")));
    }

    #[test]
    fn test_magic_detection() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(!looks_like_pdf(b"%PD"));
        assert!(!looks_like_pdf(b"PK\x03\x04"));
    }

    #[test]
    fn test_truncated_pdf_is_an_error_not_a_panic() {
        let result = extract_pdf_text(b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog");
        assert!(matches!(result, Err(IngestError::Pdf(_))));
    }
}
