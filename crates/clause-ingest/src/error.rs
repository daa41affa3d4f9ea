use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file type: {0} (only PDF, DOCX and TXT files are accepted)")]
    UnsupportedFormat(String),

    #[error("could not extract PDF text: {0}")]
    Pdf(String),

    #[error("could not extract DOCX text: {0}")]
    Docx(String),

    #[error("no text could be extracted from the {0} file")]
    EmptyDocument(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
