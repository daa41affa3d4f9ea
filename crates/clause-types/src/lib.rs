//! Shared data model for contract analysis: clauses, legal terms,
//! readability reports and the per-document report served by the API.

pub mod types;

pub use types::{
    summarize_categories, Clause, ClauseCategory, DocumentFormat, DocumentReport,
    DocumentSummary, LegalTermMatch, ParseLevelError, ReadabilityReport, SimplificationLevel,
};
