use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category assigned to a clause by the clause detector.
///
/// The declaration order is also the priority order used by the keyword
/// classifier: the first category whose rule matches wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClauseCategory {
    #[serde(rename = "Confidentiality")]
    Confidentiality,
    #[serde(rename = "Termination")]
    Termination,
    #[serde(rename = "Indemnity")]
    Indemnity,
    #[serde(rename = "Dispute Resolution")]
    DisputeResolution,
    #[serde(rename = "Governing Law")]
    GoverningLaw,
    #[serde(rename = "Payment Terms")]
    PaymentTerms,
    #[serde(rename = "Intellectual Property")]
    IntellectualProperty,
    #[serde(rename = "Warranties")]
    Warranties,
    #[serde(rename = "Limitation of Liability")]
    LimitationOfLiability,
    #[serde(rename = "Force Majeure")]
    ForceMajeure,
    #[serde(rename = "Assignment")]
    Assignment,
    #[serde(rename = "Non-Compete")]
    NonCompete,
    #[serde(rename = "Severability")]
    Severability,
    #[serde(rename = "Amendment")]
    Amendment,
    #[serde(rename = "Notice")]
    Notice,
    #[serde(rename = "Other")]
    Other,
}

impl ClauseCategory {
    /// Every category, in classifier priority order.
    pub const ALL: [ClauseCategory; 16] = [
        ClauseCategory::Confidentiality,
        ClauseCategory::Termination,
        ClauseCategory::Indemnity,
        ClauseCategory::DisputeResolution,
        ClauseCategory::GoverningLaw,
        ClauseCategory::PaymentTerms,
        ClauseCategory::IntellectualProperty,
        ClauseCategory::Warranties,
        ClauseCategory::LimitationOfLiability,
        ClauseCategory::ForceMajeure,
        ClauseCategory::Assignment,
        ClauseCategory::NonCompete,
        ClauseCategory::Severability,
        ClauseCategory::Amendment,
        ClauseCategory::Notice,
        ClauseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseCategory::Confidentiality => "Confidentiality",
            ClauseCategory::Termination => "Termination",
            ClauseCategory::Indemnity => "Indemnity",
            ClauseCategory::DisputeResolution => "Dispute Resolution",
            ClauseCategory::GoverningLaw => "Governing Law",
            ClauseCategory::PaymentTerms => "Payment Terms",
            ClauseCategory::IntellectualProperty => "Intellectual Property",
            ClauseCategory::Warranties => "Warranties",
            ClauseCategory::LimitationOfLiability => "Limitation of Liability",
            ClauseCategory::ForceMajeure => "Force Majeure",
            ClauseCategory::Assignment => "Assignment",
            ClauseCategory::NonCompete => "Non-Compete",
            ClauseCategory::Severability => "Severability",
            ClauseCategory::Amendment => "Amendment",
            ClauseCategory::Notice => "Notice",
            ClauseCategory::Other => "Other",
        }
    }

    /// Look up a category by its display label, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }

    /// Map a classifier output index (`LABEL_3` → 3) onto a category.
    ///
    /// Indices follow the fine-tuned model's label order, which is the
    /// declaration order without `Other`. Anything out of range is `Other`.
    pub fn from_index(index: usize) -> Self {
        if index < Self::ALL.len() - 1 {
            Self::ALL[index]
        } else {
            ClauseCategory::Other
        }
    }
}

impl fmt::Display for ClauseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How aggressively clause text is rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimplificationLevel {
    #[default]
    Basic,
    Intermediate,
    Advanced,
}

impl SimplificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimplificationLevel::Basic => "basic",
            SimplificationLevel::Intermediate => "intermediate",
            SimplificationLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SimplificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown simplification level: {0} (expected basic, intermediate or advanced)")]
pub struct ParseLevelError(pub String);

impl FromStr for SimplificationLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(SimplificationLevel::Basic),
            "intermediate" => Ok(SimplificationLevel::Intermediate),
            "advanced" => Ok(SimplificationLevel::Advanced),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Match a bare file extension (no dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clause of a contract, in original document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// 1-based position in the source document
    pub index: u32,
    pub category: ClauseCategory,
    pub original_text: String,
    pub cleaned_text: String,
    pub sentences: Vec<String>,
    pub simplified_text: String,
}

/// A legal term found in a document, with its plain-language definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalTermMatch {
    pub term: String,
    pub category: String,
    pub definition: String,
    /// Case-insensitive whole-word occurrences in the document text
    pub occurrences: u32,
}

/// Readability statistics for a text sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityReport {
    pub sentence_count: u32,
    pub word_count: u32,
    pub syllable_count: u32,
    pub complex_word_count: u32,
    pub avg_words_per_sentence: f64,
    pub avg_syllables_per_word: f64,
    /// Flesch reading ease, clamped to 0..=100 (higher is easier)
    pub flesch_reading_ease: f64,
    /// Flesch-Kincaid grade level, floored at 0
    pub flesch_kincaid_grade: f64,
}

/// Full analysis of one stored document, as served and downloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub document_id: i64,
    pub filename: String,
    pub format: DocumentFormat,
    pub simplification_level: SimplificationLevel,
    /// RFC 3339 UTC timestamp
    pub created_at: String,
    pub word_count: u32,
    pub clause_count: u32,
    pub raw_text: String,
    pub simplified_text: String,
    pub clauses: Vec<Clause>,
    pub legal_terms: Vec<LegalTermMatch>,
    pub original_readability: ReadabilityReport,
    pub simplified_readability: ReadabilityReport,
    pub clause_type_summary: BTreeMap<String, u32>,
}

/// Row of a user's document history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub filename: String,
    pub format: DocumentFormat,
    pub created_at: String,
    pub clause_count: u32,
    pub word_count: u32,
    pub original_reading_ease: f64,
    pub simplified_word_count: u32,
}

/// Count clauses per category label.
pub fn summarize_categories(clauses: &[Clause]) -> BTreeMap<String, u32> {
    let mut summary = BTreeMap::new();
    for clause in clauses {
        *summary.entry(clause.category.as_str().to_string()).or_insert(0) += 1;
    }
    summary
}
