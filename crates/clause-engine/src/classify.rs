//! Clause type detection

use clause_types::ClauseCategory;

use crate::EngineError;

/// Assigns a [`ClauseCategory`] to a clause's text
pub trait ClauseClassifier: Send + Sync {
    /// Name reported in logs
    fn name(&self) -> &str;

    /// Classify one clause. Blank text is always `Other`.
    fn classify(&self, text: &str) -> Result<ClauseCategory, EngineError>;
}

/// Keyword rules in priority order. The first category with a keyword
/// contained in the lowercased clause wins.
pub const KEYWORD_RULES: &[(ClauseCategory, &[&str])] = &[
    (
        ClauseCategory::Confidentiality,
        &[
            "confidential",
            "confidentiality",
            "non-disclosure",
            "nda",
            "proprietary information",
        ],
    ),
    (
        ClauseCategory::Termination,
        &[
            "terminate",
            "termination",
            "expire",
            "end of contract",
            "breach",
            "cancel",
        ],
    ),
    (
        ClauseCategory::Indemnity,
        &["indemnify", "indemnity", "hold harmless", "defend against"],
    ),
    (
        ClauseCategory::DisputeResolution,
        &[
            "arbitration",
            "dispute",
            "mediation",
            "court",
            "sole arbitrator",
            "litigation",
        ],
    ),
    (
        ClauseCategory::GoverningLaw,
        &["governing law", "laws in force", "law of ", "applicable law"],
    ),
    (
        ClauseCategory::PaymentTerms,
        &[
            "payment",
            "fee",
            "invoice",
            "compensation",
            "price",
            "remuneration",
            "salary",
        ],
    ),
    (
        ClauseCategory::IntellectualProperty,
        &[
            "intellectual property",
            "copyright",
            "trademark",
            "patent",
            "ip rights",
            "ownership",
        ],
    ),
    (
        ClauseCategory::Warranties,
        &["warranty", "warranties", "represent", "guarantee", "assurance"],
    ),
    (
        ClauseCategory::LimitationOfLiability,
        &[
            "limitation of liability",
            "limited to",
            "aggregate liability",
            "consequential damages",
        ],
    ),
    (
        ClauseCategory::ForceMajeure,
        &[
            "force majeure",
            "act of god",
            "natural disaster",
            "unforeseen circumstances",
        ],
    ),
    (
        ClauseCategory::Assignment,
        &["assignment", "transfer", "assign rights", "delegate"],
    ),
    (
        ClauseCategory::NonCompete,
        &[
            "non-compete",
            "non compete",
            "competitive",
            "solicitation",
            "restrictive covenant",
        ],
    ),
    (
        ClauseCategory::Severability,
        &[
            "severability",
            "severable",
            "invalid provision",
            "unenforceable",
        ],
    ),
    (
        ClauseCategory::Amendment,
        &["amendment", "modify", "modification", "change", "variation"],
    ),
    (
        ClauseCategory::Notice,
        &[
            "notice",
            "notification",
            "inform",
            "written notice",
            "email to",
        ],
    ),
];

/// Classify text with [`KEYWORD_RULES`]
pub fn classify_by_keywords(text: &str) -> ClauseCategory {
    if text.trim().is_empty() {
        return ClauseCategory::Other;
    }
    let text_lower = text.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text_lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(ClauseCategory::Other)
}

/// Rule-based classifier, always available and deterministic
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl ClauseClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    fn classify(&self, text: &str) -> Result<ClauseCategory, EngineError> {
        Ok(classify_by_keywords(text))
    }
}
