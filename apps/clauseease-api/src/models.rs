//! Database rows and API request/response types

use std::collections::BTreeMap;

use clause_types::{
    Clause, ClauseCategory, DocumentFormat, DocumentSummary, LegalTermMatch, ReadabilityReport,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lowercased username that may read the admin statistics
pub const ADMIN_USERNAME: &str = "admin";

// Database models

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, FromRow)]
pub struct DbDocument {
    pub id: i64,
    pub filename: String,
    pub format: String,
    pub simplification_level: String,
    pub raw_text: String,
    pub simplified_text: String,
    pub word_count: i64,
    pub clause_count: i64,
    pub created_at: String,
}

#[derive(Debug, FromRow)]
pub struct DbClause {
    pub clause_index: i64,
    pub category: String,
    pub original_text: String,
    pub cleaned_text: String,
    pub sentences_json: String,
    pub simplified_text: String,
}

impl DbClause {
    pub fn into_clause(self) -> Result<Clause, serde_json::Error> {
        Ok(Clause {
            index: self.clause_index as u32,
            category: ClauseCategory::from_label(&self.category).unwrap_or(ClauseCategory::Other),
            original_text: self.original_text,
            cleaned_text: self.cleaned_text,
            sentences: serde_json::from_str(&self.sentences_json)?,
            simplified_text: self.simplified_text,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct DbTerm {
    pub term: String,
    pub category: String,
    pub definition: String,
    pub occurrences: i64,
}

impl From<DbTerm> for LegalTermMatch {
    fn from(row: DbTerm) -> Self {
        LegalTermMatch {
            term: row.term,
            category: row.category,
            definition: row.definition,
            occurrences: row.occurrences as u32,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct DbReadability {
    pub kind: String,
    pub sentence_count: i64,
    pub word_count: i64,
    pub syllable_count: i64,
    pub complex_word_count: i64,
    pub avg_words_per_sentence: f64,
    pub avg_syllables_per_word: f64,
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
}

impl From<DbReadability> for ReadabilityReport {
    fn from(row: DbReadability) -> Self {
        ReadabilityReport {
            sentence_count: row.sentence_count as u32,
            word_count: row.word_count as u32,
            syllable_count: row.syllable_count as u32,
            complex_word_count: row.complex_word_count as u32,
            avg_words_per_sentence: row.avg_words_per_sentence,
            avg_syllables_per_word: row.avg_syllables_per_word,
            flesch_reading_ease: row.flesch_reading_ease,
            flesch_kincaid_grade: row.flesch_kincaid_grade,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct DbDocumentSummary {
    pub id: i64,
    pub filename: String,
    pub format: String,
    pub created_at: String,
    pub clause_count: i64,
    pub word_count: i64,
    pub original_reading_ease: Option<f64>,
    pub simplified_word_count: Option<i64>,
}

impl DbDocumentSummary {
    pub fn into_summary(self) -> Option<DocumentSummary> {
        Some(DocumentSummary {
            id: self.id,
            filename: self.filename,
            format: DocumentFormat::from_extension(&self.format)?,
            created_at: self.created_at,
            clause_count: self.clause_count as u32,
            word_count: self.word_count as u32,
            original_reading_ease: self.original_reading_ease.unwrap_or_default(),
            simplified_word_count: self.simplified_word_count.unwrap_or_default() as u32,
        })
    }
}

// API request/response types

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub is_admin: bool,
}

impl From<DbUser> for UserResponse {
    fn from(user: DbUser) -> Self {
        UserResponse {
            is_admin: is_admin_username(&user.username),
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    High,
    Medium,
    Low,
}

impl ActivityLevel {
    pub fn from_document_count(documents: i64) -> Self {
        match documents {
            n if n >= 4 => ActivityLevel::High,
            n if n >= 2 => ActivityLevel::Medium,
            _ => ActivityLevel::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveUser {
    pub username: String,
    pub documents: i64,
    pub activity_level: ActivityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_documents: i64,
    pub active_users_today: i64,
    pub top_users: Vec<ActiveUser>,
    /// `YYYY-MM-DD` → accounts created that day, oldest first, zero-filled
    pub registrations_last_7_days: BTreeMap<String, i64>,
    /// Monday `YYYY-MM-DD` → documents uploaded that week, oldest first,
    /// zero-filled, the current week last
    pub documents_last_4_weeks: BTreeMap<String, i64>,
}

pub fn is_admin_username(username: &str) -> bool {
    username.to_lowercase() == ADMIN_USERNAME
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_activity_levels() {
        assert_eq!(ActivityLevel::from_document_count(0), ActivityLevel::Low);
        assert_eq!(ActivityLevel::from_document_count(1), ActivityLevel::Low);
        assert_eq!(ActivityLevel::from_document_count(2), ActivityLevel::Medium);
        assert_eq!(ActivityLevel::from_document_count(3), ActivityLevel::Medium);
        assert_eq!(ActivityLevel::from_document_count(4), ActivityLevel::High);
        assert_eq!(ActivityLevel::from_document_count(40), ActivityLevel::High);
    }

    #[test]
    fn test_admin_username_ignores_case() {
        assert!(is_admin_username("admin"));
        assert!(is_admin_username("Admin"));
        assert!(!is_admin_username("administrator"));
    }

    #[test]
    fn test_clause_row_conversion() {
        let row = DbClause {
            clause_index: 3,
            category: "Force Majeure".into(),
            original_text: "3. Force majeure.".into(),
            cleaned_text: "3. Force majeure.".into(),
            sentences_json: r#"["3. Force majeure."]"#.into(),
            simplified_text: "3. Force majeure.".into(),
        };
        let clause = row.into_clause().unwrap();
        assert_eq!(clause.index, 3);
        assert_eq!(clause.category, ClauseCategory::ForceMajeure);
        assert_eq!(clause.sentences, vec!["3. Force majeure.".to_string()]);
    }

    #[test]
    fn test_summary_with_unknown_format_is_skipped() {
        let row = DbDocumentSummary {
            id: 1,
            filename: "a.doc".into(),
            format: "doc".into(),
            created_at: "2026-01-01T00:00:00Z".into(),
            clause_count: 1,
            word_count: 1,
            original_reading_ease: None,
            simplified_word_count: None,
        };
        assert_eq!(row.into_summary(), None);
    }
}
