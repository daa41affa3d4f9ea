//! SQLite queries
//!
//! Timestamps are stored as RFC 3339 UTC strings with second precision, so
//! lexical order is chronological and `substr(created_at, 1, 10)` is the day.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};
use clause_engine::Analysis;
use clause_types::{
    summarize_categories, DocumentFormat, DocumentReport, DocumentSummary, LegalTermMatch,
    ReadabilityReport, SimplificationLevel,
};
use sqlx::sqlite::SqlitePool;

use crate::error::ApiError;
use crate::models::*;

pub const TOP_USERS_LIMIT: i64 = 5;
pub const REGISTRATION_WINDOW_DAYS: i64 = 7;
pub const DOCUMENT_WINDOW_WEEKS: i64 = 4;

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Monday of the calendar week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

// Users and sessions

pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    created_at: &str,
) -> Result<DbUser, ApiError> {
    let id = sqlx::query(
        "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(created_at)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(DbUser {
        id,
        username: username.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at: created_at.to_string(),
    })
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<DbUser>, ApiError> {
    Ok(sqlx::query_as(
        "SELECT id, username, email, password_hash, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?)
}

pub async fn find_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<DbUser>, ApiError> {
    Ok(sqlx::query_as(
        "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool, ApiError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn create_session(
    pool: &SqlitePool,
    session_id: &str,
    user_id: i64,
    created_at: &str,
    expires_at: &str,
) -> Result<(), ApiError> {
    sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(session_id)
        .bind(user_id)
        .bind(created_at)
        .bind(expires_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// The session exists, belongs to the user and has not expired at `now`
pub async fn session_is_active(
    pool: &SqlitePool,
    session_id: &str,
    user_id: i64,
    now: &str,
) -> Result<bool, ApiError> {
    let found: Option<String> = sqlx::query_scalar(
        "SELECT id FROM sessions WHERE id = ? AND user_id = ? AND expires_at > ?",
    )
    .bind(session_id)
    .bind(user_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Drop the user's sessions that expired at or before `now`
pub async fn purge_expired_sessions(
    pool: &SqlitePool,
    user_id: i64,
    now: &str,
) -> Result<u64, ApiError> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = ? AND expires_at <= ?")
        .bind(user_id)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count_sessions(pool: &SqlitePool, user_id: i64) -> Result<i64, ApiError> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?,
    )
}

pub async fn delete_session(pool: &SqlitePool, session_id: &str) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(())
}

// Documents

/// Metadata of an upload being stored alongside its analysis
pub struct NewDocument<'a> {
    pub user_id: i64,
    pub filename: &'a str,
    pub format: DocumentFormat,
    pub level: SimplificationLevel,
    pub raw_text: &'a str,
    pub created_at: &'a str,
}

/// Store a document with its clauses, terms and both readability reports
/// in one transaction. Returns the new document id.
pub async fn insert_document(
    pool: &SqlitePool,
    doc: &NewDocument<'_>,
    analysis: &Analysis,
) -> Result<i64, ApiError> {
    let mut tx = pool.begin().await?;

    let document_id = sqlx::query(
        r#"
        INSERT INTO documents (user_id, filename, format, simplification_level, raw_text,
                               simplified_text, word_count, clause_count, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(doc.user_id)
    .bind(doc.filename)
    .bind(doc.format.as_str())
    .bind(doc.level.as_str())
    .bind(doc.raw_text)
    .bind(&analysis.simplified_text)
    .bind(i64::from(analysis.word_count))
    .bind(analysis.clauses.len() as i64)
    .bind(doc.created_at)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for clause in &analysis.clauses {
        let sentences_json =
            serde_json::to_string(&clause.sentences).map_err(|e| ApiError::Internal(e.into()))?;
        sqlx::query(
            r#"
            INSERT INTO clauses (document_id, clause_index, category, original_text,
                                 cleaned_text, sentences_json, simplified_text)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(document_id)
        .bind(i64::from(clause.index))
        .bind(clause.category.as_str())
        .bind(&clause.original_text)
        .bind(&clause.cleaned_text)
        .bind(&sentences_json)
        .bind(&clause.simplified_text)
        .execute(&mut *tx)
        .await?;
    }

    for (position, term) in analysis.legal_terms.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO document_terms (document_id, position, term, category, definition, occurrences)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(document_id)
        .bind(position as i64)
        .bind(&term.term)
        .bind(&term.category)
        .bind(&term.definition)
        .bind(i64::from(term.occurrences))
        .execute(&mut *tx)
        .await?;
    }

    for (kind, report) in [
        ("original", &analysis.original_readability),
        ("simplified", &analysis.simplified_readability),
    ] {
        sqlx::query(
            r#"
            INSERT INTO readability_reports (document_id, kind, sentence_count, word_count,
                syllable_count, complex_word_count, avg_words_per_sentence,
                avg_syllables_per_word, flesch_reading_ease, flesch_kincaid_grade)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(document_id)
        .bind(kind)
        .bind(i64::from(report.sentence_count))
        .bind(i64::from(report.word_count))
        .bind(i64::from(report.syllable_count))
        .bind(i64::from(report.complex_word_count))
        .bind(report.avg_words_per_sentence)
        .bind(report.avg_syllables_per_word)
        .bind(report.flesch_reading_ease)
        .bind(report.flesch_kincaid_grade)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        document_id,
        clauses = analysis.clauses.len(),
        terms = analysis.legal_terms.len(),
        "Stored document"
    );
    Ok(document_id)
}

/// Rebuild a stored document's report. `None` when the document does not
/// exist or belongs to someone else.
pub async fn load_report(
    pool: &SqlitePool,
    user_id: i64,
    document_id: i64,
) -> Result<Option<DocumentReport>, ApiError> {
    let document: Option<DbDocument> = sqlx::query_as(
        r#"
        SELECT id, filename, format, simplification_level, raw_text, simplified_text,
               word_count, clause_count, created_at
        FROM documents
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(document_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(document) = document else {
        return Ok(None);
    };

    let clauses = sqlx::query_as::<_, DbClause>(
        r#"
        SELECT clause_index, category, original_text, cleaned_text, sentences_json, simplified_text
        FROM clauses
        WHERE document_id = ?
        ORDER BY clause_index
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(DbClause::into_clause)
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| ApiError::Internal(e.into()))?;

    let legal_terms: Vec<LegalTermMatch> = sqlx::query_as::<_, DbTerm>(
        r#"
        SELECT term, category, definition, occurrences
        FROM document_terms
        WHERE document_id = ?
        ORDER BY position
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

    let readability: Vec<DbReadability> = sqlx::query_as(
        r#"
        SELECT kind, sentence_count, word_count, syllable_count, complex_word_count,
               avg_words_per_sentence, avg_syllables_per_word, flesch_reading_ease,
               flesch_kincaid_grade
        FROM readability_reports
        WHERE document_id = ?
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    let mut original_readability = ReadabilityReport::default();
    let mut simplified_readability = ReadabilityReport::default();
    for row in readability {
        if row.kind == "original" {
            original_readability = row.into();
        } else if row.kind == "simplified" {
            simplified_readability = row.into();
        }
    }

    let format = DocumentFormat::from_extension(&document.format).ok_or_else(|| {
        ApiError::Internal(anyhow::anyhow!(
            "document {} has unknown format {:?}",
            document.id,
            document.format
        ))
    })?;
    let simplification_level: SimplificationLevel = document
        .simplification_level
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;

    Ok(Some(DocumentReport {
        document_id: document.id,
        filename: document.filename,
        format,
        simplification_level,
        created_at: document.created_at,
        word_count: document.word_count as u32,
        clause_count: document.clause_count as u32,
        raw_text: document.raw_text,
        simplified_text: document.simplified_text,
        clause_type_summary: summarize_categories(&clauses),
        clauses,
        legal_terms,
        original_readability,
        simplified_readability,
    }))
}

/// A user's documents, newest first
pub async fn list_documents(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<DocumentSummary>, ApiError> {
    let rows: Vec<DbDocumentSummary> = sqlx::query_as(
        r#"
        SELECT d.id, d.filename, d.format, d.created_at, d.clause_count, d.word_count,
               o.flesch_reading_ease AS original_reading_ease,
               s.word_count AS simplified_word_count
        FROM documents d
        LEFT JOIN readability_reports o ON o.document_id = d.id AND o.kind = 'original'
        LEFT JOIN readability_reports s ON s.document_id = d.id AND s.kind = 'simplified'
        WHERE d.user_id = ?
        ORDER BY d.created_at DESC, d.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(DbDocumentSummary::into_summary)
        .collect())
}

/// Delete a user's document and everything derived from it.
/// Returns `false` when there was nothing of theirs to delete.
pub async fn delete_document(
    pool: &SqlitePool,
    user_id: i64,
    document_id: i64,
) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM documents WHERE id = ? AND user_id = ?")
        .bind(document_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_clauses(pool: &SqlitePool, document_id: i64) -> Result<i64, ApiError> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(*) FROM clauses WHERE document_id = ?")
            .bind(document_id)
            .fetch_one(pool)
            .await?,
    )
}

// Admin

pub async fn admin_stats(pool: &SqlitePool, today: NaiveDate) -> Result<AdminStats, ApiError> {
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    let total_documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(pool)
        .await?;
    let active_users_today: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT user_id) FROM documents WHERE substr(created_at, 1, 10) = ?",
    )
    .bind(day(today))
    .fetch_one(pool)
    .await?;

    let top: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT u.username, COUNT(d.id) AS documents
        FROM users u
        LEFT JOIN documents d ON d.user_id = u.id
        GROUP BY u.id
        ORDER BY documents DESC, u.username ASC
        LIMIT ?
        "#,
    )
    .bind(TOP_USERS_LIMIT)
    .fetch_all(pool)
    .await?;
    let top_users = top
        .into_iter()
        .map(|(username, documents)| ActiveUser {
            username,
            documents,
            activity_level: ActivityLevel::from_document_count(documents),
        })
        .collect();

    let first_day = today - Duration::days(REGISTRATION_WINDOW_DAYS - 1);
    let mut registrations_last_7_days: BTreeMap<String, i64> = (0..REGISTRATION_WINDOW_DAYS)
        .map(|offset| (day(first_day + Duration::days(offset)), 0))
        .collect();
    let per_day: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT substr(created_at, 1, 10) AS day, COUNT(*)
        FROM users
        WHERE substr(created_at, 1, 10) BETWEEN ? AND ?
        GROUP BY day
        "#,
    )
    .bind(day(first_day))
    .bind(day(today))
    .fetch_all(pool)
    .await?;
    for (date, count) in per_day {
        registrations_last_7_days.insert(date, count);
    }

    let first_week = week_start(today) - Duration::weeks(DOCUMENT_WINDOW_WEEKS - 1);
    let mut documents_last_4_weeks: BTreeMap<String, i64> = (0..DOCUMENT_WINDOW_WEEKS)
        .map(|offset| (day(first_week + Duration::weeks(offset)), 0))
        .collect();
    let per_week: Vec<(String, i64)> = sqlx::query_as(
        r#"
        -- 'weekday 0' moves to the Sunday ending the week, six days back is its Monday
        SELECT date(substr(created_at, 1, 10), 'weekday 0', '-6 days') AS week, COUNT(*)
        FROM documents
        WHERE substr(created_at, 1, 10) BETWEEN ? AND ?
        GROUP BY week
        "#,
    )
    .bind(day(first_week))
    .bind(day(today))
    .fetch_all(pool)
    .await?;
    for (week, count) in per_week {
        documents_last_4_weeks.insert(week, count);
    }

    Ok(AdminStats {
        total_users,
        total_documents,
        active_users_today,
        top_users,
        registrations_last_7_days,
        documents_last_4_weeks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_week_start_is_monday() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        for offset in 0..7 {
            assert_eq!(week_start(monday + Duration::days(offset)), monday);
        }
        assert_eq!(
            week_start(monday - Duration::days(1)),
            NaiveDate::from_ymd_opt(2026, 10, 5).unwrap()
        );
    }
}
