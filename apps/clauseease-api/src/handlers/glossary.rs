use axum::Json;
use clause_engine::{GlossaryEntry, GLOSSARY};

/// The static legal term glossary
pub async fn list_glossary() -> Json<&'static [GlossaryEntry]> {
    Json(GLOSSARY)
}
