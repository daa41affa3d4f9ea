//! End-to-end analysis of one contract

use std::collections::BTreeMap;

use clause_types::{
    summarize_categories, Clause, LegalTermMatch, ReadabilityReport, SimplificationLevel,
};
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::classify::{ClauseClassifier, KeywordClassifier};
use crate::preprocess::{clean_text, document_body, segment_body};
use crate::readability::measure;
use crate::simplify::{PlainLanguageSimplifier, Simplifier};
use crate::terms::extract_legal_terms;
use crate::EngineError;

/// Result of running the pipeline over a document's text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Words in the original text
    pub word_count: u32,
    pub clauses: Vec<Clause>,
    pub legal_terms: Vec<LegalTermMatch>,
    pub original_readability: ReadabilityReport,
    pub simplified_readability: ReadabilityReport,
    pub clause_type_summary: BTreeMap<String, u32>,
    /// Simplified clauses joined by blank lines, in document order
    pub simplified_text: String,
}

/// Preprocess, classify, extract terms, simplify and score a contract.
///
/// Stages run one after another on the calling thread.
pub struct Pipeline {
    classifier: Box<dyn ClauseClassifier>,
    simplifier: Box<dyn Simplifier>,
}

impl Pipeline {
    pub fn new(classifier: Box<dyn ClauseClassifier>, simplifier: Box<dyn Simplifier>) -> Self {
        Self {
            classifier,
            simplifier,
        }
    }

    /// Keyword classifier and plain-language simplifier
    pub fn rule_based() -> Self {
        Self::new(Box::new(KeywordClassifier), Box::new(PlainLanguageSimplifier))
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn simplifier_name(&self) -> &str {
        self.simplifier.name()
    }

    pub fn run(&self, raw_text: &str, level: SimplificationLevel) -> Result<Analysis, EngineError> {
        let span = info_span!(
            "pipeline",
            classifier = self.classifier.name(),
            simplifier = self.simplifier.name(),
            %level
        );
        let _enter = span.enter();

        let body = document_body(raw_text);
        let prepared = segment_body(&body);
        if prepared.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        debug!(clauses = prepared.len(), "preprocessed");

        let mut clauses = Vec::with_capacity(prepared.len());
        for (position, clause) in prepared.into_iter().enumerate() {
            let category = self.classifier.classify(&clause.cleaned_text)?;
            clauses.push(Clause {
                index: position as u32 + 1,
                category,
                original_text: clause.raw_text,
                cleaned_text: clause.cleaned_text,
                sentences: clause.sentences,
                simplified_text: String::new(),
            });
        }
        let clause_type_summary = summarize_categories(&clauses);
        debug!(?clause_type_summary, "classified");

        let full_text = clean_text(&body);
        let legal_terms = extract_legal_terms(&full_text);

        for clause in &mut clauses {
            let simplified = self.simplifier.simplify(&clause.cleaned_text, level)?;
            clause.simplified_text = if simplified.trim().is_empty() {
                clause.cleaned_text.clone()
            } else {
                simplified
            };
        }

        let simplified_text = clauses
            .iter()
            .map(|c| c.simplified_text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let original_readability = measure(&full_text);
        let simplified_readability = measure(&simplified_text);

        info!(
            clauses = clauses.len(),
            terms = legal_terms.len(),
            words = original_readability.word_count,
            reading_ease = original_readability.flesch_reading_ease,
            simplified_reading_ease = simplified_readability.flesch_reading_ease,
            "analysis complete"
        );

        Ok(Analysis {
            word_count: original_readability.word_count,
            clauses,
            legal_terms,
            original_readability,
            simplified_readability,
            clause_type_summary,
            simplified_text,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::rule_based()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clause_types::ClauseCategory;
    use pretty_assertions::assert_eq;

    const CONTRACT: &str = "SERVICES AGREEMENT\n\
        This Agreement is made between Acme Ltd and Beta LLC.\n\
        1. Confidentiality. The Recipient shall keep all Confidential Information secret.\n\
        2. Payment Terms. The Client shall pay each invoice pursuant to Schedule B within thirty days.\n\
        3. Termination. Either party may terminate this Agreement upon written notice.\n\
        4. Governing Law. The governing law of this Agreement is the law of England.";

    #[test]
    fn test_rule_based_pipeline_end_to_end() {
        let analysis = Pipeline::rule_based()
            .run(CONTRACT, SimplificationLevel::Basic)
            .unwrap();

        let categories: Vec<ClauseCategory> = analysis.clauses.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![
                ClauseCategory::Other,
                ClauseCategory::Confidentiality,
                ClauseCategory::PaymentTerms,
                ClauseCategory::Termination,
                ClauseCategory::GoverningLaw,
            ]
        );
        let indexes: Vec<u32> = analysis.clauses.iter().map(|c| c.index).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4, 5]);

        assert!(analysis.clauses[2]
            .simplified_text
            .contains("must pay each invoice under Schedule B"));
        assert_eq!(analysis.clause_type_summary.values().sum::<u32>(), 5);
        assert!(analysis
            .legal_terms
            .iter()
            .any(|t| t.term == "Governing Law"));
        assert_eq!(analysis.word_count, analysis.original_readability.word_count);
        assert!(analysis.word_count > 40);
    }

    #[test]
    fn test_every_clause_gets_simplified_text() {
        let analysis = Pipeline::rule_based()
            .run(CONTRACT, SimplificationLevel::Advanced)
            .unwrap();
        for clause in &analysis.clauses {
            assert!(!clause.simplified_text.trim().is_empty());
        }
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let result = Pipeline::rule_based().run(" \n ", SimplificationLevel::Basic);
        assert!(matches!(result, Err(EngineError::EmptyInput)));
    }

    #[test]
    fn test_running_headers_do_not_reach_terms_or_readability() {
        let raw = "ACME INDEMNITY HOLD HARMLESS HEADER\n\
            1. Payment Terms. The Client shall pay each invoice within thirty days.\n\
            Page 1 of 3\u{000C}ACME INDEMNITY HOLD HARMLESS HEADER\n\
            2. Termination. Either party may terminate on written notice.\n\
            Page 2 of 3\u{000C}ACME INDEMNITY HOLD HARMLESS HEADER\n\
            3. Governing Law. The law of England governs this Agreement.\n\
            Page 3 of 3";
        let analysis = Pipeline::rule_based()
            .run(raw, SimplificationLevel::Basic)
            .unwrap();

        let terms: Vec<&str> = analysis.legal_terms.iter().map(|t| t.term.as_str()).collect();
        assert!(!terms.contains(&"Indemnity"), "{:?}", terms);
        assert!(!terms.contains(&"Hold Harmless"), "{:?}", terms);
        assert!(terms.contains(&"Governing Law"), "{:?}", terms);

        let clause_words: u32 = analysis
            .clauses
            .iter()
            .map(|c| measure(&c.cleaned_text).word_count)
            .sum();
        assert_eq!(analysis.original_readability.word_count, clause_words);
        assert!(analysis.clauses.iter().all(|c| !c.cleaned_text.contains("HEADER")));
    }

    struct BlankSimplifier;

    impl Simplifier for BlankSimplifier {
        fn name(&self) -> &str {
            "blank"
        }

        fn simplify(&self, _text: &str, _level: SimplificationLevel) -> Result<String, EngineError> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_blank_simplifier_output_falls_back_to_cleaned_text() {
        let pipeline = Pipeline::new(Box::new(KeywordClassifier), Box::new(BlankSimplifier));
        let analysis = pipeline.run(CONTRACT, SimplificationLevel::Basic).unwrap();
        for clause in &analysis.clauses {
            assert_eq!(clause.simplified_text, clause.cleaned_text);
        }
    }

    struct FailingClassifier;

    impl ClauseClassifier for FailingClassifier {
        fn name(&self) -> &str {
            "failing"
        }

        fn classify(&self, _text: &str) -> Result<ClauseCategory, EngineError> {
            Err(EngineError::Inference("offline".into()))
        }
    }

    #[test]
    fn test_classifier_errors_propagate() {
        let pipeline = Pipeline::new(Box::new(FailingClassifier), Box::new(PlainLanguageSimplifier));
        assert_eq!(pipeline.classifier_name(), "failing");
        let result = pipeline.run(CONTRACT, SimplificationLevel::Basic);
        assert!(matches!(result, Err(EngineError::Inference(_))));
    }
}
