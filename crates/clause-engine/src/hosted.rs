//! Hosted-model backends for clause classification and simplification.
//!
//! Both talk to a Hugging Face compatible inference endpoint
//! (`POST {base_url}/models/{model}` with `{"inputs": ...}`) over a blocking
//! HTTP client, so they must run off the async runtime. Any failure falls
//! back to the rule-based implementation for that clause or sentence.

use std::sync::Arc;
use std::time::Duration;

use clause_types::{ClauseCategory, SimplificationLevel};
use serde_json::{json, Value};
use tracing::warn;

use crate::classify::{ClauseClassifier, KeywordClassifier};
use crate::preprocess::split_sentences;
use crate::simplify::{PlainLanguageSimplifier, Simplifier};
use crate::{EngineError, DEFAULT_INFERENCE_URL};

pub const DEFAULT_CLAUSE_MODEL: &str = "nlpaueb/legal-bert-base-uncased";
pub const DEFAULT_SIMPLIFIER_MODEL: &str = "facebook/bart-large-cnn";

/// Clauses with this many words or fewer skip the model
const MIN_MODEL_WORDS: usize = 10;
/// Sentences shorter than this skip the model
const MIN_MODEL_SENTENCE_CHARS: usize = 20;
const MIN_SUMMARY_TOKENS: usize = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the inference endpoint
pub struct InferenceClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl InferenceClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, EngineError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EngineError::Inference(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn query(&self, model: &str, body: &Value) -> Result<Value, EngineError> {
        let url = format!("{}/models/{}", self.base_url, model);
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| EngineError::Inference(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(EngineError::Inference(format!("{}: {}", status, detail)));
        }
        response
            .json::<Value>()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))
    }
}

/// Highest-scoring label from a text-classification response.
///
/// Accepts both `[{label, score}, ...]` and `[[{label, score}, ...]]`.
pub fn best_label(response: &Value) -> Option<&str> {
    let outer = response.as_array()?;
    let candidates = match outer.first()? {
        Value::Array(inner) => inner,
        _ => outer,
    };
    candidates
        .iter()
        .filter_map(|c| {
            let label = c.get("label")?.as_str()?;
            let score = c.get("score").and_then(Value::as_f64).unwrap_or(0.0);
            Some((label, score))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, _)| label)
}

/// Map a model label (`LABEL_4` or a category name) onto a category
pub fn category_for_label(label: &str) -> ClauseCategory {
    if let Some(index) = label
        .strip_prefix("LABEL_")
        .and_then(|n| n.parse::<usize>().ok())
    {
        return ClauseCategory::from_index(index);
    }
    ClauseCategory::from_label(label).unwrap_or(ClauseCategory::Other)
}

/// Clause classifier backed by a hosted sequence-classification model
pub struct HostedClassifier {
    client: Arc<InferenceClient>,
    model: String,
    fallback: KeywordClassifier,
}

impl HostedClassifier {
    pub fn new(client: Arc<InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            fallback: KeywordClassifier,
        }
    }

    fn query(&self, text: &str) -> Result<ClauseCategory, EngineError> {
        let response = self.client.query(&self.model, &json!({ "inputs": text }))?;
        let label = best_label(&response)
            .ok_or_else(|| EngineError::InvalidResponse(response.to_string()))?;
        Ok(category_for_label(label))
    }
}

impl ClauseClassifier for HostedClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    fn classify(&self, text: &str) -> Result<ClauseCategory, EngineError> {
        if text.trim().is_empty() {
            return Ok(ClauseCategory::Other);
        }
        match self.query(text) {
            Ok(category) => Ok(category),
            Err(e) => {
                warn!(model = %self.model, error = %e, "hosted classification failed, using keyword rules");
                self.fallback.classify(text)
            }
        }
    }
}

/// Target summary length relative to the input, by level
pub fn length_ratio(level: SimplificationLevel) -> f64 {
    match level {
        SimplificationLevel::Basic => 0.85,
        SimplificationLevel::Intermediate => 0.70,
        SimplificationLevel::Advanced => 0.55,
    }
}

/// Maximum summary length for a sentence of `words` words
pub fn max_summary_length(words: usize, level: SimplificationLevel) -> usize {
    ((words as f64 * length_ratio(level)) as usize).clamp(15, 50)
}

/// Model output is kept only when it is neither trivial nor much longer
/// than the sentence it replaces
pub fn accept_output(output: &str, input: &str) -> bool {
    let len = output.chars().count();
    len > 5 && (len as f64) <= input.chars().count() as f64 * 1.5
}

/// Sentence-level simplifier backed by a hosted summarisation model
pub struct HostedSimplifier {
    client: Arc<InferenceClient>,
    model: String,
    fallback: PlainLanguageSimplifier,
}

impl HostedSimplifier {
    pub fn new(client: Arc<InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            fallback: PlainLanguageSimplifier,
        }
    }

    fn summarize(&self, sentence: &str, level: SimplificationLevel) -> Result<String, EngineError> {
        let words = sentence.split_whitespace().count();
        let body = json!({
            "inputs": sentence,
            "parameters": {
                "max_length": max_summary_length(words, level),
                "min_length": MIN_SUMMARY_TOKENS,
                "do_sample": false,
                "truncation": "only_first",
            },
        });
        let response = self.client.query(&self.model, &body)?;
        response
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| item.get("summary_text"))
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| EngineError::InvalidResponse(response.to_string()))
    }

    fn simplify_sentence(&self, sentence: &str, level: SimplificationLevel) -> String {
        if sentence.chars().count() < MIN_MODEL_SENTENCE_CHARS {
            return self.fallback.rewrite(sentence, level);
        }
        match self.summarize(sentence, level) {
            Ok(summary) => {
                let summary = match level {
                    SimplificationLevel::Basic => summary,
                    _ => self.fallback.rewrite(&summary, level),
                };
                if accept_output(&summary, sentence) {
                    summary
                } else {
                    self.fallback.rewrite(sentence, level)
                }
            }
            Err(e) => {
                warn!(model = %self.model, error = %e, "hosted simplification failed, using rules");
                self.fallback.rewrite(sentence, level)
            }
        }
    }
}

impl Simplifier for HostedSimplifier {
    fn name(&self) -> &str {
        &self.model
    }

    fn simplify(&self, text: &str, level: SimplificationLevel) -> Result<String, EngineError> {
        let text = text.trim();
        if text.split_whitespace().count() <= MIN_MODEL_WORDS {
            return Ok(self.fallback.rewrite(text, level));
        }
        let rewritten = split_sentences(text)
            .iter()
            .map(|sentence| self.simplify_sentence(sentence, level))
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if rewritten.is_empty() {
            Ok(text.to_string())
        } else {
            Ok(rewritten)
        }
    }
}
