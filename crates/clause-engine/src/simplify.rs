//! Plain-language rewriting of clause text

use clause_types::SimplificationLevel;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::preprocess::split_sentences;
use crate::EngineError;

/// Rewrites clause text into plainer language
pub trait Simplifier: Send + Sync {
    /// Name reported in logs
    fn name(&self) -> &str;

    /// Simplify one clause. Non-empty input always yields non-empty output.
    fn simplify(&self, text: &str, level: SimplificationLevel) -> Result<String, EngineError>;
}

/// Sentences longer than this are split at conjunctions at the advanced level
pub const ADVANCED_MAX_SENTENCE_WORDS: usize = 25;

/// Legalese replaced at every level. Longer phrases come first.
const PLAIN_PHRASES: &[(&str, &str)] = &[
    ("in the event that", "if"),
    ("in the event of", "if there is"),
    ("in accordance with", "under"),
    ("for the purpose of", "to"),
    ("with respect to", "about"),
    ("in the absence of", "without"),
    ("at such time as", "when"),
    ("by virtue of", "because of"),
    ("in lieu of", "instead of"),
    ("pursuant to", "under"),
    ("prior to", "before"),
    ("subsequent to", "after"),
    ("inter alia", "among other things"),
    ("mutatis mutandis", "with the necessary changes"),
    ("shall mean", "means"),
    ("notwithstanding", "despite"),
    ("hereinafter", "from now on"),
    ("hereunder", "under this agreement"),
    ("hereto", "to this agreement"),
    ("hereof", "of this agreement"),
    ("herein", "in this agreement"),
    ("thereof", "of it"),
    ("thereto", "to it"),
    ("therein", "in it"),
    ("whereby", "by which"),
    ("aforementioned", "mentioned"),
    ("aforesaid", "mentioned"),
    ("forthwith", "immediately"),
    ("commence", "start"),
    ("commences", "starts"),
    ("utilize", "use"),
    ("endeavour", "try"),
    ("endeavor", "try"),
    ("cease", "stop"),
    ("shall", "must"),
];

/// Redundant legal doublets collapsed from the intermediate level up
const DOUBLETS: &[(&str, &str)] = &[
    ("null and void", "void"),
    ("terms and conditions", "terms"),
    ("full force and effect", "full effect"),
    ("any and all", "all"),
    ("each and every", "every"),
    ("cease and desist", "stop"),
    ("due and payable", "due"),
    ("free and clear", "free"),
    ("true and correct", "true"),
    ("unless and until", "until"),
    ("by and between", "between"),
    ("final and binding", "binding"),
    ("fit and proper", "suitable"),
    ("goods and chattels", "goods"),
];

lazy_static! {
    static ref PLAIN_PATTERNS: Vec<(Regex, &'static str)> = compile(PLAIN_PHRASES);
    static ref DOUBLET_PATTERNS: Vec<(Regex, &'static str)> = compile(DOUBLETS);

    static ref PARENTHETICAL: Regex = Regex::new(r"\s*\([^()]*\)").unwrap();
    static ref CONJUNCTION_BREAK: Regex =
        Regex::new(r"(?i),\s+(and|but|provided\s+that)\s+").unwrap();
    static ref SPACE_BEFORE_PUNCT: Regex = Regex::new(r"\s+([,.;:!?])").unwrap();
    static ref MULTI_SPACE: Regex = Regex::new(r"\s{2,}").unwrap();
}

fn compile(pairs: &[(&'static str, &'static str)]) -> Vec<(Regex, &'static str)> {
    pairs
        .iter()
        .map(|(phrase, plain)| {
            let body = phrase.replace(' ', r"\s+");
            (Regex::new(&format!(r"(?i)\b{}\b", body)).unwrap(), *plain)
        })
        .collect()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replace each phrase, keeping a leading capital when the match had one
fn replace_phrases(text: &str, patterns: &[(Regex, &'static str)]) -> String {
    let mut out = text.to_string();
    for (pattern, plain) in patterns {
        out = pattern
            .replace_all(&out, |caps: &Captures| {
                let matched = &caps[0];
                if matched.chars().next().is_some_and(char::is_uppercase) {
                    capitalize_first(plain)
                } else {
                    plain.to_string()
                }
            })
            .into_owned();
    }
    out
}

fn tidy(text: &str) -> String {
    let text = SPACE_BEFORE_PUNCT.replace_all(text, "$1");
    MULTI_SPACE.replace_all(&text, " ").trim().to_string()
}

/// Make a fragment read as a sentence: capitalised, ending in punctuation
fn as_sentence(fragment: &str) -> Option<String> {
    let fragment = fragment.trim().trim_end_matches([',', ';', ':']).trim();
    if fragment.is_empty() {
        return None;
    }
    let mut sentence = capitalize_first(fragment);
    if !sentence.ends_with(['.', '!', '?', '"', '\'', ')']) {
        sentence.push('.');
    }
    Some(sentence)
}

fn split_on_semicolons(sentence: &str) -> Vec<String> {
    if !sentence.contains(';') {
        return vec![sentence.to_string()];
    }
    sentence.split(';').filter_map(as_sentence).collect()
}

fn split_long_sentence(sentence: &str) -> Vec<String> {
    if sentence.split_whitespace().count() <= ADVANCED_MAX_SENTENCE_WORDS {
        return vec![sentence.to_string()];
    }

    let mut pieces = Vec::new();
    let mut rest_start = 0;
    let mut lead = "";
    for caps in CONJUNCTION_BREAK.captures_iter(sentence) {
        let (Some(whole), Some(conjunction)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let piece = format!("{}{}", lead, &sentence[rest_start..whole.start()]);
        pieces.extend(as_sentence(&piece));
        lead = match conjunction.as_str().to_lowercase().as_str() {
            "but" => "but ",
            "and" => "",
            _ => "this applies only if ",
        };
        rest_start = whole.end();
    }
    let tail = format!("{}{}", lead, &sentence[rest_start..]);
    pieces.extend(as_sentence(&tail));
    pieces
}

/// Rewrite a single sentence at the given level. May return several sentences.
pub fn simplify_sentence(sentence: &str, level: SimplificationLevel) -> Vec<String> {
    let mut text = sentence.to_string();

    if level != SimplificationLevel::Basic {
        text = replace_phrases(&text, &DOUBLET_PATTERNS);
    }
    if level == SimplificationLevel::Advanced {
        text = PARENTHETICAL.replace_all(&text, "").into_owned();
    }
    text = tidy(&replace_phrases(&text, &PLAIN_PATTERNS));

    let mut sentences = match level {
        SimplificationLevel::Basic => vec![text],
        SimplificationLevel::Intermediate => split_on_semicolons(&text),
        SimplificationLevel::Advanced => split_on_semicolons(&text)
            .iter()
            .flat_map(|s| split_long_sentence(s))
            .collect(),
    };
    sentences.retain(|s| !s.trim().is_empty());
    sentences
}

/// Rule-based simplifier working sentence by sentence
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainLanguageSimplifier;

impl PlainLanguageSimplifier {
    /// Infallible form of [`Simplifier::simplify`]
    pub fn rewrite(&self, text: &str, level: SimplificationLevel) -> String {
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }

        let rewritten = split_sentences(text)
            .iter()
            .flat_map(|sentence| simplify_sentence(sentence, level))
            .collect::<Vec<_>>()
            .join(" ");

        if rewritten.trim().is_empty() {
            text.to_string()
        } else {
            rewritten
        }
    }
}

impl Simplifier for PlainLanguageSimplifier {
    fn name(&self) -> &str {
        "plain-language"
    }

    fn simplify(&self, text: &str, level: SimplificationLevel) -> Result<String, EngineError> {
        Ok(self.rewrite(text, level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn simplify(text: &str, level: SimplificationLevel) -> String {
        PlainLanguageSimplifier.simplify(text, level).unwrap()
    }

    #[test]
    fn test_basic_replaces_legalese_and_keeps_capitals() {
        let text = "Notwithstanding the above, the Tenant shall pay rent pursuant to Schedule A herein.";
        assert_eq!(
            simplify(text, SimplificationLevel::Basic),
            "Despite the above, the Tenant must pay rent under Schedule A in this agreement."
        );
    }

    #[test]
    fn test_basic_leaves_doublets_and_semicolons() {
        let text = "Any and all claims are null and void; no refund applies.";
        assert_eq!(simplify(text, SimplificationLevel::Basic), text);
    }

    #[test]
    fn test_whole_words_only() {
        let text = "The thereofore clause and the hereinabove list stay.";
        assert_eq!(simplify(text, SimplificationLevel::Basic), text);
    }

    #[test]
    fn test_intermediate_collapses_doublets_and_splits_semicolons() {
        let text = "Any and all claims are null and void; the terms and conditions remain in full force and effect.";
        assert_eq!(
            simplify(text, SimplificationLevel::Intermediate),
            "All claims are void. The terms remain in full effect."
        );
    }

    #[test]
    fn test_advanced_drops_parentheticals() {
        let text = "The Supplier (as defined in Schedule 1) shall deliver the goods.";
        assert_eq!(
            simplify(text, SimplificationLevel::Advanced),
            "The Supplier must deliver the goods."
        );
    }

    #[test]
    fn test_advanced_splits_long_sentences_at_conjunctions() {
        let text = "The Contractor shall deliver all of the materials listed in the first schedule to the site before the agreed date, and the Employer shall inspect every one of them within five working days, provided that access to the site is granted.";
        let result = simplify(text, SimplificationLevel::Advanced);
        assert_eq!(
            result,
            "The Contractor must deliver all of the materials listed in the first schedule to the site before the agreed date. The Employer must inspect every one of them within five working days. This applies only if access to the site is granted."
        );
    }

    #[test]
    fn test_short_sentences_are_not_split() {
        let text = "Fees are due monthly, and late fees apply.";
        assert_eq!(
            simplify(text, SimplificationLevel::Advanced),
            "Fees are due monthly, and late fees apply."
        );
    }

    #[test]
    fn test_output_never_empty_for_non_empty_input() {
        assert_eq!(simplify("(see annex)", SimplificationLevel::Advanced), "(see annex)");
        assert_eq!(simplify(";;", SimplificationLevel::Intermediate), ";;");
        assert_eq!(simplify("   ", SimplificationLevel::Basic), "");
    }

    #[test]
    fn test_levels_get_progressively_shorter() {
        let text = "Notwithstanding anything herein (including Schedule 2), any and all fees shall be due and payable prior to delivery; the Buyer shall pay them in accordance with the invoice.";
        let basic = simplify(text, SimplificationLevel::Basic);
        let intermediate = simplify(text, SimplificationLevel::Intermediate);
        let advanced = simplify(text, SimplificationLevel::Advanced);
        assert!(intermediate.len() < basic.len());
        assert!(advanced.len() < intermediate.len());
    }
}
