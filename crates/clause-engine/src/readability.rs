//! Readability statistics: counts, Flesch reading ease and Flesch-Kincaid grade

use clause_types::ReadabilityReport;
use lazy_static::lazy_static;
use regex::Regex;

use crate::preprocess::split_sentences;

lazy_static! {
    /// Alphabetic words, allowing internal apostrophes and hyphens
    static ref WORD: Regex = Regex::new(r"[A-Za-z]+(?:['-][A-Za-z]+)*").unwrap();
}

const VOWELS: &[u8] = b"aeiouy";

/// Estimate syllables by counting vowel groups. A trailing silent `e` is
/// ignored and every word has at least one syllable.
pub fn count_syllables(word: &str) -> u32 {
    let word = word.to_ascii_lowercase();
    if word.len() <= 1 {
        return 1;
    }
    let word = word.strip_suffix('e').unwrap_or(word.as_str());

    let mut syllables = 0;
    let mut previous_was_vowel = false;
    for b in word.bytes() {
        let is_vowel = VOWELS.contains(&b);
        if is_vowel && !previous_was_vowel {
            syllables += 1;
        }
        previous_was_vowel = is_vowel;
    }
    syllables.max(1)
}

/// Three or more syllables, ignoring very short tokens
pub fn is_complex_word(word: &str) -> bool {
    word.len() > 2 && count_syllables(word) >= 3
}

/// Alphabetic words in the text
pub fn words(text: &str) -> Vec<&str> {
    WORD.find_iter(text).map(|m| m.as_str()).collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Measure a text sample. Empty text yields an all-zero report.
pub fn measure(text: &str) -> ReadabilityReport {
    let words = words(text);
    if words.is_empty() {
        return ReadabilityReport::default();
    }

    let sentence_count = split_sentences(text).len().max(1) as u32;
    let word_count = words.len() as u32;
    let syllable_count: u32 = words.iter().map(|w| count_syllables(w)).sum();
    let complex_word_count = words.iter().filter(|w| is_complex_word(w)).count() as u32;

    let words_per_sentence = word_count as f64 / sentence_count as f64;
    let syllables_per_word = syllable_count as f64 / word_count as f64;

    let reading_ease = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;

    ReadabilityReport {
        sentence_count,
        word_count,
        syllable_count,
        complex_word_count,
        avg_words_per_sentence: round2(words_per_sentence),
        avg_syllables_per_word: round2(syllables_per_word),
        flesch_reading_ease: round2(reading_ease.clamp(0.0, 100.0)),
        flesch_kincaid_grade: round2(grade.max(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_count_syllables() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("agreement"), 3);
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("indemnify"), 4);
        assert_eq!(count_syllables("a"), 1);
        assert_eq!(count_syllables("rhythm"), 1);
    }

    #[test]
    fn test_complex_words() {
        assert!(is_complex_word("confidential"));
        assert!(!is_complex_word("party"));
    }

    #[test]
    fn test_words_skip_numbers_and_punctuation() {
        assert_eq!(
            words("The Tenant's non-compete fee is $500, due 1 May."),
            vec!["The", "Tenant's", "non-compete", "fee", "is", "due", "May"]
        );
    }

    #[test]
    fn test_measure_simple_text() {
        let report = measure("The cat sat. The dog ran.");
        assert_eq!(report.sentence_count, 2);
        assert_eq!(report.word_count, 6);
        assert_eq!(report.syllable_count, 6);
        assert_eq!(report.complex_word_count, 0);
        assert_eq!(report.avg_words_per_sentence, 3.0);
        assert_eq!(report.avg_syllables_per_word, 1.0);
        // 206.835 - 3.045 - 84.6 = 119.19, clamped
        assert_eq!(report.flesch_reading_ease, 100.0);
        // 1.17 + 11.8 - 15.59 < 0
        assert_eq!(report.flesch_kincaid_grade, 0.0);
    }

    #[test]
    fn test_measure_dense_text_scores_low() {
        let text = "Notwithstanding the aforementioned indemnification obligations, the Licensee's aggregate liability hereunder shall not exceed the consideration previously remitted.";
        let report = measure(text);
        assert_eq!(report.sentence_count, 1);
        assert!(report.flesch_reading_ease < 30.0);
        assert!(report.flesch_kincaid_grade > 12.0);
        assert!(report.complex_word_count >= 6);
    }

    #[test]
    fn test_measure_empty() {
        assert_eq!(measure(""), ReadabilityReport::default());
        assert_eq!(measure("123 456 !!"), ReadabilityReport::default());
    }

    #[test]
    fn test_measure_is_deterministic() {
        let text = "Either party may terminate this Agreement with thirty days written notice.";
        assert_eq!(measure(text), measure(text));
    }
}
