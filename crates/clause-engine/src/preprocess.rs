//! Text preprocessing: layout normalisation, boilerplate removal,
//! clause segmentation and sentence splitting.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

/// Segments at or below this many characters are merged into the next one
pub const MIN_CLAUSE_CHARS: usize = 15;

/// Paragraphs at or below this many characters are merged when falling back
/// to paragraph segmentation
pub const MIN_PARAGRAPH_CHARS: usize = 20;

/// Header and footer candidates are short lines
const MAX_BOILERPLATE_LINE: usize = 60;

/// A line repeated this often is treated as a running header or footer
const BOILERPLATE_REPEATS: usize = 3;

/// Common abbreviations that end with a period but do not end a sentence
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "inc", "ltd", "co", "corp", "llc", "llp",
    "plc", "pvt", "no", "nos", "sec", "secs", "art", "arts", "para", "paras", "cl", "vs", "v",
    "e.g", "i.e", "cf", "viz", "approx", "ref", "vol", "pp", "fig", "dept", "govt", "u.s", "u.k",
    "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sept", "sep", "oct", "nov", "dec",
];

lazy_static! {
    /// Start of a clause: numbered headings, recitals and closing blocks
    static ref CLAUSE_MARKER: Regex = Regex::new(
        r#"(?m)^(?:\d+\.(?:\d+\.?)*\s+["A-Z]|\((?:[a-z]{1,4}|\d{1,3})\)\s+["A-Z]|(?i:article|section)\s+[0-9IVXLC]+\b|(?i:whereas)\b|(?i:now,?\s+therefore)\b|(?i:now\s+this\s+agreement\s+witnesseth)|(?i:witnesseth)\b|(?i:in\s+witness\s+whereof)\b|(?i:note):)"#
    )
    .unwrap();

    /// `Page 3`, `Page 3 of 10`, `- 4 -`, `12`
    static ref PAGE_NUMBER_LINE: Regex =
        Regex::new(r"^(?i:page\s+\d+(?:\s+of\s+\d+)?|-?\s*\d{1,4}\s*-?)$").unwrap();

    static ref BLANK_LINES: Regex = Regex::new(r"\n\s*\n").unwrap();
    static ref INLINE_WHITESPACE: Regex = Regex::new(r"[ \t\u{00A0}\u{000B}]+").unwrap();
    static ref ANY_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// A clause after preprocessing, ready for classification and simplification.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedClause {
    pub raw_text: String,
    pub cleaned_text: String,
    pub sentences: Vec<String>,
}

fn normalize_characters(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{00A0}' => ' ',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' => '\'',
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            other => other,
        })
        .collect()
}

/// Flatten text into a single normalised line.
///
/// Non-breaking spaces become spaces, carriage returns and form/vertical
/// feeds are dropped, smart quotes and dashes are replaced by their ASCII
/// forms, and whitespace runs collapse to one space.
pub fn clean_text(text: &str) -> String {
    let text: String = normalize_characters(text)
        .chars()
        .filter(|c| !matches!(c, '\r' | '\u{000C}' | '\u{000B}'))
        .collect();
    ANY_WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Normalise text while keeping its line structure.
///
/// Line endings become `\n`, form feeds become line breaks, whitespace
/// inside a line collapses, each line is trimmed and runs of blank lines
/// shrink to one.
pub fn normalize_layout(text: &str) -> String {
    let text = normalize_characters(text)
        .replace("\r\n", "\n")
        .replace(['\r', '\u{000C}'], "\n");

    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = INLINE_WHITESPACE.replace_all(line, " ");
        let line = line.trim();
        if line.is_empty() {
            blank_run += 1;
            if blank_run == 1 && !out.is_empty() {
                out.push('\n');
            }
            continue;
        }
        blank_run = 0;
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

/// Remove page numbers and running headers/footers from line-structured text.
pub fn strip_boilerplate(text: &str) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for line in text.lines().map(str::trim) {
        if !line.is_empty()
            && line.chars().count() <= MAX_BOILERPLATE_LINE
            && !CLAUSE_MARKER.is_match(line)
        {
            *counts.entry(line).or_insert(0) += 1;
        }
    }

    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let line = line.trim();
            if line.is_empty() {
                return true;
            }
            if PAGE_NUMBER_LINE.is_match(line) {
                return false;
            }
            counts.get(line).copied().unwrap_or(0) < BOILERPLATE_REPEATS
        })
        .collect();

    let removed = text.lines().count() - kept.len();
    if removed > 0 {
        tracing::debug!(removed, "stripped boilerplate lines");
    }
    kept.join("\n")
}

/// Split line-structured text into clauses.
///
/// Splits before clause markers (numbered headings, `ARTICLE`/`SECTION`,
/// recitals, witness blocks, notes). Without any marker the text falls back
/// to blank-line paragraphs, and then to a single clause. Short fragments
/// are merged into their neighbour so no text is lost.
pub fn segment_clauses(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut starts: Vec<usize> = CLAUSE_MARKER.find_iter(text).map(|m| m.start()).collect();

    let clauses = if starts.is_empty() {
        let paragraphs: Vec<&str> = BLANK_LINES.split(text).collect();
        tracing::debug!(
            paragraphs = paragraphs.len(),
            "no clause markers found, splitting on paragraphs"
        );
        merge_short_segments(paragraphs, MIN_PARAGRAPH_CHARS)
    } else {
        if starts[0] != 0 {
            starts.insert(0, 0);
        }
        starts.push(text.len());
        let segments: Vec<&str> = starts.windows(2).map(|w| &text[w[0]..w[1]]).collect();
        tracing::debug!(markers = segments.len(), "split text on clause markers");
        merge_short_segments(segments, MIN_CLAUSE_CHARS)
    };

    if clauses.is_empty() {
        vec![text.to_string()]
    } else {
        clauses
    }
}

/// Merge segments at or below `min_chars` into the following segment.
/// A short tail is appended to the previous clause.
fn merge_short_segments(segments: Vec<&str>, min_chars: usize) -> Vec<String> {
    let mut clauses: Vec<String> = Vec::new();
    let mut carry = String::new();

    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if !carry.is_empty() {
            carry.push('\n');
        }
        carry.push_str(segment);
        if carry.chars().count() > min_chars {
            clauses.push(std::mem::take(&mut carry));
        }
    }

    if !carry.is_empty() {
        match clauses.last_mut() {
            Some(last) => {
                last.push('\n');
                last.push_str(&carry);
            }
            None => clauses.push(carry),
        }
    }

    clauses
}

fn starts_sentence(c: char) -> bool {
    c.is_uppercase() || c.is_ascii_digit() || matches!(c, '"' | '\'' | '(' | '[')
}

/// Whether a period at the end of `preceding` belongs to an abbreviation,
/// an initial or a clause number rather than ending a sentence.
fn is_non_terminal_period(preceding: &str) -> bool {
    let token = preceding
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .trim_start_matches(['(', '"', '\'', '[']);
    if token.is_empty() {
        return false;
    }

    let lower = token.to_lowercase();
    if ABBREVIATIONS.contains(&lower.as_str()) {
        return true;
    }

    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_alphabetic() {
            return true;
        }
    }

    // Clause numbers: "2.1" anywhere, or "3" at the very start of the text
    if token.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return token.contains('.') || preceding.trim() == token;
    }

    false
}

/// Split text into sentences on `.`, `!` and `?`.
///
/// A terminator (with any closing quotes or brackets) ends a sentence only
/// when followed by whitespace and a character that can start a sentence.
/// Abbreviations, initials and clause numbers do not end a sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if !matches!(c, '.' | '!' | '?') {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?' | '"' | '\'' | ')' | ']') {
            j += 1;
        }

        if j < chars.len() && chars[j].1.is_whitespace() {
            let mut k = j;
            while k < chars.len() && chars[k].1.is_whitespace() {
                k += 1;
            }
            let boundary = k < chars.len()
                && starts_sentence(chars[k].1)
                && !(c == '.' && is_non_terminal_period(&text[start..pos]));
            if boundary {
                let sentence = text[start..chars[j].0].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = chars[k].0;
                i = k;
                continue;
            }
        }
        i = j;
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Clean and split a single clause.
pub fn preprocess_clause(raw: &str) -> PreprocessedClause {
    let cleaned_text = clean_text(raw);
    let sentences = split_sentences(&cleaned_text);
    PreprocessedClause {
        raw_text: raw.to_string(),
        cleaned_text,
        sentences,
    }
}

/// The line-structured contract body with page numbers and running
/// headers/footers removed. Text made only of boilerplate is kept as is.
pub fn document_body(raw_text: &str) -> String {
    let layout = normalize_layout(raw_text);
    let stripped = strip_boilerplate(&layout);
    if stripped.trim().is_empty() {
        layout
    } else {
        stripped
    }
}

/// Preprocess a whole contract into clauses in document order.
///
/// Returns an empty list only when the input has no visible text.
pub fn preprocess(raw_text: &str) -> Vec<PreprocessedClause> {
    segment_body(&document_body(raw_text))
}

/// Split an already stripped body into preprocessed clauses
pub fn segment_body(body: &str) -> Vec<PreprocessedClause> {
    segment_clauses(body)
        .iter()
        .map(|clause| preprocess_clause(clause))
        .collect()
}
