//! Legal term extraction against a static plain-language glossary

use std::collections::HashSet;

use clause_types::LegalTermMatch;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Definition used for defined terms that are not in the glossary
pub const DEFAULT_DEFINITION: &str = "Legal terminology used in contracts.";

/// Category given to terms the document defines itself
pub const DEFINED_TERM_CATEGORY: &str = "Defined Term";

/// A glossary entry: a legal term with a plain-language definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlossaryEntry {
    pub term: &'static str,
    pub category: &'static str,
    pub definition: &'static str,
}

const fn entry(
    term: &'static str,
    category: &'static str,
    definition: &'static str,
) -> GlossaryEntry {
    GlossaryEntry {
        term,
        category,
        definition,
    }
}

/// Reference glossary, in the order terms are reported
pub const GLOSSARY: &[GlossaryEntry] = &[
    entry("indemnity", "Indemnity Clause", "A promise to protect someone from financial loss or legal liability"),
    entry("indemnify", "Indemnity Clause", "To compensate or reimburse someone for loss or damage"),
    entry("hold harmless", "Indemnity Clause", "A promise not to hold the other party responsible for certain losses"),
    entry("security deposit", "Payment Terms", "Money held by one party as protection in case of damage or default"),
    entry("liquidated damages", "Payment Terms", "A predetermined amount of money to be paid if a contract is broken"),
    entry("termination", "Termination Clause", "The act of ending or canceling a contract or agreement"),
    entry("cure period", "Termination Clause", "Time given to fix a problem or breach before penalties apply"),
    entry("material breach", "Termination Clause", "A serious violation of a contract that affects its core purpose"),
    entry("breach", "Termination Clause", "Breaking or violating the terms of a contract"),
    entry("renewal", "Termination Clause", "Extending a contract for an additional period"),
    entry("arbitration", "Dispute Resolution", "Resolving a dispute outside of court with a neutral third party making the decision"),
    entry("dispute resolution", "Dispute Resolution", "Methods used to settle disagreements or conflicts"),
    entry("mediation", "Dispute Resolution", "A neutral person helps the parties reach their own agreement"),
    entry("jurisdiction", "Dispute Resolution", "The authority of a court or legal system to hear a case"),
    entry("venue", "Dispute Resolution", "The location where a legal case will be heard"),
    entry("force majeure", "Force Majeure", "Unforeseeable circumstances that prevent someone from fulfilling a contract (like natural disasters)"),
    entry("act of god", "Force Majeure", "A natural event nobody could have prevented, such as a flood or earthquake"),
    entry("governing law", "Governing Law", "The legal system and rules that apply to a contract"),
    entry("warranty", "Warranty", "A guarantee or promise about the quality or condition of something"),
    entry("warranties", "Warranty", "Promises or guarantees about facts or conditions"),
    entry("representations and warranties", "Warranty", "Statements and promises made about facts and conditions"),
    entry("representations", "Warranty", "Statements of fact made by one party to another"),
    entry("as is", "Warranty", "Sold or provided in its current condition with no promises about quality"),
    entry("confidential", "Confidentiality", "Information that must be kept private and not shared with others"),
    entry("confidentiality", "Confidentiality", "The state of keeping information secret or private"),
    entry("non-disclosure", "Confidentiality", "An agreement to keep certain information confidential"),
    entry("disclosure", "Confidentiality", "Revealing or making information known"),
    entry("trade secret", "Confidentiality", "Valuable business information kept secret to keep a competitive edge"),
    entry("intellectual property", "IP Rights", "Creations of the mind like inventions, designs, brand names, and artistic works"),
    entry("license", "IP Rights", "Permission to use something that belongs to someone else"),
    entry("sublicense", "IP Rights", "Permission granted by a licensee to allow someone else to use licensed rights"),
    entry("royalty", "IP Rights", "A payment made for the right to use someone else's property or work"),
    entry("non-compete", "Non-Compete", "An agreement not to compete with a business in the same industry or area"),
    entry("non-solicitation", "Non-Compete", "A promise not to approach the other party's clients or staff"),
    entry("exclusivity", "Non-Compete", "The right to be the only one to do something in an agreement"),
    entry("severability", "Severability", "If one part of a contract is invalid, the rest of the contract remains valid"),
    entry("amendment", "Amendment Rights", "A formal change or addition to a contract or document"),
    entry("waiver", "Amendment Rights", "Voluntarily giving up a right or claim"),
    entry("entire agreement", "Amendment Rights", "This document replaces every earlier promise about the same subject"),
    entry("assignment", "Assignment Rights", "Transferring rights or responsibilities from one party to another"),
    entry("third party", "Assignment Rights", "A person or entity not directly involved in an agreement"),
    entry("subsidiary", "Assignment Rights", "A company controlled by another company"),
    entry("limitation of liability", "Liability", "A cap or restriction on the amount of damages that can be claimed"),
    entry("liability", "Liability", "Legal responsibility for something, especially for costs or damages"),
    entry("consequential damages", "Damages", "Indirect losses that follow from a breach, such as lost profits"),
    entry("damages", "Damages", "Money paid as compensation for loss or injury"),
    entry("remedies", "Damages", "Solutions or compensations available when a contract is broken"),
    entry("injunction", "Damages", "A court order telling someone to do or stop doing something"),
    entry("consideration", "Contract Basics", "Something of value exchanged between parties in a contract"),
    entry("covenant", "Contract Basics", "A formal promise or agreement in a contract"),
    entry("parties", "Contract Basics", "People or organizations involved in a contract or legal agreement"),
    entry("party", "Contract Basics", "A person or organization involved in a contract or legal agreement"),
    entry("effective date", "Contract Basics", "The date when a contract or agreement officially begins"),
    entry("terms and conditions", "Contract Basics", "The detailed rules and requirements of an agreement"),
    entry("agreement", "Contract Basics", "A mutual understanding or arrangement between two or more parties"),
    entry("obligations", "Contract Basics", "Duties or responsibilities that must be fulfilled under a contract"),
    entry("rights", "Contract Basics", "Legal entitlements or permissions granted by a contract"),
    entry("default", "Contract Basics", "Failure to fulfill an obligation or payment as required"),
    entry("execution", "Contract Basics", "The act of signing and making a contract legally binding"),
    entry("mutual consent", "Contract Basics", "Agreement by all parties involved"),
    entry("performance", "Contract Basics", "Completing the obligations required by a contract"),
    entry("term", "Contract Basics", "The length or duration of a contract"),
    entry("notice", "Contract Basics", "Formal communication or warning given to another party"),
    entry("audit", "Compliance", "An official examination or review of records or accounts"),
    entry("compliance", "Compliance", "Following or obeying rules, laws, or requirements"),
    entry("services", "Commercial", "Work or assistance provided under an agreement"),
    entry("service provider", "Commercial", "The person or company providing work or assistance"),
    entry("sole discretion", "Commercial", "The complete freedom to make a decision without needing approval"),
    entry("title", "Commercial", "Legal ownership of property or rights"),
    entry("void", "Validity", "Having no legal effect or validity"),
    entry("voidable", "Validity", "Valid but can be legally canceled under certain conditions"),
    entry("null and void", "Validity", "Completely without legal force"),
];

lazy_static! {
    /// `"Effective Date"` or `'Services'`
    static ref QUOTED_TERM: Regex = Regex::new(r#"["']([A-Z][A-Za-z\s]{2,30})["']"#).unwrap();

    /// `Confidential Information shall mean ...`, `the Term (hereinafter ...`
    static ref DEFINITION_TERM: Regex = Regex::new(
        r"([A-Z][A-Za-z\s]{2,30})\s*(?:\(hereinafter|shall mean|means|refers to)"
    )
    .unwrap();

    static ref GLOSSARY_PATTERNS: Vec<(&'static GlossaryEntry, Regex)> = GLOSSARY
        .iter()
        .map(|entry| (entry, word_pattern(entry.term)))
        .collect();
}

/// Case-insensitive whole-word pattern with flexible inner whitespace
fn word_pattern(term: &str) -> Regex {
    let body = term
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    // Escaped literal words always form a valid pattern
    Regex::new(&format!(r"(?i)\b{}\b", body)).unwrap()
}

/// Find a glossary entry by term, ignoring case
pub fn lookup(term: &str) -> Option<&'static GlossaryEntry> {
    GLOSSARY.iter().find(|e| e.term.eq_ignore_ascii_case(term.trim()))
}

/// Count case-insensitive whole-word occurrences of `term` in `text`
pub fn count_occurrences(text: &str, term: &str) -> u32 {
    if term.trim().is_empty() {
        return 0;
    }
    word_pattern(term).find_iter(text).count() as u32
}

/// Capitalise the first letter of every word, including after hyphens
fn title_case(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    let mut at_word_start = true;
    for c in term.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace() || c == '-';
    }
    out
}

fn defined_term(term: &str, text: &str) -> LegalTermMatch {
    let definition = lookup(term)
        .map(|e| e.definition)
        .unwrap_or(DEFAULT_DEFINITION);
    LegalTermMatch {
        term: term.to_string(),
        category: DEFINED_TERM_CATEGORY.to_string(),
        definition: definition.to_string(),
        occurrences: count_occurrences(text, term).max(1),
    }
}

/// Extract legal terms from contract text.
///
/// Terms come from three passes, reported in first-seen order and
/// de-duplicated case-insensitively:
/// 1. quoted defined terms (`"Effective Date"`)
/// 2. definition phrases (`X shall mean`, `X means`, `X refers to`, `X (hereinafter`)
/// 3. glossary terms appearing as whole words
pub fn extract_legal_terms(text: &str) -> Vec<LegalTermMatch> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut found = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let defined = QUOTED_TERM
        .captures_iter(text)
        .chain(DEFINITION_TERM.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "));

    for term in defined {
        if term.len() < 3 || !seen.insert(term.to_lowercase()) {
            continue;
        }
        found.push(defined_term(&term, text));
    }

    for (entry, pattern) in GLOSSARY_PATTERNS.iter() {
        let occurrences = pattern.find_iter(text).count() as u32;
        if occurrences == 0 || !seen.insert(entry.term.to_lowercase()) {
            continue;
        }
        found.push(LegalTermMatch {
            term: title_case(entry.term),
            category: entry.category.to_string(),
            definition: entry.definition.to_string(),
            occurrences,
        });
    }

    tracing::debug!(terms = found.len(), "extracted legal terms");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_glossary_is_large_and_unique() {
        assert!(GLOSSARY.len() >= 60);
        let unique: HashSet<String> = GLOSSARY.iter().map(|e| e.term.to_lowercase()).collect();
        assert_eq!(unique.len(), GLOSSARY.len());
        assert!(GLOSSARY.iter().all(|e| !e.definition.is_empty()));
    }

    #[test]
    fn test_quoted_defined_terms() {
        let text = "This agreement starts on the \"Effective Date\". The Effective Date is 1 May.";
        let terms = extract_legal_terms(text);
        let first = &terms[0];
        assert_eq!(first.term, "Effective Date");
        assert_eq!(first.category, DEFINED_TERM_CATEGORY);
        assert_eq!(
            first.definition,
            "The date when a contract or agreement officially begins"
        );
        assert_eq!(first.occurrences, 2);
    }

    #[test]
    fn test_definition_pattern_with_unknown_term() {
        let text = "Widget Output means every widget the factory makes.";
        let terms = extract_legal_terms(text);
        assert_eq!(terms[0].term, "Widget Output");
        assert_eq!(terms[0].definition, DEFAULT_DEFINITION);
    }

    #[test]
    fn test_glossary_terms_whole_word_and_title_cased() {
        let text = "Force majeure events excuse delay. Non-compete duties survive. Termination requires notice.";
        let terms: Vec<String> = extract_legal_terms(text).into_iter().map(|t| t.term).collect();
        assert_eq!(
            terms,
            vec!["Termination", "Force Majeure", "Non-Compete", "Notice"]
        );
    }

    #[test]
    fn test_no_partial_word_matches() {
        let terms = extract_legal_terms("The auditorium is warm and the terminal is closed.");
        assert!(terms.is_empty(), "{:?}", terms);
    }

    #[test]
    fn test_duplicates_collapsed_case_insensitively() {
        let text = "\"Confidentiality\" matters. CONFIDENTIALITY is key. Confidentiality again.";
        let terms = extract_legal_terms(text);
        let hits: Vec<&LegalTermMatch> = terms
            .iter()
            .filter(|t| t.term.eq_ignore_ascii_case("confidentiality"))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, DEFINED_TERM_CATEGORY);
        assert_eq!(hits[0].occurrences, 3);
    }

    #[test]
    fn test_count_occurrences_spans_whitespace() {
        assert_eq!(count_occurrences("force  majeure and Force\nMajeure", "force majeure"), 2);
        assert_eq!(count_occurrences("anything", "  "), 0);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("limitation of liability"), "Limitation Of Liability");
        assert_eq!(title_case("non-disclosure"), "Non-Disclosure");
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_legal_terms("   ").is_empty());
    }
}
