//! Key-concept extraction for study notes
//!
//! Plain word-frequency counting over the transcript text, with timestamps,
//! short tokens, numbers and common English stop words removed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Tokens shorter than this are ignored
pub const MIN_TERM_CHARS: usize = 4;

static TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(?:\d+:)?\d{1,3}:\d{2}\]").expect("static regex"));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "about", "above", "actually", "after", "again", "against", "all", "also", "among",
        "because", "been", "before", "being", "below", "between", "both", "called", "can't",
        "come", "could", "didn't", "does", "doesn't", "doing", "don't", "down", "during",
        "each", "even", "every", "first", "from", "further", "going", "gonna", "good",
        "have", "having", "here", "it's", "just", "know", "like", "look", "make", "many",
        "maybe", "more", "most", "much", "need", "okay", "only", "other", "over", "really",
        "right", "same", "should", "some", "something", "still", "such", "take", "than",
        "that", "that's", "their", "them", "then", "there", "there's", "these", "they",
        "thing", "things", "think", "this", "those", "through", "under", "until", "very",
        "want", "well", "were", "what", "what's", "when", "where", "which", "while", "will",
        "with", "would", "yeah", "your", "you're", "into", "we're", "we'll", "i'm",
        "let's", "kind", "sort", "said", "says", "going", "back", "little", "lot",
        "another", "anything", "everything", "because", "being", "pretty", "sure", "thank",
        "thanks", "today", "video", "here's", "again", "around", "where's", "they're",
    ]
    .into_iter()
    .collect()
});

/// A frequent term and how often it occurs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyConcept {
    pub term: String,
    pub count: usize,
}

/// Most frequent meaningful terms, highest count first
///
/// Ties are broken by first occurrence in the text.
pub fn extract_key_concepts(text: &str, limit: usize) -> Vec<KeyConcept> {
    let cleaned = TIMESTAMP.replace_all(text, " ").to_lowercase();

    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0usize;

    for raw in cleaned.split(|c: char| !(c.is_alphanumeric() || c == '\'')) {
        let token = raw.trim_matches('\'');
        if !is_candidate(token) {
            continue;
        }

        let entry = counts.entry(token.to_string()).or_insert_with(|| {
            order += 1;
            (0, order)
        });
        entry.0 += 1;
    }

    let mut concepts: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(term, (count, first_seen))| (term, count, first_seen))
        .collect();
    concepts.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    concepts
        .into_iter()
        .take(limit)
        .map(|(term, count, _)| KeyConcept { term, count })
        .collect()
}

fn is_candidate(token: &str) -> bool {
    token.chars().count() >= MIN_TERM_CHARS
        && !token.chars().all(|c| c.is_ascii_digit())
        && !STOP_WORDS.contains(token)
}
