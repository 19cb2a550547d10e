//! Query quality check. Advisory only: it never stops a query from being analyzed.

use serde::Serialize;

const MIN_QUERY_CHARS: usize = 3;
const VOCABULARY_PENALTY: f64 = 0.3;

const MEANINGFUL_WORDS: &[&str] = &[
    "drug", "compound", "effect", "lifespan", "longevity", "mouse", "rat", "compare", "best", "top",
];
const QUESTION_WORDS: &[&str] = &["show", "tell", "find", "compare", "what", "which", "how"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryValidation {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub confidence: f64,
}

pub fn validate_query(query: &str) -> QueryValidation {
    let mut validation = QueryValidation {
        is_valid: true,
        issues: Vec::new(),
        suggestions: Vec::new(),
        confidence: 1.0,
    };

    if query.trim().chars().count() < MIN_QUERY_CHARS {
        validation.is_valid = false;
        validation.issues.push("Query is too short".to_string());
        validation.suggestions.push("Please provide a more detailed query".to_string());
    }

    let lower = query.to_lowercase();
    if !MEANINGFUL_WORDS.iter().any(|w| lower.contains(w)) {
        validation.confidence -= VOCABULARY_PENALTY;
        validation
            .suggestions
            .push("Try including a compound name or a research keyword such as 'lifespan'".to_string());
    }

    if !query.contains('?') && !QUESTION_WORDS.iter().any(|w| lower.contains(w)) {
        validation.suggestions.push("Consider phrasing the query as a question".to_string());
    }

    validation
}
