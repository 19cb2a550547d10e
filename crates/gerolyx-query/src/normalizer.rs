//! Synonym normalization: resolves entity mentions to canonical labels, and
//! rewrites synonyms inside whole query strings before extraction.
//!
//! Per-entity resolution tries an exact table lookup first and only falls back to
//! fuzzy scoring (see [`crate::similarity`]) when the key is absent.

use aho_corasick::{AhoCorasick, MatchKind};
use serde::Serialize;
use tracing::{debug, info};

use crate::entity_types::EntityCategory;
use crate::similarity::similarity;
use crate::synonyms::SynonymTables;
use crate::{QueryError, Result};

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// How a mention was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub canonical: String,
    pub tier: MatchTier,
    pub similarity: f64,
}

pub struct SynonymNormalizer {
    tables: SynonymTables,
    fuzzy_threshold: f64,
    /// Drug and organism keys for the whole-string pass.
    text_automaton: AhoCorasick,
    /// Pattern index -> canonical label.
    replacements: Vec<String>,
}

impl SynonymNormalizer {
    pub fn new(tables: SynonymTables, fuzzy_threshold: f64) -> Result<Self> {
        if !(fuzzy_threshold > 0.0 && fuzzy_threshold <= 1.0) {
            return Err(QueryError::InvalidConfig(format!(
                "fuzzy_threshold must be in (0, 1], got {fuzzy_threshold}"
            )));
        }

        let mut keys: Vec<&str> = Vec::new();
        let mut replacements: Vec<String> = Vec::new();
        // Effect keys such as "times" and "%" are left out: rewriting them would
        // break numeric literals like "2 times".
        for (key, canonical) in tables.drug.iter() {
            keys.push(key);
            replacements.push(canonical.to_string());
        }
        for (key, canonical) in tables.organism.iter() {
            if tables.drug.contains_key(key) {
                continue;
            }
            keys.push(key);
            replacements.push(canonical.to_string());
        }

        let text_automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&keys)?;

        info!(
            "SynonymNormalizer ready: {} rewrite keys, fuzzy threshold {}",
            keys.len(),
            fuzzy_threshold
        );

        Ok(Self { tables, fuzzy_threshold, text_automaton, replacements })
    }

    pub fn tables(&self) -> &SynonymTables {
        &self.tables
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// Resolve `raw` against the table for `category`.
    ///
    /// Returns `None` for blank input and when no key scores at or above the fuzzy
    /// threshold. Among equally scored keys the earliest in table order wins.
    pub fn resolve(&self, raw: &str, category: EntityCategory) -> Option<Resolution> {
        let key = raw.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }

        let table = self.tables.table(category);
        if let Some(canonical) = table.get(&key) {
            return Some(Resolution { canonical: canonical.to_string(), tier: MatchTier::Exact, similarity: 1.0 });
        }

        let mut best: Option<(&str, &str, f64)> = None;
        for (synonym, canonical) in table.iter() {
            let score = similarity(&key, synonym);
            if score >= self.fuzzy_threshold && best.map_or(true, |(_, _, top)| score > top) {
                best = Some((synonym, canonical, score));
            }
        }

        let (synonym, canonical, score) = best?;
        debug!(
            category = category.as_str(),
            input = key.as_str(),
            synonym,
            canonical,
            score,
            "Fuzzy synonym match"
        );
        Some(Resolution { canonical: canonical.to_string(), tier: MatchTier::Fuzzy, similarity: score })
    }

    pub fn normalize(&self, raw: &str, category: EntityCategory) -> Option<String> {
        self.resolve(raw, category).map(|r| r.canonical)
    }

    /// Replace every drug or organism synonym in `text` with its canonical label.
    ///
    /// `text` is expected to be lower-cased. Matching is a single left-to-right
    /// pass preferring the longest key at each position; a key is only replaced
    /// where it stands as a whole word, and replaced text is not scanned again.
    pub fn normalize_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for mat in self.text_automaton.find_iter(text) {
            if !stands_alone(text, mat.start(), mat.end()) {
                continue;
            }
            out.push_str(&text[last..mat.start()]);
            out.push_str(&self.replacements[mat.pattern().as_usize()]);
            last = mat.end();
        }
        out.push_str(&text[last..]);
        out
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `text[start..end]` is not glued to a neighbouring word character on
/// any side where the match itself begins or ends with a word character.
fn stands_alone(text: &str, start: usize, end: usize) -> bool {
    let matched = &text[start..end];
    let (Some(first), Some(last)) = (matched.chars().next(), matched.chars().next_back()) else {
        return false;
    };
    if is_word_char(first) && text[..start].chars().next_back().is_some_and(is_word_char) {
        return false;
    }
    if is_word_char(last) && text[end..].chars().next().is_some_and(is_word_char) {
        return false;
    }
    true
}
