//! Entity extraction: recognition rules, the numeric-literal grammar and effect
//! vocabulary, with every string entity resolved to its canonical label.

use std::sync::Arc;

use ahash::AHashSet;

use crate::entity_types::{EntityCategory, ExtractedEntities, NumericEntity};
use crate::normalizer::SynonymNormalizer;
use crate::patterns::PatternTables;

pub struct EntityExtractor {
    patterns: Arc<PatternTables>,
    normalizer: Arc<SynonymNormalizer>,
}

impl EntityExtractor {
    pub fn new(patterns: Arc<PatternTables>, normalizer: Arc<SynonymNormalizer>) -> Self {
        Self { patterns, normalizer }
    }

    /// Extract all entities from `text`. Never fails; text without matches gives
    /// empty sets.
    pub fn extract(&self, text: &str) -> ExtractedEntities {
        let mut entities = ExtractedEntities::default();

        for category in [EntityCategory::Drug, EntityCategory::Organism] {
            for rule in self.patterns.rules(category) {
                for label in rule.labels(text) {
                    let canonical = self.normalizer.normalize(&label, category).unwrap_or(label);
                    entities.set_mut(category).insert(canonical);
                }
            }
        }

        entities.numbers = self.numbers(text);

        for group in &self.patterns.effect {
            for term in group.terms(text) {
                let canonical = self.normalizer.normalize(&term, EntityCategory::Effect).unwrap_or(term);
                entities.effects.insert(canonical);
            }
        }

        entities
    }

    /// Numeric literals in order of appearance.
    ///
    /// Each grammar rule scans the whole text on its own. When two rules claim the
    /// same number span, only the earlier-declared rule keeps it.
    pub fn numbers(&self, text: &str) -> Vec<NumericEntity> {
        let mut claimed: AHashSet<(usize, usize)> = AHashSet::new();
        let mut found: Vec<(usize, usize, NumericEntity)> = Vec::new();

        for (order, rule) in self.patterns.numeric.iter().enumerate() {
            for (start, end, value) in rule.literals(text) {
                if claimed.insert((start, end)) {
                    found.push((start, order, NumericEntity { value, kind: rule.kind }));
                }
            }
        }

        found.sort_by_key(|(start, order, _)| (*start, *order));
        found.into_iter().map(|(_, _, entity)| entity).collect()
    }
}
