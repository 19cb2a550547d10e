//! Hints for rephrasing sparse or ambiguous queries.

use crate::classifier::QueryCategory;
use crate::entity_types::ExtractedEntities;
use crate::parameters::QueryParameters;

pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

pub struct SuggestionGenerator {
    max_suggestions: usize,
}

impl Default for SuggestionGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUGGESTIONS)
    }
}

impl SuggestionGenerator {
    pub fn new(max_suggestions: usize) -> Self {
        Self { max_suggestions }
    }

    /// Rules run in a fixed order and the first `max_suggestions` hints are kept.
    pub fn generate(
        &self,
        category: QueryCategory,
        entities: &ExtractedEntities,
        params: &QueryParameters,
    ) -> Vec<String> {
        let mut hints: Vec<&'static str> = Vec::new();

        if category == QueryCategory::DrugSearch && entities.drugs.is_empty() {
            hints.push("Try naming a specific compound, such as 'rapamycin' or 'metformin'");
        }
        if category == QueryCategory::Comparison && entities.drugs.len() < 2 {
            hints.push("A comparison needs at least two compound names");
        }
        if category == QueryCategory::OrganismSpecific && entities.organisms.is_empty() {
            hints.push("Name a model organism, such as 'mouse', 'rat' or 'C. elegans'");
        }
        if category == QueryCategory::Ranking && params.limit.is_none() {
            hints.push("Consider saying how many results you want (for example 'top 10')");
        }
        if entities.drugs.is_empty() && entities.organisms.is_empty() {
            hints.push("Try describing the compound or model organism you are interested in");
            hints.push("For example: 'effect of rapamycin in mice' or 'compare metformin and resveratrol'");
        }
        if category == QueryCategory::General {
            hints.push("Try a more specific question");
            hints.push("Mention a compound name, a model organism or a type of study");
        }

        hints.into_iter().take(self.max_suggestions).map(String::from).collect()
    }
}
