//! Intent classification by weighted pattern scoring.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::PromptTemplate;
use crate::entity_types::ExtractedEntities;
use crate::patterns::{count_matching, PatternTables};

/// What a query is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    General,
    DrugSearch,
    EffectAnalysis,
    Comparison,
    Ranking,
    OrganismSpecific,
    Mechanism,
}

impl QueryCategory {
    /// Every category, in tie-break order.
    pub const ALL: [QueryCategory; 7] = [
        QueryCategory::General,
        QueryCategory::DrugSearch,
        QueryCategory::EffectAnalysis,
        QueryCategory::Comparison,
        QueryCategory::Ranking,
        QueryCategory::OrganismSpecific,
        QueryCategory::Mechanism,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryCategory::General          => "general",
            QueryCategory::DrugSearch       => "drug_search",
            QueryCategory::EffectAnalysis   => "effect_analysis",
            QueryCategory::Comparison       => "comparison",
            QueryCategory::Ranking          => "ranking",
            QueryCategory::OrganismSpecific => "organism_specific",
            QueryCategory::Mechanism        => "mechanism",
        }
    }

    pub fn primary_intent(&self) -> &'static str {
        match self {
            QueryCategory::General          => "Get general information about longevity research",
            QueryCategory::DrugSearch       => "Find detailed information about a specific compound",
            QueryCategory::EffectAnalysis   => "Analyze lifespan-extension effects of compounds",
            QueryCategory::Comparison       => "Compare multiple compounds or interventions",
            QueryCategory::Ranking          => "Rank compounds by effect",
            QueryCategory::OrganismSpecific => "Find compounds tested in a specific model organism",
            QueryCategory::Mechanism        => "Understand a compound's mechanism of action",
        }
    }

    /// Example questions that classify into this category. Empty for General.
    pub fn examples(&self) -> &'static [&'static str] {
        match self {
            QueryCategory::General => &[],
            QueryCategory::DrugSearch => &[
                "Tell me about rapamycin",
                "What effect does metformin have on lifespan?",
                "What are the research results for resveratrol?",
            ],
            QueryCategory::EffectAnalysis => &[
                "Which drugs extend lifespan by more than 20%?",
                "Show the compounds with the largest lifespan effect",
                "Analyze drugs with significant lifespan extension",
            ],
            QueryCategory::Comparison => &[
                "Compare rapamycin and metformin",
                "Which is better: resveratrol or curcumin?",
                "rapamycin vs metformin vs resveratrol",
            ],
            QueryCategory::Ranking => &[
                "Top 10 longevity drugs",
                "Rank the top compounds by lifespan",
                "List the best drugs",
            ],
            QueryCategory::OrganismSpecific => &[
                "Drugs tested in mice",
                "Which compounds were tested in C. elegans?",
                "Significant results in rat studies",
            ],
            QueryCategory::Mechanism => &[
                "How does rapamycin work through cellular signaling pathways?",
                "Which molecular signaling pathway does metformin act on?",
                "Why does resveratrol act on cellular signaling?",
            ],
        }
    }

    /// Response template for the answer-generation step.
    pub fn prompt_template(&self) -> PromptTemplate {
        match self {
            QueryCategory::Comparison => PromptTemplate::Comparison,
            QueryCategory::DrugSearch | QueryCategory::EffectAnalysis => PromptTemplate::DrugAnalysis,
            QueryCategory::General
            | QueryCategory::Ranking
            | QueryCategory::OrganismSpecific
            | QueryCategory::Mechanism => PromptTemplate::General,
        }
    }
}

impl std::fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score increments and caps per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentWeights {
    /// Score every query starts with in the General category
    pub general_baseline: f64,
    /// Any drug entity present
    pub drug_present: f64,
    /// Informational cue ("about", "tell me") alongside a drug
    pub informational_bonus: f64,
    pub effect_per_group: f64,
    pub effect_cap: f64,
    pub comparison_per_group: f64,
    /// Two or more distinct drugs
    pub comparison_multi_drug: f64,
    pub comparison_cap: f64,
    pub ranking_per_group: f64,
    /// A "top N" / "first N" literal
    pub ranking_count_bonus: f64,
    pub ranking_cap: f64,
    /// Any organism entity present
    pub organism_present: f64,
    /// Locative cue ("in", "tested") alongside an organism
    pub locative_bonus: f64,
    pub mechanism_per_group: f64,
    pub mechanism_cap: f64,
}

impl Default for IntentWeights {
    fn default() -> Self {
        Self {
            general_baseline:      0.1,
            drug_present:          0.6,
            informational_bonus:   0.3,
            effect_per_group:      0.2,
            effect_cap:            0.8,
            comparison_per_group:  0.3,
            comparison_multi_drug: 0.4,
            comparison_cap:        0.9,
            ranking_per_group:     0.3,
            ranking_count_bonus:   0.2,
            ranking_cap:           0.8,
            organism_present:      0.5,
            locative_bonus:        0.3,
            mechanism_per_group:   0.2,
            mechanism_cap:         0.7,
        }
    }
}

pub struct IntentClassifier {
    patterns: Arc<PatternTables>,
    weights: IntentWeights,
}

impl IntentClassifier {
    pub fn new(patterns: Arc<PatternTables>) -> Self {
        Self::with_weights(patterns, IntentWeights::default())
    }

    pub fn with_weights(patterns: Arc<PatternTables>, weights: IntentWeights) -> Self {
        Self { patterns, weights }
    }

    /// Pick the highest scoring category and its confidence in `[0, 1]`.
    ///
    /// `text` is the lower-cased query. A tie goes to the category listed first
    /// in [`QueryCategory::ALL`].
    pub fn classify(&self, text: &str, entities: &ExtractedEntities) -> (QueryCategory, f64) {
        let mut best = (QueryCategory::General, f64::NEG_INFINITY);
        for (category, score) in self.scores(text, entities) {
            if score > best.1 {
                best = (category, score);
            }
        }
        (best.0, best.1.clamp(0.0, 1.0))
    }

    /// Score of every category, in [`QueryCategory::ALL`] order.
    pub fn scores(&self, text: &str, entities: &ExtractedEntities) -> Vec<(QueryCategory, f64)> {
        let w = &self.weights;
        let p = &self.patterns;

        let mut drug_search = 0.0;
        if !entities.drugs.is_empty() {
            drug_search = w.drug_present;
            if p.informational_cues.is_match(text) {
                drug_search += w.informational_bonus;
            }
        }

        let effect = accumulate(count_matching(&p.effect, text), w.effect_per_group).min(w.effect_cap);

        let mut comparison = accumulate(count_matching(&p.comparison, text), w.comparison_per_group);
        if entities.drugs.len() >= 2 {
            comparison += w.comparison_multi_drug;
        }
        let comparison = comparison.min(w.comparison_cap);

        let mut ranking = accumulate(count_matching(&p.ranking, text), w.ranking_per_group);
        if entities.has_count_limit() {
            ranking += w.ranking_count_bonus;
        }
        let ranking = ranking.min(w.ranking_cap);

        let mut organism = 0.0;
        if !entities.organisms.is_empty() {
            organism = w.organism_present;
            if p.locative_cues.is_match(text) {
                organism += w.locative_bonus;
            }
        }

        let mechanism =
            accumulate(count_matching(&p.mechanism, text), w.mechanism_per_group).min(w.mechanism_cap);

        vec![
            (QueryCategory::General, w.general_baseline),
            (QueryCategory::DrugSearch, drug_search),
            (QueryCategory::EffectAnalysis, effect),
            (QueryCategory::Comparison, comparison),
            (QueryCategory::Ranking, ranking),
            (QueryCategory::OrganismSpecific, organism),
            (QueryCategory::Mechanism, mechanism),
        ]
    }
}

/// Add `step` once per matched group. Repeated addition keeps the
/// rounding of each partial sum, which tie-breaking depends on.
fn accumulate(groups: usize, step: f64) -> f64 {
    (0..groups).fold(0.0, |acc, _| acc + step)
}
