//! Typed hand-off from an analyzed query to the data layer and the
//! answer-generation step.

use serde::{Deserialize, Serialize};

use crate::classifier::QueryCategory;
use crate::engine::QueryContext;
use crate::parameters::{ComparisonType, SortOrder, DEFAULT_RANKING_LIMIT};

/// The single data operation a query asks for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum DataOperation {
    SearchDrugs {
        drugs: Vec<String>,
        exact_match: bool,
        include_similar: bool,
    },
    AnalyzeEffects {
        min_effect: Option<f64>,
        organisms: Vec<String>,
    },
    CompareDrugs {
        drugs: Vec<String>,
        comparison_type: ComparisonType,
        include_statistics: bool,
    },
    TopDrugs {
        limit: usize,
        sort_order: SortOrder,
        organism: Option<String>,
    },
    OrganismDrugs {
        organisms: Vec<String>,
    },
    ExplainMechanism {
        drugs: Vec<String>,
    },
    Overview,
}

impl DataOperation {
    pub fn name(&self) -> &'static str {
        match self {
            DataOperation::SearchDrugs { .. }      => "search_drugs",
            DataOperation::AnalyzeEffects { .. }   => "analyze_effects",
            DataOperation::CompareDrugs { .. }     => "compare_drugs",
            DataOperation::TopDrugs { .. }         => "top_drugs",
            DataOperation::OrganismDrugs { .. }    => "organism_drugs",
            DataOperation::ExplainMechanism { .. } => "explain_mechanism",
            DataOperation::Overview                => "overview",
        }
    }
}

/// System prompt family for answer generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    General,
    DrugAnalysis,
    Comparison,
}

impl PromptTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptTemplate::General      => "general",
            PromptTemplate::DrugAnalysis => "drug_analysis",
            PromptTemplate::Comparison   => "comparison",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            PromptTemplate::General => {
                "You are an assistant for researchers querying data on compounds that extend lifespan.\n\
                 Explain the data accurately, base every answer on the data provided, point out its \
                 limitations, and say so when you are unsure. Do not give medical advice: these are \
                 laboratory findings, not clinical recommendations."
            }
            PromptTemplate::DrugAnalysis => {
                "You are analyzing records for specific compounds. Focus on lifespan effect and its \
                 statistical significance, results across model organisms, dosage and experimental \
                 conditions, and the limitations of the studies."
            }
            PromptTemplate::Comparison => {
                "You are comparing the lifespan effects of several compounds. Give a side-by-side \
                 comparison of effects, results in specific model organisms, known differences in \
                 mechanism, and an assessment of study quality."
            }
        }
    }
}

impl QueryContext {
    /// The data operation for this query. Parameters the query left out fall back
    /// to operation defaults.
    pub fn operation(&self) -> DataOperation {
        let drugs = || self.entities.drugs.iter().cloned().collect::<Vec<_>>();
        let organisms = || self.entities.organisms.iter().cloned().collect::<Vec<_>>();
        let p = &self.parameters;

        match self.category {
            QueryCategory::DrugSearch => DataOperation::SearchDrugs {
                drugs: drugs(),
                exact_match: p.exact_match.unwrap_or(false),
                include_similar: p.include_similar.unwrap_or(false),
            },
            QueryCategory::EffectAnalysis => DataOperation::AnalyzeEffects {
                min_effect: p.min_effect,
                organisms: organisms(),
            },
            QueryCategory::Comparison => DataOperation::CompareDrugs {
                drugs: drugs(),
                comparison_type: p.comparison_type.unwrap_or(ComparisonType::Comprehensive),
                include_statistics: p.include_statistics.unwrap_or(false),
            },
            QueryCategory::Ranking => DataOperation::TopDrugs {
                limit: p.limit.unwrap_or(DEFAULT_RANKING_LIMIT),
                sort_order: p.sort_order,
                organism: self.entities.organisms.iter().next().cloned(),
            },
            QueryCategory::OrganismSpecific => DataOperation::OrganismDrugs { organisms: organisms() },
            QueryCategory::Mechanism => DataOperation::ExplainMechanism { drugs: drugs() },
            QueryCategory::General => DataOperation::Overview,
        }
    }

    pub fn prompt_template(&self) -> PromptTemplate {
        self.category.prompt_template()
    }
}
