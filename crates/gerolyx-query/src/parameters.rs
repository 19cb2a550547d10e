//! Operation parameters derived from the category, the numeric entities and
//! keywords in the query.

use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classifier::QueryCategory;
use crate::entity_types::{ExtractedEntities, NumericKind};
use crate::patterns::PatternTables;
use crate::Result;

/// Ranking applied when no explicit count is given.
pub const DEFAULT_RANKING_LIMIT: usize = 10;

const PERCENT_FALLBACK: &str = r"(\d+(?:\.\d+)?)\s*(?:percent|%)";

const SUMMARY_WORDS: &[&str] = &["summary", "brief"];
const STATISTICS_WORDS: &[&str] = &["statistical", "significant", "stats"];
const ASCENDING_WORDS: &[&str] = &["ascending", "lowest", "worst", "smallest"];
const EXACT_WORDS: &[&str] = &["exact", "exactly"];
const SIMILAR_WORDS: &[&str] = &["similar", "related"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Years,
    Months,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub value: f64,
    pub unit: TimeUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonType {
    Comprehensive,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Parameters for the data operation. Absent fields mean "use the operation's
/// default" and are omitted from serialized output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_effect: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_type: Option<ComparisonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_statistics: Option<bool>,
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_match: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_similar: Option<bool>,
}

pub struct ParameterExtractor {
    patterns: Arc<PatternTables>,
    percent_fallback: Regex,
}

impl ParameterExtractor {
    pub fn new(patterns: Arc<PatternTables>) -> Result<Self> {
        Ok(Self { patterns, percent_fallback: Regex::new(PERCENT_FALLBACK)? })
    }

    /// Derive parameters for a classified query. `text` is the lower-cased query.
    pub fn extract(&self, category: QueryCategory, entities: &ExtractedEntities, text: &str) -> QueryParameters {
        let mut params = QueryParameters::default();

        params.limit = entities
            .first_number(|k| k.is_count())
            .map(|n| n.value as usize)
            .or_else(|| {
                (category == QueryCategory::Ranking && self.patterns.superlative_cues.is_match(text))
                    .then_some(DEFAULT_RANKING_LIMIT)
            });

        params.min_effect = entities
            .first_number(|k| k == NumericKind::Percentage)
            .map(|n| n.value)
            .or_else(|| self.raw_percentage(text));

        params.time_period = entities.first_number(|k| k.is_duration()).map(|n| TimePeriod {
            value: n.value,
            unit: if n.kind == NumericKind::Years { TimeUnit::Years } else { TimeUnit::Months },
        });

        params.dosage = entities.first_number(|k| k == NumericKind::Dosage).map(|n| n.value);

        if category == QueryCategory::Comparison {
            params.comparison_type = Some(if contains_any(text, SUMMARY_WORDS) {
                ComparisonType::Summary
            } else {
                ComparisonType::Comprehensive
            });
            if contains_any(text, STATISTICS_WORDS) {
                params.include_statistics = Some(true);
            }
        }

        params.sort_order =
            if contains_any(text, ASCENDING_WORDS) { SortOrder::Ascending } else { SortOrder::Descending };

        if category == QueryCategory::DrugSearch {
            if contains_any(text, EXACT_WORDS) {
                params.exact_match = Some(true);
            }
            if contains_any(text, SIMILAR_WORDS) {
                params.include_similar = Some(true);
            }
        }

        params
    }

    /// Second chance for a threshold when the grammar found no percentage.
    fn raw_percentage(&self, text: &str) -> Option<f64> {
        let caps = self.percent_fallback.captures(text)?;
        caps.get(1)?.as_str().parse().ok()
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_types::NumericEntity;

    fn extractor() -> ParameterExtractor {
        ParameterExtractor::new(Arc::new(PatternTables::builtin().unwrap())).unwrap()
    }

    fn numbers(items: &[(f64, NumericKind)]) -> ExtractedEntities {
        ExtractedEntities {
            numbers: items.iter().map(|&(value, kind)| NumericEntity { value, kind }).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_limit_from_count_literal() {
        let entities = numbers(&[(5.0, NumericKind::TopN), (3.0, NumericKind::FirstN)]);
        let p = extractor().extract(QueryCategory::Ranking, &entities, "top 5 and first 3");
        assert_eq!(p.limit, Some(5));
    }

    #[test]
    fn test_default_ranking_limit() {
        let empty = ExtractedEntities::default();
        let p = extractor().extract(QueryCategory::Ranking, &empty, "best longevity drugs");
        assert_eq!(p.limit, Some(DEFAULT_RANKING_LIMIT));
        let p = extractor().extract(QueryCategory::Ranking, &empty, "rank longevity drugs");
        assert_eq!(p.limit, None);
        let p = extractor().extract(QueryCategory::EffectAnalysis, &empty, "best longevity drugs");
        assert_eq!(p.limit, None);
    }

    #[test]
    fn test_min_effect_prefers_first_percentage_entity() {
        let entities = numbers(&[(20.0, NumericKind::Percentage), (30.0, NumericKind::Percentage)]);
        let p = extractor().extract(QueryCategory::EffectAnalysis, &entities, "20% or 30%");
        assert_eq!(p.min_effect, Some(20.0));
    }

    #[test]
    fn test_min_effect_raw_fallback() {
        // No word boundary before the digits, so the grammar misses it.
        let p = extractor().extract(QueryCategory::EffectAnalysis, &ExtractedEntities::default(), "above x15%");
        assert_eq!(p.min_effect, Some(15.0));
    }

    #[test]
    fn test_time_period_and_dosage() {
        let entities = numbers(&[(6.0, NumericKind::Months), (2.0, NumericKind::Years), (5.0, NumericKind::Dosage)]);
        let p = extractor().extract(QueryCategory::General, &entities, "");
        assert_eq!(p.time_period, Some(TimePeriod { value: 6.0, unit: TimeUnit::Months }));
        assert_eq!(p.dosage, Some(5.0));
    }

    #[test]
    fn test_comparison_parameters() {
        let empty = ExtractedEntities::default();
        let p = extractor().extract(QueryCategory::Comparison, &empty, "brief comparison with stats");
        assert_eq!(p.comparison_type, Some(ComparisonType::Summary));
        assert_eq!(p.include_statistics, Some(true));

        let p = extractor().extract(QueryCategory::Comparison, &empty, "compare a and b");
        assert_eq!(p.comparison_type, Some(ComparisonType::Comprehensive));
        assert_eq!(p.include_statistics, None);

        let p = extractor().extract(QueryCategory::Ranking, &empty, "significant");
        assert_eq!(p.comparison_type, None);
        assert_eq!(p.include_statistics, None);
    }

    #[test]
    fn test_sort_order_always_present() {
        let empty = ExtractedEntities::default();
        let p = extractor().extract(QueryCategory::General, &empty, "");
        assert_eq!(p.sort_order, SortOrder::Descending);
        let p = extractor().extract(QueryCategory::Ranking, &empty, "lowest effect first");
        assert_eq!(p.sort_order, SortOrder::Ascending);
    }

    #[test]
    fn test_drug_search_flags() {
        let empty = ExtractedEntities::default();
        let p = extractor().extract(QueryCategory::DrugSearch, &empty, "exactly rapamycin and related compounds");
        assert_eq!(p.exact_match, Some(true));
        assert_eq!(p.include_similar, Some(true));
        let p = extractor().extract(QueryCategory::Comparison, &empty, "exactly similar");
        assert_eq!(p.exact_match, None);
        assert_eq!(p.include_similar, None);
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let p = QueryParameters { limit: Some(10), ..Default::default() };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json, serde_json::json!({"limit": 10, "sort_order": "descending"}));
    }
}
