//! The query pipeline: synonym rewrite, extraction, classification, parameters
//! and suggestions, run against tables built once at construction.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{IntentClassifier, QueryCategory};
use crate::entity_types::{EntityCategory, ExtractedEntities};
use crate::extractor::EntityExtractor;
use crate::normalizer::{SynonymNormalizer, DEFAULT_FUZZY_THRESHOLD};
use crate::parameters::{ParameterExtractor, QueryParameters};
use crate::patterns::PatternTables;
use crate::suggestions::{SuggestionGenerator, DEFAULT_MAX_SUGGESTIONS};
use crate::synonyms::{SynonymOverrides, SynonymTables};
use crate::Result;

/// Batches above this size are analyzed on the rayon pool.
#[cfg(feature = "parallel")]
const PARALLEL_BATCH_THRESHOLD: usize = 10;

/// Engine settings. Every field has a default, so an empty `[engine]` table is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum similarity for a fuzzy synonym match
    pub fuzzy_threshold: f64,
    pub max_suggestions: usize,
    /// Rewrite synonyms in the query text before extraction
    pub normalize_query_text: bool,
    /// JSON file with extra synonyms
    pub synonyms_file: Option<PathBuf>,
    /// Inline extra synonyms; these win over `synonyms_file` on equal keys
    pub extra_synonyms: SynonymOverrides,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            normalize_query_text: true,
            synonyms_file: None,
            extra_synonyms: SynonymOverrides::default(),
        }
    }
}

/// Structured result of analyzing one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    pub category: QueryCategory,
    pub primary_intent: String,
    pub entities: ExtractedEntities,
    pub parameters: QueryParameters,
    pub confidence: f64,
    pub suggestions: Vec<String>,
}

/// Query understanding engine. Immutable once built; share it across threads
/// behind an `Arc`.
pub struct QueryEngine {
    config: EngineConfig,
    patterns: Arc<PatternTables>,
    normalizer: Arc<SynonymNormalizer>,
    extractor: EntityExtractor,
    classifier: IntentClassifier,
    parameters: ParameterExtractor,
    suggestions: SuggestionGenerator,
}

impl QueryEngine {
    /// Engine with built-in tables and default settings.
    pub fn new() -> Result<Self> {
        Self::from_config(&EngineConfig::default())
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut overrides = match &config.synonyms_file {
            Some(path) => {
                info!("Loading synonym overrides from {}", path.display());
                SynonymOverrides::from_json_file(path)?
            }
            None => SynonymOverrides::default(),
        };
        overrides.merge(config.extra_synonyms.clone());

        let tables = SynonymTables::with_overrides(&overrides)?;
        Self::with_tables(config, PatternTables::builtin()?, tables)
    }

    /// Engine over caller-supplied tables. Canonical labels that only the synonym
    /// tables know get literal recognition rules, so every synonym the text rewrite
    /// produces can still be extracted.
    pub fn with_tables(config: &EngineConfig, mut patterns: PatternTables, synonyms: SynonymTables) -> Result<Self> {
        for category in [EntityCategory::Drug, EntityCategory::Organism] {
            let labels = synonyms.table(category).iter().map(|(_, canonical)| canonical);
            patterns.add_dictionary_rules(category, labels)?;
        }
        let patterns = Arc::new(patterns);
        let normalizer = Arc::new(SynonymNormalizer::new(synonyms, config.fuzzy_threshold)?);

        let engine = Self {
            config: config.clone(),
            extractor: EntityExtractor::new(Arc::clone(&patterns), Arc::clone(&normalizer)),
            classifier: IntentClassifier::new(Arc::clone(&patterns)),
            parameters: ParameterExtractor::new(Arc::clone(&patterns))?,
            suggestions: SuggestionGenerator::new(config.max_suggestions),
            patterns,
            normalizer,
        };

        info!(
            "QueryEngine ready (text normalization: {}, max suggestions: {})",
            config.normalize_query_text, config.max_suggestions
        );
        Ok(engine)
    }

    /// Analyze one query. Never fails: empty or unrecognised input yields the
    /// General category with low confidence.
    pub fn analyze(&self, query: &str) -> QueryContext {
        let text = query.trim().to_lowercase();
        let scan: Cow<'_, str> = if self.config.normalize_query_text {
            Cow::Owned(self.normalizer.normalize_text(&text))
        } else {
            Cow::Borrowed(text.as_str())
        };

        let entities = self.extractor.extract(&scan);
        let (category, confidence) = self.classifier.classify(&text, &entities);
        let parameters = self.parameters.extract(category, &entities, &text);
        let suggestions = self.suggestions.generate(category, &entities, &parameters);

        debug!(
            category = category.as_str(),
            confidence,
            drugs = entities.drugs.len(),
            organisms = entities.organisms.len(),
            numbers = entities.numbers.len(),
            effects = entities.effects.len(),
            "Query analyzed"
        );

        QueryContext {
            category,
            primary_intent: category.primary_intent().to_string(),
            entities,
            parameters,
            confidence,
            suggestions,
        }
    }

    /// Analyze many queries, in parallel for large batches when the `parallel`
    /// feature is enabled. Output order matches input order.
    pub fn analyze_batch(&self, queries: &[&str]) -> Vec<QueryContext> {
        #[cfg(feature = "parallel")]
        {
            if queries.len() > PARALLEL_BATCH_THRESHOLD {
                use rayon::prelude::*;
                return queries.par_iter().map(|q| self.analyze(q)).collect();
            }
        }
        queries.iter().map(|q| self.analyze(q)).collect()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn patterns(&self) -> &PatternTables {
        &self.patterns
    }

    pub fn normalizer(&self) -> &SynonymNormalizer {
        &self.normalizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_types::NumericKind;

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryEngine>();
    }

    #[test]
    fn test_config_defaults_from_empty_table() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.fuzzy_threshold, 0.8);
        assert_eq!(config.max_suggestions, 3);
        assert!(config.normalize_query_text);
    }

    #[test]
    fn test_synonym_rewrite_feeds_extraction() {
        let engine = QueryEngine::new().unwrap();
        let ctx = engine.analyze("Does EGCG extend lifespan in fruit flies?");
        assert!(ctx.entities.drugs.contains("green tea"));
        assert!(ctx.entities.organisms.contains("drosophila"));
    }

    #[test]
    fn test_rewrite_can_be_disabled() {
        let config = EngineConfig { normalize_query_text: false, ..Default::default() };
        let engine = QueryEngine::from_config(&config).unwrap();
        // "glucophage" is only known to the synonym table.
        assert!(engine.analyze("glucophage").entities.drugs.is_empty());
        let engine = QueryEngine::new().unwrap();
        assert!(engine.analyze("glucophage").entities.drugs.contains("metformin"));
    }

    #[test]
    fn test_inline_synonyms() {
        let mut config = EngineConfig::default();
        config.extra_synonyms.add("organism", "mouse", &["murine"]).unwrap();
        let engine = QueryEngine::from_config(&config).unwrap();
        let ctx = engine.analyze("murine studies");
        assert!(ctx.entities.organisms.contains("mouse"));
    }

    #[test]
    fn test_missing_synonyms_file_fails_construction() {
        let config = EngineConfig {
            synonyms_file: Some(PathBuf::from("/nonexistent/gerolyx-synonyms.json")),
            ..Default::default()
        };
        assert!(QueryEngine::from_config(&config).is_err());
    }

    #[test]
    fn test_analyze_batch_keeps_order() {
        let engine = QueryEngine::new().unwrap();
        let queries: Vec<&str> = std::iter::repeat(["top 5 drugs", "compare rapamycin and metformin"])
            .take(8)
            .flatten()
            .collect();
        let results = engine.analyze_batch(&queries);
        assert_eq!(results.len(), 16);
        for (i, ctx) in results.iter().enumerate() {
            let expected = if i % 2 == 0 { QueryCategory::Ranking } else { QueryCategory::Comparison };
            assert_eq!(ctx.category, expected);
        }
        assert_eq!(results[0].entities.numbers[0].kind, NumericKind::TopN);
    }
}
