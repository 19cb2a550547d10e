//! Query understanding for natural-language questions about longevity compounds.
//!
//! Turns free text such as "compare rapamycin and metformin in mice" into a typed
//! [`QueryContext`]: the query category with a confidence, the recognised compounds,
//! organisms, effect terms and numeric literals, and the parameters a data operation
//! needs. Everything runs against immutable tables built once at startup, so a
//! single [`QueryEngine`] can be shared across threads without locking.

pub mod classifier;
pub mod dispatch;
pub mod engine;
pub mod entity_types;
pub mod extractor;
pub mod normalizer;
pub mod parameters;
pub mod patterns;
pub mod similarity;
pub mod suggestions;
pub mod synonyms;
pub mod validation;

pub use classifier::{IntentClassifier, IntentWeights, QueryCategory};
pub use dispatch::{DataOperation, PromptTemplate};
pub use engine::{EngineConfig, QueryContext, QueryEngine};
pub use entity_types::{EntityCategory, ExtractedEntities, NumericEntity, NumericKind};
pub use extractor::EntityExtractor;
pub use normalizer::{MatchTier, Resolution, SynonymNormalizer};
pub use parameters::{ComparisonType, ParameterExtractor, QueryParameters, SortOrder, TimePeriod, TimeUnit};
pub use patterns::{PatternGroup, PatternTables, RecognitionRule};
pub use similarity::similarity;
pub use suggestions::SuggestionGenerator;
pub use synonyms::{SynonymOverrides, SynonymTable, SynonymTables};
pub use validation::{validate_query, QueryValidation};

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid recognition pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Synonym automaton build failed: {0}")]
    Automaton(#[from] aho_corasick::BuildError),

    #[error("Invalid synonym entry '{key}' -> '{value}': {reason}")]
    InvalidSynonym {
        key: String,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown entity category: {0}")]
    UnknownCategory(String),

    #[error("Synonym file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Synonym file parse failed: {0}")]
    Json(#[from] serde_json::Error),
}
