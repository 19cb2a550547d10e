//! Entity categories and the entity containers produced by extraction.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::QueryError;

/// Vocabulary category an entity or synonym table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Drug,
    Organism,
    Effect,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 3] = [EntityCategory::Drug, EntityCategory::Organism, EntityCategory::Effect];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Drug => "drug",
            EntityCategory::Organism => "organism",
            EntityCategory::Effect => "effect",
        }
    }
}

impl FromStr for EntityCategory {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drug" | "drugs" | "compound" | "compounds" => Ok(EntityCategory::Drug),
            "organism" | "organisms" => Ok(EntityCategory::Organism),
            "effect" | "effects" => Ok(EntityCategory::Effect),
            other => Err(QueryError::UnknownCategory(other.to_string())),
        }
    }
}

/// What a numeric literal in the query measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Percentage,
    FoldChange,
    Years,
    Months,
    TopN,
    FirstN,
    Dosage,
}

impl NumericKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericKind::Percentage => "percentage",
            NumericKind::FoldChange => "fold_change",
            NumericKind::Years => "years",
            NumericKind::Months => "months",
            NumericKind::TopN => "top_n",
            NumericKind::FirstN => "first_n",
            NumericKind::Dosage => "dosage",
        }
    }

    /// Kinds that bound the number of results ("top 5", "first 3").
    pub fn is_count(&self) -> bool {
        matches!(self, NumericKind::TopN | NumericKind::FirstN)
    }

    pub fn is_duration(&self) -> bool {
        matches!(self, NumericKind::Years | NumericKind::Months)
    }
}

/// A number recognised by the numeric-literal grammar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericEntity {
    pub value: f64,
    pub kind: NumericKind,
}

/// Entities found in one query.
///
/// The string sets deduplicate by canonical value. `numbers` keeps every grammar
/// match in order of appearance and is never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub drugs: BTreeSet<String>,
    pub organisms: BTreeSet<String>,
    pub numbers: Vec<NumericEntity>,
    pub effects: BTreeSet<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty() && self.organisms.is_empty() && self.numbers.is_empty() && self.effects.is_empty()
    }

    /// First numeric entity (in text order) accepted by `pred`.
    pub fn first_number(&self, pred: impl Fn(NumericKind) -> bool) -> Option<&NumericEntity> {
        self.numbers.iter().find(|n| pred(n.kind))
    }

    pub fn has_count_limit(&self) -> bool {
        self.numbers.iter().any(|n| n.kind.is_count())
    }

    pub(crate) fn set_mut(&mut self, category: EntityCategory) -> &mut BTreeSet<String> {
        match category {
            EntityCategory::Drug => &mut self.drugs,
            EntityCategory::Organism => &mut self.organisms,
            EntityCategory::Effect => &mut self.effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str() {
        assert_eq!("drug".parse::<EntityCategory>().unwrap(), EntityCategory::Drug);
        assert_eq!("Compounds".parse::<EntityCategory>().unwrap(), EntityCategory::Drug);
        assert_eq!(" organism ".parse::<EntityCategory>().unwrap(), EntityCategory::Organism);
        assert_eq!("effects".parse::<EntityCategory>().unwrap(), EntityCategory::Effect);
        assert!(matches!("gene".parse::<EntityCategory>(), Err(QueryError::UnknownCategory(_))));
    }

    #[test]
    fn test_numeric_kind_serializes_snake_case() {
        let n = NumericEntity { value: 10.0, kind: NumericKind::TopN };
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, r#"{"value":10.0,"kind":"top_n"}"#);
        assert_eq!(NumericKind::FoldChange.as_str(), "fold_change");
    }

    #[test]
    fn test_first_number_respects_text_order() {
        let entities = ExtractedEntities {
            numbers: vec![
                NumericEntity { value: 5.0, kind: NumericKind::Dosage },
                NumericEntity { value: 20.0, kind: NumericKind::Percentage },
                NumericEntity { value: 30.0, kind: NumericKind::Percentage },
            ],
            ..Default::default()
        };
        let first = entities.first_number(|k| k == NumericKind::Percentage).unwrap();
        assert_eq!(first.value, 20.0);
        assert!(!entities.has_count_limit());
    }

    #[test]
    fn test_sets_deduplicate() {
        let mut entities = ExtractedEntities::default();
        entities.set_mut(EntityCategory::Organism).insert("mouse".to_string());
        entities.set_mut(EntityCategory::Organism).insert("mouse".to_string());
        assert_eq!(entities.organisms.len(), 1);
        assert!(!entities.is_empty());
    }
}
