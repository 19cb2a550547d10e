//! Static recognition tables: entity rules, the numeric-literal grammar and the
//! categorical intent pattern groups.
//!
//! All patterns are compiled once by [`PatternTables::builtin`] and never change
//! afterwards. Entity rules are written against canonical names; query text that
//! uses a synonym is rewritten by the normalizer before the rules run.

use ahash::AHashSet;
use regex::Regex;
use tracing::info;

use crate::entity_types::{EntityCategory, NumericKind};
use crate::Result;

/// A pattern paired with the canonical label it emits.
///
/// The label may reference capture groups (`$1`), in which case the emitted label
/// is the captured text.
#[derive(Debug, Clone)]
pub struct RecognitionRule {
    pattern: Regex,
    label: String,
}

impl RecognitionRule {
    pub fn new(pattern: &str, label: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(&format!("(?i){pattern}"))?,
            label: label.to_string(),
        })
    }

    /// A rule matching `label` literally and emitting it unchanged.
    pub fn literal(label: &str) -> Result<Self> {
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        let lead = if label.chars().next().is_some_and(is_word) { r"\b" } else { "" };
        let trail = if label.chars().next_back().is_some_and(is_word) { r"\b" } else { "" };
        let pattern = format!("{lead}{}{trail}", regex::escape(label));
        Self::new(&pattern, &label.replace('$', "$$"))
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The fixed label, or `None` when the label is taken from the match.
    pub fn fixed_label(&self) -> Option<&str> {
        (!self.label.contains('$')).then_some(self.label.as_str())
    }

    /// Every label this rule emits for `text`, one per match.
    pub fn labels<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.pattern.captures_iter(text).map(move |caps| {
            let mut label = String::new();
            caps.expand(&self.label, &mut label);
            label.trim().to_lowercase()
        })
    }
}

/// One rule of the numeric-literal grammar. Capture group 1 holds the number.
#[derive(Debug, Clone)]
pub struct NumericRule {
    pub kind: NumericKind,
    pattern: Regex,
}

impl NumericRule {
    pub fn new(kind: NumericKind, pattern: &str) -> Result<Self> {
        Ok(Self { kind, pattern: Regex::new(&format!("(?i){pattern}"))? })
    }

    /// `(start, end, value)` for every literal this rule recognises. The span is
    /// the span of the number itself.
    pub fn literals<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (usize, usize, f64)> + 'a {
        self.pattern.captures_iter(text).filter_map(|caps| {
            let m = caps.get(1)?;
            let value = m.as_str().parse::<f64>().ok()?;
            Some((m.start(), m.end(), value))
        })
    }
}

/// A presence/absence pattern that contributes to one intent family.
#[derive(Debug, Clone)]
pub struct PatternGroup {
    pub name: &'static str,
    pattern: Regex,
}

impl PatternGroup {
    pub fn new(name: &'static str, pattern: &str) -> Result<Self> {
        Ok(Self { name, pattern: Regex::new(&format!("(?i){pattern}"))? })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// The matched terms, lower-cased.
    pub fn terms<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.pattern.find_iter(text).map(|m| m.as_str().to_lowercase())
    }
}

/// Number of groups in `groups` that match `text` at least once.
pub fn count_matching(groups: &[PatternGroup], text: &str) -> usize {
    groups.iter().filter(|g| g.is_match(text)).count()
}

const DRUG_RULES: &[(&str, &str)] = &[
    (r"\b(rapamycin|sirolimus)\b", "rapamycin"),
    (r"\b(metformin)\b", "metformin"),
    (r"\b(resveratrol)\b", "resveratrol"),
    (r"\b(aspirin|acetylsalicylic acid)\b", "aspirin"),
    (r"\b(curcumin|turmeric)\b", "curcumin"),
    (r"\b(lithium|lithium chloride)\b", "lithium"),
    (r"\b(caffeine)\b", "caffeine"),
    (r"\b(vitamin [a-ek])\b", "$1"),
    (r"\b(spermidine)\b", "spermidine"),
    (r"\b(nicotinamide|nam|niacinamide)\b", "nicotinamide"),
    (r"\b(quercetin)\b", "quercetin"),
    (r"\b(green tea|egcg|epigallocatechin)\b", "green tea"),
    (r"\b(caloric restriction|cr)\b", "caloric restriction"),
    (r"\b(hydroxytyrosol)\b", "hydroxytyrosol"),
    (r"\b(polyphenol)\b", "polyphenol"),
    (r"\b(n-acetylcysteine|nac)\b", "n-acetylcysteine"),
    (r"\b(coenzyme q10|coq10)\b", "coenzyme q10"),
    (r"\b(omega-3|omega 3|fish oil)\b", "omega-3"),
    (r"\b(melatonin)\b", "melatonin"),
];

/// Vitamin letters the vitamin rule accepts; each is a canonical label.
pub const VITAMIN_LETTERS: &[char] = &['a', 'b', 'c', 'd', 'e', 'k'];

const ORGANISM_RULES: &[(&str, &str)] = &[
    (r"\b(mouse|mice|mus musculus)\b", "mouse"),
    (r"\b(rat|rats|rattus norvegicus)\b", "rat"),
    (r"\b(worm|worms|c\.?\s*elegans|caenorhabditis elegans|nematode)\b", "c. elegans"),
    (r"\b(fly|flies|drosophila|d\.?\s*melanogaster|fruit fly)\b", "drosophila"),
    (r"\b(yeast|s\.?\s*cerevisiae|saccharomyces)\b", "yeast"),
    (r"\b(human|humans|homo sapiens)\b", "human"),
    (r"\b(primate|primates|monkey|monkeys)\b", "primate"),
    (r"\b(zebrafish|danio rerio)\b", "zebrafish"),
    (r"\b(killifish)\b", "killifish"),
];

// Declared order decides which kind wins when two rules claim the same span.
const NUMERIC_RULES: &[(NumericKind, &str)] = &[
    (NumericKind::Percentage, r"\b(\d+(?:\.\d+)?)\s*(?:percent\b|%)"),
    (NumericKind::FoldChange, r"\b(\d+(?:\.\d+)?)\s*(?:fold|times)\b"),
    (NumericKind::Years, r"\b(\d+(?:\.\d+)?)\s*(?:year|years|yr)\b"),
    (NumericKind::Months, r"\b(\d+(?:\.\d+)?)\s*(?:month|months|mo)\b"),
    (NumericKind::TopN, r"\btop\s*(\d+)\b"),
    (NumericKind::FirstN, r"\bfirst\s*(\d+)\b"),
    (NumericKind::Dosage, r"\b(\d+(?:\.\d+)?)\s*(?:mg|g|kg|ml|l)\b"),
];

const EFFECT_GROUPS: &[(&str, &str)] = &[
    ("lifespan", r"\b(?:lifespan|life span|longevity|aging|ageing)\b"),
    ("extend", r"\b(?:extend|extension|increase|prolong|benefit|improve)\b"),
    ("effect", r"\b(?:effect|impact|influence|result|outcome)\b"),
    ("survival", r"\b(?:survival|mortality|death|live longer)\b"),
    ("percent", r"\b(?:percent|percentage|fold|times)\b|%"),
    ("healthspan", r"\b(?:healthspan|health span)\b"),
];

const COMPARISON_GROUPS: &[(&str, &str)] = &[
    ("compare", r"\b(?:compare|comparison|versus|vs\.?|against)\b"),
    ("better", r"\b(?:better|worse|more effective|less effective)\b"),
    ("difference", r"\b(?:difference|differ|similar|same|alike)\b"),
    ("which", r"\b(?:which is|what is the difference|which one)\b"),
    ("superior", r"\b(?:superior|inferior|outperform)\b"),
];

const RANKING_GROUPS: &[(&str, &str)] = &[
    ("best", r"\b(?:best|top|most|highest|greatest|maximum)\b"),
    ("worst", r"\b(?:worst|bottom|least|lowest|smallest|minimum)\b"),
    ("rank", r"\b(?:rank|ranking|order|list|sort)\b"),
    ("ordinal", r"\b(?:first|second|third|\d+st|\d+nd|\d+rd|\d+th)\b"),
    ("leading", r"\b(?:leading|premier|superior)\b"),
];

const MECHANISM_GROUPS: &[(&str, &str)] = &[
    ("how", r"\b(?:how|why|mechanism|pathway|target)\b"),
    ("work", r"\b(?:work|function|operate|act)\b"),
    ("molecular", r"\b(?:molecular|cellular|biochemical)\b"),
    ("gene", r"\b(?:gene|protein|enzyme|receptor)\b"),
    ("signaling", r"\b(?:signaling|signal|cascade)\b"),
];

const INFORMATIONAL_CUES: &str = r"(?i)\b(?:information|about|tell me|what is|describe)\b";
const LOCATIVE_CUES: &str = r"(?i)\b(?:in|on|for|using|with|tested)\b";
const SUPERLATIVE_CUES: &str = r"(?i)\b(?:best|top|most)\b";

/// Every compiled pattern the engine uses.
#[derive(Debug, Clone)]
pub struct PatternTables {
    pub drugs: Vec<RecognitionRule>,
    pub organisms: Vec<RecognitionRule>,
    pub numeric: Vec<NumericRule>,
    pub effect: Vec<PatternGroup>,
    pub comparison: Vec<PatternGroup>,
    pub ranking: Vec<PatternGroup>,
    pub mechanism: Vec<PatternGroup>,
    pub informational_cues: Regex,
    pub locative_cues: Regex,
    pub superlative_cues: Regex,
}

impl PatternTables {
    /// Compile the built-in tables.
    pub fn builtin() -> Result<Self> {
        let rules = |table: &[(&str, &str)]| -> Result<Vec<RecognitionRule>> {
            table.iter().map(|(p, l)| RecognitionRule::new(p, l)).collect()
        };
        let groups = |table: &[(&'static str, &str)]| -> Result<Vec<PatternGroup>> {
            table.iter().map(|(n, p)| PatternGroup::new(*n, p)).collect()
        };

        let tables = Self {
            drugs: rules(DRUG_RULES)?,
            organisms: rules(ORGANISM_RULES)?,
            numeric: NUMERIC_RULES
                .iter()
                .map(|(k, p)| NumericRule::new(*k, p))
                .collect::<Result<_>>()?,
            effect: groups(EFFECT_GROUPS)?,
            comparison: groups(COMPARISON_GROUPS)?,
            ranking: groups(RANKING_GROUPS)?,
            mechanism: groups(MECHANISM_GROUPS)?,
            informational_cues: Regex::new(INFORMATIONAL_CUES)?,
            locative_cues: Regex::new(LOCATIVE_CUES)?,
            superlative_cues: Regex::new(SUPERLATIVE_CUES)?,
        };

        info!(
            "Pattern tables compiled: {} drug rules, {} organism rules, {} numeric rules",
            tables.drugs.len(),
            tables.organisms.len(),
            tables.numeric.len()
        );
        Ok(tables)
    }

    /// Recognition rules for an entity category. Effects have no rules of their
    /// own; their terms come from the effect pattern groups.
    pub fn rules(&self, category: EntityCategory) -> &[RecognitionRule] {
        match category {
            EntityCategory::Drug => &self.drugs,
            EntityCategory::Organism => &self.organisms,
            EntityCategory::Effect => &[],
        }
    }

    /// Every label the rules of `category` can emit.
    pub fn canonical_labels(&self, category: EntityCategory) -> Vec<String> {
        let mut labels: Vec<String> = self
            .rules(category)
            .iter()
            .filter_map(|r| r.fixed_label().map(str::to_string))
            .collect();
        if category == EntityCategory::Drug {
            labels.extend(VITAMIN_LETTERS.iter().map(|c| format!("vitamin {c}")));
        }
        labels
    }

    /// Append a literal rule for every label in `labels` that no rule of
    /// `category` emits yet. Returns the number of rules added. Effects have no
    /// rules, so nothing is added for them.
    pub fn add_dictionary_rules<'a>(
        &mut self,
        category: EntityCategory,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Result<usize> {
        let mut known: AHashSet<String> = self.canonical_labels(category).into_iter().collect();
        let rules = match category {
            EntityCategory::Drug => &mut self.drugs,
            EntityCategory::Organism => &mut self.organisms,
            EntityCategory::Effect => return Ok(0),
        };

        let mut added = 0;
        for label in labels {
            if known.insert(label.to_string()) {
                rules.push(RecognitionRule::literal(label)?);
                added += 1;
            }
        }
        if added > 0 {
            info!("Added {} dictionary rules for {} labels", added, category.as_str());
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> PatternTables {
        PatternTables::builtin().unwrap()
    }

    #[test]
    fn test_builtin_compiles() {
        let t = tables();
        assert_eq!(t.numeric.len(), 7);
        assert_eq!(t.effect.len(), 6);
        assert_eq!(t.comparison.len(), 5);
        assert_eq!(t.ranking.len(), 5);
        assert_eq!(t.mechanism.len(), 5);
    }

    #[test]
    fn test_fixed_label_rule() {
        let rule = RecognitionRule::new(r"\b(rapamycin|sirolimus)\b", "rapamycin").unwrap();
        let labels: Vec<String> = rule.labels("sirolimus or rapamycin").collect();
        assert_eq!(labels, vec!["rapamycin", "rapamycin"]);
        assert_eq!(rule.fixed_label(), Some("rapamycin"));
    }

    #[test]
    fn test_captured_label_rule() {
        let rule = RecognitionRule::new(r"\b(vitamin [a-ek])\b", "$1").unwrap();
        let labels: Vec<String> = rule.labels("Vitamin D and vitamin e").collect();
        assert_eq!(labels, vec!["vitamin d", "vitamin e"]);
        assert_eq!(rule.fixed_label(), None);
        assert_eq!(rule.labels("vitamin b3").count(), 0);
    }

    #[test]
    fn test_rules_respect_word_boundaries() {
        let t = tables();
        let hits: usize = t.drugs.iter().map(|r| r.labels("crude macronutrients").count()).sum();
        assert_eq!(hits, 0);
        let hits: usize = t.organisms.iter().map(|r| r.labels("rationale").count()).sum();
        assert_eq!(hits, 0);
    }

    #[test]
    fn test_numeric_literal_span_is_the_number() {
        let rule = NumericRule::new(NumericKind::TopN, r"\btop\s*(\d+)\b").unwrap();
        let found: Vec<_> = rule.literals("the top 10 drugs").collect();
        assert_eq!(found, vec![(8, 10, 10.0)]);
    }

    #[test]
    fn test_percent_sign_needs_no_trailing_boundary() {
        let t = tables();
        let pct = &t.numeric[0];
        assert_eq!(pct.kind, NumericKind::Percentage);
        let values: Vec<f64> = pct.literals("over 20% and 12.5 percent").map(|(_, _, v)| v).collect();
        assert_eq!(values, vec![20.0, 12.5]);
    }

    #[test]
    fn test_count_matching_counts_groups_once() {
        let t = tables();
        assert_eq!(count_matching(&t.effect, "lifespan lifespan longevity"), 1);
        assert_eq!(count_matching(&t.effect, "lifespan effect in 20%"), 3);
        assert_eq!(count_matching(&t.mechanism, ""), 0);
    }

    #[test]
    fn test_group_terms() {
        let t = tables();
        let terms: Vec<String> = t.effect[0].terms("Longevity and aging").collect();
        assert_eq!(terms, vec!["longevity", "aging"]);
    }

    #[test]
    fn test_literal_rule_matches_whole_label() {
        let rule = RecognitionRule::literal("urolithin a").unwrap();
        let labels: Vec<String> = rule.labels("Urolithin A or urolithin abc").collect();
        assert_eq!(labels, vec!["urolithin a"]);
        assert_eq!(rule.fixed_label(), Some("urolithin a"));
    }

    #[test]
    fn test_dictionary_rules_only_for_unknown_labels() {
        let mut t = tables();
        let before = t.drugs.len();
        let added = t
            .add_dictionary_rules(EntityCategory::Drug, ["rapamycin", "nmn", "nmn", "vitamin d"])
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(t.drugs.len(), before + 1);
        assert!(t.canonical_labels(EntityCategory::Drug).contains(&"nmn".to_string()));
        assert_eq!(t.add_dictionary_rules(EntityCategory::Effect, ["lifespan"]).unwrap(), 0);
    }

    #[test]
    fn test_canonical_labels_include_vitamins() {
        let t = tables();
        let labels = t.canonical_labels(EntityCategory::Drug);
        assert!(labels.contains(&"rapamycin".to_string()));
        assert!(labels.contains(&"vitamin k".to_string()));
        assert!(t.canonical_labels(EntityCategory::Effect).is_empty());
        assert!(t.canonical_labels(EntityCategory::Organism).contains(&"c. elegans".to_string()));
    }
}
