//! Synonym tables: alternate spellings, abbreviations and trade names mapped to
//! one canonical label per entity category.
//!
//! Usage:
//! ```ignore
//! let tables = SynonymTables::builtin()?;
//! assert_eq!(tables.drug.get("sirolimus"), Some("rapamycin"));
//! ```
//!
//! Every canonical label is also listed as a key that maps to itself, so a label
//! emitted by a recognition rule resolves to itself by exact lookup.

use std::collections::BTreeMap;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entity_types::EntityCategory;
use crate::{QueryError, Result};

/// Many-to-one synonym map for one category.
///
/// Iteration follows insertion order; fuzzy resolution relies on that order to
/// break ties deterministically.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    category: EntityCategory,
    entries: Vec<(String, String)>,
    index: AHashMap<String, usize>,
}

impl SynonymTable {
    pub fn new(category: EntityCategory) -> Self {
        Self { category, entries: Vec::new(), index: AHashMap::new() }
    }

    /// Build from `(synonym, canonical)` pairs in order.
    pub fn from_pairs(category: EntityCategory, pairs: &[(&str, &str)]) -> Result<Self> {
        let mut table = Self::new(category);
        for (key, value) in pairs {
            table.insert(key, value)?;
        }
        Ok(table)
    }

    /// Insert a synonym. Key and value are trimmed and lower-cased. A key that is
    /// already present keeps its position and takes the new value; the previous
    /// value is returned.
    pub fn insert(&mut self, key: &str, value: &str) -> Result<Option<String>> {
        let key = key.trim().to_lowercase();
        let value = value.trim().to_lowercase();
        if key.is_empty() {
            return Err(QueryError::InvalidSynonym { key, value, reason: "empty synonym" });
        }
        if value.is_empty() {
            return Err(QueryError::InvalidSynonym { key, value, reason: "empty canonical label" });
        }

        match self.index.get(&key) {
            Some(&pos) => Ok(Some(std::mem::replace(&mut self.entries[pos].1, value))),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                Ok(None)
            }
        }
    }

    /// Exact lookup of an already lower-cased, trimmed key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// `(synonym, canonical)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn category(&self) -> EntityCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extra synonyms merged into the built-in tables at construction time.
///
/// Reads the JSON shape `{"drug_synonyms": {..}, "organism_synonyms": {..},
/// "effect_synonyms": {..}}`; the short names `drug`, `organism` and `effect` are
/// accepted as well so the same struct works as an inline TOML table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynonymOverrides {
    #[serde(default, alias = "drug")]
    pub drug_synonyms: BTreeMap<String, String>,
    #[serde(default, alias = "organism")]
    pub organism_synonyms: BTreeMap<String, String>,
    #[serde(default, alias = "effect")]
    pub effect_synonyms: BTreeMap<String, String>,
}

impl SynonymOverrides {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Add synonyms for `canonical` in a category given by name
    /// (`drug`, `organism`, `effect`).
    pub fn add(&mut self, category: &str, canonical: &str, synonyms: &[&str]) -> Result<()> {
        let category: EntityCategory = category.parse()?;
        let map = self.map_mut(category);
        for synonym in synonyms {
            map.insert(synonym.to_string(), canonical.to_string());
        }
        Ok(())
    }

    /// Merge `other` into `self`; entries in `other` win.
    pub fn merge(&mut self, other: SynonymOverrides) {
        self.drug_synonyms.extend(other.drug_synonyms);
        self.organism_synonyms.extend(other.organism_synonyms);
        self.effect_synonyms.extend(other.effect_synonyms);
    }

    pub fn is_empty(&self) -> bool {
        self.drug_synonyms.is_empty() && self.organism_synonyms.is_empty() && self.effect_synonyms.is_empty()
    }

    pub fn map(&self, category: EntityCategory) -> &BTreeMap<String, String> {
        match category {
            EntityCategory::Drug => &self.drug_synonyms,
            EntityCategory::Organism => &self.organism_synonyms,
            EntityCategory::Effect => &self.effect_synonyms,
        }
    }

    fn map_mut(&mut self, category: EntityCategory) -> &mut BTreeMap<String, String> {
        match category {
            EntityCategory::Drug => &mut self.drug_synonyms,
            EntityCategory::Organism => &mut self.organism_synonyms,
            EntityCategory::Effect => &mut self.effect_synonyms,
        }
    }
}

/// The three synonym tables, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct SynonymTables {
    pub drug: SynonymTable,
    pub organism: SynonymTable,
    pub effect: SynonymTable,
}

impl SynonymTables {
    // ── Constructors ──────────────────────────────────────────────────────────

    pub fn builtin() -> Result<Self> {
        let tables = Self {
            drug: SynonymTable::from_pairs(EntityCategory::Drug, DRUG_SYNONYMS)?,
            organism: SynonymTable::from_pairs(EntityCategory::Organism, ORGANISM_SYNONYMS)?,
            effect: SynonymTable::from_pairs(EntityCategory::Effect, EFFECT_SYNONYMS)?,
        };
        info!(
            "Synonym tables built: {} drug, {} organism, {} effect entries",
            tables.drug.len(),
            tables.organism.len(),
            tables.effect.len()
        );
        Ok(tables)
    }

    /// Built-in tables with `overrides` merged on top. A canonical label the table
    /// does not know yet gets a self-entry ahead of its first synonym.
    pub fn with_overrides(overrides: &SynonymOverrides) -> Result<Self> {
        let mut tables = Self::builtin()?;
        for category in EntityCategory::ALL {
            let table = tables.table_mut(category);
            for (key, value) in overrides.map(category) {
                let canonical = value.trim().to_lowercase();
                if !canonical.is_empty() && !table.contains_key(&canonical) {
                    table.insert(&canonical, &canonical)?;
                }
                if let Some(previous) = table.insert(key, value)? {
                    if previous != value.trim().to_lowercase() {
                        warn!(
                            category = category.as_str(),
                            synonym = key.as_str(),
                            previous = previous.as_str(),
                            replacement = value.as_str(),
                            "Synonym override replaces built-in canonical label"
                        );
                    }
                }
            }
        }
        if !overrides.is_empty() {
            info!(
                "Synonym overrides applied: {} drug, {} organism, {} effect",
                overrides.drug_synonyms.len(),
                overrides.organism_synonyms.len(),
                overrides.effect_synonyms.len()
            );
        }
        Ok(tables)
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    pub fn table(&self, category: EntityCategory) -> &SynonymTable {
        match category {
            EntityCategory::Drug => &self.drug,
            EntityCategory::Organism => &self.organism,
            EntityCategory::Effect => &self.effect,
        }
    }

    fn table_mut(&mut self, category: EntityCategory) -> &mut SynonymTable {
        match category {
            EntityCategory::Drug => &mut self.drug,
            EntityCategory::Organism => &mut self.organism,
            EntityCategory::Effect => &mut self.effect,
        }
    }
}

// Canonical self-entries come first within each group so they win fuzzy ties.
const DRUG_SYNONYMS: &[(&str, &str)] = &[
    // mTOR inhibitors
    ("rapamycin", "rapamycin"),
    ("sirolimus", "rapamycin"),
    ("rapa", "rapamycin"),
    ("rapamune", "rapamycin"),
    ("ay-22989", "rapamycin"),
    ("wy-090217", "rapamycin"),
    ("cci-779", "rapamycin"),
    ("temsirolimus", "rapamycin"),
    ("everolimus", "rapamycin"),
    ("ridaforolimus", "rapamycin"),
    // Biguanides
    ("metformin", "metformin"),
    ("glucophage", "metformin"),
    ("met", "metformin"),
    ("dimethylbiguanide", "metformin"),
    ("n,n-dimethylbiguanide", "metformin"),
    ("1,1-dimethylbiguanide", "metformin"),
    ("metformin hydrochloride", "metformin"),
    // Stilbenes
    ("resveratrol", "resveratrol"),
    ("res", "resveratrol"),
    ("trans-resveratrol", "resveratrol"),
    ("cis-resveratrol", "resveratrol"),
    ("3,5,4'-trihydroxystilbene", "resveratrol"),
    ("piceatannol", "resveratrol"),
    // Salicylates
    ("aspirin", "aspirin"),
    ("acetylsalicylic acid", "aspirin"),
    ("asa", "aspirin"),
    ("asp", "aspirin"),
    ("acetylsalicylate", "aspirin"),
    ("2-acetoxybenzoic acid", "aspirin"),
    ("salicylic acid acetate", "aspirin"),
    // Curcuminoids
    ("curcumin", "curcumin"),
    ("curcuma longa", "curcumin"),
    ("turmeric", "curcumin"),
    ("diferuloylmethane", "curcumin"),
    // Lithium salts
    ("lithium", "lithium"),
    ("lithium chloride", "lithium"),
    ("licl", "lithium"),
    ("lithium carbonate", "lithium"),
    ("lithium citrate", "lithium"),
    ("lithium acetate", "lithium"),
    ("lithium sulfate", "lithium"),
    // Methylxanthines
    ("caffeine", "caffeine"),
    ("caf", "caffeine"),
    ("1,3,7-trimethylxanthine", "caffeine"),
    ("coffee", "caffeine"),
    ("theine", "caffeine"),
    ("guaranine", "caffeine"),
    ("methyltheobromine", "caffeine"),
    // Polyamines
    ("spermidine", "spermidine"),
    ("spd", "spermidine"),
    ("n-(3-aminopropyl)-1,4-butanediamine", "spermidine"),
    ("1,5,10-triazadecane", "spermidine"),
    ("n-(3-aminopropyl)butane-1,4-diamine", "spermidine"),
    // NAD+ precursors
    ("nicotinamide", "nicotinamide"),
    ("nam", "nicotinamide"),
    ("niacinamide", "nicotinamide"),
    ("vitamin b3", "nicotinamide"),
    ("pyridine-3-carboxamide", "nicotinamide"),
    ("nicotinic acid amide", "nicotinamide"),
    ("3-pyridinecarboxamide", "nicotinamide"),
    // Flavonoids
    ("quercetin", "quercetin"),
    ("quercetol", "quercetin"),
    ("sophoretin", "quercetin"),
    ("meletin", "quercetin"),
    ("xanthaurine", "quercetin"),
    ("3,3',4',5,7-pentahydroxyflavone", "quercetin"),
    // Green tea catechins
    ("green tea", "green tea"),
    ("egcg", "green tea"),
    ("epigallocatechin", "green tea"),
    ("epigallocatechin gallate", "green tea"),
    ("epigallocatechin-3-gallate", "green tea"),
    ("catechin", "green tea"),
    ("camellia sinensis", "green tea"),
    ("green tea extract", "green tea"),
    ("gtee", "green tea"),
    // Dietary interventions
    ("caloric restriction", "caloric restriction"),
    ("cr", "caloric restriction"),
    ("dietary restriction", "caloric restriction"),
    ("calorie restriction", "caloric restriction"),
    ("food restriction", "caloric restriction"),
    ("undernutrition", "caloric restriction"),
    ("caloric restriction mimetic", "caloric restriction"),
    // Thiol antioxidants
    ("n-acetylcysteine", "n-acetylcysteine"),
    ("nac", "n-acetylcysteine"),
    ("n-acetyl-l-cysteine", "n-acetylcysteine"),
    ("acetylcysteine", "n-acetylcysteine"),
    ("n-acetyl cysteine", "n-acetylcysteine"),
    ("mucomyst", "n-acetylcysteine"),
    ("acetadote", "n-acetylcysteine"),
    // Olive phenols
    ("hydroxytyrosol", "hydroxytyrosol"),
    ("ht", "hydroxytyrosol"),
    ("3,4-dihydroxyphenylethanol", "hydroxytyrosol"),
    ("dopet", "hydroxytyrosol"),
    ("3,4-dhpea", "hydroxytyrosol"),
    ("polyphenol", "polyphenol"),
    // Vitamins
    ("vitamin a", "vitamin a"),
    ("retinol", "vitamin a"),
    ("vitamin b", "vitamin b"),
    ("vitamin c", "vitamin c"),
    ("ascorbic acid", "vitamin c"),
    ("ascorbate", "vitamin c"),
    ("l-ascorbic acid", "vitamin c"),
    ("vitamin c sodium", "vitamin c"),
    ("vitamin d", "vitamin d"),
    ("cholecalciferol", "vitamin d"),
    ("vitamin d3", "vitamin d"),
    ("calcitriol", "vitamin d"),
    ("1,25-dihydroxyvitamin d3", "vitamin d"),
    ("ergocalciferol", "vitamin d"),
    ("vitamin d2", "vitamin d"),
    ("vitamin e", "vitamin e"),
    ("tocopherol", "vitamin e"),
    ("alpha-tocopherol", "vitamin e"),
    ("vitamin e acetate", "vitamin e"),
    ("tocotrienol", "vitamin e"),
    ("vitamin k", "vitamin k"),
    ("phylloquinone", "vitamin k"),
    ("menaquinone", "vitamin k"),
    // Coenzyme Q10
    ("coenzyme q10", "coenzyme q10"),
    ("coq10", "coenzyme q10"),
    ("ubiquinone", "coenzyme q10"),
    ("ubiquinol", "coenzyme q10"),
    ("coenzyme q", "coenzyme q10"),
    ("q10", "coenzyme q10"),
    // Omega-3 fatty acids
    ("omega-3", "omega-3"),
    ("fish oil", "omega-3"),
    ("epa", "omega-3"),
    ("dha", "omega-3"),
    ("eicosapentaenoic acid", "omega-3"),
    ("docosahexaenoic acid", "omega-3"),
    ("omega 3", "omega-3"),
    ("n-3 fatty acids", "omega-3"),
    // Melatonin
    ("melatonin", "melatonin"),
    ("mt", "melatonin"),
    ("n-acetyl-5-methoxytryptamine", "melatonin"),
    ("mel", "melatonin"),
    ("5-methoxy-n-acetyltryptamine", "melatonin"),
];

const ORGANISM_SYNONYMS: &[(&str, &str)] = &[
    // Mouse
    ("mouse", "mouse"),
    ("mice", "mouse"),
    ("mus musculus", "mouse"),
    ("house mouse", "mouse"),
    ("laboratory mouse", "mouse"),
    ("c57bl/6", "mouse"),
    ("balb/c", "mouse"),
    ("dba/2", "mouse"),
    ("c3h", "mouse"),
    ("fvb", "mouse"),
    ("nude mouse", "mouse"),
    // Rat
    ("rat", "rat"),
    ("rats", "rat"),
    ("rattus norvegicus", "rat"),
    ("norway rat", "rat"),
    ("brown rat", "rat"),
    ("wistar", "rat"),
    ("sprague-dawley", "rat"),
    ("fischer 344", "rat"),
    ("lewis rat", "rat"),
    // Nematode
    ("c. elegans", "c. elegans"),
    ("c elegans", "c. elegans"),
    ("c.elegans", "c. elegans"),
    ("caenorhabditis elegans", "c. elegans"),
    ("worm", "c. elegans"),
    ("worms", "c. elegans"),
    ("nematode", "c. elegans"),
    ("roundworm", "c. elegans"),
    ("elegans", "c. elegans"),
    // Fruit fly
    ("drosophila", "drosophila"),
    ("drosophila melanogaster", "drosophila"),
    ("d. melanogaster", "drosophila"),
    ("d.melanogaster", "drosophila"),
    ("fruit fly", "drosophila"),
    ("fly", "drosophila"),
    ("flies", "drosophila"),
    ("vinegar fly", "drosophila"),
    // Yeast
    ("yeast", "yeast"),
    ("saccharomyces cerevisiae", "yeast"),
    ("s. cerevisiae", "yeast"),
    ("s.cerevisiae", "yeast"),
    ("baker's yeast", "yeast"),
    ("budding yeast", "yeast"),
    ("saccharomyces", "yeast"),
    // Human
    ("human", "human"),
    ("humans", "human"),
    ("homo sapiens", "human"),
    ("h. sapiens", "human"),
    ("h.sapiens", "human"),
    ("human cells", "human"),
    ("human tissue", "human"),
    ("clinical", "human"),
    // Primate
    ("primate", "primate"),
    ("primates", "primate"),
    ("monkey", "primate"),
    ("monkeys", "primate"),
    ("rhesus macaque", "primate"),
    // Zebrafish
    ("zebrafish", "zebrafish"),
    ("zebra fish", "zebrafish"),
    ("zebra-fish", "zebrafish"),
    ("danio rerio", "zebrafish"),
    ("d. rerio", "zebrafish"),
    ("d.rerio", "zebrafish"),
    // Killifish
    ("killifish", "killifish"),
    ("nothobranchius guentheri", "killifish"),
    ("n. guentheri", "killifish"),
    ("n.guentheri", "killifish"),
    ("annual fish", "killifish"),
    ("turquoise killifish", "killifish"),
];

const EFFECT_SYNONYMS: &[(&str, &str)] = &[
    ("lifespan", "lifespan"),
    ("life span", "lifespan"),
    ("longevity", "lifespan"),
    ("survival", "lifespan"),
    ("lifespan extension", "lifespan"),
    ("life extension", "lifespan"),
    ("longevity extension", "lifespan"),
    ("survival time", "lifespan"),
    ("aging", "aging"),
    ("ageing", "aging"),
    ("senescence", "aging"),
    ("cellular aging", "aging"),
    ("biological aging", "aging"),
    ("chronological aging", "aging"),
    ("replicative aging", "aging"),
    ("effect", "effect"),
    ("impact", "effect"),
    ("influence", "effect"),
    ("result", "effect"),
    ("outcome", "effect"),
    ("response", "effect"),
    ("change", "effect"),
    ("modification", "effect"),
    ("alteration", "effect"),
    ("extend", "extend"),
    ("extension", "extend"),
    ("prolong", "extend"),
    ("increase", "extend"),
    ("enhance", "extend"),
    ("improve", "extend"),
    ("boost", "extend"),
    ("augment", "extend"),
    ("amplify", "extend"),
    ("strengthen", "extend"),
    ("percent", "percent"),
    ("percentage", "percent"),
    ("%", "percent"),
    ("percent change", "percent"),
    ("relative change", "percent"),
    ("fold change", "percent"),
    ("times", "percent"),
    ("ratio", "percent"),
    ("healthspan", "healthspan"),
    ("health span", "healthspan"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternTables;

    #[test]
    fn test_lookup_synonym() {
        let t = SynonymTables::builtin().unwrap();
        assert_eq!(t.drug.get("sirolimus"), Some("rapamycin"));
        assert_eq!(t.drug.get("glucophage"), Some("metformin"));
        assert_eq!(t.organism.get("mice"), Some("mouse"));
        assert_eq!(t.effect.get("longevity"), Some("lifespan"));
        assert_eq!(t.drug.get("notacompound"), None);
    }

    #[test]
    fn test_every_rule_label_maps_to_itself() {
        let patterns = PatternTables::builtin().unwrap();
        let synonyms = SynonymTables::builtin().unwrap();
        for category in [EntityCategory::Drug, EntityCategory::Organism] {
            for label in patterns.canonical_labels(category) {
                assert_eq!(
                    synonyms.table(category).get(&label),
                    Some(label.as_str()),
                    "{} label '{}' must be a self-entry",
                    category.as_str(),
                    label
                );
            }
        }
    }

    #[test]
    fn test_every_value_is_a_rule_label() {
        let patterns = PatternTables::builtin().unwrap();
        let synonyms = SynonymTables::builtin().unwrap();
        for category in [EntityCategory::Drug, EntityCategory::Organism] {
            let labels = patterns.canonical_labels(category);
            for (key, value) in synonyms.table(category).iter() {
                assert!(labels.iter().any(|l| l == value), "'{key}' maps to unknown label '{value}'");
            }
        }
    }

    #[test]
    fn test_insert_keeps_position_and_replaces_value() {
        let mut table = SynonymTable::new(EntityCategory::Drug);
        assert_eq!(table.insert("Rapa ", "Rapamycin").unwrap(), None);
        table.insert("met", "metformin").unwrap();
        assert_eq!(table.insert("rapa", "sirolimus").unwrap(), Some("rapamycin".to_string()));
        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["rapa", "met"]);
        assert_eq!(table.get("rapa"), Some("sirolimus"));
    }

    #[test]
    fn test_insert_rejects_empty_entries() {
        let mut table = SynonymTable::new(EntityCategory::Organism);
        assert!(matches!(table.insert("  ", "mouse"), Err(QueryError::InvalidSynonym { .. })));
        assert!(matches!(table.insert("mice", ""), Err(QueryError::InvalidSynonym { .. })));
        assert!(table.is_empty());
    }

    #[test]
    fn test_overrides_from_json() {
        let json = r#"{"drug_synonyms": {"Urolithin": "urolithin a"}, "organism": {"medaka": "medaka"}}"#;
        let overrides = SynonymOverrides::from_json_str(json).unwrap();
        let t = SynonymTables::with_overrides(&overrides).unwrap();
        assert_eq!(t.drug.get("urolithin"), Some("urolithin a"));
        assert_eq!(t.organism.get("medaka"), Some("medaka"));
        assert_eq!(t.drug.get("sirolimus"), Some("rapamycin"));
    }

    #[test]
    fn test_new_canonical_label_gets_self_entry_first() {
        let mut overrides = SynonymOverrides::default();
        overrides.add("drug", "Urolithin A", &["mitopure"]).unwrap();
        let t = SynonymTables::with_overrides(&overrides).unwrap();
        assert_eq!(t.drug.get("urolithin a"), Some("urolithin a"));
        let tail: Vec<(&str, &str)> = t.drug.iter().skip(t.drug.len() - 2).collect();
        assert_eq!(tail, vec![("urolithin a", "urolithin a"), ("mitopure", "urolithin a")]);
    }

    #[test]
    fn test_overrides_add_and_merge() {
        let mut overrides = SynonymOverrides::default();
        overrides.add("drug", "acarbose", &["precose", "glucobay"]).unwrap();
        assert!(overrides.add("gene", "tp53", &["p53"]).is_err());

        let mut other = SynonymOverrides::default();
        other.add("drug", "acarbose-x", &["glucobay"]).unwrap();
        overrides.merge(other);
        assert_eq!(overrides.drug_synonyms.get("glucobay").map(String::as_str), Some("acarbose-x"));
        assert_eq!(overrides.drug_synonyms.len(), 2);
    }

    #[test]
    fn test_overrides_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synonyms.json");
        std::fs::write(&path, r#"{"effect_synonyms": {"health-span": "healthspan"}}"#).unwrap();
        let overrides = SynonymOverrides::from_json_file(&path).unwrap();
        assert_eq!(overrides.effect_synonyms.len(), 1);
        assert!(SynonymOverrides::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}
