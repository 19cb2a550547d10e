//! Extra synonyms merged from a JSON file and from inline configuration.

use std::io::Write;

use gerolyx_query::{
    EngineConfig, EntityCategory, MatchTier, QueryCategory, QueryEngine, QueryError, SynonymOverrides,
};
use pretty_assertions::assert_eq;

fn write_synonyms(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_synonyms_file_extends_builtin_tables() {
    let file = write_synonyms(
        r#"{
            "drug_synonyms": {"Sirolimus-X": "rapamycin", "dmbg": "metformin"},
            "organism_synonyms": {"lab mice": "mouse"}
        }"#,
    );
    let config = EngineConfig { synonyms_file: Some(file.path().to_path_buf()), ..Default::default() };
    let engine = QueryEngine::from_config(&config).unwrap();

    let ctx = engine.analyze("compare dmbg and sirolimus-x in lab mice");
    assert_eq!(ctx.entities.drugs.iter().collect::<Vec<_>>(), vec!["metformin", "rapamycin"]);
    assert_eq!(ctx.entities.organisms.iter().collect::<Vec<_>>(), vec!["mouse"]);
}

#[test]
fn test_inline_synonyms_win_over_file() {
    let file = write_synonyms(r#"{"drug_synonyms": {"metfo": "metformin"}}"#);
    let mut inline = SynonymOverrides::default();
    inline.add("drug", "rapamycin", &["metfo"]).unwrap();
    let config = EngineConfig {
        synonyms_file: Some(file.path().to_path_buf()),
        extra_synonyms: inline,
        ..Default::default()
    };
    let engine = QueryEngine::from_config(&config).unwrap();

    let resolution = engine.normalizer().resolve("metfo", EntityCategory::Drug).unwrap();
    assert_eq!(resolution.canonical, "rapamycin");
    assert_eq!(resolution.tier, MatchTier::Exact);
}

#[test]
fn test_malformed_file_is_rejected() {
    let file = write_synonyms("{not json");
    let config = EngineConfig { synonyms_file: Some(file.path().to_path_buf()), ..Default::default() };
    assert!(matches!(QueryEngine::from_config(&config), Err(QueryError::Json(_))));
}

#[test]
fn test_empty_canonical_is_rejected() {
    let file = write_synonyms(r#"{"organism_synonyms": {"medaka": "  "}}"#);
    let config = EngineConfig { synonyms_file: Some(file.path().to_path_buf()), ..Default::default() };
    assert!(matches!(QueryEngine::from_config(&config), Err(QueryError::InvalidSynonym { .. })));
}

#[test]
fn test_inline_table_parses_from_toml_shape() {
    // The short table names used in config files deserialize into the same struct.
    let overrides: SynonymOverrides =
        serde_json::from_str(r#"{"drug": {"urolithin": "urolithin a"}, "effect": {"life-span": "lifespan"}}"#)
            .unwrap();
    assert_eq!(overrides.drug_synonyms.get("urolithin").map(String::as_str), Some("urolithin a"));
    assert_eq!(overrides.effect_synonyms.len(), 1);
}

#[test]
fn test_new_canonical_label_is_extracted() {
    let mut config = EngineConfig::default();
    config.extra_synonyms.add("drug", "urolithin a", &["urolithin", "mitopure"]).unwrap();
    let engine = QueryEngine::from_config(&config).unwrap();

    let ctx = engine.analyze("tell me about mitopure");
    assert_eq!(ctx.entities.drugs.iter().collect::<Vec<_>>(), vec!["urolithin a"]);
    assert_eq!(ctx.category, QueryCategory::DrugSearch);

    let ctx = engine.analyze("what is urolithin");
    assert_eq!(ctx.entities.drugs.iter().collect::<Vec<_>>(), vec!["urolithin a"]);

    let resolution = engine.normalizer().resolve("urolithin a", EntityCategory::Drug).unwrap();
    assert_eq!(resolution.tier, MatchTier::Exact);
}

#[test]
fn test_remapped_builtin_synonym_is_extracted() {
    let mut config = EngineConfig::default();
    config.extra_synonyms.add("organism", "rodent", &["mice"]).unwrap();
    let engine = QueryEngine::from_config(&config).unwrap();

    let ctx = engine.analyze("drugs tested in mice");
    assert_eq!(ctx.entities.organisms.iter().collect::<Vec<_>>(), vec!["rodent"]);
    assert_eq!(ctx.category, QueryCategory::OrganismSpecific);
}
