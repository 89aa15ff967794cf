use pretty_assertions::assert_eq;
use revcast::error::ForecastError;
use revcast::{AnchorPolicy, EngineConfig, ForecastEngine, RevcastConfig};
use rstest::rstest;
use series_math::ArimaOrder;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = RevcastConfig::default();

    assert_eq!(config.engine.order, ArimaOrder::new(1, 1, 1));
    assert_eq!(config.engine.min_history_points, 3);
    assert_eq!(config.engine.default_horizon, 6);
    assert_eq!(config.engine.anchor, AnchorPolicy::Calendar);
    assert_eq!(config.engine.round_decimals, Some(2));
    assert!(!config.engine.parallel);
    assert_eq!(config.ingest.category_column, "category");
    assert_eq!(config.ingest.value_column, "revenue");
    assert_eq!(config.ingest.default_category, "Total Sales");
    assert_eq!(config.ingest.date_columns[0], "date");
}

#[test]
fn test_partial_document() {
    let config = RevcastConfig::from_json_str(
        r#"{
            "engine": { "parallel": true, "round_decimals": null },
            "ingest": { "value_column": "amount" }
        }"#,
    )
    .unwrap();

    assert!(config.engine.parallel);
    assert_eq!(config.engine.round_decimals, None);
    assert_eq!(config.engine.default_horizon, 6);
    assert_eq!(config.ingest.value_column, "amount");
    assert_eq!(config.ingest.category_column, "category");
}

#[test]
fn test_empty_document() {
    assert_eq!(RevcastConfig::from_json_str("{}").unwrap(), RevcastConfig::default());
}

#[rstest]
#[case(r#"{ "engine": { "min_history_points": 0 } }"#)]
#[case(r#"{ "engine": { "default_horizon": 0 } }"#)]
#[case(r#"{ "engine": { "max_fit_iterations": 0 } }"#)]
#[case(r#"{ "engine": { "round_decimals": 11 } }"#)]
fn test_invalid_values_rejected(#[case] json: &str) {
    let result = RevcastConfig::from_json_str(json);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_malformed_document() {
    let result = RevcastConfig::from_json_str(r#"{ "engine": { "anchor": "sideways" } }"#);
    assert!(matches!(result, Err(ForecastError::ConfigError(_))));
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{ "engine": {{ "order": {{ "p": 2, "d": 1, "q": 0 }} }} }}"#).unwrap();

    let config = RevcastConfig::from_file(file.path()).unwrap();
    assert_eq!(config.engine.order, ArimaOrder::new(2, 1, 0));
}

#[test]
fn test_engine_rejects_invalid_order() {
    let config = EngineConfig {
        order: ArimaOrder::new(9, 1, 1),
        ..EngineConfig::default()
    };
    assert!(ForecastEngine::new(config).is_err());
}

#[test]
fn test_engine_rejects_invalid_config() {
    let config = EngineConfig {
        min_history_points: 0,
        ..EngineConfig::default()
    };
    assert!(matches!(
        ForecastEngine::new(config),
        Err(ForecastError::InvalidParameter(_))
    ));
}
