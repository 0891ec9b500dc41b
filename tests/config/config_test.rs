//! Tests for loading sampling configurations from disk

use std::path::PathBuf;

use ncc_sampler::{SamplingConfig, SamplingError};

fn temp_config_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ncc-sampler-{}-{name}.json", std::process::id()))
}

#[test]
fn test_load_config_file() {
    let path = temp_config_path("valid");
    std::fs::write(
        &path,
        r#"{
            "controls_per_case": 3,
            "match_on_age": true,
            "age_caliper": 1.5,
            "match_on_visit_date": true,
            "visit_date_caliper": 14,
            "random_seed": 123
        }"#,
    )
    .unwrap();

    let config = SamplingConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.controls_per_case, 3);
    assert_eq!(config.age_caliper_days(), 547);
    assert!(config.match_on_visit_date);
    assert_eq!(config.visit_date_caliper, 14);
    assert_eq!(config.random_seed, Some(123));
    assert!(!config.use_parallel);
}

#[test]
fn test_missing_config_file() {
    let err = SamplingConfig::from_json_file(&temp_config_path("missing")).unwrap_err();
    assert!(matches!(err, SamplingError::Io(_)));
}

#[test]
fn test_invalid_values_in_file() {
    let path = temp_config_path("invalid");
    std::fs::write(&path, r#"{ "min_age_days": 50, "max_age_days": 10 }"#)
        .unwrap();

    let result = SamplingConfig::from_json_file(&path);
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(SamplingError::InvalidConfig(_))));
}

#[test]
fn test_builder_matches_json() {
    let from_json = SamplingConfig::from_json_str(
        r#"{ "first_outcome_only": true, "washout_period": 365, "match_on_gender": false }"#,
    )
    .unwrap();
    let from_builder = SamplingConfig::builder()
        .first_outcome_only(true)
        .washout_period(365)
        .match_on_gender(false)
        .build();
    assert_eq!(from_json, from_builder);
}
