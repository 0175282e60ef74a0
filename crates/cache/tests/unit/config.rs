//! # Configuration Tests
//!
//! Tests for configuration structures, deserialization, defaults, and validation.

use std::io::Write;

use cachesim_core::CacheError;
use cachesim_core::config::*;
use rstest::rstest;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.llc.name, "l2");
    assert_eq!(config.llc.policy, ReplacementPolicy::Lru);
    assert_eq!(config.tracking.scheme, TrackingScheme::GoodBadUgly);
}

#[test]
fn test_cache_config_defaults() {
    let cache = CacheConfig::default();
    assert_eq!(cache.size_bytes, 1024 * 1024);
    assert_eq!(cache.line_bytes, 64);
    assert_eq!(cache.ways, 8);
    assert_eq!(cache.num_threads, 2);
    assert!(cache.validate().is_ok());
}

#[test]
fn test_set_dueling_defaults() {
    let dueling = SetDuelingConfig::default();
    assert_eq!(
        dueling.candidates,
        vec![ReplacementPolicy::Lru, ReplacementPolicy::DeadBlockPredictionLru]
    );
    assert_eq!(dueling.sets_per_monitor, 32);
    assert_eq!(dueling.criterion, DuelingCriterion::HelperThreadUsefulness);
    assert_eq!(dueling.cycles_per_interval, 5_000_000);
}

#[test]
fn test_dip_defaults() {
    let dip = DipConfig::default();
    assert_eq!(dip.psel_max, 1024);
    assert_eq!(dip.sdm_size, 32);
    assert_eq!(dip.bimodal_throttle, 5);
}

#[test]
fn test_policy_names() {
    assert_eq!(ReplacementPolicy::DeadBlockPredictionLru.name(), "deadBlockPredictionLru");
    assert_eq!(ReplacementPolicy::RereferenceIntervalPrediction.name(), "rereferenceIntervalPrediction");
    assert_eq!(ReplacementPolicy::SetDueling.name(), "setDueling");
}

#[test]
fn test_deserialize_partial_json_fills_defaults() {
    let json = r#"{
        "llc": {
            "ways": 16,
            "policy": "rereference_interval_prediction",
            "dip": { "bimodal_throttle": 10 }
        }
    }"#;
    let config = Config::from_json(json).unwrap();
    assert_eq!(config.llc.ways, 16);
    assert_eq!(config.llc.size_bytes, 1024 * 1024);
    assert_eq!(config.llc.policy, ReplacementPolicy::RereferenceIntervalPrediction);
    assert_eq!(config.llc.dip.bimodal_throttle, 10);
    assert_eq!(config.llc.dip.sdm_size, 32);
    assert_eq!(config.tracking.scheme, TrackingScheme::GoodBadUgly);
}

#[test]
fn test_deserialize_set_dueling() {
    let json = r#"{
        "llc": {
            "policy": "set_dueling",
            "set_dueling": {
                "candidates": ["helper_thread_aware_lru", "lfu", "random"],
                "criterion": "main_thread_misses",
                "cycles_per_interval": 1000
            }
        },
        "tracking": { "scheme": "used_polluting" }
    }"#;
    let config = Config::from_json(json).unwrap();
    let dueling = &config.llc.set_dueling;
    assert_eq!(dueling.candidates.len(), 3);
    assert_eq!(dueling.candidates[0], ReplacementPolicy::HelperThreadAwareLru);
    assert_eq!(dueling.criterion, DuelingCriterion::MainThreadMisses);
    assert_eq!(dueling.cycles_per_interval, 1000);
    assert_eq!(dueling.sets_per_monitor, 32);
    assert_eq!(config.tracking.scheme, TrackingScheme::UsedPolluting);
}

#[test]
fn test_deserialize_rejects_unknown_policy() {
    let result = Config::from_json(r#"{ "llc": { "policy": "clock" } }"#);
    assert!(matches!(result, Err(CacheError::Parse(_))));
}

#[test]
fn test_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{ "llc": { "name": "llc", "size_bytes": 65536, "ways": 4 } }"#)
        .unwrap();

    let config = Config::from_json_file(file.path()).unwrap();
    assert_eq!(config.llc.name, "llc");
    assert_eq!(config.llc.size_bytes, 65536);
}

#[test]
fn test_from_json_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::from_json_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(CacheError::Io(_))));
}

#[rstest]
#[case(r#"{ "llc": { "size_bytes": 0 } }"#)]
#[case(r#"{ "llc": { "ways": 0 } }"#)]
#[case(r#"{ "llc": { "line_bytes": 48 } }"#)]
#[case(r#"{ "llc": { "num_threads": 0 } }"#)]
#[case(r#"{ "llc": { "policy": "set_dueling", "set_dueling": { "candidates": [] } } }"#)]
#[case(r#"{ "llc": { "policy": "set_dueling", "set_dueling": { "candidates": ["lru", "set_dueling"] } } }"#)]
fn test_validation_errors(#[case] json: &str) {
    let result = Config::from_json(json);
    assert!(matches!(result, Err(CacheError::InvalidConfig(_))), "{json}: {result:?}");
}
