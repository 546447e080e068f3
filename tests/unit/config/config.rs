use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = PipelineConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.asset_dir, PathBuf::from("Dataset"));
    assert_eq!(cfg.max_input_chars, DEFAULT_MAX_INPUT_CHARS);
    assert_eq!(cfg.match_strategy, MatchStrategy::MaximalMunch);
    assert_eq!(cfg.busy_policy, BusyPolicy::Reject);
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = PipelineConfig::from_json(
        r#"{
            "asset_dir": "clips",
            "match_strategy": "first_fit",
            "unknown_letters": "report",
            "busy_policy": "cancel_in_flight",
            "encoder": { "crf": 18 }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.asset_dir, PathBuf::from("clips"));
    assert_eq!(cfg.match_strategy, MatchStrategy::FirstFit);
    assert_eq!(cfg.unknown_letters, UnknownLetterPolicy::Report);
    assert_eq!(cfg.busy_policy, BusyPolicy::CancelInFlight);
    assert_eq!(cfg.encoder.crf, 18);
    assert_eq!(cfg.encoder.preset, "medium");
    assert_eq!(cfg.max_input_chars, DEFAULT_MAX_INPUT_CHARS);
}

#[test]
fn unknown_fields_and_bad_enums_are_rejected() {
    assert!(matches!(
        PipelineConfig::from_json(r#"{"asset_directory": "x"}"#),
        Err(SignError::Serde(_))
    ));
    assert!(PipelineConfig::from_json(r#"{"match_strategy": "random"}"#).is_err());
}

#[test]
fn validation_rejects_zero_length_cap_and_bad_encoder() {
    let cfg = PipelineConfig {
        max_input_chars: 0,
        ..PipelineConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(SignError::Config(_))));

    let mut cfg = PipelineConfig::default();
    cfg.encoder.playback_rate = 3.0;
    assert!(cfg.validate().is_err());
}

#[test]
fn json_round_trip_preserves_values() {
    let mut cfg = PipelineConfig::default();
    cfg.match_strategy = MatchStrategy::FirstFit;
    cfg.encoder.spacer_rgb = [255, 255, 255];
    let back = PipelineConfig::from_json(&cfg.to_json_pretty().unwrap()).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn load_reads_and_validates_file() {
    let path = std::env::temp_dir().join(format!(
        "signclip_config_{}_{}.json",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::write(&path, r#"{"max_input_chars": 0}"#).unwrap();
    assert!(PipelineConfig::load(&path).is_err());

    std::fs::write(&path, r#"{"max_input_chars": 50}"#).unwrap();
    assert_eq!(PipelineConfig::load(&path).unwrap().max_input_chars, 50);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(
        PipelineConfig::load(&path),
        Err(SignError::Other(_))
    ));
}
