use super::*;

#[test]
fn lowercases_and_strips_punctuation() {
    let n = normalize("Hello, World!");
    assert_eq!(n.clean_text, "hello world");
    assert_eq!(n.sentence_type, SentenceType::Exclamation);
}

#[test]
fn keeps_digits_and_collapses_runs() {
    assert_eq!(clean("  abc -- 5\t\n7  "), "abc 5 7");
    assert_eq!(clean("don't"), "don t");
    assert_eq!(clean("naïve café"), "na ve caf");
}

#[test]
fn question_wins_over_exclamation() {
    assert_eq!(SentenceType::detect("wow! really?"), SentenceType::Question);
    assert_eq!(SentenceType::detect("really? wow!"), SentenceType::Question);
    assert_eq!(SentenceType::detect("wow!"), SentenceType::Exclamation);
    assert_eq!(SentenceType::detect("ok."), SentenceType::Statement);
}

#[test]
fn marker_keys_match_sentence_types() {
    assert_eq!(SentenceType::Statement.marker_key(), None);
    assert_eq!(SentenceType::Question.marker_key(), Some("question"));
    assert_eq!(SentenceType::Exclamation.marker_key(), Some("exclamation"));
}

#[test]
fn empty_and_symbol_only_inputs_normalize_to_empty() {
    for raw in ["", "   ", "?!", "---", "¿¡"] {
        let n = normalize(raw);
        assert!(n.is_empty(), "{raw:?} should normalize to empty");
        assert!(n.words().is_empty());
    }
}

#[test]
fn normalization_is_idempotent_on_clean_text() {
    for raw in [
        "Hello?",
        "  Thank   you!! ",
        "abc 5",
        "It's 10 o'clock...",
        "MiXeD_case-Words",
        "",
    ] {
        let once = normalize(raw);
        let twice = normalize(&once.clean_text);
        assert_eq!(once.clean_text, twice.clean_text);
        assert_eq!(twice.sentence_type, SentenceType::Statement);
    }
}

#[test]
fn validate_input_rejects_over_length_without_truncating() {
    assert!(validate_input("hello", 5).is_ok());
    let err = validate_input("hello!", 5).unwrap_err();
    assert!(matches!(err, SignError::InvalidInput(_)));
    assert!(err.to_string().contains("6 characters"));
}

#[test]
fn validate_input_counts_chars_not_bytes() {
    assert!(validate_input("ééé", 3).is_ok());
}
