use super::*;

#[test]
fn parses_duration_and_size() {
    let json = br#"{
        "streams": [
            {"codec_type": "audio"},
            {"codec_type": "video", "width": 1280, "height": 720, "duration": "2.000000"}
        ],
        "format": {"duration": "2.040000"}
    }"#;
    let info = parse_ffprobe_json(json).unwrap();
    assert!((info.duration_sec - 2.04).abs() < 1e-9);
    assert_eq!(
        info.size,
        FrameSize {
            width: 1280,
            height: 720
        }
    );
}

#[test]
fn falls_back_to_stream_duration() {
    let json = br#"{"streams": [{"codec_type": "video", "width": 64, "height": 64, "duration": "1.5"}]}"#;
    let info = parse_ffprobe_json(json).unwrap();
    assert!((info.duration_sec - 1.5).abs() < 1e-9);
}

#[test]
fn rejects_missing_video_stream() {
    let json = br#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "1"}}"#;
    assert!(parse_ffprobe_json(json).is_err());
}

#[test]
fn rejects_missing_duration() {
    let json = br#"{"streams": [{"codec_type": "video", "width": 64, "height": 64}]}"#;
    assert!(parse_ffprobe_json(json).is_err());
}

#[test]
fn rejects_malformed_json() {
    let err = parse_ffprobe_json(b"not json").unwrap_err();
    assert!(matches!(err, SignError::Serde(_)));
}
