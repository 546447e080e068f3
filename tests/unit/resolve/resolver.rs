use std::path::{Path, PathBuf};

use super::*;
use crate::{
    foundation::error::{SignError, SignResult},
    resolve::probe::ClipInfo,
    segment::segmenter::{TokenKind, segment},
    text::normalize::SentenceType,
};

struct FixedProbe(f64);

impl ClipProbe for FixedProbe {
    fn probe(&self, _path: &Path) -> SignResult<ClipInfo> {
        Ok(ClipInfo {
            duration_sec: self.0,
            size: FrameSize {
                width: 1280,
                height: 720,
            },
        })
    }
}

struct FailingProbe;

impl ClipProbe for FailingProbe {
    fn probe(&self, _path: &Path) -> SignResult<ClipInfo> {
        Err(SignError::render("corrupt"))
    }
}

fn temp_assets(tag: &str, names: &[&str]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "signclip_resolver_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    for name in names {
        std::fs::write(dir.join(name), b"").unwrap();
    }
    dir
}

fn token(span: &str, kind: TokenKind, key: Option<&str>) -> Token {
    Token {
        span: span.to_string(),
        kind,
        resolved_key: key.map(str::to_string),
        word_index: Some(0),
    }
}

#[test]
fn trim_window_keeps_first_half() {
    assert_eq!(trim_window(4.0), (0.0, 2.0));
    assert_eq!(trim_window(0.0), (0.0, 0.0));
    assert_eq!(trim_window(-1.0), (0.0, 0.0));
}

#[test]
fn filename_variants_are_ordered_and_unique() {
    assert_eq!(
        filename_variants("thank you", "mp4"),
        vec!["thank you.mp4", "thank-you.mp4", "thankyou.mp4"]
    );
    assert_eq!(filename_variants("hello", "mp4"), vec!["hello.mp4"]);
}

#[test]
fn resolves_word_with_trim_window() {
    let dir = temp_assets("word", &["hello.mp4"]);
    let dict = Dictionary::load(&dir).unwrap();
    let probe = FixedProbe(3.0);
    let resolver = Resolver::new(&dict, &probe);

    let Resolution::Clip(clip) = resolver.resolve(&token("hello", TokenKind::Word, Some("hello")))
    else {
        panic!("expected clip");
    };
    assert_eq!(clip.asset_path, dir.join("hello.mp4"));
    assert_eq!(clip.trim_start_sec, 0.0);
    assert!((clip.trim_end_sec - 1.5).abs() < 1e-9);
    assert!((clip.duration_sec() - 1.5).abs() < 1e-9);
    assert_eq!(clip.source_duration_sec, 3.0);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn keyless_token_is_dropped_with_warning() {
    let dict = Dictionary::empty("Dataset");
    let probe = FixedProbe(1.0);
    let resolver = Resolver::new(&dict, &probe);
    let r = resolver.resolve(&token("x", TokenKind::Letter, None));
    assert_eq!(
        r,
        Resolution::Dropped(Warning::Unresolvable {
            span: "x".to_string()
        })
    );
}

#[test]
fn missing_file_falls_back_to_filename_variant() {
    let dir = temp_assets("variant", &["thankyou.mp4"]);
    let dict = Dictionary::from_paths(&dir, [dir.join("thank-you.mp4")]);
    let probe = FixedProbe(2.0);
    let resolver = Resolver::new(&dict, &probe);

    let Resolution::Clip(clip) =
        resolver.resolve(&token("thank you", TokenKind::Phrase, Some("thank you")))
    else {
        panic!("expected clip");
    };
    assert_eq!(clip.asset_path, dir.join("thankyou.mp4"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_file_without_variant_is_asset_missing() {
    let dir = temp_assets("missing", &[]);
    let dict = Dictionary::from_paths(&dir, [dir.join("hello.mp4")]);
    let probe = FixedProbe(2.0);
    let resolver = Resolver::new(&dict, &probe);

    let r = resolver.resolve(&token("hello", TokenKind::Word, Some("hello")));
    assert_eq!(
        r,
        Resolution::Dropped(Warning::AssetMissing {
            key: "hello".to_string(),
            path: dir.join("hello.mp4"),
        })
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn probe_failure_and_zero_length_clips_are_dropped() {
    let dir = temp_assets("probe", &["a.mp4"]);
    let dict = Dictionary::load(&dir).unwrap();
    let t = token("a", TokenKind::Letter, Some("a"));

    let failing = FailingProbe;
    let r = Resolver::new(&dict, &failing).resolve(&t);
    assert!(matches!(r, Resolution::Dropped(Warning::ProbeFailed { .. })));

    let empty = FixedProbe(0.0);
    let r = Resolver::new(&dict, &empty).resolve(&t);
    assert!(matches!(r, Resolution::Dropped(Warning::EmptyClip { .. })));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn resolve_all_keeps_order_and_collects_warnings() {
    let dir = temp_assets("all", &["a.mp4", "b.mp4", "question.mp4"]);
    let dict = Dictionary::load(&dir).unwrap();
    std::fs::remove_file(dir.join("b.mp4")).unwrap();

    let seg = segment("ab a", SentenceType::Question, &dict);
    let probe = FixedProbe(1.0);
    let (clips, warnings) = Resolver::new(&dict, &probe).resolve_all(&seg.tokens);

    let spans: Vec<&str> = clips.iter().map(|c| c.token.span.as_str()).collect();
    assert_eq!(spans, vec!["question", "a", "a"]);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].to_string().contains("'b'"));

    std::fs::remove_dir_all(&dir).unwrap();
}
