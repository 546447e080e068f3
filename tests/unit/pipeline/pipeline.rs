use std::sync::Mutex;

use super::*;
use crate::{
    foundation::core::{CANONICAL_SIZE, FrameSize},
    resolve::probe::ClipInfo,
    segment::segmenter::TokenKind,
};

struct FixedProbe;

impl ClipProbe for FixedProbe {
    fn probe(&self, _path: &Path) -> SignResult<ClipInfo> {
        Ok(ClipInfo {
            duration_sec: 2.0,
            size: FrameSize {
                width: 320,
                height: 240,
            },
        })
    }
}

#[derive(Default)]
struct RecordingRenderer {
    seen: Arc<Mutex<Vec<usize>>>,
}

impl Renderer for RecordingRenderer {
    fn render(
        &mut self,
        timeline: &Timeline,
        out_path: &Path,
        cancel: &CancelToken,
    ) -> SignResult<()> {
        cancel.check()?;
        self.seen.lock().unwrap().push(timeline.entries.len());
        std::fs::write(out_path, b"video").map_err(|e| SignError::render(e.to_string()))
    }
}

fn temp_assets(tag: &str, names: &[&str]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "signclip_pipeline_unit_{tag}_{}_{}",
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

fn pipeline(dir: &Path, config: PipelineConfig) -> (SignPipeline, Arc<Mutex<Vec<usize>>>) {
    let renderer = RecordingRenderer::default();
    let seen = Arc::clone(&renderer.seen);
    let dict = Arc::new(Dictionary::load(dir).unwrap());
    let p = SignPipeline::new(config, dict, Box::new(FixedProbe), Box::new(renderer)).unwrap();
    (p, seen)
}

#[test]
fn plan_builds_gap_aware_timeline() {
    let dir = temp_assets("plan", &["hello.mp4", "thank-you.mp4", "question.mp4"]);
    let (p, _) = pipeline(&dir, PipelineConfig::default());

    let plan = p.plan("Hello, thank you?").unwrap();
    let kinds: Vec<TokenKind> = plan.segmentation.tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::SentenceMarker, TokenKind::Word, TokenKind::Phrase]
    );
    assert_eq!(plan.timeline.clip_count(), 3);
    assert_eq!(plan.timeline.spacer_count(), 2);
    assert!(plan.timeline.clips().all(|c| c.target_size == CANONICAL_SIZE));
    assert!(plan.warnings.is_empty());
    assert_eq!(plan.dictionary_fingerprint, p.dictionary().fingerprint());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn over_length_input_is_invalid() {
    let dir = temp_assets("long", &["a.mp4"]);
    let config = PipelineConfig {
        max_input_chars: 4,
        ..PipelineConfig::default()
    };
    let (p, seen) = pipeline(&dir, config);
    let err = p
        .translate("aaaaa", dir.join("out.mp4"), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, SignError::InvalidInput(_)));
    assert!(seen.lock().unwrap().is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn empty_input_is_nothing_to_render() {
    let dir = temp_assets("empty", &["a.mp4"]);
    let (p, _) = pipeline(&dir, PipelineConfig::default());
    assert!(p.plan("").unwrap_err().is_nothing_to_render());
    assert!(p.plan("zzz").unwrap_err().is_nothing_to_render());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn cancelled_request_never_reaches_renderer() {
    let dir = temp_assets("cancel", &["a.mp4"]);
    let (p, seen) = pipeline(&dir, PipelineConfig::default());
    let cancel = CancelToken::new();
    cancel.cancel();
    let out = dir.join("out.mp4");
    assert!(matches!(
        p.translate("a", &out, &cancel),
        Err(SignError::Cancelled)
    ));
    assert!(seen.lock().unwrap().is_empty());
    assert!(!out.exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn reload_picks_up_new_clips() {
    let dir = temp_assets("reload", &["a.mp4"]);
    let config = PipelineConfig {
        asset_dir: dir.clone(),
        ..PipelineConfig::default()
    };
    let (mut p, _) = pipeline(&dir, config);
    assert!(!p.dictionary().contains("b"));

    std::fs::write(dir.join("b.mp4"), b"").unwrap();
    p.reload_dictionary().unwrap();
    assert!(p.dictionary().contains("b"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn translate_creates_missing_output_directory() {
    let dir = temp_assets("nested", &["a.mp4"]);
    let (p, seen) = pipeline(&dir, PipelineConfig::default());
    let out = dir.join("renders").join("day1").join("a.mp4");

    let t = p.translate("a", &out, &CancelToken::new()).unwrap();
    assert_eq!(t.output_path, out);
    assert!(out.is_file());
    assert_eq!(seen.lock().unwrap().len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}
