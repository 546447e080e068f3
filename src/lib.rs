//! signclip turns written text into one sign-language video assembled from a dictionary of
//! pre-recorded gesture clips.
//!
//! A request flows through five stages:
//!
//! - [`normalize`] raw text into lowercase words plus a [`SentenceType`]
//! - [`Segmenter`] splits words into phrase, word, letter and digit tokens (maximal munch)
//! - [`Resolver`] binds tokens to clip files and a trim window
//! - [`build`] lays clips out on a [`Timeline`] with spacers between them
//! - a [`Renderer`] (by default [`FfmpegRenderer`]) encodes the timeline to MP4
//!
//! [`SignPipeline`] wires the stages together over a shared [`Dictionary`] snapshot.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod config;
pub(crate) mod dictionary;
pub(crate) mod pipeline;
pub(crate) mod render;
pub(crate) mod resolve;
pub(crate) mod segment;
pub(crate) mod text;
pub(crate) mod timeline;

pub use crate::foundation::core::{
    CANONICAL_SIZE, DEFAULT_FPS, EXCLAMATION_KEY, FrameSize, QUESTION_KEY, SPACER_DURATION_SEC,
    TRIM_RATIO,
};
pub use crate::foundation::error::{SignError, SignResult};

pub use crate::config::{DEFAULT_MAX_INPUT_CHARS, PipelineConfig};
pub use crate::dictionary::store::{ASSET_EXTENSIONS, Dictionary, DictionaryEntry, normalize_key};
pub use crate::pipeline::{RenderPlan, SignPipeline, Translation};
pub use crate::render::cancel::CancelToken;
pub use crate::render::ffmpeg::{
    EncoderSettings, FfmpegRenderer, Renderer, build_ffmpeg_args, ensure_parent_dir,
    is_ffmpeg_on_path,
};
pub use crate::render::slot::{BusyPolicy, RenderPermit, RenderSlot};
pub use crate::resolve::probe::{ClipInfo, ClipProbe, FfprobeProbe, is_ffprobe_on_path};
pub use crate::resolve::resolver::{
    Resolution, ResolvedClip, Resolver, Warning, filename_variants, trim_window,
};
pub use crate::segment::segmenter::{
    MatchStrategy, SegmentationResult, Segmenter, SegmenterOptions, Token, TokenKind,
    UnknownLetterPolicy, segment,
};
pub use crate::text::normalize::{Normalized, SentenceType, clean, normalize, validate_input};
pub use crate::timeline::builder::{
    Spacer, Timeline, TimelineEntry, TimelineSettings, build, build_with,
};
