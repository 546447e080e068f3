use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    config::PipelineConfig,
    dictionary::store::Dictionary,
    foundation::error::{SignError, SignResult},
    render::{
        cancel::CancelToken,
        ffmpeg::{FfmpegRenderer, Renderer, ensure_parent_dir},
        slot::RenderSlot,
    },
    resolve::{
        probe::{ClipProbe, FfprobeProbe},
        resolver::{Resolver, Warning},
    },
    segment::segmenter::{SegmentationResult, Segmenter},
    text::normalize::{Normalized, normalize, validate_input},
    timeline::builder::{Timeline, build},
};

#[derive(Clone, Debug, serde::Serialize)]
/// Everything computed for a request up to, but not including, rendering.
pub struct RenderPlan {
    /// Normalizer output.
    pub normalized: Normalized,
    /// Segmenter output.
    pub segmentation: SegmentationResult,
    /// Timeline ready for the renderer.
    pub timeline: Timeline,
    /// Tokens dropped during resolution.
    pub warnings: Vec<Warning>,
    /// Fingerprint of the dictionary snapshot used.
    pub dictionary_fingerprint: u64,
}

#[derive(Clone, Debug, serde::Serialize)]
/// Successful request: the output file exists.
pub struct Translation {
    /// Rendered media file.
    pub output_path: PathBuf,
    /// Plan that was rendered.
    pub plan: RenderPlan,
}

/// Text-to-sign pipeline: normalize → segment → resolve → build → render.
///
/// The dictionary is an immutable snapshot shared by every request. Planning is pure and
/// may run concurrently; rendering is serialized by a [`RenderSlot`].
pub struct SignPipeline {
    config: PipelineConfig,
    dictionary: Arc<Dictionary>,
    probe: Box<dyn ClipProbe>,
    renderer: Mutex<Box<dyn Renderer>>,
    slot: RenderSlot,
}

impl std::fmt::Debug for SignPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignPipeline")
            .field("config", &self.config)
            .field("dictionary_entries", &self.dictionary.len())
            .field("render_busy", &self.slot.is_busy())
            .finish()
    }
}

impl SignPipeline {
    /// Assemble a pipeline from explicit parts.
    pub fn new(
        config: PipelineConfig,
        dictionary: Arc<Dictionary>,
        probe: Box<dyn ClipProbe>,
        renderer: Box<dyn Renderer>,
    ) -> SignResult<Self> {
        config.validate()?;
        Ok(Self {
            slot: RenderSlot::new(config.busy_policy),
            config,
            dictionary,
            probe,
            renderer: Mutex::new(renderer),
        })
    }

    /// Load the dictionary from `config.asset_dir` and use `ffprobe`/`ffmpeg` from `PATH`.
    pub fn from_config(config: PipelineConfig) -> SignResult<Self> {
        let dictionary = Arc::new(Dictionary::load(&config.asset_dir)?);
        let renderer = FfmpegRenderer::new(config.encoder.clone());
        Self::new(config, dictionary, Box::new(FfprobeProbe), Box::new(renderer))
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Current dictionary snapshot.
    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    /// Rescan the asset directory and swap in the new snapshot.
    pub fn reload_dictionary(&mut self) -> SignResult<()> {
        self.dictionary = Arc::new(Dictionary::load(&self.config.asset_dir)?);
        Ok(())
    }

    /// Validate, normalize and segment `text`.
    pub fn segment(&self, text: &str) -> SignResult<(Normalized, SegmentationResult)> {
        validate_input(text, self.config.max_input_chars)?;
        let normalized = normalize(text);
        let segmentation = Segmenter::new(&self.dictionary, self.config.segmenter_options())
            .segment_normalized(&normalized);
        Ok((normalized, segmentation))
    }

    /// Run every stage except rendering.
    ///
    /// Fails with [`SignError::EmptySegmentation`] if no clip survives resolution.
    #[tracing::instrument(skip(self))]
    pub fn plan(&self, text: &str) -> SignResult<RenderPlan> {
        let (normalized, segmentation) = self.segment(text)?;
        if segmentation.is_empty() {
            return Err(SignError::empty_segmentation(
                "no word, letter or digit of the input has a clip",
            ));
        }

        let resolver = Resolver::new(&self.dictionary, self.probe.as_ref());
        let (clips, warnings) = resolver.resolve_all(&segmentation.tokens);
        if clips.is_empty() {
            return Err(SignError::empty_segmentation(format!(
                "all {} tokens were dropped during resolution",
                segmentation.tokens.len()
            )));
        }

        let timeline = build(clips);
        tracing::debug!(
            tokens = segmentation.tokens.len(),
            clips = timeline.clip_count(),
            dropped = warnings.len(),
            "planned"
        );
        Ok(RenderPlan {
            normalized,
            segmentation,
            timeline,
            warnings,
            dictionary_fingerprint: self.dictionary.fingerprint(),
        })
    }

    /// Plan and render `text` into `out_path`.
    ///
    /// Cancelling before rendering discards the plan; cancelling during rendering also
    /// removes the partial output. Only one render runs at a time (see [`RenderSlot`]).
    pub fn translate(
        &self,
        text: &str,
        out_path: impl AsRef<Path>,
        cancel: &CancelToken,
    ) -> SignResult<Translation> {
        let out_path = out_path.as_ref();
        let plan = self.plan(text)?;
        cancel.check()?;

        let _permit = self.slot.acquire(cancel)?;
        cancel.check()?;
        ensure_parent_dir(out_path)?;
        let mut renderer = self.renderer.lock().unwrap_or_else(PoisonError::into_inner);
        renderer.render(&plan.timeline, out_path, cancel)?;

        Ok(Translation {
            output_path: out_path.to_path_buf(),
            plan,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline/pipeline.rs"]
mod tests;
