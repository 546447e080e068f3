use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::error::{SignError, SignResult},
    render::{ffmpeg::EncoderSettings, slot::BusyPolicy},
    segment::segmenter::{MatchStrategy, SegmenterOptions, UnknownLetterPolicy},
};

/// Default cap on input length, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 1000;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Pipeline configuration, loadable from JSON. Every field has a default.
pub struct PipelineConfig {
    /// Directory holding the gesture clips.
    pub asset_dir: PathBuf,
    /// Longer input is rejected, never truncated.
    pub max_input_chars: usize,
    /// Phrase selection policy.
    pub match_strategy: MatchStrategy,
    /// Handling of spelled characters without a clip.
    pub unknown_letters: UnknownLetterPolicy,
    /// Behaviour when a render is already running.
    pub busy_policy: BusyPolicy,
    /// Encoder parameters.
    pub encoder: EncoderSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("Dataset"),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            match_strategy: MatchStrategy::default(),
            unknown_letters: UnknownLetterPolicy::default(),
            busy_policy: BusyPolicy::default(),
            encoder: EncoderSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> SignResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg = Self::from_json(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a JSON config string (not validated).
    pub fn from_json(text: &str) -> SignResult<Self> {
        serde_json::from_str(text).map_err(|e| SignError::serde(format!("config json: {e}")))
    }

    /// Pretty JSON form, e.g. for writing a starter config.
    pub fn to_json_pretty(&self) -> SignResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SignError::serde(e.to_string()))
    }

    /// Check value ranges.
    pub fn validate(&self) -> SignResult<()> {
        if self.max_input_chars == 0 {
            return Err(SignError::config("max_input_chars must be greater than zero"));
        }
        self.encoder.validate()
    }

    /// Segmentation policies derived from this config.
    pub fn segmenter_options(&self) -> SegmenterOptions {
        SegmenterOptions {
            strategy: self.match_strategy,
            unknown_letters: self.unknown_letters,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
