use std::path::PathBuf;

/// Convenience result type used across signclip.
pub type SignResult<T> = Result<T, SignError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum SignError {
    /// Input text rejected before any processing (too long, nothing left after normalization).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Normalization succeeded but no token could be resolved to a clip.
    #[error("nothing to render: {0}")]
    EmptySegmentation(String),

    /// A dictionary-indexed asset is absent from disk.
    #[error("asset missing: '{key}' ({})", path.display())]
    AssetMissing {
        /// Dictionary key of the missing asset.
        key: String,
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// The external renderer failed; the message is passed through verbatim.
    #[error("render failure: {0}")]
    RenderFailure(String),

    /// The request was cancelled by its caller.
    #[error("render cancelled")]
    Cancelled,

    /// Another render is already in flight and the busy policy rejects new requests.
    #[error("a render is already in progress")]
    Busy,

    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SignError {
    /// Build a [`SignError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`SignError::EmptySegmentation`] value.
    pub fn empty_segmentation(msg: impl Into<String>) -> Self {
        Self::EmptySegmentation(msg.into())
    }

    /// Build a [`SignError::AssetMissing`] value.
    pub fn asset_missing(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::AssetMissing {
            key: key.into(),
            path: path.into(),
        }
    }

    /// Build a [`SignError::RenderFailure`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::RenderFailure(msg.into())
    }

    /// Build a [`SignError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SignError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for the "nothing to render" outcome, which callers usually report
    /// differently from a broken pipeline.
    pub fn is_nothing_to_render(&self) -> bool {
        matches!(self, Self::EmptySegmentation(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
