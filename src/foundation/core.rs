use crate::foundation::error::{SignError, SignResult};

/// Fraction of each source clip that is kept; the tail holds a static frame.
pub const TRIM_RATIO: f64 = 0.5;

/// Length of the blank filler between two consecutive gestures.
pub const SPACER_DURATION_SEC: f64 = 0.3;

/// Every clip is scaled (and letterboxed) to this size before concatenation.
pub const CANONICAL_SIZE: FrameSize = FrameSize {
    width: 640,
    height: 480,
};

/// Output frame rate used unless configured otherwise.
pub const DEFAULT_FPS: u32 = 30;

/// Dictionary key that marks a question.
pub const QUESTION_KEY: &str = "question";

/// Dictionary key that marks an exclamation.
pub const EXCLAMATION_KEY: &str = "exclamation";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Pixel dimensions of a video frame.
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Build a size, rejecting zero or odd dimensions (yuv420p output needs even sizes).
    pub fn new(width: u32, height: u32) -> SignResult<Self> {
        let size = Self { width, height };
        size.validate()?;
        Ok(size)
    }

    /// Check that both dimensions are non-zero and even.
    pub fn validate(self) -> SignResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SignError::config("frame width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(SignError::config(
                "frame width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
