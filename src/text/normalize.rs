use crate::foundation::{
    core::{EXCLAMATION_KEY, QUESTION_KEY},
    error::{SignError, SignResult},
};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
/// Sentence type detected from punctuation in the raw input.
pub enum SentenceType {
    /// No `?` or `!` present.
    #[default]
    Statement,
    /// Input contains `?`. Wins over `!` when both are present.
    Question,
    /// Input contains `!` and no `?`.
    Exclamation,
}

impl SentenceType {
    /// Detect the sentence type by presence of `?` then `!`.
    ///
    /// Detection is presence-based, not positional: `"wow! really?"` is a question.
    pub fn detect(raw: &str) -> Self {
        if raw.contains('?') {
            Self::Question
        } else if raw.contains('!') {
            Self::Exclamation
        } else {
            Self::Statement
        }
    }

    /// Dictionary key of the marker gesture for this type, if it has one.
    pub fn marker_key(self) -> Option<&'static str> {
        match self {
            Self::Statement => None,
            Self::Question => Some(QUESTION_KEY),
            Self::Exclamation => Some(EXCLAMATION_KEY),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// Output of [`normalize`].
pub struct Normalized {
    /// Lowercase text restricted to `[a-z0-9 ]`, single-spaced and trimmed.
    pub clean_text: String,
    /// Sentence type detected before punctuation was stripped.
    pub sentence_type: SentenceType,
}

impl Normalized {
    /// `true` if nothing survived normalization.
    pub fn is_empty(&self) -> bool {
        self.clean_text.is_empty()
    }

    /// Whitespace-delimited words of the clean text.
    pub fn words(&self) -> Vec<&str> {
        self.clean_text.split_whitespace().collect()
    }
}

/// Clean and classify raw input text. Never fails; any input maps to a (possibly empty) text.
pub fn normalize(raw: &str) -> Normalized {
    Normalized {
        clean_text: clean(raw),
        sentence_type: SentenceType::detect(raw),
    }
}

/// Lowercase `raw` and collapse every run of characters outside `[a-z0-9]` into one space.
pub fn clean(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Reject input longer than `max_chars` characters. Input is never truncated.
pub fn validate_input(raw: &str, max_chars: usize) -> SignResult<()> {
    let len = raw.chars().count();
    if len > max_chars {
        return Err(SignError::invalid_input(format!(
            "input has {len} characters, maximum is {max_chars}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/text/normalize.rs"]
mod tests;
