use crate::{
    dictionary::store::{Dictionary, DictionaryEntry},
    text::normalize::{Normalized, SentenceType},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Classification of a segmented token.
pub enum TokenKind {
    /// Dictionary match spanning two or more words.
    Phrase,
    /// Dictionary match spanning exactly one word.
    Word,
    /// Single letter from finger-spelling fallback.
    Letter,
    /// Single numeral `0`..`9`.
    Digit,
    /// Leading sentence-type gesture (`question` / `exclamation`).
    SentenceMarker,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// One classified unit of segmented text.
pub struct Token {
    /// Covered text: one or more words, or a single character.
    pub span: String,
    /// Token classification.
    pub kind: TokenKind,
    /// Dictionary key proven to exist during segmentation.
    ///
    /// `None` only for letters kept under [`UnknownLetterPolicy::Report`].
    pub resolved_key: Option<String>,
    /// Index of the first input word covered; `None` for the sentence marker.
    pub word_index: Option<usize>,
}

impl Token {
    fn matched(kind: TokenKind, key: &str, span: String, word_index: Option<usize>) -> Self {
        Self {
            span,
            kind,
            resolved_key: Some(key.to_string()),
            word_index,
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
/// How a multi-word match is chosen at each position.
pub enum MatchStrategy {
    /// Always take the longest dictionary phrase starting at the cursor.
    #[default]
    MaximalMunch,
    /// Take the shortest dictionary phrase starting at the cursor.
    FirstFit,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
/// What happens to spelled-out characters that have no dictionary entry.
pub enum UnknownLetterPolicy {
    /// Omit them silently.
    #[default]
    Skip,
    /// Keep them as keyless tokens so resolution drops them with a warning.
    Report,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Segmentation policies, fixed when the segmenter is built.
pub struct SegmenterOptions {
    /// Phrase selection policy.
    pub strategy: MatchStrategy,
    /// Unknown letter handling.
    pub unknown_letters: UnknownLetterPolicy,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// Token sequence plus the detected sentence type.
pub struct SegmentationResult {
    /// Tokens in render order.
    pub tokens: Vec<Token>,
    /// Sentence type passed to segmentation.
    pub sentence_type: SentenceType,
}

impl SegmentationResult {
    /// `true` if no token was produced.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rebuild the text covered by the tokens: characters of one word are glued, words are
    /// joined by single spaces, the sentence marker is left out.
    pub fn covered_text(&self) -> String {
        let mut out = String::new();
        let mut last_word = None;
        for token in &self.tokens {
            let Some(idx) = token.word_index else {
                continue;
            };
            if last_word.is_some() && last_word != Some(idx) {
                out.push(' ');
            }
            out.push_str(&token.span);
            last_word = Some(idx);
        }
        out
    }

    /// Dictionary keys of the tokens, in order, skipping keyless ones.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| t.resolved_key.as_deref())
    }
}

#[derive(Clone, Copy, Debug)]
/// Greedy word-level segmenter over a borrowed [`Dictionary`].
pub struct Segmenter<'d> {
    dictionary: &'d Dictionary,
    options: SegmenterOptions,
}

impl<'d> Segmenter<'d> {
    /// Build a segmenter with explicit policies.
    pub fn new(dictionary: &'d Dictionary, options: SegmenterOptions) -> Self {
        Self {
            dictionary,
            options,
        }
    }

    /// Segment normalized text.
    pub fn segment_normalized(&self, normalized: &Normalized) -> SegmentationResult {
        self.segment(&normalized.clean_text, normalized.sentence_type)
    }

    /// Split `clean_text` into tokens.
    ///
    /// 1. Optional leading sentence marker, if the dictionary has one.
    /// 2. At each word: dictionary phrase/word per [`MatchStrategy`]; a lone numeral matched
    ///    this way is a [`TokenKind::Digit`].
    /// 3. Otherwise an all-digit word becomes one digit token per numeral.
    /// 4. Otherwise the word is spelled out letter by letter.
    ///
    /// The cursor only moves forward, so this runs in `O(words)` outer steps.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn segment(&self, clean_text: &str, sentence_type: SentenceType) -> SegmentationResult {
        let mut tokens = Vec::new();

        if let Some(marker) = sentence_type.marker_key() {
            match self.dictionary.lookup(marker) {
                Some(entry) => tokens.push(Token::matched(
                    TokenKind::SentenceMarker,
                    &entry.key,
                    entry.key.clone(),
                    None,
                )),
                None => tracing::debug!(marker, "no marker clip; sentence type not signed"),
            }
        }

        let words: Vec<&str> = clean_text.split_whitespace().collect();
        let mut i = 0;
        while i < words.len() {
            if let Some((entry, n)) = self.match_at(&words, i) {
                let kind = if n > 1 {
                    TokenKind::Phrase
                } else if is_numeral(words[i]) {
                    TokenKind::Digit
                } else {
                    TokenKind::Word
                };
                let span = words[i..i + n].join(" ");
                tokens.push(Token::matched(kind, &entry.key, span, Some(i)));
                i += n;
                continue;
            }

            // Numerals and letters are both signed one character at a time.
            self.spell(words[i], i, &mut tokens);
            i += 1;
        }

        tracing::debug!(words = words.len(), tokens = tokens.len(), "segmented");
        SegmentationResult {
            tokens,
            sentence_type,
        }
    }

    fn match_at(&self, words: &[&str], i: usize) -> Option<(&'d DictionaryEntry, usize)> {
        match self.options.strategy {
            MatchStrategy::MaximalMunch => self.dictionary.longest_match(words, i),
            MatchStrategy::FirstFit => self.dictionary.shortest_match(words, i),
        }
    }

    fn spell(&self, word: &str, word_index: usize, tokens: &mut Vec<Token>) {
        for ch in word.chars() {
            let kind = if ch.is_ascii_digit() {
                TokenKind::Digit
            } else {
                TokenKind::Letter
            };
            let span = ch.to_string();
            match self.dictionary.lookup(&span) {
                Some(entry) => {
                    tokens.push(Token::matched(kind, &entry.key, span, Some(word_index)))
                }
                None => match self.options.unknown_letters {
                    UnknownLetterPolicy::Skip => {
                        tracing::debug!(%ch, "no clip for character; skipped")
                    }
                    UnknownLetterPolicy::Report => tokens.push(Token {
                        span,
                        kind,
                        resolved_key: None,
                        word_index: Some(word_index),
                    }),
                },
            }
        }
    }
}

fn is_numeral(word: &str) -> bool {
    word.len() == 1 && word.bytes().all(|b| b.is_ascii_digit())
}

/// Segment with default policies (maximal munch, skip unknown letters).
pub fn segment(
    clean_text: &str,
    sentence_type: SentenceType,
    dictionary: &Dictionary,
) -> SegmentationResult {
    Segmenter::new(dictionary, SegmenterOptions::default()).segment(clean_text, sentence_type)
}

#[cfg(test)]
#[path = "../../tests/unit/segment/segmenter.rs"]
mod tests;
