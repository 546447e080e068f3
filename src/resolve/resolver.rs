use std::path::{Path, PathBuf};

use crate::{
    dictionary::store::{Dictionary, DictionaryEntry},
    foundation::core::{FrameSize, TRIM_RATIO},
    resolve::probe::ClipProbe,
    segment::segmenter::Token,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A token bound to a concrete clip and trim window.
pub struct ResolvedClip {
    /// Token this clip signs.
    pub token: Token,
    /// Clip file on disk.
    pub asset_path: PathBuf,
    /// Trim window start, seconds into the source.
    pub trim_start_sec: f64,
    /// Trim window end (exclusive), seconds into the source.
    pub trim_end_sec: f64,
    /// Full source duration as probed.
    pub source_duration_sec: f64,
    /// Frame size the clip is rendered at.
    pub target_size: FrameSize,
}

impl ResolvedClip {
    /// Length of the trim window in seconds.
    pub fn duration_sec(&self) -> f64 {
        (self.trim_end_sec - self.trim_start_sec).max(0.0)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Non-fatal problem recorded while turning tokens into clips.
pub enum Warning {
    /// Token carries no dictionary key (spelled character without a clip).
    Unresolvable {
        /// Token text.
        span: String,
    },
    /// Token key is not present in the dictionary snapshot.
    UnknownKey {
        /// Offending key.
        key: String,
    },
    /// Indexed clip (and all filename variants) absent from disk.
    AssetMissing {
        /// Dictionary key.
        key: String,
        /// Indexed path.
        path: PathBuf,
    },
    /// Clip exists but could not be probed.
    ProbeFailed {
        /// Dictionary key.
        key: String,
        /// Probed path.
        path: PathBuf,
        /// Probe error text.
        message: String,
    },
    /// Clip trims to nothing.
    EmptyClip {
        /// Dictionary key.
        key: String,
        /// Clip path.
        path: PathBuf,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolvable { span } => write!(f, "no clip for '{span}'"),
            Self::UnknownKey { key } => write!(f, "key '{key}' is not in the dictionary"),
            Self::AssetMissing { key, path } => {
                write!(f, "clip for '{key}' missing on disk ({})", path.display())
            }
            Self::ProbeFailed { key, path, message } => write!(
                f,
                "could not read clip for '{key}' ({}): {message}",
                path.display()
            ),
            Self::EmptyClip { key, path } => {
                write!(f, "clip for '{key}' is empty ({})", path.display())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Outcome of resolving a single token.
pub enum Resolution {
    /// Token bound to a clip.
    Clip(ResolvedClip),
    /// Token dropped; the warning says why.
    Dropped(Warning),
}

/// Trim window applied to every clip: the first [`TRIM_RATIO`] of its length.
pub fn trim_window(duration_sec: f64) -> (f64, f64) {
    (0.0, duration_sec.max(0.0) * TRIM_RATIO)
}

/// Alternative file names tried when the indexed clip path is gone: the key as-is,
/// spaces as hyphens, spaces removed. Duplicates are collapsed.
pub fn filename_variants(key: &str, extension: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(3);
    for stem in [key.to_string(), key.replace(' ', "-"), key.replace(' ', "")] {
        let name = if extension.is_empty() {
            stem
        } else {
            format!("{stem}.{extension}")
        };
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Maps tokens to clips using a dictionary snapshot and a [`ClipProbe`].
pub struct Resolver<'a> {
    dictionary: &'a Dictionary,
    probe: &'a dyn ClipProbe,
}

impl<'a> Resolver<'a> {
    /// Build a resolver.
    pub fn new(dictionary: &'a Dictionary, probe: &'a dyn ClipProbe) -> Self {
        Self { dictionary, probe }
    }

    /// Resolve one token. Missing or unreadable clips are dropped, never retried.
    pub fn resolve(&self, token: &Token) -> Resolution {
        let Some(key) = token.resolved_key.as_deref() else {
            return Resolution::Dropped(Warning::Unresolvable {
                span: token.span.clone(),
            });
        };
        let Some(entry) = self.dictionary.lookup(key) else {
            return Resolution::Dropped(Warning::UnknownKey {
                key: key.to_string(),
            });
        };
        let Some(path) = self.locate(entry) else {
            return Resolution::Dropped(Warning::AssetMissing {
                key: entry.key.clone(),
                path: entry.asset_path.clone(),
            });
        };

        let info = match self.probe.probe(&path) {
            Ok(info) => info,
            Err(e) => {
                return Resolution::Dropped(Warning::ProbeFailed {
                    key: entry.key.clone(),
                    path,
                    message: e.to_string(),
                });
            }
        };

        let (trim_start_sec, trim_end_sec) = trim_window(info.duration_sec);
        if trim_end_sec <= trim_start_sec {
            return Resolution::Dropped(Warning::EmptyClip {
                key: entry.key.clone(),
                path,
            });
        }

        Resolution::Clip(ResolvedClip {
            token: token.clone(),
            asset_path: path,
            trim_start_sec,
            trim_end_sec,
            source_duration_sec: info.duration_sec,
            target_size: info.size,
        })
    }

    /// Resolve tokens in order, collecting clips and warnings separately.
    #[tracing::instrument(skip_all, fields(tokens = tokens.len()))]
    pub fn resolve_all(&self, tokens: &[Token]) -> (Vec<ResolvedClip>, Vec<Warning>) {
        let mut clips = Vec::with_capacity(tokens.len());
        let mut warnings = Vec::new();
        for token in tokens {
            match self.resolve(token) {
                Resolution::Clip(clip) => clips.push(clip),
                Resolution::Dropped(w) => {
                    tracing::warn!(span = %token.span, "dropping token: {w}");
                    warnings.push(w);
                }
            }
        }
        (clips, warnings)
    }

    fn locate(&self, entry: &DictionaryEntry) -> Option<PathBuf> {
        if entry.asset_path.is_file() {
            return Some(entry.asset_path.clone());
        }
        let dir = entry
            .asset_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| self.dictionary.root());
        let ext = entry
            .asset_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4");
        find_variant(dir, &entry.key, ext)
    }
}

fn find_variant(dir: &Path, key: &str, ext: &str) -> Option<PathBuf> {
    filename_variants(key, ext)
        .into_iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/resolver.rs"]
mod tests;
