use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    foundation::{error::SignResult, math::Fnv1a64},
    text::normalize::clean,
};

/// File extensions (lowercase, without dot) recognised as gesture clips.
pub const ASSET_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// One gesture clip indexed by its normalized phrase.
pub struct DictionaryEntry {
    /// Normalized phrase: cleaned like input text, words joined by single spaces.
    pub key: String,
    /// Clip location on disk as discovered at load time.
    pub asset_path: PathBuf,
    /// Phrase as written in the file name, original case kept.
    pub display_form: String,
}

impl DictionaryEntry {
    /// Build an entry from a clip path, deriving key and display form from the file stem.
    ///
    /// Returns `None` for paths without a usable UTF-8 stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let asset_path = path.into();
        let stem = asset_path.file_stem()?.to_str()?;
        let key = normalize_key(stem);
        if key.is_empty() {
            return None;
        }
        Some(Self {
            key,
            display_form: display_form(stem),
            asset_path,
        })
    }

    /// Number of space-separated words in the key.
    pub fn word_count(&self) -> usize {
        self.key.split(' ').count()
    }

    fn matches_words(&self, words: &[&str]) -> bool {
        self.key.split(' ').eq(words.iter().copied())
    }
}

/// Turn a file stem into a lookup key with the same rules as input text: lowercase, and
/// every run of characters outside `[a-z0-9]` becomes one space.
pub fn normalize_key(stem: &str) -> String {
    clean(stem)
}

fn display_form(stem: &str) -> String {
    collapse_separators(stem)
}

fn collapse_separators(s: &str) -> String {
    s.replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_asset_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_none_or(|n| n.starts_with('.'));
    if hidden {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ASSET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

#[derive(Clone, Debug, Default)]
/// Immutable index of gesture clips keyed by normalized phrase.
///
/// Built once by [`Dictionary::load`] and shared read-only by segmentation and resolution.
/// Keys are bucketed by their first word, longest phrases first, so prefix matching only
/// compares candidates that can actually start at the current word.
pub struct Dictionary {
    root: PathBuf,
    entries: BTreeMap<String, DictionaryEntry>,
    by_first_word: HashMap<String, Vec<String>>,
    duplicates: Vec<PathBuf>,
}

impl Dictionary {
    /// An empty dictionary rooted at `root`.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Scan `dir` (non-recursively) for clips and index them.
    ///
    /// A missing directory is not an error: the dictionary is simply empty.
    #[tracing::instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn load(dir: impl AsRef<Path>) -> SignResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            tracing::warn!("asset directory not found; dictionary is empty");
            return Ok(Self::empty(dir));
        }

        let mut paths = Vec::new();
        let listing = std::fs::read_dir(dir)
            .with_context(|| format!("read asset directory '{}'", dir.display()))?;
        for item in listing {
            let item =
                item.with_context(|| format!("list asset directory '{}'", dir.display()))?;
            let path = item.path();
            if path.is_file() && is_asset_file(&path) {
                paths.push(path);
            }
        }

        let dict = Self::from_paths(dir, paths);
        if dict.is_empty() {
            tracing::warn!("asset directory holds no clips; dictionary is empty");
        }
        tracing::debug!(
            entries = dict.len(),
            duplicates = dict.duplicates.len(),
            "dictionary loaded"
        );
        Ok(dict)
    }

    /// Index the given clip paths without touching the filesystem.
    ///
    /// Paths are processed in sorted order; when two files normalize to the same key the
    /// first one wins and the other is recorded in [`Dictionary::duplicates`].
    pub fn from_paths(
        root: impl Into<PathBuf>,
        paths: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        let mut paths: Vec<PathBuf> = paths.into_iter().collect();
        paths.sort();

        let mut dict = Self::empty(root);
        for path in paths {
            let Some(entry) = DictionaryEntry::from_path(&path) else {
                tracing::warn!(path = %path.display(), "skipping clip with unusable file name");
                continue;
            };
            if entry.key != collapse_separators(&entry.display_form.to_lowercase()) {
                tracing::warn!(
                    key = %entry.key,
                    path = %path.display(),
                    "clip name has characters input text cannot contain; indexed under cleaned key"
                );
            }
            if dict.entries.contains_key(&entry.key) {
                tracing::warn!(
                    key = %entry.key,
                    path = %path.display(),
                    "duplicate dictionary key; keeping the first clip"
                );
                dict.duplicates.push(path);
                continue;
            }
            dict.entries.insert(entry.key.clone(), entry);
        }
        dict.rebuild_index();
        dict
    }

    fn rebuild_index(&mut self) {
        let mut index: HashMap<String, Vec<String>> = HashMap::new();
        for key in self.entries.keys() {
            let first = key.split(' ').next().unwrap_or_default();
            index.entry(first.to_string()).or_default().push(key.clone());
        }
        for bucket in index.values_mut() {
            bucket.sort_by(|a, b| {
                let (wa, wb) = (a.split(' ').count(), b.split(' ').count());
                wb.cmp(&wa).then_with(|| a.cmp(b))
            });
        }
        self.by_first_word = index;
    }

    /// Case- and separator-insensitive exact lookup.
    pub fn lookup(&self, key: &str) -> Option<&DictionaryEntry> {
        if let Some(e) = self.entries.get(key) {
            return Some(e);
        }
        self.entries.get(&normalize_key(key))
    }

    /// `true` if `key` (after key normalization) is indexed.
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Entry whose key is the longest whitespace-delimited prefix of `text[start..]`.
    ///
    /// `start` is a byte offset; an offset that is out of range or not on a char boundary
    /// matches nothing.
    pub fn longest_prefix_match(&self, text: &str, start: usize) -> Option<&DictionaryEntry> {
        let rest = text.get(start..)?;
        let words: Vec<&str> = rest.split_whitespace().collect();
        self.longest_match(&words, 0).map(|(entry, _)| entry)
    }

    /// Longest entry matching `words[start..start + n]`, with `n` the number of words consumed.
    pub fn longest_match(&self, words: &[&str], start: usize) -> Option<(&DictionaryEntry, usize)> {
        let bucket = self.bucket(words, start)?;
        self.first_fitting(bucket.iter(), words, start)
    }

    /// Shortest entry matching at `words[start]`, with the number of words consumed.
    pub fn shortest_match(&self, words: &[&str], start: usize) -> Option<(&DictionaryEntry, usize)> {
        let bucket = self.bucket(words, start)?;
        self.first_fitting(bucket.iter().rev(), words, start)
    }

    fn bucket(&self, words: &[&str], start: usize) -> Option<&Vec<String>> {
        let first = words.get(start)?;
        self.by_first_word.get(*first)
    }

    fn first_fitting<'a>(
        &self,
        keys: impl Iterator<Item = &'a String>,
        words: &[&str],
        start: usize,
    ) -> Option<(&DictionaryEntry, usize)> {
        let available = words.len().saturating_sub(start);
        for key in keys {
            let entry = self.entries.get(key)?;
            let n = entry.word_count();
            if n <= available && entry.matches_words(&words[start..start + n]) {
                return Some((entry, n));
            }
        }
        None
    }

    /// Directory the dictionary was loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no clip is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.values()
    }

    /// Clip paths ignored because their key was already taken.
    pub fn duplicates(&self) -> &[PathBuf] {
        &self.duplicates
    }

    /// Stable hash of the indexed (key, file name) pairs identifying this snapshot.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        for entry in self.entries.values() {
            h.write_str(&entry.key);
            let name = entry
                .asset_path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            h.write_str(&name);
        }
        h.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dictionary/store.rs"]
mod tests;
