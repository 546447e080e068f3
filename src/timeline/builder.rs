use crate::{
    foundation::{
        core::{CANONICAL_SIZE, FrameSize, SPACER_DURATION_SEC},
        error::{SignError, SignResult},
    },
    resolve::resolver::ResolvedClip,
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Blank filler between two gestures.
pub struct Spacer {
    /// Filler length in seconds.
    pub duration_sec: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
/// One element of a [`Timeline`].
pub enum TimelineEntry {
    /// A gesture clip.
    Clip(ResolvedClip),
    /// A blank filler.
    Spacer(Spacer),
}

impl TimelineEntry {
    /// Playback length of this entry in seconds.
    pub fn duration_sec(&self) -> f64 {
        match self {
            Self::Clip(c) => c.duration_sec(),
            Self::Spacer(s) => s.duration_sec,
        }
    }

    /// `true` for spacer entries.
    pub fn is_spacer(&self) -> bool {
        matches!(self, Self::Spacer(_))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Ordered clips and spacers handed to the renderer. Built per request, never persisted.
pub struct Timeline {
    /// Entries in playback order.
    pub entries: Vec<TimelineEntry>,
    /// Frame size shared by every clip.
    pub size: FrameSize,
}

impl Timeline {
    /// Number of clip entries.
    pub fn clip_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_spacer()).count()
    }

    /// Number of spacer entries.
    pub fn spacer_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_spacer()).count()
    }

    /// `true` if the timeline has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry durations.
    pub fn total_duration_sec(&self) -> f64 {
        self.entries.iter().map(TimelineEntry::duration_sec).sum()
    }

    /// Clips in playback order.
    pub fn clips(&self) -> impl Iterator<Item = &ResolvedClip> {
        self.entries.iter().filter_map(|e| match e {
            TimelineEntry::Clip(c) => Some(c),
            TimelineEntry::Spacer(_) => None,
        })
    }

    /// Check structural invariants: no leading, trailing or adjacent spacers, and every
    /// clip at the timeline size.
    pub fn validate(&self) -> SignResult<()> {
        if self.entries.first().is_some_and(TimelineEntry::is_spacer)
            || self.entries.last().is_some_and(TimelineEntry::is_spacer)
        {
            return Err(SignError::invalid_input(
                "timeline must not start or end with a spacer",
            ));
        }
        if self
            .entries
            .windows(2)
            .any(|w| w[0].is_spacer() && w[1].is_spacer())
        {
            return Err(SignError::invalid_input(
                "timeline must not contain adjacent spacers",
            ));
        }
        if let Some(clip) = self.clips().find(|c| c.target_size != self.size) {
            return Err(SignError::invalid_input(format!(
                "clip '{}' is {} but timeline is {}",
                clip.asset_path.display(),
                clip.target_size,
                self.size
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Timeline layout parameters.
pub struct TimelineSettings {
    /// Canonical frame size.
    pub size: FrameSize,
    /// Spacer length in seconds.
    pub spacer_sec: f64,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            size: CANONICAL_SIZE,
            spacer_sec: SPACER_DURATION_SEC,
        }
    }
}

/// Sequence resolved clips at the canonical size with a spacer between each pair.
pub fn build(clips: Vec<ResolvedClip>) -> Timeline {
    build_with(clips, TimelineSettings::default())
}

/// [`build`] with explicit settings. Deterministic for a given input.
#[tracing::instrument(skip_all, fields(clips = clips.len()))]
pub fn build_with(clips: Vec<ResolvedClip>, settings: TimelineSettings) -> Timeline {
    let mut entries = Vec::with_capacity(clips.len().saturating_mul(2));
    for (i, mut clip) in clips.into_iter().enumerate() {
        if i > 0 {
            entries.push(TimelineEntry::Spacer(Spacer {
                duration_sec: settings.spacer_sec,
            }));
        }
        clip.target_size = settings.size;
        entries.push(TimelineEntry::Clip(clip));
    }
    Timeline {
        entries,
        size: settings.size,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
