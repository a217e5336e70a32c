use crate::catalog::{Chapter, TranscriptCue};

/// Anything anchored at a start time on the lesson timeline
pub trait Timed {
    fn at_sec(&self) -> f64;
}

impl Timed for TranscriptCue {
    fn at_sec(&self) -> f64 {
        self.at_sec
    }
}

impl Timed for Chapter {
    fn at_sec(&self) -> f64 {
        self.at_sec
    }
}

/// Index of the entry whose interval `[items[i].at_sec, items[i + 1].at_sec)`
/// contains `t`. The last entry's interval is open-ended.
///
/// `items` must be sorted by `at_sec`. Returns `None` when `t` precedes the
/// first entry or there are no entries.
pub fn active_index<T: Timed>(items: &[T], t: f64) -> Option<usize> {
    if t.is_nan() {
        return None;
    }
    items
        .partition_point(|item| item.at_sec() <= t)
        .checked_sub(1)
}

pub fn active_cue_index(cues: &[TranscriptCue], t: f64) -> Option<usize> {
    active_index(cues, t)
}

pub fn active_chapter_index(chapters: &[Chapter], t: f64) -> Option<usize> {
    active_index(chapters, t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterStatus {
    Active,
    Past,
    Upcoming,
}

pub fn chapter_status(chapters: &[Chapter], index: usize, t: f64) -> ChapterStatus {
    if active_chapter_index(chapters, t) == Some(index) {
        ChapterStatus::Active
    } else if chapters.get(index).is_some_and(|chapter| t >= chapter.at_sec) {
        ChapterStatus::Past
    } else {
        ChapterStatus::Upcoming
    }
}

/// Tracks the highlighted cue across time updates.
///
/// `update` reports whether the highlighted cue changed, which is what
/// drives scrolling the transcript to the new cue.
#[derive(Debug, Default, Clone)]
pub struct TranscriptSync {
    active: Option<usize>,
}

impl TranscriptSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn update(&mut self, cues: &[TranscriptCue], t: f64) -> bool {
        let next = active_cue_index(cues, t);
        let changed = next != self.active;
        self.active = next;
        changed
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}
