use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::info;

const EMBEDDED_COURSE: &str = include_str!("../data/course.json");

const DEFAULT_DESCRIPTION: &str =
    "Learn essential React concepts and best practices in this comprehensive lesson.";
const DEFAULT_INSTRUCTOR: &str = "Sarah Johnson";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub duration_sec: f64,
    pub url: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
}

impl Lesson {
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    }

    pub fn instructor_or_default(&self) -> &str {
        self.instructor.as_deref().unwrap_or(DEFAULT_INSTRUCTOR)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub label: String,
    pub at_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptCue {
    pub at_sec: f64,
    pub text: String,
}

/// Read-only course catalog: lessons in display order plus per-lesson
/// chapters and transcript cues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub chapters_by_lesson_id: HashMap<String, Vec<Chapter>>,
    #[serde(default)]
    pub transcript_by_lesson_id: HashMap<String, Vec<TranscriptCue>>,
}

impl Course {
    /// The mock course bundled with the app
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_COURSE)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let course = Self::from_json(&raw)?;
        info!(
            "Loaded course '{}' from {} ({} lessons)",
            course.title,
            path.display(),
            course.lessons.len()
        );
        Ok(course)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let course: Course = serde_json::from_str(raw)?;
        course.validate()?;
        Ok(course)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.lessons.is_empty() {
            return Err(CatalogError::Invalid("course has no lessons".to_string()));
        }

        let mut seen = HashSet::new();
        for lesson in &self.lessons {
            if lesson.id.trim().is_empty() {
                return Err(CatalogError::Invalid("lesson with empty id".to_string()));
            }
            if !seen.insert(lesson.id.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate lesson id {}",
                    lesson.id
                )));
            }
            if !(lesson.duration_sec.is_finite() && lesson.duration_sec > 0.0) {
                return Err(CatalogError::Invalid(format!(
                    "lesson {} has non-positive duration {}",
                    lesson.id, lesson.duration_sec
                )));
            }
        }

        for (lesson_id, chapters) in &self.chapters_by_lesson_id {
            check_ordered(lesson_id, "chapters", chapters.iter().map(|c| c.at_sec))?;
        }
        for (lesson_id, cues) in &self.transcript_by_lesson_id {
            check_ordered(lesson_id, "transcript", cues.iter().map(|c| c.at_sec))?;
        }

        Ok(())
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id == lesson_id)
    }

    pub fn chapters(&self, lesson_id: &str) -> &[Chapter] {
        self.chapters_by_lesson_id
            .get(lesson_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn transcript(&self, lesson_id: &str) -> &[TranscriptCue] {
        self.transcript_by_lesson_id
            .get(lesson_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn first_unlocked(&self) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| !lesson.locked)
    }

    /// Next lesson in catalog order, counting unlocked lessons only
    pub fn next_unlocked_after(&self, lesson_id: &str) -> Option<&Lesson> {
        let mut unlocked = self.lessons.iter().filter(|lesson| !lesson.locked);
        unlocked.find(|lesson| lesson.id == lesson_id)?;
        unlocked.next()
    }

    pub fn unlocked_count(&self) -> usize {
        self.lessons.iter().filter(|lesson| !lesson.locked).count()
    }
}

fn check_ordered(
    lesson_id: &str,
    what: &str,
    times: impl Iterator<Item = f64>,
) -> Result<(), CatalogError> {
    let mut previous = 0.0_f64;
    for at_sec in times {
        if !(at_sec.is_finite() && at_sec >= 0.0) {
            return Err(CatalogError::Invalid(format!(
                "{} of lesson {} has invalid time {}",
                what, lesson_id, at_sec
            )));
        }
        if at_sec < previous {
            return Err(CatalogError::Invalid(format!(
                "{} of lesson {} not sorted by time",
                what, lesson_id
            )));
        }
        previous = at_sec;
    }
    Ok(())
}
