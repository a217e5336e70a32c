use crate::storage::{notes_key, SharedStore, StorageError};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// A timestamped note taken while watching a lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    /// Seconds into the lesson video when the note was taken
    pub timestamp: f64,
    pub text: String,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredInstant {
    Rfc3339(String),
    EpochMillis(i64),
}

// Accept both RFC 3339 strings and epoch milliseconds
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match StoredInstant::deserialize(deserializer)? {
        StoredInstant::Rfc3339(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom),
        StoredInstant::EpochMillis(ms) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid epoch millis {}", ms))),
    }
}

/// Why a note mutation was refused at the command boundary
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteRejected {
    #[error("Note text is empty")]
    EmptyText,
    #[error("Playback has not started")]
    PlaybackNotStarted,
    #[error("Notes are still loading")]
    NotReady,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesState {
    Uninitialized,
    Loading { lesson_id: String },
    Ready { lesson_id: String },
}

/// Handle for a load in flight. Only the most recent ticket can finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    lesson_id: String,
    generation: u64,
}

impl LoadTicket {
    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }
}

/// Owns the note collection of the active lesson.
///
/// Mutations are accepted only in `Ready` and write the whole collection back
/// under the owning lesson's key before returning.
pub struct NotesManager {
    store: SharedStore,
    state: NotesState,
    notes: Vec<Note>,
    generation: u64,
    duration_limit: Option<f64>,
}

impl NotesManager {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            state: NotesState::Uninitialized,
            notes: Vec::new(),
            generation: 0,
            duration_limit: None,
        }
    }

    pub fn state(&self) -> &NotesState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, NotesState::Ready { .. })
    }

    /// Lesson whose notes are held, once loaded
    pub fn lesson_id(&self) -> Option<&str> {
        match &self.state {
            NotesState::Ready { lesson_id } => Some(lesson_id),
            _ => None,
        }
    }

    /// Upper bound applied to new note timestamps
    pub fn set_duration_limit(&mut self, duration: Option<f64>) {
        self.duration_limit = duration.filter(|d| d.is_finite() && *d > 0.0);
    }

    /// Enter `Loading` for a lesson. In-memory notes are dropped immediately
    /// so the previous lesson's notes are never shown under the new id.
    pub fn begin_load(&mut self, lesson_id: &str) -> LoadTicket {
        self.generation += 1;
        self.notes.clear();
        self.state = NotesState::Loading {
            lesson_id: lesson_id.to_string(),
        };
        debug!("Loading notes for {} (generation {})", lesson_id, self.generation);
        LoadTicket {
            lesson_id: lesson_id.to_string(),
            generation: self.generation,
        }
    }

    /// Read the persisted collection and enter `Ready`.
    /// Returns false if the ticket was superseded by a later load.
    pub fn finish_load(&mut self, ticket: LoadTicket) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale notes load for {} (generation {} != {})",
                ticket.lesson_id, ticket.generation, self.generation
            );
            return false;
        }

        self.notes = self.read(&ticket.lesson_id);
        info!(
            "Loaded {} notes for {}",
            self.notes.len(),
            ticket.lesson_id
        );
        self.state = NotesState::Ready {
            lesson_id: ticket.lesson_id,
        };
        true
    }

    pub fn load(&mut self, lesson_id: &str) {
        let ticket = self.begin_load(lesson_id);
        self.finish_load(ticket);
    }

    fn read(&self, lesson_id: &str) -> Vec<Note> {
        let raw = match self.store.get(&notes_key(lesson_id)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read notes for {}: {}", lesson_id, e);
                return Vec::new();
            }
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" || trimmed == "undefined" {
            return Vec::new();
        }
        match serde_json::from_str::<Vec<Note>>(trimmed) {
            Ok(notes) => notes,
            Err(e) => {
                warn!("Stored notes for {} are corrupt, starting empty: {}", lesson_id, e);
                Vec::new()
            }
        }
    }

    fn persist(&self, lesson_id: &str) {
        let result = serde_json::to_string(&self.notes)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(&notes_key(lesson_id), &json));
        match result {
            Ok(()) => debug!("Persisted {} notes for {}", self.notes.len(), lesson_id),
            Err(e) => warn!(
                "Failed to persist notes for {}, keeping them in memory: {}",
                lesson_id, e
            ),
        }
    }

    pub fn add_note(&mut self, text: &str, current_time: f64) -> Result<&Note, NoteRejected> {
        self.add_note_at(text, current_time, Utc::now())
    }

    /// Add a note stamped with `current_time`, created at `now`
    pub fn add_note_at(
        &mut self,
        text: &str,
        current_time: f64,
        now: DateTime<Utc>,
    ) -> Result<&Note, NoteRejected> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NoteRejected::EmptyText);
        }
        if !(current_time.is_finite() && current_time > 0.0) {
            return Err(NoteRejected::PlaybackNotStarted);
        }
        let NotesState::Ready { lesson_id } = &self.state else {
            debug!("Note rejected while notes are not ready");
            return Err(NoteRejected::NotReady);
        };
        let lesson_id = lesson_id.clone();

        let timestamp = match self.duration_limit {
            Some(limit) => current_time.min(limit),
            None => current_time,
        };
        let note = Note {
            id: self.next_id(now),
            timestamp,
            text: text.to_string(),
            created_at: now,
        };
        debug!("Adding note {} at {:.1}s to {}", note.id, timestamp, lesson_id);
        self.notes.push(note);
        self.persist(&lesson_id);

        Ok(&self.notes[self.notes.len() - 1])
    }

    fn next_id(&self, now: DateTime<Utc>) -> String {
        let now_ms = now.timestamp_millis();
        let next_free = self
            .notes
            .iter()
            .filter_map(|note| note.id.parse::<i64>().ok())
            .max()
            .map_or(now_ms, |max| max + 1);
        now_ms.max(next_free).to_string()
    }

    /// Remove a note by id. Returns whether a note was removed.
    pub fn delete_note(&mut self, id: &str) -> Result<bool, NoteRejected> {
        let NotesState::Ready { lesson_id } = &self.state else {
            debug!("Delete of {} rejected while notes are not ready", id);
            return Err(NoteRejected::NotReady);
        };
        let lesson_id = lesson_id.clone();

        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        if self.notes.len() == before {
            return Ok(false);
        }
        debug!("Deleted note {} from {}", id, lesson_id);
        // An emptied collection is written too
        self.persist(&lesson_id);
        Ok(true)
    }

    /// Notes in insertion order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Notes ordered by video timestamp
    pub fn sorted(&self) -> Vec<Note> {
        let mut notes = self.notes.clone();
        notes.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn manager() -> (Arc<MemoryStore>, NotesManager) {
        let memory = Arc::new(MemoryStore::new());
        (memory.clone(), NotesManager::new(memory))
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_rejects_invalid_input() {
        let (_, mut notes) = manager();
        assert_eq!(
            notes.add_note("hello", 5.0).unwrap_err(),
            NoteRejected::NotReady
        );

        notes.load("l1");
        assert_eq!(notes.add_note("   ", 5.0).unwrap_err(), NoteRejected::EmptyText);
        assert_eq!(
            notes.add_note("hello", 0.0).unwrap_err(),
            NoteRejected::PlaybackNotStarted
        );
        assert!(notes.notes().is_empty());
    }

    #[test]
    fn test_add_persists_synchronously() {
        let (memory, mut notes) = manager();
        notes.load("l1");
        let note = notes.add_note_at("  key idea  ", 12.5, at(1_000)).unwrap();
        assert_eq!(note.text, "key idea");
        assert_eq!(note.id, "1000");

        let stored: Vec<Note> = serde_json::from_str(&memory.peek("notes-l1").unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].timestamp, 12.5);
        assert_eq!(stored[0].created_at, at(1_000));
    }

    #[test]
    fn test_ids_are_unique_within_same_millisecond() {
        let (_, mut notes) = manager();
        notes.load("l1");
        let first = notes.add_note_at("a", 1.0, at(5_000)).unwrap().id.clone();
        let second = notes.add_note_at("b", 2.0, at(5_000)).unwrap().id.clone();
        let third = notes.add_note_at("c", 3.0, at(4_000)).unwrap().id.clone();
        assert_eq!(first, "5000");
        assert_eq!(second, "5001");
        assert_eq!(third, "5002");
    }

    #[test]
    fn test_timestamp_clamped_to_duration() {
        let (_, mut notes) = manager();
        notes.set_duration_limit(Some(180.0));
        notes.load("l1");
        let note = notes.add_note("late", 181.4).unwrap();
        assert_eq!(note.timestamp, 180.0);
    }

    #[test]
    fn test_mutations_rejected_while_loading() {
        let (memory, mut notes) = manager();
        notes.load("l1");
        notes.add_note_at("keep", 3.0, at(1)).unwrap();

        let ticket = notes.begin_load("l2");
        assert!(notes.notes().is_empty());
        assert_eq!(notes.add_note("x", 4.0).unwrap_err(), NoteRejected::NotReady);
        assert_eq!(notes.delete_note("1").unwrap_err(), NoteRejected::NotReady);
        assert_eq!(memory.peek("notes-l2"), None);

        assert!(notes.finish_load(ticket));
        assert_eq!(notes.lesson_id(), Some("l2"));
        assert!(notes.notes().is_empty());
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let (memory, mut notes) = manager();
        memory
            .set("notes-l1", r#"[{"id":"1","timestamp":2,"text":"one","createdAt":1}]"#)
            .unwrap();

        let stale = notes.begin_load("l1");
        let current = notes.begin_load("l2");
        assert!(!notes.finish_load(stale));
        assert!(!notes.is_ready());
        assert!(notes.finish_load(current));
        assert_eq!(notes.lesson_id(), Some("l2"));
        assert!(notes.notes().is_empty());
    }

    #[test]
    fn test_delete_last_note_persists_empty_collection() {
        let (memory, mut notes) = manager();
        notes.load("l1");
        let id = notes.add_note("only", 9.0).unwrap().id.clone();
        assert!(notes.delete_note(&id).unwrap());
        assert_eq!(memory.peek("notes-l1").as_deref(), Some("[]"));
        assert!(!notes.delete_note(&id).unwrap());

        notes.load("l1");
        assert!(notes.notes().is_empty());
    }

    #[test]
    fn test_load_tolerates_bad_payloads() {
        let (memory, mut notes) = manager();
        for raw in ["null", "undefined", "{oops", ""] {
            memory.set("notes-l1", raw).unwrap();
            notes.load("l1");
            assert!(notes.is_ready());
            assert!(notes.notes().is_empty(), "payload {:?}", raw);
        }
    }

    #[test]
    fn test_load_rehydrates_created_at_formats() {
        let (memory, mut notes) = manager();
        memory
            .set(
                "notes-l1",
                r#"[
                    {"id":"2","timestamp":40,"text":"iso","createdAt":"2025-03-05T14:30:00.000Z"},
                    {"id":"1","timestamp":10,"text":"epoch","createdAt":1741185000000}
                ]"#,
            )
            .unwrap();
        notes.load("l1");
        let sorted = notes.sorted();
        assert_eq!(sorted[0].text, "epoch");
        assert_eq!(sorted[1].text, "iso");
        assert_eq!(sorted[0].created_at, sorted[1].created_at);
        // stored order is untouched
        assert_eq!(notes.notes()[0].text, "iso");
    }

    #[test]
    fn test_storage_failure_keeps_notes_in_memory() {
        let memory = Arc::new(MemoryStore::unavailable());
        let mut notes = NotesManager::new(memory);
        notes.load("l1");
        assert!(notes.is_ready());
        notes.add_note("offline", 2.0).unwrap();
        assert_eq!(notes.notes().len(), 1);
    }
}
