use crate::storage::{resume_key, SharedStore};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Last known playback position per lesson, persisted under `resume-<lessonId>`
#[derive(Clone)]
pub struct ResumeStore {
    store: SharedStore,
}

impl ResumeStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Persist `t` for a lesson. Invalid times and storage failures are logged
    /// and dropped.
    pub fn save(&self, lesson_id: &str, t: f64) {
        if !(t.is_finite() && t >= 0.0) {
            debug!("Not saving resume time {} for {}", t, lesson_id);
            return;
        }
        if let Err(e) = self.store.set(&resume_key(lesson_id), &t.to_string()) {
            warn!("Failed to save resume time for {}: {}", lesson_id, e);
        }
    }

    pub fn load(&self, lesson_id: &str) -> Option<f64> {
        let raw = match self.store.get(&resume_key(lesson_id)) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read resume time for {}: {}", lesson_id, e);
                return None;
            }
        };
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite() && *t >= 0.0)
    }

    /// A saved position worth offering to the user, if any
    pub fn offer(&self, lesson_id: &str) -> Option<f64> {
        self.load(lesson_id).filter(|t| *t > 0.0)
    }
}

/// Periodic trigger for resume saves while a lesson is open
#[derive(Debug, Clone, Copy)]
pub struct ResumeTicker {
    interval: Duration,
}

impl ResumeTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Call `on_tick` every interval until the future is dropped.
    /// The first call happens one full interval after start.
    pub async fn run<F: FnMut()>(self, mut on_tick: F) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval() completes its first tick immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            on_tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn resume_store() -> (Arc<MemoryStore>, ResumeStore) {
        let memory = Arc::new(MemoryStore::new());
        (memory.clone(), ResumeStore::new(memory))
    }

    #[test]
    fn test_save_and_load() {
        let (memory, resume) = resume_store();
        resume.save("l1", 42.5);
        assert_eq!(memory.peek("resume-l1").as_deref(), Some("42.5"));
        assert_eq!(resume.load("l1"), Some(42.5));
        assert_eq!(resume.load("l2"), None);
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let (memory, resume) = resume_store();
        resume.save("l1", f64::NAN);
        resume.save("l1", -4.0);
        assert_eq!(memory.peek("resume-l1"), None);

        memory.set("resume-l2", "garbage").unwrap();
        assert_eq!(resume.load("l2"), None);
    }

    #[test]
    fn test_offer_requires_positive_time() {
        let (_, resume) = resume_store();
        resume.save("l1", 0.0);
        assert_eq!(resume.load("l1"), Some(0.0));
        assert_eq!(resume.offer("l1"), None);

        resume.save("l1", 12.0);
        assert_eq!(resume.offer("l1"), Some(12.0));
    }

    #[test]
    fn test_unavailable_storage_is_not_fatal() {
        let resume = ResumeStore::new(Arc::new(MemoryStore::unavailable()));
        resume.save("l1", 10.0);
        assert_eq!(resume.load("l1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_fires_each_interval() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let ticker = ResumeTicker::new(Duration::from_secs(5));
        let handle = tokio::spawn(ticker.run(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(10_200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        handle.abort();
    }
}
