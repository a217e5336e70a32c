use std::time::Duration;
use tracing::debug;

/// A scheduled switch to the next lesson.
///
/// Only the ticket matching the scheduler's current generation may fire.
/// Any lesson change or reschedule bumps the generation, so a sleeping
/// timer holding an old ticket wakes up to a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoAdvanceTicket {
    pub from_lesson_id: String,
    pub target_lesson_id: String,
    generation: u64,
}

impl AutoAdvanceTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct AutoAdvance {
    generation: u64,
    pending: Option<AutoAdvanceTicket>,
}

impl AutoAdvance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending advance with a new one
    pub fn schedule(&mut self, from_lesson_id: &str, target_lesson_id: &str) -> AutoAdvanceTicket {
        self.generation += 1;
        let ticket = AutoAdvanceTicket {
            from_lesson_id: from_lesson_id.to_string(),
            target_lesson_id: target_lesson_id.to_string(),
            generation: self.generation,
        };
        debug!(
            "Auto-advance scheduled {} -> {} (generation {})",
            from_lesson_id, target_lesson_id, self.generation
        );
        self.pending = Some(ticket.clone());
        ticket
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(ticket) = self.pending.take() {
            debug!(
                "Auto-advance {} -> {} cancelled",
                ticket.from_lesson_id, ticket.target_lesson_id
            );
        }
    }

    pub fn pending(&self) -> Option<&AutoAdvanceTicket> {
        self.pending.as_ref()
    }

    /// Consume the pending advance if `ticket` is still the current one
    pub fn take_if_current(&mut self, ticket: &AutoAdvanceTicket) -> bool {
        if self.pending.as_ref() == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

/// Sleep out the auto-advance delay, handing the ticket back for validation
pub async fn wait(ticket: AutoAdvanceTicket, delay: Duration) -> AutoAdvanceTicket {
    tokio::time::sleep(delay).await;
    ticket
}
