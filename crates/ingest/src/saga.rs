//! Compensation tracking for multi-step ingestion.
//!
//! Each committed step pushes a compensation token; when a later step fails,
//! the orchestrator walks the tokens back in reverse order to undo what was
//! already committed.

use database::SqlitePool;
use tracing::warn;

/// A committed step that can be undone.
#[derive(Debug)]
pub(crate) enum Compensation {
    /// Delete a message that was inserted earlier in the workflow.
    DeleteMessage { message_id: String },
}

/// Stack of compensations for the steps committed so far.
#[derive(Debug, Default)]
pub(crate) struct Compensations {
    steps: Vec<Compensation>,
}

impl Compensations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a committed step.
    pub(crate) fn push(&mut self, step: Compensation) {
        self.steps.push(step);
    }

    /// Undo all committed steps, most recent first.
    ///
    /// Compensation failures are logged, not propagated: the original
    /// failure is what the caller needs to see.
    pub(crate) async fn unwind(self, pool: &SqlitePool) {
        for step in self.steps.into_iter().rev() {
            match step {
                Compensation::DeleteMessage { message_id } => {
                    if let Err(e) = database::message::delete_by_id(pool, &message_id).await {
                        warn!(message_id = %message_id, error = %e, "failed to roll back message");
                    }
                }
            }
        }
    }
}
