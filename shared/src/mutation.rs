//! Lifecycle of a create/update/delete submission and the app's reaction to
//! its outcome.

use serde::{Deserialize, Serialize};

use crate::capabilities::{Notification, ServiceResult};
use crate::error::RemoteError;
use crate::query::{RequestTicket, TicketCounter};

pub const SAVED_MESSAGE: &str = "Your changes were saved";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum MutationPhase {
    #[default]
    Idle,
    Submitting {
        ticket: RequestTicket,
    },
}

/// `Idle -> Submitting -> Idle`. Each submission's outcome is consumed once.
#[derive(Clone, Debug, Default)]
pub struct MutationTracker {
    phase: MutationPhase,
    tickets: TicketCounter,
}

impl MutationTracker {
    #[must_use]
    pub const fn phase(&self) -> MutationPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, MutationPhase::Submitting { .. })
    }

    /// Starts a submission, or returns `None` while one is in flight.
    pub fn begin(&mut self) -> Option<RequestTicket> {
        if self.is_submitting() {
            return None;
        }
        let ticket = self.tickets.issue();
        self.phase = MutationPhase::Submitting { ticket };
        Some(ticket)
    }

    /// Returns `true` exactly once, for the outcome of the in-flight ticket.
    pub fn settle(&mut self, ticket: RequestTicket) -> bool {
        if self.phase == (MutationPhase::Submitting { ticket }) {
            self.phase = MutationPhase::Idle;
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MutationOutcome<T> {
    Success(T),
    Failure(RemoteError),
}

impl<T> From<Result<T, RemoteError>> for MutationOutcome<T> {
    fn from(result: Result<T, RemoteError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

/// What the screen does once a submission settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reaction {
    pub notification: Notification,
    /// Refetch the list with its current query.
    pub refetch: bool,
    /// Reset the create form, or close the edit form.
    pub reset_draft: bool,
}

impl Reaction {
    #[must_use]
    pub fn for_outcome<T>(outcome: &MutationOutcome<T>) -> Self {
        match outcome {
            MutationOutcome::Success(_) => Self {
                notification: Notification::success(SAVED_MESSAGE),
                refetch: true,
                reset_draft: true,
            },
            MutationOutcome::Failure(error) => Self {
                notification: Notification::from_error(error),
                refetch: false,
                reset_draft: false,
            },
        }
    }

    #[must_use]
    pub fn for_result(result: ServiceResult) -> Self {
        Self::for_outcome(&MutationOutcome::from(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{NotificationKind, ServiceOutput};
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn second_begin_is_rejected_while_submitting() {
        let mut tracker = MutationTracker::default();
        let ticket = tracker.begin().unwrap();
        assert!(tracker.begin().is_none());
        assert!(tracker.settle(ticket));
        assert!(tracker.begin().is_some());
    }

    #[test]
    fn outcome_is_consumed_once() {
        let mut tracker = MutationTracker::default();
        let ticket = tracker.begin().unwrap();
        assert!(tracker.settle(ticket));
        assert!(!tracker.settle(ticket));
    }

    #[test]
    fn success_refetches_and_resets() {
        let reaction = Reaction::for_result(Ok(ServiceOutput::Deleted));
        assert_eq!(reaction.notification.kind, NotificationKind::Success);
        assert_eq!(reaction.notification.message, SAVED_MESSAGE);
        assert!(reaction.refetch);
        assert!(reaction.reset_draft);
    }

    #[test]
    fn failure_keeps_draft_and_reports_server_message() {
        let error = RemoteError::new(ErrorKind::Validation, "Name is required")
            .with_details("The Name field is required.");
        let reaction = Reaction::for_result(Err(error));
        assert_eq!(reaction.notification.kind, NotificationKind::Danger);
        assert_eq!(reaction.notification.message, "Name is required");
        assert_eq!(
            reaction.notification.details.as_deref(),
            Some("The Name field is required.")
        );
        assert!(!reaction.refetch);
        assert!(!reaction.reset_draft);
    }

    proptest! {
        #[test]
        fn one_settlement_per_submission(rounds in 1usize..20, extra_settles in 0usize..3) {
            let mut tracker = MutationTracker::default();
            let mut settled = 0;
            for _ in 0..rounds {
                let ticket = tracker.begin().unwrap();
                for _ in 0..=extra_settles {
                    if tracker.settle(ticket) {
                        settled += 1;
                    }
                }
            }
            prop_assert_eq!(settled, rounds);
        }
    }
}
