use serde::{Deserialize, Serialize};

use crate::capabilities::{ServiceResult, TimerOutput};
use crate::config::AdminConfig;
use crate::debounce::DebounceToken;
use crate::draft::DraftChange;
use crate::model::UserRole;
use crate::query::{RequestTicket, Sorting};
use crate::resource::{EntityId, ResourceKind};

// --- Event enum: no None variant, service responses boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Session & settings, reported by the shell
    ConfigLoaded { config: AdminConfig },
    UserRoleResolved { role: UserRole },

    // Everything that happens on a resource screen
    Screen {
        resource: ResourceKind,
        event: ScreenEvent,
    },
}

impl Event {
    #[must_use]
    pub const fn screen(resource: ResourceKind, event: ScreenEvent) -> Self {
        Self::Screen { resource, event }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ConfigLoaded { .. } => "config_loaded",
            Self::UserRoleResolved { .. } => "user_role_resolved",
            Self::Screen { event, .. } => event.name(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ScreenEvent {
    // Lifecycle
    Opened,

    // Table
    SortingChanged { sorting: Sorting },
    PageChanged { page: u32 },
    SearchChanged { text: String },
    ListRetryRequested,
    ReferenceRetryRequested { source: ResourceKind },

    // Create form
    DraftChanged { change: DraftChange },
    DraftCleared,
    CreateRequested,

    // Edit form
    EditOpened { id: EntityId },
    EditChanged { change: DraftChange },
    EditSubmitted,
    DeleteRequested,
    EditClosed,

    // Capability responses
    SearchTimer {
        token: DebounceToken,
        output: TimerOutput,
    },
    ListLoaded {
        ticket: RequestTicket,
        result: Box<ServiceResult>,
    },
    ReferenceLoaded {
        source: ResourceKind,
        ticket: RequestTicket,
        result: Box<ServiceResult>,
    },
    CreateCompleted {
        ticket: RequestTicket,
        result: Box<ServiceResult>,
    },
    EditLoaded {
        id: EntityId,
        result: Box<ServiceResult>,
    },
    EditCompleted {
        id: EntityId,
        ticket: RequestTicket,
        result: Box<ServiceResult>,
    },
    DeleteCompleted {
        id: EntityId,
        ticket: RequestTicket,
        result: Box<ServiceResult>,
    },
}

impl ScreenEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::SortingChanged { .. } => "sorting_changed",
            Self::PageChanged { .. } => "page_changed",
            Self::SearchChanged { .. } => "search_changed",
            Self::ListRetryRequested => "list_retry_requested",
            Self::ReferenceRetryRequested { .. } => "reference_retry_requested",
            Self::DraftChanged { .. } => "draft_changed",
            Self::DraftCleared => "draft_cleared",
            Self::CreateRequested => "create_requested",
            Self::EditOpened { .. } => "edit_opened",
            Self::EditChanged { .. } => "edit_changed",
            Self::EditSubmitted => "edit_submitted",
            Self::DeleteRequested => "delete_requested",
            Self::EditClosed => "edit_closed",
            Self::SearchTimer { .. } => "search_timer",
            Self::ListLoaded { .. } => "list_loaded",
            Self::ReferenceLoaded { .. } => "reference_loaded",
            Self::CreateCompleted { .. } => "create_completed",
            Self::EditLoaded { .. } => "edit_loaded",
            Self::EditCompleted { .. } => "edit_completed",
            Self::DeleteCompleted { .. } => "delete_completed",
        }
    }

    /// Events that change data on the server or the forms that feed it.
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::DraftChanged { .. }
                | Self::DraftCleared
                | Self::CreateRequested
                | Self::EditOpened { .. }
                | Self::EditChanged { .. }
                | Self::EditSubmitted
                | Self::DeleteRequested
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::ServiceOutput;

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(size <= 96, "Event is {size} bytes; box the larger payloads");
    }

    #[test]
    fn screen_events_round_trip_through_json() {
        let event = Event::screen(
            ResourceKind::Office,
            ScreenEvent::SortingChanged {
                sorting: "Name DESC".parse().unwrap(),
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"Name DESC\""));
        assert_eq!(serde_json::from_str::<Event>(&json).unwrap(), event);
    }

    #[test]
    fn names_come_from_the_screen_event() {
        let event = Event::screen(
            ResourceKind::Room,
            ScreenEvent::DeleteCompleted {
                id: EntityId::new("r1"),
                ticket: crate::query::TicketCounter::default().issue(),
                result: Box::new(Ok(ServiceOutput::Deleted)),
            },
        );
        assert_eq!(event.name(), "delete_completed");
        assert!(!ScreenEvent::ListRetryRequested.is_mutating());
        assert!(ScreenEvent::CreateRequested.is_mutating());
    }
}
