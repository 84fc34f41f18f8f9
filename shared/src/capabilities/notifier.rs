use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Danger,
}

impl NotificationKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Success => 3000,
            Self::Danger => 6000,
        }
    }
}

/// Message for the shell's single notification area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub duration_ms: u64,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            details: None,
            duration_ms: NotificationKind::Success.default_duration_ms(),
        }
    }

    pub fn danger(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            kind: NotificationKind::Danger,
            message: message.into(),
            details,
            duration_ms: NotificationKind::Danger.default_duration_ms(),
        }
    }

    #[must_use]
    pub fn from_error(error: &RemoteError) -> Self {
        Self::danger(error.message.clone(), error.details.clone())
    }
}

impl Operation for Notification {
    type Output = ();
}

/// Fire-and-forget notifications; the shell renders them in one place.
pub struct Notifier<Ev> {
    context: CapabilityContext<Notification, Ev>,
}

impl<Ev> Capability<Ev> for Notifier<Ev> {
    type Operation = Notification;
    type MappedSelf<MappedEv> = Notifier<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Notifier::new(self.context.map_event(f))
    }
}

impl<Ev> Notifier<Ev> {
    pub fn new(context: CapabilityContext<Notification, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev: Send + 'static> Notifier<Ev> {
    pub fn notify(&self, notification: Notification) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(notification).await;
        });
    }
}
