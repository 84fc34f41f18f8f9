mod notifier;
mod service;
mod timer;

pub use self::notifier::{Notification, NotificationKind, Notifier};
pub use self::service::{PageResponse, Service, ServiceOperation, ServiceOutput, ServiceResult};
pub use self::timer::{Timer, TimerId, TimerOperation, TimerOutput};

// Crux's built-in Render capability covers view refreshes.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub service: Service<Event>,
    pub timer: Timer<Event>,
    pub notifier: Notifier<Event>,
}
