#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod capabilities;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod draft;
pub mod error;
pub mod event;
pub mod model;
pub mod mutation;
pub mod query;
pub mod reference;
pub mod resource;
pub mod time_zones;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::AdminConfig;
pub use error::{AdminError, AdminResult, ErrorKind, RemoteError};
pub use event::{Event, ScreenEvent};
pub use model::{Model, UserRole};
pub use resource::{EntityId, ResourceKind};
pub use view::ViewModel;

pub mod app {
    use tracing::{debug, info, warn};

    use crate::capabilities::Capabilities;
    use crate::event::{Event, ScreenEvent};
    use crate::model::Model;
    use crate::view::ViewModel;

    #[derive(Default)]
    pub struct App;

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(event = event.name(), "update");

            match event {
                Event::ConfigLoaded { config } => match config.validate() {
                    Ok(()) => {
                        info!(page_size = config.page_size, "configuration applied");
                        model.config = config;
                    }
                    Err(error) => warn!(%error, "configuration rejected, keeping previous"),
                },

                Event::UserRoleResolved { role } => {
                    info!(?role, "user role resolved");
                    model.role = role;
                }

                Event::Screen { resource, event } => {
                    if matches!(event, ScreenEvent::Opened) {
                        model.active = Some(resource);
                    }
                    let ctx = model.screen_context();
                    match model.screen_mut(resource) {
                        Some(screen) => screen.handle(event, ctx, caps),
                        None => warn!(%resource, "no screen for resource"),
                    }
                }
            }

            caps.render.render();
        }

        fn view(&self, model: &Model) -> ViewModel {
            let ctx = model.screen_context();
            ViewModel {
                role: model.role,
                can_manage: ctx.can_manage,
                screen: model
                    .active
                    .and_then(|kind| model.screen(kind))
                    .map(|screen| screen.view(ctx)),
            }
        }
    }
}
