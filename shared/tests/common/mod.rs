#![allow(dead_code)]

use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use serde_json::{json, Value};
use shared::capabilities::{
    Notification, PageResponse, ServiceOperation, ServiceOutput, ServiceResult, TimerOperation,
    TimerOutput,
};
use shared::{App, Effect, Event, Model, ResourceKind, ScreenEvent};

pub type Tester = AppTester<App, Effect>;

#[derive(Default)]
pub struct Effects {
    pub service: Vec<Request<ServiceOperation>>,
    pub timers: Vec<Request<TimerOperation>>,
    pub notifications: Vec<Notification>,
    pub rendered: bool,
}

impl Effects {
    fn absorb(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Service(request) => self.service.push(request),
                Effect::Timer(request) => self.timers.push(request),
                Effect::Notifier(request) => self.notifications.push(request.operation.clone()),
                Effect::Render(_) => self.rendered = true,
            }
        }
    }

    /// Removes and returns the only service request, failing otherwise.
    pub fn single_service(&mut self) -> Request<ServiceOperation> {
        assert_eq!(
            self.service.len(),
            1,
            "expected one service request, got {:?}",
            self.service.iter().map(|r| &r.operation).collect::<Vec<_>>()
        );
        self.service.remove(0)
    }

    /// Removes and returns the list request for `resource`.
    pub fn take_list(&mut self, resource: ResourceKind) -> Request<ServiceOperation> {
        let index = self
            .service
            .iter()
            .position(|r| matches!(&r.operation, ServiceOperation::List { resource: kind, .. } if *kind == resource))
            .unwrap_or_else(|| panic!("no list request for {resource}"));
        self.service.remove(index)
    }

    pub fn started_timers(&mut self) -> Vec<Request<TimerOperation>> {
        let (started, rest): (Vec<_>, Vec<_>) = self
            .timers
            .drain(..)
            .partition(|r| matches!(r.operation, TimerOperation::Start { .. }));
        self.timers = rest;
        started
    }

    pub fn cancelled_timers(&self) -> usize {
        self.timers
            .iter()
            .filter(|r| matches!(r.operation, TimerOperation::Cancel { .. }))
            .count()
    }

    fn merge(&mut self, other: Effects) {
        self.service.extend(other.service);
        self.timers.extend(other.timers);
        self.notifications.extend(other.notifications);
        self.rendered |= other.rendered;
    }
}

/// Collects an update's effects and feeds its events back through the app.
fn drain(app: &Tester, model: &mut Model, update: Update<Effect, Event>) -> Effects {
    let mut effects = Effects::default();
    effects.absorb(update.effects);
    for event in update.events {
        effects.merge(send(app, model, event));
    }
    effects
}

pub fn send(app: &Tester, model: &mut Model, event: Event) -> Effects {
    let update = app.update(event, model);
    drain(app, model, update)
}

pub fn screen(app: &Tester, model: &mut Model, resource: ResourceKind, event: ScreenEvent) -> Effects {
    send(app, model, Event::screen(resource, event))
}

pub fn resolve_service(
    app: &Tester,
    model: &mut Model,
    mut request: Request<ServiceOperation>,
    result: ServiceResult,
) -> Effects {
    let update = app
        .resolve(&mut request, result)
        .expect("service request should resolve");
    drain(app, model, update)
}

pub fn fire_timer(app: &Tester, model: &mut Model, mut request: Request<TimerOperation>) -> Effects {
    let TimerOperation::Start { id, .. } = request.operation.clone() else {
        panic!("only started timers can fire");
    };
    let update = app
        .resolve(&mut request, TimerOutput::Elapsed { id })
        .expect("timer should resolve");
    drain(app, model, update)
}

pub fn page(items: Vec<Value>, total_count: u64) -> ServiceResult {
    Ok(ServiceOutput::Page(PageResponse { items, total_count }))
}

pub fn named(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name })
}

/// Opens a screen and answers every request it makes with the given pages.
pub fn open_with(
    app: &Tester,
    model: &mut Model,
    resource: ResourceKind,
    list: ServiceResult,
    reference: &[(ResourceKind, ServiceResult)],
) {
    let mut effects = screen(app, model, resource, ScreenEvent::Opened);
    let request = effects.take_list(resource);
    resolve_service(app, model, request, list);
    for (source, result) in reference {
        let request = effects.take_list(*source);
        resolve_service(app, model, request, result.clone());
    }
    assert!(effects.service.is_empty(), "unanswered requests on open");
}
