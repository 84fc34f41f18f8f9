use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TimerId(pub String);

impl TimerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerOperation {
    Start { id: TimerId, millis: u64 },
    Cancel { id: TimerId },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerOutput {
    Elapsed { id: TimerId },
    Cancelled { id: TimerId },
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

/// One-shot timers run by the shell.
pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerOperation;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Timer::new(self.context.map_event(f))
    }
}

impl<Ev> Timer<Ev> {
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev: Send + 'static> Timer<Ev> {
    /// Starts a timer; `callback` receives `Elapsed` or, if it was
    /// cancelled first, `Cancelled`.
    pub fn start<F>(&self, id: TimerId, after: Duration, callback: F)
    where
        F: FnOnce(TimerOutput) -> Ev + Send + 'static,
    {
        let millis = u64::try_from(after.as_millis()).unwrap_or(u64::MAX);
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(TimerOperation::Start { id, millis })
                .await;
            context.update_app(callback(output));
        });
    }

    pub fn cancel(&self, id: TimerId) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(TimerOperation::Cancel { id }).await;
        });
    }
}
