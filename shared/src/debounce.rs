use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebounceToken(u64);

impl DebounceToken {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub token: DebounceToken,
    /// Token of the value this call replaced, whose timer should be cancelled.
    pub superseded: Option<DebounceToken>,
}

/// Trailing-edge debounce. The owner starts a timer for each scheduled token
/// and calls [`Debounce::settle`] when it fires; only the newest token yields
/// a value, so a burst of calls produces one downstream call with the last
/// argument.
#[derive(Clone, Debug)]
pub struct Debounce<T> {
    delay: Duration,
    issued: u64,
    pending: Option<(DebounceToken, T)>,
}

impl<T> Debounce<T> {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            issued: 0,
            pending: None,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn schedule(&mut self, value: T) -> Scheduled {
        self.issued += 1;
        let token = DebounceToken(self.issued);
        let superseded = self.pending.replace((token, value)).map(|(old, _)| old);
        Scheduled { token, superseded }
    }

    /// Takes the pending value if `token` is the most recent one.
    pub fn settle(&mut self, token: DebounceToken) -> Option<T> {
        match &self.pending {
            Some((current, _)) if *current == token => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Drops the pending value, returning its token.
    pub fn cancel(&mut self) -> Option<DebounceToken> {
        self.pending.take().map(|(token, _)| token)
    }
}
