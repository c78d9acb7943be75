//! Single-shot, cancellable refresh timer.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::trace;

/// Emitted when a scheduled poll comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTick {
    pub generation: u64,
}

/// Owns at most one pending poll. Scheduling replaces the pending one;
/// dropping the poller aborts it.
#[derive(Debug, Default)]
pub struct Poller {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a [`PollTick`] on `events` after `delay`, cancelling any pending poll.
    pub fn schedule<T>(&mut self, delay: Duration, events: UnboundedSender<T>) -> u64
    where
        T: From<PollTick> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let tick = PollTick {
            generation: self.generation,
        };
        trace!("Scheduling poll {} in {:?}", tick.generation, delay);

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(T::from(tick));
        }));
        self.generation
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            trace!("Cancelling poll {}", self.generation);
            handle.abort();
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    /// Claim a delivered tick. Ticks from replaced or cancelled schedules are refused.
    pub fn accept(&mut self, tick: PollTick) -> bool {
        if self.pending.is_none() || tick.generation != self.generation {
            trace!("Ignoring stale poll {}", tick.generation);
            return false;
        }
        self.pending = None;
        true
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel();
    }
}
