//! Periodic refresh timers

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Running poller. The timer stops when the handle is stopped or dropped.
#[derive(Debug)]
pub struct PollHandle {
    name: &'static str,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!(poller = self.name, "Poller stopped");
    }
}

/// Run `tick` now and then every `period`. A slow tick delays the next one
/// instead of causing a burst of catch-up ticks.
pub fn spawn_poller<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tracing::debug!(poller = name, period_ms = period.as_millis() as u64, "Poller started");

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            tracing::trace!(poller = name, "Poll tick");
            tick().await;
        }
    });

    PollHandle { name, task }
}
