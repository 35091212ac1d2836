use crate::state::messages::RefreshRequest;
use log::debug;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{MissedTickBehavior, interval};

/// Asks for a refresh every `period`. A tick that lands while a cycle is still
/// queued or running is dropped, never stacked.
pub struct PeriodicRefresher {
    requests: mpsc::Sender<RefreshRequest>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(requests: mpsc::Sender<RefreshRequest>, period: Duration) -> Self {
        Self { requests, period }
    }

    pub async fn run(self) {
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Skip the immediate first tick; startup sends its own request.
        ticks.tick().await;

        loop {
            ticks.tick().await;
            match self.requests.try_send(RefreshRequest::Scheduled) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => debug!("refresh already pending, tick skipped"),
                Err(TrySendError::Closed(_)) => break,
            }
        }
    }
}
