use crate::state::messages::{RefreshRequest, RefreshResponse};
use log::{debug, info};
use std::future::Future;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

/// One full recompute. `false` means the cycle failed and was logged.
pub trait Refresh {
    fn refresh(&mut self) -> impl Future<Output = bool> + Send;
}

/// Runs refresh cycles strictly one after another. Shutdown is only observed
/// between cycles, so an in-flight cycle always finishes its write.
pub struct RefreshWorker<R> {
    cycle: R,
    requests: mpsc::Receiver<RefreshRequest>,
    responses: mpsc::Sender<RefreshResponse>,
    shutdown: watch::Receiver<bool>,
}

impl<R: Refresh> RefreshWorker<R> {
    pub fn new(
        cycle: R,
        requests: mpsc::Receiver<RefreshRequest>,
        responses: mpsc::Sender<RefreshResponse>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self { cycle, requests, responses, shutdown }
    }

    pub async fn run(mut self) {
        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let request = tokio::select! {
                biased;
                changed = self.shutdown.changed() => {
                    // Sender gone counts as shutdown too.
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                request = self.requests.recv() => match request {
                    Some(request) => request,
                    None => break,
                },
            };

            debug!("refresh requested: {request:?}");
            let started = Instant::now();
            let ok = self.cycle.refresh().await;
            let response = RefreshResponse::CycleFinished { request, ok, elapsed: started.elapsed() };
            // Nobody listening is fine; keep serving requests.
            let _ = self.responses.send(response).await;
        }
        info!("refresh worker stopped");
    }
}
