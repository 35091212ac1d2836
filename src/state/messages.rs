use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRequest {
    Startup,
    Scheduled,
}

#[derive(Debug)]
pub enum RefreshResponse {
    CycleFinished {
        request: RefreshRequest,
        ok: bool,
        elapsed: Duration,
    },
}
