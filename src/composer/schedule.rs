/// Coalesces render requests so the host renders at most once per animation frame.
///
/// Any number of `request` calls between two frames collapse into a single pending
/// frame; the host drains it with `take_frame_request` from its frame callback.
#[derive(Clone, Debug, Default)]
pub struct FrameScheduler {
    pending: bool,
    coalesced: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) {
        if self.pending {
            self.coalesced += 1;
        }
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns `true` once per batch of requests.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Requests that were folded into an already pending frame.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composer/schedule.rs"]
mod tests;
