//! Display-refresh scheduling contract

/// Identifier of one outstanding frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Delivers a callback on the next display refresh
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a request. Unknown or already-delivered handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Single-slot request queue drained by the host once per refresh
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    pending: Option<FrameHandle>,
    next_id: u64,
    requested: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the outstanding request, if any, for delivery this refresh
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Requests made over the queue's lifetime
    pub fn requested(&self) -> u64 {
        self.requested
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        // A newer request supersedes the old one.
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}
