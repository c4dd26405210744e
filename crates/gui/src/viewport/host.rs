//! Host-side signals a viewport session subscribes to: frame requests
//! (one tick per request) and resize notifications.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Identifies one subscriber (a session's render loop or resize listener)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct HostInner {
    next_id: u64,
    resize_subscribers: BTreeSet<SubscriptionId>,
    frame_requests: BTreeSet<SubscriptionId>,
}

/// Shared registry owned by the hosting panel
#[derive(Clone, Default)]
pub struct HostSignals {
    inner: Arc<Mutex<HostInner>>,
}

impl HostSignals {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HostInner> {
        // A poisoned registry only means a panic elsewhere; the sets are still valid
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn allocate_id(&self) -> SubscriptionId {
        let mut inner = self.lock();
        inner.next_id += 1;
        SubscriptionId(inner.next_id)
    }

    pub fn subscribe_resize(&self) -> SubscriptionId {
        let id = self.allocate_id();
        self.lock().resize_subscribers.insert(id);
        id
    }

    pub fn unsubscribe_resize(&self, id: SubscriptionId) {
        self.lock().resize_subscribers.remove(&id);
    }

    pub fn is_resize_subscribed(&self, id: SubscriptionId) -> bool {
        self.lock().resize_subscribers.contains(&id)
    }

    pub fn resize_subscriber_count(&self) -> usize {
        self.lock().resize_subscribers.len()
    }

    /// Ask for one more tick of the given loop
    pub fn request_frame(&self, id: SubscriptionId) {
        self.lock().frame_requests.insert(id);
    }

    pub fn cancel_frame(&self, id: SubscriptionId) {
        self.lock().frame_requests.remove(&id);
    }

    /// Consume a pending request; true means the loop should tick now
    pub fn take_frame_request(&self, id: SubscriptionId) -> bool {
        self.lock().frame_requests.remove(&id)
    }

    pub fn has_frame_requests(&self) -> bool {
        !self.lock().frame_requests.is_empty()
    }

    pub fn pending_frame_count(&self) -> usize {
        self.lock().frame_requests.len()
    }
}

/// Guard checked by late asynchronous callbacks before touching a session
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock delta between consecutive ticks. The first call returns zero.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let dt = self.last.map(|last| now - last).unwrap_or_default();
        self.last = Some(now);
        dt
    }
}
