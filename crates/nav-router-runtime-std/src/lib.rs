//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform
//! abstraction traits defined in `nav-router-core`. Hosts construct a
//! [`StdRuntime`], create navigation handlers from it, and call
//! [`StdRuntime::run_due_tasks`] from their event loop whenever
//! [`StdRuntime::time_until_next_task`] says something is due.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use nav_router_core::{
    Clock, NavigationConfig, NavigationHandler, Runtime, RuntimeHandle, RuntimeScheduler,
};

const NO_WAKEUP: u64 = u64::MAX;

type Waker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduler that records requests in atomics for the host loop to poll.
pub struct StdScheduler {
    frame_requested: AtomicBool,
    next_wakeup: AtomicU64,
    waker: RwLock<Option<Waker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            frame_requested: AtomicBool::new(false),
            next_wakeup: AtomicU64::new(NO_WAKEUP),
            waker: RwLock::new(None),
        }
    }

    /// Returns whether a frame has been requested since the last call.
    pub fn take_frame_request(&self) -> bool {
        self.frame_requested.swap(false, Ordering::SeqCst)
    }

    /// Earliest requested wakeup since the last call, in clock milliseconds.
    pub fn take_wakeup(&self) -> Option<u64> {
        match self.next_wakeup.swap(NO_WAKEUP, Ordering::SeqCst) {
            NO_WAKEUP => None,
            at => Some(at),
        }
    }

    /// Registers a waker invoked whenever a frame or wakeup is requested.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut slot) = self.waker.write() {
            *slot = Some(Arc::new(waker));
        }
    }

    /// Clears any registered waker.
    pub fn clear_waker(&self) {
        if let Ok(mut slot) = self.waker.write() {
            *slot = None;
        }
    }

    fn wake(&self) {
        let waker = self
            .waker
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().map(Arc::clone));
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field(
                "frame_requested",
                &self.frame_requested.load(Ordering::SeqCst),
            )
            .field("next_wakeup", &self.next_wakeup.load(Ordering::SeqCst))
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_frame(&self) {
        self.frame_requested.store(true, Ordering::SeqCst);
        self.wake();
    }

    fn schedule_wakeup(&self, at_millis: u64) {
        self.next_wakeup.fetch_min(at_millis, Ordering::SeqCst);
        self.wake();
    }
}

/// Monotonic clock backed by [`std::time::Instant`].
#[derive(Debug, Clone)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Instant corresponding to `millis` on this clock.
    pub fn instant_at(&self, millis: u64) -> Instant {
        self.origin + Duration::from_millis(millis)
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Convenience container bundling the standard scheduler and clock.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
    clock: Arc<StdClock>,
    runtime: Runtime,
}

impl StdRuntime {
    /// Creates a new standard runtime instance.
    pub fn new() -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        let clock = Arc::new(StdClock::default());
        let runtime = Runtime::new(scheduler.clone(), clock.clone());
        Self {
            scheduler,
            clock,
            runtime,
        }
    }

    /// Returns the [`nav_router_core::Runtime`] configured with the standard services.
    pub fn runtime(&self) -> Runtime {
        self.runtime.clone()
    }

    /// Returns a handle to the runtime.
    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    /// Creates a navigation handler driven by this runtime.
    pub fn navigation_handler(&self, config: NavigationConfig) -> NavigationHandler {
        NavigationHandler::with_config(self.runtime_handle(), config)
    }

    /// Returns the scheduler implementation.
    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Returns the clock implementation.
    pub fn clock(&self) -> Arc<StdClock> {
        Arc::clone(&self.clock)
    }

    /// Returns whether a frame was requested since the last poll.
    pub fn take_frame_request(&self) -> bool {
        self.scheduler.take_frame_request()
    }

    /// Registers a waker to be called when the runtime needs the host loop.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_waker(waker);
    }

    /// Clears any previously registered waker.
    pub fn clear_waker(&self) {
        self.scheduler.clear_waker();
    }

    /// Runs every delayed task that is due now.
    pub fn run_due_tasks(&self) -> usize {
        let ran = self.runtime.run_due_tasks();
        if ran > 0 {
            log::trace!("ran {ran} delayed navigation tasks");
        }
        ran
    }

    /// How long the host may sleep before the next task is due. `None` when
    /// nothing is pending.
    pub fn time_until_next_task(&self) -> Option<Duration> {
        let due = self.runtime.next_due_millis()?;
        let now = self.clock.now_millis();
        Some(Duration::from_millis(due.saturating_sub(now)))
    }

    /// Deadline of the next task as an [`Instant`], for event loops that
    /// wait until a point in time.
    pub fn next_task_deadline(&self) -> Option<Instant> {
        self.runtime
            .next_due_millis()
            .map(|due| self.clock.instant_at(due))
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("clock", &self.clock)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}
