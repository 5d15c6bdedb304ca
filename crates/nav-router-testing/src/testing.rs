use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nav_router_core::{
    Clock, Location, NavigationConfig, NavigationHandler, Runtime, RuntimeHandle,
    RuntimeScheduler,
};

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_millis: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.now_millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set_millis(&self, millis: u64) {
        self.now_millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now_millis.load(Ordering::SeqCst)
    }
}

/// Scheduler that remembers what the runtime asked for.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    frame_requests: AtomicUsize,
    wakeups: Mutex<Vec<u64>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame requests since the last call.
    pub fn take_frame_requests(&self) -> usize {
        self.frame_requests.swap(0, Ordering::SeqCst)
    }

    /// Wakeup times requested so far, in request order.
    pub fn wakeups(&self) -> Vec<u64> {
        self.wakeups
            .lock()
            .map(|wakeups| wakeups.clone())
            .unwrap_or_default()
    }
}

impl RuntimeScheduler for RecordingScheduler {
    fn schedule_frame(&self) {
        self.frame_requests.fetch_add(1, Ordering::SeqCst);
    }

    fn schedule_wakeup(&self, at_millis: u64) {
        if let Ok(mut wakeups) = self.wakeups.lock() {
            wakeups.push(at_millis);
        }
    }
}

/// A navigation handler wired to a runtime with virtual time.
pub struct TestNavigation {
    runtime: Runtime,
    clock: Arc<ManualClock>,
    scheduler: Arc<RecordingScheduler>,
    handler: NavigationHandler,
}

impl TestNavigation {
    pub fn new() -> Self {
        Self::with_config(NavigationConfig::default())
    }

    pub fn with_config(config: NavigationConfig) -> Self {
        let clock = Arc::new(ManualClock::new());
        let scheduler = Arc::new(RecordingScheduler::new());
        let runtime = Runtime::new(scheduler.clone(), clock.clone());
        let handler = NavigationHandler::with_config(runtime.handle(), config);
        Self {
            runtime,
            clock,
            scheduler,
            handler,
        }
    }

    pub fn handler(&self) -> &NavigationHandler {
        &self.handler
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn clock(&self) -> Arc<ManualClock> {
        Arc::clone(&self.clock)
    }

    pub fn scheduler(&self) -> Arc<RecordingScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Moves virtual time forward and runs the tasks that became due.
    pub fn advance_by(&self, by: Duration) -> usize {
        self.clock.advance(by);
        self.runtime.run_due_tasks()
    }

    /// Moves time just far enough for the pop guard to release.
    pub fn advance_past_cooldown(&self) -> usize {
        self.advance_by(self.handler.config().pop_cooldown)
    }

    pub fn take_frame_requests(&self) -> usize {
        self.scheduler.take_frame_requests()
    }
}

impl Default for TestNavigation {
    fn default() -> Self {
        Self::new()
    }
}

/// Short type names of the route, root excluded, for readable assertions.
pub fn route_type_names(handler: &NavigationHandler) -> Vec<&'static str> {
    handler
        .path_history()
        .iter()
        .map(short_type_name)
        .collect()
}

pub fn short_type_name(location: &Location) -> &'static str {
    let name = location.type_tag().name();
    name.rsplit("::").next().unwrap_or(name)
}
