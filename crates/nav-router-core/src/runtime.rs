use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use crate::delayed_task::Timer;
use crate::platform::{Clock, RuntimeScheduler};

pub type TaskId = u64;

struct DelayedTaskEntry {
    id: TaskId,
    due_millis: u64,
    callback: Option<Box<dyn FnOnce() + 'static>>,
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    clock: Arc<dyn Clock>,
    delayed_tasks: RefCell<Vec<DelayedTaskEntry>>, // sorted by due time, then registration order
    next_task_id: Cell<TaskId>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scheduler,
            clock,
            delayed_tasks: RefCell::new(Vec::new()),
            next_task_id: Cell::new(1),
        }
    }

    fn schedule_frame(&self) {
        self.scheduler.schedule_frame();
    }

    fn register_delayed_task(
        &self,
        delay: Duration,
        callback: Box<dyn FnOnce() + 'static>,
    ) -> TaskId {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        let delay_millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let due_millis = self.clock.now_millis().saturating_add(delay_millis);
        {
            let mut tasks = self.delayed_tasks.borrow_mut();
            let index = tasks.partition_point(|entry| entry.due_millis <= due_millis);
            tasks.insert(
                index,
                DelayedTaskEntry {
                    id,
                    due_millis,
                    callback: Some(callback),
                },
            );
        }
        self.scheduler.schedule_wakeup(due_millis);
        id
    }

    fn cancel_delayed_task(&self, id: TaskId) {
        let mut tasks = self.delayed_tasks.borrow_mut();
        if let Some(index) = tasks.iter().position(|entry| entry.id == id) {
            tasks.remove(index);
        }
    }

    fn run_due_tasks(&self) -> usize {
        let now = self.clock.now_millis();
        // Collect first so tasks may register or cancel other tasks while running.
        let due: Vec<Box<dyn FnOnce() + 'static>> = {
            let mut tasks = self.delayed_tasks.borrow_mut();
            let split = tasks.partition_point(|entry| entry.due_millis <= now);
            tasks
                .drain(..split)
                .filter_map(|mut entry| entry.callback.take())
                .collect()
        };
        let ran = due.len();
        for task in due {
            task();
        }
        ran
    }

    fn next_due_millis(&self) -> Option<u64> {
        self.delayed_tasks
            .borrow()
            .first()
            .map(|entry| entry.due_millis)
    }

    fn has_pending_tasks(&self) -> bool {
        !self.delayed_tasks.borrow().is_empty()
    }
}

/// Owning side of the navigation runtime.
///
/// Handlers only ever hold a [`RuntimeHandle`], so dropping the `Runtime`
/// detaches every handler created from it.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler, clock)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn timer(&self) -> Timer {
        Timer::new(self.handle())
    }

    /// Runs every delayed task whose due time has passed. Returns how many ran.
    pub fn run_due_tasks(&self) -> usize {
        self.inner.run_due_tasks()
    }

    pub fn next_due_millis(&self) -> Option<u64> {
        self.inner.next_due_millis()
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.inner.has_pending_tasks()
    }

    pub fn now_millis(&self) -> u64 {
        self.inner.clock.now_millis()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("pending_tasks", &self.inner.delayed_tasks.borrow().len())
            .finish()
    }
}

/// Scheduler that ignores every request. Useful when the host polls
/// [`Runtime::run_due_tasks`] on its own cadence.
#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}

    fn schedule_wakeup(&self, _at_millis: u64) {}
}

#[cfg(test)]
#[derive(Default)]
pub struct TestClock(std::sync::atomic::AtomicU64);

#[cfg(test)]
impl TestClock {
    pub fn advance(&self, millis: u64) {
        self.0
            .fetch_add(millis, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for TestClock {
    fn now_millis(&self) -> u64 {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
pub struct TestRuntime {
    runtime: Runtime,
    clock: Arc<TestClock>,
}

#[cfg(test)]
impl TestRuntime {
    pub fn new() -> Self {
        let clock = Arc::new(TestClock::default());
        Self {
            runtime: Runtime::new(Arc::new(DefaultScheduler), clock.clone()),
            clock,
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Moves the clock forward and runs whatever became due.
    pub fn advance(&self, millis: u64) -> usize {
        self.clock.advance(millis);
        self.runtime.run_due_tasks()
    }
}

#[derive(Clone)]
pub struct RuntimeHandle(Weak<RuntimeInner>);

impl RuntimeHandle {
    /// A handle that was never attached to a runtime.
    pub fn detached() -> Self {
        RuntimeHandle(Weak::new())
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn schedule_frame(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.schedule_frame();
        }
    }

    pub fn register_delayed_task(
        &self,
        delay: Duration,
        callback: impl FnOnce() + 'static,
    ) -> Option<TaskId> {
        self.0
            .upgrade()
            .map(|inner| inner.register_delayed_task(delay, Box::new(callback)))
    }

    pub fn cancel_delayed_task(&self, id: TaskId) {
        if let Some(inner) = self.0.upgrade() {
            inner.cancel_delayed_task(id);
        }
    }

    pub fn run_due_tasks(&self) -> usize {
        self.0
            .upgrade()
            .map(|inner| inner.run_due_tasks())
            .unwrap_or(0)
    }

    pub fn next_due_millis(&self) -> Option<u64> {
        self.0.upgrade().and_then(|inner| inner.next_due_millis())
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.has_pending_tasks())
            .unwrap_or(false)
    }

    pub fn now_millis(&self) -> Option<u64> {
        self.0.upgrade().map(|inner| inner.clock.now_millis())
    }

    pub fn timer(&self) -> Timer {
        Timer::new(self.clone())
    }
}

impl std::fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RuntimeHandle")
            .field(&self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn delayed_tasks_run_only_once_due() {
        let runtime = TestRuntime::new();
        let fired = Rc::new(Cell::new(0));
        let fired_task = fired.clone();
        runtime
            .handle()
            .register_delayed_task(Duration::from_millis(100), move || {
                fired_task.set(fired_task.get() + 1);
            });

        assert_eq!(runtime.advance(99), 0);
        assert_eq!(fired.get(), 0);
        assert_eq!(runtime.advance(1), 1);
        assert_eq!(fired.get(), 1);
        assert!(!runtime.runtime().has_pending_tasks());
    }

    #[test]
    fn delayed_tasks_run_in_due_order() {
        let runtime = TestRuntime::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (label, delay) in [("late", 30), ("early", 10), ("middle", 20)] {
            let order = order.clone();
            runtime
                .handle()
                .register_delayed_task(Duration::from_millis(delay), move || {
                    order.borrow_mut().push(label);
                });
        }
        assert_eq!(runtime.runtime().next_due_millis(), Some(10));
        runtime.advance(50);
        assert_eq!(*order.borrow(), vec!["early", "middle", "late"]);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let runtime = TestRuntime::new();
        let fired = Rc::new(Cell::new(false));
        let fired_task = fired.clone();
        let id = runtime
            .handle()
            .register_delayed_task(Duration::ZERO, move || fired_task.set(true))
            .expect("runtime alive");
        runtime.handle().cancel_delayed_task(id);
        assert_eq!(runtime.advance(1), 0);
        assert!(!fired.get());
    }

    #[test]
    fn task_registered_from_task_waits_for_next_drain() {
        let runtime = TestRuntime::new();
        let handle = runtime.handle();
        let fired = Rc::new(Cell::new(0));
        let fired_outer = fired.clone();
        handle.register_delayed_task(Duration::ZERO, {
            let handle = handle.clone();
            move || {
                let fired_inner = fired_outer.clone();
                handle.register_delayed_task(Duration::ZERO, move || {
                    fired_inner.set(fired_inner.get() + 1);
                });
            }
        });
        assert_eq!(runtime.advance(0), 1);
        assert_eq!(fired.get(), 0);
        assert_eq!(runtime.advance(0), 1);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn detached_handle_ignores_requests() {
        let handle = RuntimeHandle::detached();
        assert!(!handle.is_alive());
        assert!(handle
            .register_delayed_task(Duration::ZERO, || {})
            .is_none());
        assert_eq!(handle.run_due_tasks(), 0);
        assert_eq!(handle.now_millis(), None);
    }

    #[test]
    fn dropping_runtime_detaches_handles() {
        let runtime = TestRuntime::new();
        let handle = runtime.handle();
        assert!(handle.is_alive());
        drop(runtime);
        assert!(!handle.is_alive());
    }
}
