use std::cell::{Cell, RefCell};
use std::time::Duration;

use crate::delayed_task::{DelayedTaskRegistration, Timer};

/// Timed lock that serializes pop operations.
///
/// Holds the pending reset so dropping the guard cancels it.
pub(crate) struct PopGuard {
    locked: Cell<bool>,
    reset: RefCell<Option<DelayedTaskRegistration>>,
}

impl PopGuard {
    pub(crate) fn new() -> Self {
        Self {
            locked: Cell::new(false),
            reset: RefCell::new(None),
        }
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Locks and schedules `on_expire` after `cooldown`. Returns `false` when
    /// the timer has no live runtime, in which case the guard stays open.
    pub(crate) fn lock(
        &self,
        timer: &Timer,
        cooldown: Duration,
        on_expire: impl FnOnce() + 'static,
    ) -> bool {
        let registration = timer.after(cooldown, on_expire);
        if !registration.is_active() {
            return false;
        }
        self.locked.set(true);
        let previous = self.reset.borrow_mut().replace(registration);
        drop(previous);
        true
    }

    pub(crate) fn unlock(&self) {
        self.locked.set(false);
        let finished = self.reset.borrow_mut().take();
        drop(finished);
    }
}
