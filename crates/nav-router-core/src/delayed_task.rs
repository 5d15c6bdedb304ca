use std::time::Duration;

use crate::runtime::{RuntimeHandle, TaskId};

/// Schedules one-shot callbacks on the runtime after a delay.
#[derive(Clone, Debug)]
pub struct Timer {
    runtime: RuntimeHandle,
}

impl Timer {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    /// Runs `callback` on the runtime once `delay` has elapsed.
    ///
    /// The returned registration cancels the callback when dropped. If the
    /// runtime is already gone the registration is inactive and the callback
    /// is dropped without running.
    pub fn after(
        &self,
        delay: Duration,
        callback: impl FnOnce() + 'static,
    ) -> DelayedTaskRegistration {
        let runtime = self.runtime.clone();
        match runtime.register_delayed_task(delay, callback) {
            Some(id) => DelayedTaskRegistration::new(runtime, id),
            None => DelayedTaskRegistration::inactive(runtime),
        }
    }
}

pub struct DelayedTaskRegistration {
    runtime: RuntimeHandle,
    id: Option<TaskId>,
}

impl DelayedTaskRegistration {
    fn new(runtime: RuntimeHandle, id: TaskId) -> Self {
        Self {
            runtime,
            id: Some(id),
        }
    }

    fn inactive(runtime: RuntimeHandle) -> Self {
        Self { runtime, id: None }
    }

    /// Whether the callback was accepted by a live runtime.
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_delayed_task(id);
        }
    }
}

impl Drop for DelayedTaskRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_delayed_task(id);
        }
    }
}

impl std::fmt::Debug for DelayedTaskRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedTaskRegistration")
            .field("id", &self.id)
            .finish()
    }
}
