//! Platform abstraction traits for navigation runtime services.
//!
//! The navigation runtime never reads the system clock or parks a thread
//! itself. Hosts provide a [`Clock`] and a [`RuntimeScheduler`] so the pop
//! guard can be driven by whatever event loop owns the UI.

/// Schedules work for the navigation runtime.
///
/// Implementations forward requests to the host event loop. They must be
/// safe to share across threads even though the runtime itself is
/// single-threaded.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host render a new frame because the route changed.
    fn schedule_frame(&self);

    /// Request that the host call back into the runtime no earlier than
    /// `at_millis` on the runtime clock so due delayed tasks can run.
    fn schedule_wakeup(&self, at_millis: u64);
}

/// Monotonic time source for the runtime, in milliseconds.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since an arbitrary, fixed origin.
    fn now_millis(&self) -> u64;
}
