#![doc = r"Navigation route state machine: locations, push/pop, and the pop guard."]

pub mod collections;
pub mod delayed_task;
pub mod platform;
pub mod runtime;

mod config;
mod guard;
mod handler;
mod location;
mod observe;
mod pop_action;
mod resolve;
mod route;
mod user_data;

pub use config::NavigationConfig;
pub use delayed_task::{DelayedTaskRegistration, Timer};
pub use handler::{NavigationHandler, PopOutcome, UpdateOutcome};
pub use location::{Location, LocationId, Payload, TypeTag};
pub use observe::{RouteChange, RouteSubscription};
pub use platform::{Clock, RuntimeScheduler};
pub use pop_action::PopAction;
pub use resolve::{pop_count_to, resolve, LocationPredicate, LocationTarget, Resolved};
pub use route::Route;
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle, TaskId};
pub use user_data::{PatchEntry, UserData, UserDataPatch, UserValue};

#[cfg(test)]
pub use runtime::{TestClock, TestRuntime};
