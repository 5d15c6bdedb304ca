//! The navigation handler: owner of one route and its pop guard.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, trace, warn};

use crate::config::NavigationConfig;
use crate::guard::PopGuard;
use crate::location::{Location, LocationId, Payload, TypeTag};
use crate::observe::{RouteChange, RouteObservers, RouteSubscription};
use crate::resolve::{pop_count_to, resolve, LocationTarget, Resolved};
use crate::route::Route;
use crate::runtime::RuntimeHandle;
use crate::user_data::{UserData, UserDataPatch};

/// Result of a pop-family operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopOutcome {
    /// Entries were removed and the pop guard is now engaged.
    Popped { removed: usize },
    /// Rejected because a previous pop is still cooling down.
    Guarded,
    /// The target did not resolve to any location.
    NoMatch,
    /// The target was already on top or the route was empty. The pop guard
    /// is still engaged.
    Unchanged,
}

impl PopOutcome {
    pub fn is_popped(&self) -> bool {
        matches!(self, PopOutcome::Popped { .. })
    }

    pub fn removed(&self) -> usize {
        match self {
            PopOutcome::Popped { removed } => *removed,
            _ => 0,
        }
    }
}

/// Result of [`NavigationHandler::update_user_data`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Resolved),
    NoMatch,
}

struct NavigationInner {
    route: RefCell<Route>,
    root: RefCell<Option<Location>>,
    guard: PopGuard,
    observers: RouteObservers,
    runtime: RuntimeHandle,
    config: NavigationConfig,
}

/// Handles all navigation for one navigation scope.
///
/// Cloning yields another handle to the same route; hand it explicitly to
/// whatever needs to navigate. Every route mutation goes through here and
/// is reported to subscribers before the call returns.
#[derive(Clone)]
pub struct NavigationHandler {
    inner: Rc<NavigationInner>,
}

impl NavigationHandler {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self::with_config(runtime, NavigationConfig::default())
    }

    pub fn with_config(runtime: RuntimeHandle, config: NavigationConfig) -> Self {
        if !runtime.is_alive() {
            warn!("navigation handler created without a live runtime; pops will not be guarded");
        }
        Self {
            inner: Rc::new(NavigationInner {
                route: RefCell::new(Route::new()),
                root: RefCell::new(None),
                guard: PopGuard::new(),
                observers: RouteObservers::default(),
                runtime,
                config,
            }),
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.inner.config
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.inner.runtime.clone()
    }

    /// Whether both handles drive the same route.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Installs the location shown beneath the route. It is never counted
    /// but takes part in type, identity and predicate lookups.
    pub fn set_root(&self, payload: Payload) -> LocationId {
        let root = Location::new(payload, UserData::new());
        let id = root.id();
        let previous = self.inner.root.borrow_mut().replace(root);
        drop(previous);
        id
    }

    pub fn root(&self) -> Option<Location> {
        self.inner.root.borrow().clone()
    }
}

// Information
impl NavigationHandler {
    /// Number of locations in the route, root excluded.
    pub fn count(&self) -> usize {
        self.inner.route.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.route.borrow().is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    pub fn path_history(&self) -> Vec<Location> {
        self.inner.route.borrow().as_slice().to_vec()
    }

    pub fn location(&self, index: usize) -> Option<Location> {
        self.inner.route.borrow().get(index).cloned()
    }

    /// The location currently displayed, falling back to the root.
    pub fn top(&self) -> Option<Location> {
        self.inner
            .route
            .borrow()
            .last()
            .cloned()
            .or_else(|| self.root())
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.inner.route.borrow().position_of(id).is_some()
    }

    pub fn with_route<R>(&self, f: impl FnOnce(&Route) -> R) -> R {
        f(&self.inner.route.borrow())
    }

    pub fn is_pop_locked(&self) -> bool {
        self.inner.guard.is_locked()
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&RouteChange, &[Location]) + 'static,
    ) -> RouteSubscription {
        self.inner.observers.subscribe(callback)
    }
}

// Pushing
impl NavigationHandler {
    pub fn push(&self, payload: Payload) -> LocationId {
        self.push_with(payload, UserData::new())
    }

    pub fn push_with(&self, payload: Payload, user_data: UserData) -> LocationId {
        let location = Location::new(payload, user_data);
        let id = location.id();
        debug!("push {:?} as {id}", location.type_tag());
        self.inner.route.borrow_mut().push(location);
        self.notify(RouteChange::Pushed { count: 1 });
        id
    }

    /// Pushes every payload in order, each as its own location.
    pub fn push_all(&self, payloads: impl IntoIterator<Item = Payload>) -> Vec<LocationId> {
        let ids: Vec<LocationId> = {
            let mut route = self.inner.route.borrow_mut();
            payloads
                .into_iter()
                .map(|payload| {
                    let location = Location::new(payload, UserData::new());
                    let id = location.id();
                    route.push(location);
                    id
                })
                .collect()
        };
        if !ids.is_empty() {
            debug!("pushed {} locations", ids.len());
            self.notify(RouteChange::Pushed { count: ids.len() });
        }
        ids
    }
}

// Popping
impl NavigationHandler {
    /// Removes the last `amount` locations. Asking for more than the route
    /// holds clears it.
    pub fn pop(&self, amount: usize) -> PopOutcome {
        if self.rejected_by_guard() {
            return PopOutcome::Guarded;
        }
        self.pop_entries(amount)
    }

    /// Pops `amount` locations when the route is deeper than that, otherwise
    /// returns to the root.
    pub fn safe_pop(&self, amount: usize) -> PopOutcome {
        if self.count() > amount {
            self.pop(amount)
        } else {
            self.pop_to_root()
        }
    }

    /// Makes the location at `index` the top of the route.
    pub fn pop_to_index(&self, index: usize) -> PopOutcome {
        self.pop_to_target(&LocationTarget::Index(index))
    }

    pub fn pop_to<T: 'static>(&self) -> PopOutcome {
        self.pop_to_type(TypeTag::of::<T>())
    }

    /// Returns to the most recent location whose payload has `tag`.
    pub fn pop_to_type(&self, tag: TypeTag) -> PopOutcome {
        self.pop_to_target(&LocationTarget::Type(tag))
    }

    pub fn pop_to_location(&self, id: LocationId) -> PopOutcome {
        self.pop_to_target(&LocationTarget::Location(id))
    }

    pub fn pop_to_where(&self, predicate: impl Fn(&Location) -> bool + 'static) -> PopOutcome {
        self.pop_to_target(&LocationTarget::matching(predicate))
    }

    pub fn pop_to_target(&self, target: &LocationTarget) -> PopOutcome {
        if self.rejected_by_guard() {
            return PopOutcome::Guarded;
        }
        let (count, resolved) = {
            let route = self.inner.route.borrow();
            let root = self.inner.root.borrow();
            (route.len(), resolve(&route, root.as_ref(), target))
        };
        match resolved {
            Some(Resolved::Index(index)) => self.pop_entries(pop_count_to(count, index)),
            Some(Resolved::Root) => self.pop_entries(count),
            None => {
                trace!("pop target {target:?} matched nothing");
                PopOutcome::NoMatch
            }
        }
    }

    pub fn pop_to_root(&self) -> PopOutcome {
        if self.rejected_by_guard() {
            return PopOutcome::Guarded;
        }
        self.pop_entries(self.count())
    }

    fn rejected_by_guard(&self) -> bool {
        let locked = self.inner.guard.is_locked();
        if locked {
            trace!("pop rejected while guard cools down");
        }
        locked
    }

    fn pop_entries(&self, amount: usize) -> PopOutcome {
        let removed = {
            let mut route = self.inner.route.borrow_mut();
            let new_len = route.len().saturating_sub(amount);
            route.truncate(new_len)
        };
        // Every pop that gets this far locks, even one that removes nothing.
        self.engage_guard();
        if removed.is_empty() {
            return PopOutcome::Unchanged;
        }
        let removed_count = removed.len();
        // Payloads are released only after the route borrow ends.
        drop(removed);
        debug!("popped {removed_count} locations, depth now {}", self.count());
        self.notify(RouteChange::Popped {
            removed: removed_count,
        });
        PopOutcome::Popped {
            removed: removed_count,
        }
    }

    fn engage_guard(&self) {
        let weak = Rc::downgrade(&self.inner);
        let engaged = self.inner.guard.lock(
            &self.inner.runtime.timer(),
            self.inner.config.pop_cooldown,
            move || {
                if let Some(inner) = weak.upgrade() {
                    inner.guard.unlock();
                    trace!("pop guard released");
                }
            },
        );
        if engaged {
            trace!("pop guard engaged for {:?}", self.inner.config.pop_cooldown);
        } else {
            warn!("navigation runtime is gone; pop guard not engaged");
        }
    }
}

// User data
impl NavigationHandler {
    /// Merges `patch` into the user data of the location `target` resolves to.
    pub fn update_user_data(&self, target: &LocationTarget, patch: &UserDataPatch) -> UpdateOutcome {
        let resolved = {
            let route = self.inner.route.borrow();
            let root = self.inner.root.borrow();
            resolve(&route, root.as_ref(), target)
        };
        let Some(resolved) = resolved else {
            trace!("user data target {target:?} matched nothing");
            return UpdateOutcome::NoMatch;
        };
        match resolved {
            Resolved::Index(index) => {
                if let Some(location) = self.inner.route.borrow_mut().get_mut(index) {
                    location.apply_patch(patch);
                }
            }
            Resolved::Root => {
                if let Some(root) = self.inner.root.borrow_mut().as_mut() {
                    root.apply_patch(patch);
                }
            }
        }
        self.notify(RouteChange::UserDataUpdated { target: resolved });
        UpdateOutcome::Updated(resolved)
    }

    pub fn update_user_data_at(&self, index: usize, patch: &UserDataPatch) -> UpdateOutcome {
        self.update_user_data(&LocationTarget::Index(index), patch)
    }

    pub fn update_user_data_of(&self, id: LocationId, patch: &UserDataPatch) -> UpdateOutcome {
        self.update_user_data(&LocationTarget::Location(id), patch)
    }
}

impl NavigationHandler {
    fn notify(&self, change: RouteChange) {
        self.inner.runtime.schedule_frame();
        if !self.inner.observers.has_watchers() {
            return;
        }
        let snapshot = self.path_history();
        self.inner.observers.notify(&change, &snapshot);
    }
}

impl fmt::Debug for NavigationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationHandler")
            .field("route", &self.inner.route.borrow())
            .field("pop_locked", &self.inner.guard.is_locked())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/handler_tests.rs"]
mod tests;
