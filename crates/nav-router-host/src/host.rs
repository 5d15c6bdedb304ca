//! Keeps rendered screens in step with a navigation route.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, error};
use nav_router_core::{
    Location, LocationId, NavigationHandler, Payload, PopOutcome, Resolved, RouteChange,
    RouteSubscription,
};

use crate::destination::{DestinationOptions, DestinationRegistry};
use crate::gesture::{BackSwipeConfig, BackSwipeRecognizer};
use crate::input::PointerEvent;
use crate::scope::NavigationScope;

struct Screen<R> {
    id: LocationId,
    rendered: Option<R>,
}

struct HostState<R> {
    registry: DestinationRegistry<R>,
    root: RefCell<Option<Screen<R>>>,
    screens: RefCell<Vec<Screen<R>>>,
}

impl<R> HostState<R> {
    fn render(&self, location: &Location) -> Screen<R> {
        let rendered = match self.registry.render(location) {
            Ok(rendered) => Some(rendered),
            Err(err) => {
                error!("cannot render {}: {err}", location.id());
                None
            }
        };
        Screen {
            id: location.id(),
            rendered,
        }
    }

    /// Re-renders the suffix of the route that no longer matches.
    fn reconcile(&self, route: &[Location]) {
        let keep = {
            let screens = self.screens.borrow();
            screens
                .iter()
                .zip(route)
                .take_while(|(screen, location)| screen.id == location.id())
                .count()
        };
        let fresh: Vec<Screen<R>> = route[keep..].iter().map(|l| self.render(l)).collect();
        let stale = {
            let mut screens = self.screens.borrow_mut();
            let stale = screens.split_off(keep);
            screens.extend(fresh);
            stale
        };
        if !stale.is_empty() {
            debug!("discarded {} rendered screens", stale.len());
        }
    }

    fn rerender_at(&self, index: usize, route: &[Location]) {
        let Some(location) = route.get(index) else {
            return;
        };
        let screen = self.render(location);
        let previous = {
            let mut screens = self.screens.borrow_mut();
            match screens.get_mut(index) {
                Some(slot) => Some(std::mem::replace(slot, screen)),
                None => None,
            }
        };
        drop(previous);
    }

    fn rerender_root(&self, root: Option<Location>) {
        let screen = root.map(|root| self.render(&root));
        let previous = self.root.replace(screen);
        drop(previous);
    }
}

/// Owns a handler and renders its route through a destination registry.
///
/// The host subscribes to the route on creation, so any mutation made
/// through the handler (or a clone of it) updates `screens()` before the
/// mutating call returns.
pub struct NavigationHost<R: 'static> {
    handler: NavigationHandler,
    state: Rc<HostState<R>>,
    swipe: RefCell<BackSwipeRecognizer>,
    _subscription: RouteSubscription,
}

impl<R: 'static> NavigationHost<R> {
    pub fn new(handler: NavigationHandler, registry: DestinationRegistry<R>) -> Self {
        let state = Rc::new(HostState {
            registry,
            root: RefCell::new(None),
            screens: RefCell::new(Vec::new()),
        });
        let weak = Rc::downgrade(&state);
        let source = handler.clone();
        // Snapshots go stale once an earlier observer navigates; read the live route.
        let subscription = handler.subscribe(move |change, _snapshot| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let route = source.path_history();
            state.reconcile(&route);
            match change {
                RouteChange::Pushed { .. } | RouteChange::Popped { .. } => {}
                RouteChange::UserDataUpdated {
                    target: Resolved::Index(index),
                } => state.rerender_at(*index, &route),
                RouteChange::UserDataUpdated {
                    target: Resolved::Root,
                } => state.rerender_root(source.root()),
            }
        });
        let host = Self {
            handler,
            state,
            swipe: RefCell::new(BackSwipeRecognizer::default()),
            _subscription: subscription,
        };
        host.refresh();
        host
    }

    pub fn with_swipe_config(self, config: BackSwipeConfig) -> Self {
        self.swipe.replace(BackSwipeRecognizer::new(config));
        self
    }

    pub fn handler(&self) -> &NavigationHandler {
        &self.handler
    }

    pub fn registry(&self) -> &DestinationRegistry<R> {
        &self.state.registry
    }

    pub fn scope(&self) -> NavigationScope {
        NavigationScope::new(self.handler.clone())
    }

    /// Installs the root location and renders it.
    pub fn set_root(&self, payload: Payload) -> LocationId {
        let id = self.handler.set_root(payload);
        self.state.rerender_root(self.handler.root());
        id
    }

    /// Renders the root and every route location from scratch.
    pub fn refresh(&self) {
        self.state.rerender_root(self.handler.root());
        let stale = self.state.screens.take();
        drop(stale);
        let route = self.handler.path_history();
        self.state.reconcile(&route);
    }

    /// Number of screen slots, one per route location.
    pub fn screen_count(&self) -> usize {
        self.state.screens.borrow().len()
    }

    /// Rendered screens in route order. A slot is `None` when its location
    /// could not be rendered.
    pub fn screens(&self) -> Vec<Option<R>>
    where
        R: Clone,
    {
        self.state
            .screens
            .borrow()
            .iter()
            .map(|screen| screen.rendered.clone())
            .collect()
    }

    pub fn root_screen(&self) -> Option<R>
    where
        R: Clone,
    {
        self.state
            .root
            .borrow()
            .as_ref()
            .and_then(|screen| screen.rendered.clone())
    }

    /// The screen currently on display: the top of the route, or the root
    /// when the route is empty.
    pub fn visible_screen(&self) -> Option<R>
    where
        R: Clone,
    {
        let screens = self.state.screens.borrow();
        match screens.last() {
            Some(top) => top.rendered.clone(),
            None => {
                drop(screens);
                self.root_screen()
            }
        }
    }

    fn top_options(&self) -> DestinationOptions {
        self.handler
            .top()
            .map(|top| self.state.registry.options_for(top.type_tag()))
            .unwrap_or_default()
    }

    /// Title of the visible location unless its destination hides titles.
    pub fn top_title(&self) -> Option<String> {
        if self.top_options().title_disabled {
            return None;
        }
        self.scope().top_title()
    }

    pub fn shows_back_button(&self) -> bool {
        self.handler.is_not_empty() && !self.top_options().back_button_disabled
    }

    pub fn back_swipe_enabled(&self) -> bool {
        self.handler.is_not_empty() && !self.top_options().back_swipe_disabled
    }

    /// Routes a pointer event to the back swipe. Returns the pop outcome
    /// when the event completed a swipe.
    pub fn handle_pointer(&self, event: &PointerEvent) -> Option<PopOutcome> {
        let mut swipe = self.swipe.borrow_mut();
        if !swipe.is_tracking() && !self.back_swipe_enabled() {
            swipe.reset();
            return None;
        }
        swipe.dispatch(event, &self.handler)
    }
}

impl<R: 'static> fmt::Debug for NavigationHost<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationHost")
            .field("handler", &self.handler)
            .field("registry", &self.state.registry)
            .field("screens", &self.screen_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod tests;
