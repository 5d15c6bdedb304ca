use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::location::Location;
use crate::resolve::Resolved;

/// What a route mutation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteChange {
    Pushed { count: usize },
    Popped { removed: usize },
    UserDataUpdated { target: Resolved },
}

type RouteCallback = dyn Fn(&RouteChange, &[Location]);

/// Keeps a route observer registered. Dropping it unsubscribes.
pub struct RouteSubscription {
    _callback: Rc<RouteCallback>,
}

impl fmt::Debug for RouteSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RouteSubscription")
    }
}

#[derive(Default)]
pub(crate) struct RouteObservers {
    watchers: RefCell<Vec<Weak<RouteCallback>>>,
}

impl RouteObservers {
    pub(crate) fn subscribe(
        &self,
        callback: impl Fn(&RouteChange, &[Location]) + 'static,
    ) -> RouteSubscription {
        let callback: Rc<RouteCallback> = Rc::new(callback);
        let mut watchers = self.watchers.borrow_mut();
        watchers.retain(|w| w.strong_count() > 0);
        watchers.push(Rc::downgrade(&callback));
        RouteSubscription {
            _callback: callback,
        }
    }

    pub(crate) fn has_watchers(&self) -> bool {
        self.watchers.borrow().iter().any(|w| w.strong_count() > 0)
    }

    pub(crate) fn notify(&self, change: &RouteChange, route: &[Location]) {
        let watchers: Vec<Rc<RouteCallback>> = {
            let mut watchers = self.watchers.borrow_mut();
            watchers.retain(|w| w.strong_count() > 0);
            watchers.iter().filter_map(|w| w.upgrade()).collect()
        };

        for watcher in watchers {
            watcher(change, route);
        }
    }
}
