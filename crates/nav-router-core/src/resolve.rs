//! Maps a target description to a position in the route.
//!
//! Every strategy except [`LocationTarget::Index`] picks the most recent
//! match. The root location, when present, is the lowest-priority candidate:
//! it is chosen only when no route entry matches.

use std::fmt;
use std::rc::Rc;

use crate::location::{Location, LocationId, TypeTag};
use crate::route::Route;

pub type LocationPredicate = Rc<dyn Fn(&Location) -> bool>;

/// Describes which location an operation addresses.
#[derive(Clone)]
pub enum LocationTarget {
    /// Route position. Never addresses the root.
    Index(usize),
    Type(TypeTag),
    Location(LocationId),
    Where(LocationPredicate),
}

impl LocationTarget {
    pub fn of_type<T: 'static>() -> Self {
        LocationTarget::Type(TypeTag::of::<T>())
    }

    pub fn matching(predicate: impl Fn(&Location) -> bool + 'static) -> Self {
        LocationTarget::Where(Rc::new(predicate))
    }
}

impl From<LocationId> for LocationTarget {
    fn from(id: LocationId) -> Self {
        LocationTarget::Location(id)
    }
}

impl From<TypeTag> for LocationTarget {
    fn from(tag: TypeTag) -> Self {
        LocationTarget::Type(tag)
    }
}

impl fmt::Debug for LocationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationTarget::Index(index) => f.debug_tuple("Index").field(index).finish(),
            LocationTarget::Type(tag) => f.debug_tuple("Type").field(tag).finish(),
            LocationTarget::Location(id) => f.debug_tuple("Location").field(id).finish(),
            LocationTarget::Where(_) => f.write_str("Where(..)"),
        }
    }
}

/// Where a target landed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    Index(usize),
    Root,
}

impl Resolved {
    /// Route length that leaves this position on top.
    pub fn retained_len(self) -> usize {
        match self {
            Resolved::Index(index) => index + 1,
            Resolved::Root => 0,
        }
    }
}

pub fn resolve(route: &Route, root: Option<&Location>, target: &LocationTarget) -> Option<Resolved> {
    match target {
        LocationTarget::Index(index) => (*index < route.len()).then_some(Resolved::Index(*index)),
        LocationTarget::Type(tag) => resolve_last(route, root, |location| location.type_tag() == *tag),
        LocationTarget::Location(id) => resolve_last(route, root, |location| location.id() == *id),
        LocationTarget::Where(predicate) => resolve_last(route, root, |location| predicate(location)),
    }
}

fn resolve_last(
    route: &Route,
    root: Option<&Location>,
    matches: impl Fn(&Location) -> bool,
) -> Option<Resolved> {
    if let Some(index) = route.last_position(&matches) {
        return Some(Resolved::Index(index));
    }
    root.filter(|root| matches(root)).map(|_| Resolved::Root)
}

/// Entries to remove from a route of `count` so `index` ends up on top.
pub fn pop_count_to(count: usize, index: usize) -> usize {
    count.saturating_sub(index.saturating_add(1))
}

#[cfg(test)]
#[path = "tests/resolve_tests.rs"]
mod tests;
