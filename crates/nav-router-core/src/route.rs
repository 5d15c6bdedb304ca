use crate::location::{Location, LocationId};

/// Ordered navigation history, root-to-leaf.
///
/// Entries are only ever appended or removed from the end.
#[derive(Clone, Default, Debug)]
pub struct Route {
    entries: Vec<Location>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, location: Location) {
        self.entries.push(location);
    }

    /// Removes every entry at index `new_len` or above and hands them back
    /// so the caller controls when they are dropped.
    pub fn truncate(&mut self, new_len: usize) -> Vec<Location> {
        if new_len >= self.entries.len() {
            return Vec::new();
        }
        self.entries.split_off(new_len)
    }

    pub fn clear(&mut self) -> Vec<Location> {
        self.truncate(0)
    }

    pub fn get(&self, index: usize) -> Option<&Location> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Location> {
        self.entries.get_mut(index)
    }

    pub fn last(&self) -> Option<&Location> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Location> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Location] {
        &self.entries
    }

    /// Index of the most recent entry satisfying `predicate`.
    pub fn last_position(&self, predicate: impl Fn(&Location) -> bool) -> Option<usize> {
        self.entries.iter().rposition(predicate)
    }

    pub fn position_of(&self, id: LocationId) -> Option<usize> {
        self.last_position(|location| location.id() == id)
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a Location;
    type IntoIter = std::slice::Iter<'a, Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
