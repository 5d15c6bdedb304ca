//! Caller-supplied metadata attached to route entries.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::collections::map::HashMap;

/// A single metadata value.
#[derive(Clone)]
pub enum UserValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Anything else. Compared by pointer identity.
    Opaque(Rc<dyn Any>),
}

impl UserValue {
    pub fn opaque<T: 'static>(value: T) -> Self {
        UserValue::Opaque(Rc::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            UserValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            UserValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            UserValue::Float(value) => Some(*value),
            UserValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            UserValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_opaque<T: 'static>(&self) -> Option<&T> {
        match self {
            UserValue::Opaque(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for UserValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (UserValue::Str(a), UserValue::Str(b)) => a == b,
            (UserValue::Int(a), UserValue::Int(b)) => a == b,
            (UserValue::Float(a), UserValue::Float(b)) => a == b,
            (UserValue::Bool(a), UserValue::Bool(b)) => a == b,
            (UserValue::Opaque(a), UserValue::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for UserValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserValue::Str(value) => f.debug_tuple("Str").field(value).finish(),
            UserValue::Int(value) => f.debug_tuple("Int").field(value).finish(),
            UserValue::Float(value) => f.debug_tuple("Float").field(value).finish(),
            UserValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            UserValue::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl From<&str> for UserValue {
    fn from(value: &str) -> Self {
        UserValue::Str(value.to_owned())
    }
}

impl From<String> for UserValue {
    fn from(value: String) -> Self {
        UserValue::Str(value)
    }
}

impl From<i64> for UserValue {
    fn from(value: i64) -> Self {
        UserValue::Int(value)
    }
}

impl From<i32> for UserValue {
    fn from(value: i32) -> Self {
        UserValue::Int(value.into())
    }
}

impl From<u32> for UserValue {
    fn from(value: u32) -> Self {
        UserValue::Int(value.into())
    }
}

impl From<f64> for UserValue {
    fn from(value: f64) -> Self {
        UserValue::Float(value)
    }
}

impl From<bool> for UserValue {
    fn from(value: bool) -> Self {
        UserValue::Bool(value)
    }
}

/// String-keyed metadata of one location.
#[derive(Clone, Default, PartialEq)]
pub struct UserData {
    entries: HashMap<String, UserValue>,
}

impl UserData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<UserValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&UserValue> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(UserValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<UserValue>,
    ) -> Option<UserValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<UserValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Merges `patch` entry by entry: deletes drop the key, upserts overwrite
    /// it. Keys the patch does not name are left alone.
    pub fn apply(&mut self, patch: &UserDataPatch) {
        for (key, entry) in patch.entries() {
            match entry {
                PatchEntry::Upsert(value) => {
                    self.entries.insert(key.to_owned(), value.clone());
                }
                PatchEntry::Delete => {
                    self.entries.remove(key);
                }
            }
        }
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for UserData
where
    K: Into<String>,
    V: Into<UserValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = UserData::new();
        for (key, value) in iter {
            data.insert(key, value);
        }
        data
    }
}

/// One change in a [`UserDataPatch`].
#[derive(Clone, Debug, PartialEq)]
pub enum PatchEntry {
    Upsert(UserValue),
    /// Removes the key from the target's user data.
    Delete,
}

/// Ordered partial update for a location's user data.
///
/// Naming the same key twice keeps the later entry.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct UserDataPatch {
    entries: IndexMap<String, PatchEntry>,
}

impl UserDataPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<UserValue>) -> Self {
        self.insert(key, PatchEntry::Upsert(value.into()));
        self
    }

    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.insert(key, PatchEntry::Delete);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: PatchEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &PatchEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<UserData> for UserDataPatch {
    fn from(data: UserData) -> Self {
        let mut patch = UserDataPatch::new();
        for (key, value) in data.entries {
            patch.insert(key, PatchEntry::Upsert(value));
        }
        patch
    }
}
