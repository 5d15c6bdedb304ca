//! Route entries and the opaque payloads they wrap.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::user_data::{UserData, UserDataPatch};

static NEXT_LOCATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Location`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(u64);

impl LocationId {
    fn next() -> Self {
        LocationId(NEXT_LOCATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "location#{}", self.0)
    }
}

/// Identifies the concrete kind of a payload.
///
/// Equality is by [`TypeId`]; the name is carried for diagnostics only.
#[derive(Copy, Clone)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeTag").field(&self.name).finish()
    }
}

/// A displayable unit the router carries but never inspects.
#[derive(Clone)]
pub struct Payload {
    tag: TypeTag,
    handle: Rc<dyn Any>,
}

impl Payload {
    pub fn new<T: 'static>(value: T) -> Self {
        Self::from_rc(Rc::new(value))
    }

    pub fn from_rc<T: 'static>(value: Rc<T>) -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            handle: value,
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.tag.is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }

    pub fn downcast_rc<T: 'static>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.handle).downcast::<T>().ok()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Payload").field(&self.tag.name).finish()
    }
}

/// One entry of a navigation route.
///
/// Two locations are equal when their ids match, whatever their payload or
/// user data hold. Clones share the id and therefore compare equal.
#[derive(Clone)]
pub struct Location {
    id: LocationId,
    payload: Payload,
    user_data: UserData,
}

impl Location {
    pub fn new(payload: Payload, user_data: UserData) -> Self {
        Self {
            id: LocationId::next(),
            payload,
            user_data,
        }
    }

    pub fn id(&self) -> LocationId {
        self.id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn type_tag(&self) -> TypeTag {
        self.payload.type_tag()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.payload.is::<T>()
    }

    /// The wrapped value, if it is a `T`.
    pub fn view<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    pub fn user_data(&self) -> &UserData {
        &self.user_data
    }

    pub fn user_data_mut(&mut self) -> &mut UserData {
        &mut self.user_data
    }

    pub fn apply_patch(&mut self, patch: &UserDataPatch) {
        self.user_data.apply(patch);
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("id", &self.id)
            .field("payload", &self.payload)
            .field("user_data", &self.user_data)
            .finish()
    }
}
