use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use nav_router_core::{Location, TypeTag};

/// Per-destination presentation switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DestinationOptions {
    pub back_button_disabled: bool,
    pub back_swipe_disabled: bool,
    pub title_disabled: bool,
}

impl DestinationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_back_button(mut self) -> Self {
        self.back_button_disabled = true;
        self
    }

    pub fn without_back_swipe(mut self) -> Self {
        self.back_swipe_disabled = true;
        self
    }

    pub fn without_title(mut self) -> Self {
        self.title_disabled = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationError {
    Unregistered { type_name: &'static str },
}

impl fmt::Display for DestinationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationError::Unregistered { type_name } => {
                write!(f, "no destination registered for {type_name}")
            }
        }
    }
}

impl std::error::Error for DestinationError {}

type RenderFn<R> = Rc<dyn Fn(&Location) -> R>;

struct Destination<R> {
    options: DestinationOptions,
    render: RenderFn<R>,
}

/// Maps payload types to the function that renders them.
pub struct DestinationRegistry<R> {
    destinations: IndexMap<TypeTag, Destination<R>>,
}

impl<R> DestinationRegistry<R> {
    pub fn new() -> Self {
        Self {
            destinations: IndexMap::new(),
        }
    }

    /// Registers `render` for payloads of type `T`, replacing any previous
    /// registration for that type.
    pub fn register<T: 'static>(&mut self, render: impl Fn(&Location) -> R + 'static) -> &mut Self {
        self.register_with::<T>(DestinationOptions::default(), render)
    }

    pub fn register_with<T: 'static>(
        &mut self,
        options: DestinationOptions,
        render: impl Fn(&Location) -> R + 'static,
    ) -> &mut Self {
        let tag = TypeTag::of::<T>();
        let previous = self.destinations.insert(
            tag,
            Destination {
                options,
                render: Rc::new(render),
            },
        );
        if previous.is_some() {
            log::debug!("replaced destination for {}", tag.name());
        }
        self
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.destinations.contains_key(&tag)
    }

    /// Options for `tag`; unregistered types get the defaults.
    pub fn options_for(&self, tag: TypeTag) -> DestinationOptions {
        self.destinations
            .get(&tag)
            .map(|destination| destination.options)
            .unwrap_or_default()
    }

    pub fn render(&self, location: &Location) -> Result<R, DestinationError> {
        let tag = location.type_tag();
        let destination =
            self.destinations
                .get(&tag)
                .ok_or(DestinationError::Unregistered {
                    type_name: tag.name(),
                })?;
        Ok((destination.render)(location))
    }

    /// Registered types in registration order.
    pub fn registered(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.destinations.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

impl<R> Default for DestinationRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for DestinationRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.destinations
                    .iter()
                    .map(|(tag, destination)| (tag.name(), destination.options)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use nav_router_core::{Location, Payload, TypeTag, UserData};

    use super::*;

    struct Inbox;
    struct Thread;
    struct Unknown;

    fn location<T: 'static>(value: T) -> Location {
        Location::new(Payload::new(value), UserData::new())
    }

    #[test]
    fn render_dispatches_on_payload_type() {
        let mut registry = DestinationRegistry::new();
        registry
            .register::<Inbox>(|_| "inbox".to_owned())
            .register::<Thread>(|_| "thread".to_owned());
        assert_eq!(registry.render(&location(Thread)).as_deref(), Ok("thread"));
        assert_eq!(registry.render(&location(Inbox)).as_deref(), Ok("inbox"));
    }

    #[test]
    fn unregistered_type_is_an_error() {
        let registry: DestinationRegistry<()> = DestinationRegistry::new();
        let err = registry.render(&location(Unknown)).unwrap_err();
        assert!(matches!(err, DestinationError::Unregistered { type_name } if type_name.ends_with("Unknown")));
        assert!(err.to_string().starts_with("no destination registered for"));
    }

    #[test]
    fn options_default_for_unknown_types() {
        let mut registry = DestinationRegistry::new();
        registry.register_with::<Thread>(DestinationOptions::new().without_back_swipe(), |_| ());
        assert!(registry.options_for(TypeTag::of::<Thread>()).back_swipe_disabled);
        assert_eq!(
            registry.options_for(TypeTag::of::<Inbox>()),
            DestinationOptions::default()
        );
    }

    #[test]
    fn registration_order_is_preserved_across_replacement() {
        let mut registry = DestinationRegistry::new();
        registry
            .register::<Inbox>(|_| 1)
            .register::<Thread>(|_| 2)
            .register::<Inbox>(|_| 3);
        let order: Vec<_> = registry.registered().collect();
        assert_eq!(order, vec![TypeTag::of::<Inbox>(), TypeTag::of::<Thread>()]);
        assert_eq!(registry.render(&location(Inbox)), Ok(3));
        assert!(registry.contains(TypeTag::of::<Thread>()));
        assert!(!registry.contains(TypeTag::of::<Unknown>()));
    }
}
