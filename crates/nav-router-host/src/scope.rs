use nav_router_core::{
    Location, LocationId, NavigationHandler, Payload, PopOutcome, UpdateOutcome, UserDataPatch,
};

/// User-data key holding a location's display title.
pub const TITLE_KEY: &str = "name";

/// Navigation context handed to nested components.
///
/// Components receive the scope explicitly instead of looking a router up
/// through ambient state; cloning it is cheap and every clone drives the
/// same route.
#[derive(Clone, Debug)]
pub struct NavigationScope {
    handler: NavigationHandler,
}

impl NavigationScope {
    pub fn new(handler: NavigationHandler) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &NavigationHandler {
        &self.handler
    }

    pub fn push(&self, payload: Payload) -> LocationId {
        self.handler.push(payload)
    }

    pub fn back(&self) -> PopOutcome {
        self.handler.pop(1)
    }

    /// Title stored on `location`, if any.
    pub fn title(location: &Location) -> Option<String> {
        location.user_data().get_str(TITLE_KEY).map(str::to_owned)
    }

    /// Title of the location with `id`, searching the route and then the root.
    pub fn title_of(&self, id: LocationId) -> Option<String> {
        let in_route = self.handler.with_route(|route| {
            route
                .position_of(id)
                .and_then(|index| route.get(index))
                .map(Self::title)
        });
        match in_route {
            Some(title) => title,
            None => self
                .handler
                .root()
                .filter(|root| root.id() == id)
                .and_then(|root| Self::title(&root)),
        }
    }

    pub fn top_title(&self) -> Option<String> {
        self.handler.top().and_then(|top| Self::title(&top))
    }

    pub fn set_title(&self, id: LocationId, title: impl Into<String>) -> UpdateOutcome {
        self.handler
            .update_user_data_of(id, &UserDataPatch::new().set(TITLE_KEY, title.into()))
    }

    pub fn clear_title(&self, id: LocationId) -> UpdateOutcome {
        self.handler
            .update_user_data_of(id, &UserDataPatch::new().delete(TITLE_KEY))
    }
}

impl From<NavigationHandler> for NavigationScope {
    fn from(handler: NavigationHandler) -> Self {
        Self::new(handler)
    }
}
