//! Host-side binding for the navigation router: destination registry,
//! navigation controls, the back-swipe gesture and the host that keeps
//! rendered screens in sync with a route.

mod controls;
mod destination;
mod gesture;
mod host;
pub mod input;
mod scope;

pub use controls::{BackButton, PopButton, PushButton};
pub use destination::{DestinationError, DestinationOptions, DestinationRegistry};
pub use gesture::{
    BackSwipeConfig, BackSwipeRecognizer, DEFAULT_EDGE_WIDTH, DEFAULT_MAX_VERTICAL_DRIFT,
    DEFAULT_MIN_DISTANCE,
};
pub use host::NavigationHost;
pub use input::{Point, PointerEvent, PointerEventKind, PointerId};
pub use scope::{NavigationScope, TITLE_KEY};

pub mod prelude {
    pub use crate::controls::{BackButton, PopButton, PushButton};
    pub use crate::destination::{DestinationOptions, DestinationRegistry};
    pub use crate::host::NavigationHost;
    pub use crate::scope::NavigationScope;
    pub use nav_router_core::{NavigationConfig, NavigationHandler, Payload, PopAction};
}
