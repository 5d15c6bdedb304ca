//! Edge swipe that navigates back.

use log::trace;
use nav_router_core::{NavigationHandler, PopOutcome};

use crate::input::{Point, PointerEvent, PointerEventKind, PointerId};

pub const DEFAULT_EDGE_WIDTH: f32 = 24.0;
pub const DEFAULT_MIN_DISTANCE: f32 = 80.0;
pub const DEFAULT_MAX_VERTICAL_DRIFT: f32 = 60.0;

/// Thresholds of the back swipe, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackSwipeConfig {
    /// Width of the leading-edge strip a swipe must start in.
    pub edge_width: f32,
    /// Horizontal travel needed to trigger.
    pub min_distance: f32,
    /// Vertical travel that turns the drag into something else.
    pub max_vertical_drift: f32,
}

impl BackSwipeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edge_width(mut self, edge_width: f32) -> Self {
        self.edge_width = edge_width;
        self
    }

    pub fn with_min_distance(mut self, min_distance: f32) -> Self {
        self.min_distance = min_distance;
        self
    }

    pub fn with_max_vertical_drift(mut self, max_vertical_drift: f32) -> Self {
        self.max_vertical_drift = max_vertical_drift;
        self
    }
}

impl Default for BackSwipeConfig {
    fn default() -> Self {
        Self {
            edge_width: DEFAULT_EDGE_WIDTH,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_vertical_drift: DEFAULT_MAX_VERTICAL_DRIFT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SwipeState {
    Idle,
    Tracking {
        pointer: PointerId,
        start: Point,
        triggered: bool,
    },
    /// The pointer went down outside the edge or drifted; ignored until it lifts or
    /// another press begins.
    Rejected { pointer: PointerId },
}

/// Recognizes a leading-edge horizontal drag and fires once per gesture.
#[derive(Debug)]
pub struct BackSwipeRecognizer {
    config: BackSwipeConfig,
    state: SwipeState,
}

impl BackSwipeRecognizer {
    pub fn new(config: BackSwipeConfig) -> Self {
        Self {
            config,
            state: SwipeState::Idle,
        }
    }

    pub fn config(&self) -> &BackSwipeConfig {
        &self.config
    }

    /// Whether a gesture is in progress.
    pub fn is_tracking(&self) -> bool {
        matches!(self.state, SwipeState::Tracking { .. })
    }

    pub fn reset(&mut self) {
        self.state = SwipeState::Idle;
    }

    /// Feeds one event. Returns `true` exactly when the current gesture
    /// crosses the trigger threshold.
    pub fn process(&mut self, event: &PointerEvent) -> bool {
        match (event.kind, self.state) {
            // Any press starts a new gesture, released or not.
            (PointerEventKind::Down, _) => {
                self.state = if event.position.x <= self.config.edge_width {
                    SwipeState::Tracking {
                        pointer: event.id,
                        start: event.position,
                        triggered: false,
                    }
                } else {
                    SwipeState::Rejected { pointer: event.id }
                };
                false
            }
            (
                PointerEventKind::Move,
                SwipeState::Tracking {
                    pointer,
                    start,
                    triggered,
                },
            ) if pointer == event.id => {
                let dx = event.position.x - start.x;
                let dy = (event.position.y - start.y).abs();
                if dy > self.config.max_vertical_drift && !triggered {
                    trace!("back swipe rejected after {dy} px of vertical drift");
                    self.state = SwipeState::Rejected { pointer };
                    return false;
                }
                if !triggered && dx >= self.config.min_distance {
                    self.state = SwipeState::Tracking {
                        pointer,
                        start,
                        triggered: true,
                    };
                    return true;
                }
                false
            }
            (PointerEventKind::Up, SwipeState::Tracking { pointer, .. })
            | (PointerEventKind::Up, SwipeState::Rejected { pointer })
                if pointer == event.id =>
            {
                self.state = SwipeState::Idle;
                false
            }
            (PointerEventKind::Cancel, _) => {
                self.state = SwipeState::Idle;
                false
            }
            _ => false,
        }
    }

    /// Feeds one event and performs `safe_pop(1)` when the swipe triggers.
    pub fn dispatch(
        &mut self,
        event: &PointerEvent,
        handler: &NavigationHandler,
    ) -> Option<PopOutcome> {
        if !self.process(event) {
            return None;
        }
        let outcome = handler.safe_pop(1);
        trace!("back swipe -> {outcome:?}");
        Some(outcome)
    }
}

impl Default for BackSwipeRecognizer {
    fn default() -> Self {
        Self::new(BackSwipeConfig::default())
    }
}

#[cfg(test)]
#[path = "tests/gesture_tests.rs"]
mod tests;
