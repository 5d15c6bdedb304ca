use std::fmt;
use std::rc::Rc;

use crate::handler::{NavigationHandler, PopOutcome};
use crate::location::{Location, LocationId, TypeTag};
use crate::resolve::{LocationPredicate, LocationTarget};

/// A backwards navigation described as data, so controls can carry it
/// without knowing how it is carried out.
#[derive(Clone)]
pub enum PopAction {
    Pop(usize),
    SafePop(usize),
    ToIndex(usize),
    Last(TypeTag),
    Location(LocationId),
    Where(LocationPredicate),
    Root,
}

impl PopAction {
    pub fn last<T: 'static>() -> Self {
        PopAction::Last(TypeTag::of::<T>())
    }

    pub fn matching(predicate: impl Fn(&Location) -> bool + 'static) -> Self {
        PopAction::Where(Rc::new(predicate))
    }

    pub fn apply(&self, handler: &NavigationHandler) -> PopOutcome {
        match self {
            PopAction::Pop(amount) => handler.pop(*amount),
            PopAction::SafePop(amount) => handler.safe_pop(*amount),
            PopAction::ToIndex(index) => handler.pop_to_index(*index),
            PopAction::Last(tag) => handler.pop_to_type(*tag),
            PopAction::Location(id) => handler.pop_to_location(*id),
            PopAction::Where(predicate) => {
                handler.pop_to_target(&LocationTarget::Where(Rc::clone(predicate)))
            }
            PopAction::Root => handler.pop_to_root(),
        }
    }
}

impl Default for PopAction {
    fn default() -> Self {
        PopAction::Pop(1)
    }
}

impl fmt::Debug for PopAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopAction::Pop(amount) => f.debug_tuple("Pop").field(amount).finish(),
            PopAction::SafePop(amount) => f.debug_tuple("SafePop").field(amount).finish(),
            PopAction::ToIndex(index) => f.debug_tuple("ToIndex").field(index).finish(),
            PopAction::Last(tag) => f.debug_tuple("Last").field(tag).finish(),
            PopAction::Location(id) => f.debug_tuple("Location").field(id).finish(),
            PopAction::Where(_) => f.write_str("Where(..)"),
            PopAction::Root => f.write_str("Root"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Payload;
    use crate::runtime::TestRuntime;

    struct Inbox;
    struct Thread(u8);

    fn handler_with_threads(runtime: &TestRuntime) -> NavigationHandler {
        let nav = NavigationHandler::new(runtime.handle());
        nav.push(Payload::new(Inbox));
        for n in 0..3 {
            nav.push(Payload::new(Thread(n)));
        }
        nav
    }

    #[test]
    fn default_action_pops_one() {
        let runtime = TestRuntime::new();
        let nav = handler_with_threads(&runtime);
        assert_eq!(PopAction::default().apply(&nav), PopOutcome::Popped { removed: 1 });
    }

    #[test]
    fn each_action_dispatches_to_matching_operation() {
        let cases: Vec<(PopAction, usize)> = vec![
            (PopAction::Pop(2), 2),
            (PopAction::SafePop(9), 0),
            (PopAction::ToIndex(1), 2),
            (PopAction::last::<Inbox>(), 1),
            (
                PopAction::matching(|l| l.view::<Thread>().map(|t| t.0 == 0).unwrap_or(false)),
                2,
            ),
            (PopAction::Root, 0),
        ];
        for (action, expected_count) in cases {
            let runtime = TestRuntime::new();
            let nav = handler_with_threads(&runtime);
            assert!(action.apply(&nav).is_popped(), "{action:?} should pop");
            assert_eq!(nav.count(), expected_count, "{action:?}");
        }
    }

    #[test]
    fn location_action_targets_identity() {
        let runtime = TestRuntime::new();
        let nav = handler_with_threads(&runtime);
        let inbox = nav.location(0).map(|l| l.id()).expect("inbox pushed");
        assert!(PopAction::Location(inbox).apply(&nav).is_popped());
        assert_eq!(nav.count(), 1);
    }
}
