use super::*;
use crate::runtime::TestRuntime;
use crate::user_data::UserValue;
use std::cell::Cell;
use std::time::Duration;

struct Home;
struct Feed;
struct Detail(u32);
struct Settings;

fn handler(runtime: &TestRuntime) -> NavigationHandler {
    NavigationHandler::new(runtime.handle())
}

fn advance_past_cooldown(runtime: &TestRuntime) {
    runtime.advance(NavigationConfig::DEFAULT_POP_COOLDOWN.as_millis() as u64);
}

#[test]
fn pushes_preserve_call_order() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    let ids: Vec<_> = (0..5).map(|n| nav.push(Payload::new(Detail(n)))).collect();
    assert_eq!(nav.count(), 5);
    let history: Vec<_> = nav.path_history().iter().map(Location::id).collect();
    assert_eq!(history, ids);
    assert_eq!(nav.top().and_then(|l| l.view::<Detail>().map(|d| d.0)), Some(4));
}

#[test]
fn push_all_matches_sequential_pushes() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    let ids = nav.push_all([Payload::new(Feed), Payload::new(Detail(1)), Payload::new(Settings)]);
    assert_eq!(ids.len(), 3);
    let tags: Vec<_> = nav.path_history().iter().map(Location::type_tag).collect();
    assert_eq!(
        tags,
        vec![TypeTag::of::<Feed>(), TypeTag::of::<Detail>(), TypeTag::of::<Settings>()]
    );
}

#[test]
fn push_with_keeps_user_data() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push_with(Payload::new(Feed), UserData::new().with("name", "Feed"));
    assert_eq!(
        nav.location(0).and_then(|l| l.user_data().get_str("name").map(str::to_owned)),
        Some("Feed".to_owned())
    );
}

#[test]
fn pop_removes_requested_amount() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    for n in 0..4 {
        nav.push(Payload::new(Detail(n)));
    }
    assert_eq!(nav.pop(3), PopOutcome::Popped { removed: 3 });
    assert_eq!(nav.count(), 1);
}

#[test]
fn pop_beyond_depth_clamps_to_root() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Settings));
    assert_eq!(nav.pop(7), PopOutcome::Popped { removed: 2 });
    assert!(nav.is_empty());
}

#[test]
fn pop_on_empty_route_is_unchanged_but_locks() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    assert_eq!(nav.pop(1), PopOutcome::Unchanged);
    assert!(nav.is_pop_locked());
    assert_eq!(nav.pop_to_root(), PopOutcome::Guarded);
    advance_past_cooldown(&runtime);
    assert_eq!(nav.pop_to_root(), PopOutcome::Unchanged);
    assert!(nav.is_pop_locked());
}

#[test]
fn pop_to_current_top_blocks_the_next_pop() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Settings));
    assert_eq!(nav.pop_to_index(1), PopOutcome::Unchanged);
    assert_eq!(nav.pop(1), PopOutcome::Guarded);
    assert_eq!(nav.count(), 2);
    advance_past_cooldown(&runtime);
    assert_eq!(nav.pop(1), PopOutcome::Popped { removed: 1 });
}

#[test]
fn pop_zero_engages_guard() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    assert_eq!(nav.pop(0), PopOutcome::Unchanged);
    assert!(nav.is_pop_locked());
    assert_eq!(nav.count(), 1);
}

#[test]
fn second_pop_without_delay_is_guarded() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    for n in 0..3 {
        nav.push(Payload::new(Detail(n)));
    }
    assert!(nav.pop(1).is_popped());
    let before = nav.path_history();
    assert_eq!(nav.pop(1), PopOutcome::Guarded);
    assert_eq!(nav.pop_to_root(), PopOutcome::Guarded);
    assert_eq!(nav.safe_pop(5), PopOutcome::Guarded);
    assert_eq!(nav.pop_to::<Detail>(), PopOutcome::Guarded);
    assert_eq!(nav.path_history(), before);
}

#[test]
fn pop_succeeds_once_cooldown_elapses() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    for n in 0..3 {
        nav.push(Payload::new(Detail(n)));
    }
    nav.pop(1);
    runtime.advance(499);
    assert!(nav.is_pop_locked());
    runtime.advance(1);
    assert!(!nav.is_pop_locked());
    assert_eq!(nav.pop(1), PopOutcome::Popped { removed: 1 });
    assert_eq!(nav.count(), 1);
}

#[test]
fn rejected_pop_does_not_extend_cooldown() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    for n in 0..3 {
        nav.push(Payload::new(Detail(n)));
    }
    nav.pop(1);
    runtime.advance(400);
    assert_eq!(nav.pop(1), PopOutcome::Guarded);
    runtime.advance(100);
    assert!(!nav.is_pop_locked());
}

#[test]
fn cooldown_follows_config() {
    let runtime = TestRuntime::new();
    let nav = NavigationHandler::with_config(
        runtime.handle(),
        NavigationConfig::new().with_pop_cooldown(Duration::from_millis(40)),
    );
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Settings));
    nav.pop(1);
    runtime.advance(40);
    assert!(nav.pop(1).is_popped());
}

#[test]
fn push_is_never_guarded() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    nav.pop(1);
    nav.push(Payload::new(Settings));
    assert_eq!(nav.count(), 1);
}

#[test]
fn safe_pop_goes_home_when_amount_reaches_depth() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Settings));
    assert_eq!(nav.safe_pop(2), PopOutcome::Popped { removed: 2 });
    assert_eq!(nav.count(), 0);
}

#[test]
fn safe_pop_pops_when_route_is_deeper() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    for n in 0..4 {
        nav.push(Payload::new(Detail(n)));
    }
    assert_eq!(nav.safe_pop(2), PopOutcome::Popped { removed: 2 });
    assert_eq!(nav.count(), 2);
}

#[test]
fn pop_to_index_leaves_index_on_top() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    for n in 0..5 {
        nav.push(Payload::new(Detail(n)));
    }
    assert_eq!(nav.pop_to_index(1), PopOutcome::Popped { removed: 3 });
    assert_eq!(nav.top().and_then(|l| l.view::<Detail>().map(|d| d.0)), Some(1));
}

#[test]
fn pop_to_index_at_or_past_top_changes_nothing() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Settings));
    assert_eq!(nav.pop_to_index(8), PopOutcome::NoMatch);
    assert!(!nav.is_pop_locked());
    assert_eq!(nav.pop_to_index(1), PopOutcome::Unchanged);
    assert_eq!(nav.count(), 2);
    assert!(nav.is_pop_locked());
}

#[test]
fn pop_to_type_uses_most_recent_match() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Settings));
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Detail(0)));
    assert_eq!(nav.pop_to::<Feed>(), PopOutcome::Popped { removed: 1 });
    assert_eq!(nav.count(), 3);
}

#[test]
fn pop_to_missing_type_is_silent_noop() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    assert_eq!(nav.pop_to::<Settings>(), PopOutcome::NoMatch);
    assert_eq!(nav.count(), 1);
    assert!(!nav.is_pop_locked());
}

#[test]
fn pop_to_location_uses_identity() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Detail(1)));
    let target = nav.push(Payload::new(Detail(1)));
    nav.push(Payload::new(Detail(1)));
    nav.push(Payload::new(Detail(1)));
    assert_eq!(nav.pop_to_location(target), PopOutcome::Popped { removed: 2 });
    assert_eq!(nav.top().map(|l| l.id()), Some(target));
}

#[test]
fn pop_to_where_uses_most_recent_match() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    for n in [3, 8, 4, 9, 1] {
        nav.push(Payload::new(Detail(n)));
    }
    let outcome = nav.pop_to_where(|l| l.view::<Detail>().map(|d| d.0 > 5).unwrap_or(false));
    assert_eq!(outcome, PopOutcome::Popped { removed: 1 });
    assert_eq!(nav.top().and_then(|l| l.view::<Detail>().map(|d| d.0)), Some(9));
}

#[test]
fn pop_to_root_clears_route() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    for n in 0..6 {
        nav.push(Payload::new(Detail(n)));
    }
    assert_eq!(nav.pop_to_root(), PopOutcome::Popped { removed: 6 });
    assert_eq!(nav.count(), 0);
}

#[test]
fn pop_to_root_type_clears_route() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.set_root(Payload::new(Home));
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Settings));
    assert_eq!(nav.pop_to::<Home>(), PopOutcome::Popped { removed: 2 });
    assert_eq!(nav.count(), 0);
    assert!(nav.top().map(|l| l.is::<Home>()).unwrap_or(false));
}

#[test]
fn pushed_entry_beats_root_of_same_type() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.set_root(Payload::new(Home));
    nav.push(Payload::new(Home));
    nav.push(Payload::new(Feed));
    assert_eq!(nav.pop_to::<Home>(), PopOutcome::Popped { removed: 1 });
    assert_eq!(nav.count(), 1);
}

#[test]
fn update_user_data_merges_into_target() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push_with(
        Payload::new(Feed),
        UserData::new().with("name", "Feed").with("badge", 2).with("pinned", true),
    );
    let patch = UserDataPatch::new().delete("badge").set("name", "Latest");
    assert_eq!(
        nav.update_user_data(&LocationTarget::of_type::<Feed>(), &patch),
        UpdateOutcome::Updated(Resolved::Index(0))
    );
    let data = nav.location(0).map(|l| l.user_data().clone()).unwrap_or_default();
    assert_eq!(data.get_str("name"), Some("Latest"));
    assert!(!data.contains_key("badge"));
    assert_eq!(data.get("pinned"), Some(&UserValue::Bool(true)));
}

#[test]
fn update_user_data_targets_last_match() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    let first = nav.push(Payload::new(Detail(1)));
    let second = nav.push(Payload::new(Detail(2)));
    let patch = UserDataPatch::new().set("name", "Second");
    nav.update_user_data(&LocationTarget::of_type::<Detail>(), &patch);
    let history = nav.path_history();
    assert_eq!(history[0].id(), first);
    assert!(history[0].user_data().is_empty());
    assert_eq!(history[1].id(), second);
    assert_eq!(history[1].user_data().get_str("name"), Some("Second"));
}

#[test]
fn update_user_data_without_match_is_noop() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    let patch = UserDataPatch::new().set("name", "Ghost");
    assert_eq!(nav.update_user_data_at(4, &patch), UpdateOutcome::NoMatch);
    assert_eq!(
        nav.update_user_data(&LocationTarget::of_type::<Settings>(), &patch),
        UpdateOutcome::NoMatch
    );
    assert!(nav.location(0).map(|l| l.user_data().is_empty()).unwrap_or(false));
}

#[test]
fn update_user_data_can_reach_root() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    let root = nav.set_root(Payload::new(Home));
    let patch = UserDataPatch::new().set("name", "Home");
    assert_eq!(nav.update_user_data_of(root, &patch), UpdateOutcome::Updated(Resolved::Root));
    assert_eq!(
        nav.root().and_then(|l| l.user_data().get_str("name").map(str::to_owned)),
        Some("Home".to_owned())
    );
}

#[test]
fn update_user_data_ignores_guard() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Settings));
    nav.pop(1);
    let patch = UserDataPatch::new().set("seen", true);
    assert!(matches!(nav.update_user_data_at(0, &patch), UpdateOutcome::Updated(_)));
}

#[test]
fn observers_see_mutation_before_call_returns() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    let seen: Rc<RefCell<Vec<(RouteChange, usize)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = nav.subscribe(move |change, route| {
        sink.borrow_mut().push((*change, route.len()));
    });

    nav.push(Payload::new(Feed));
    assert_eq!(seen.borrow().last(), Some(&(RouteChange::Pushed { count: 1 }, 1)));
    nav.push_all([Payload::new(Settings), Payload::new(Detail(0))]);
    assert_eq!(seen.borrow().last(), Some(&(RouteChange::Pushed { count: 2 }, 3)));
    nav.pop(2);
    assert_eq!(seen.borrow().last(), Some(&(RouteChange::Popped { removed: 2 }, 1)));
    nav.update_user_data_at(0, &UserDataPatch::new().set("name", "Feed"));
    assert_eq!(
        seen.borrow().last(),
        Some(&(
            RouteChange::UserDataUpdated {
                target: Resolved::Index(0)
            },
            1
        ))
    );
}

#[test]
fn rejected_operations_do_not_notify() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Settings));
    let notifications = Rc::new(Cell::new(0));
    let counter = notifications.clone();
    let _subscription = nav.subscribe(move |_, _| counter.set(counter.get() + 1));
    nav.pop(1);
    nav.pop(1);
    nav.pop_to::<Detail>();
    assert_eq!(notifications.get(), 1);
}

#[test]
fn dropped_subscription_stops_notifications() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    let notifications = Rc::new(Cell::new(0));
    let counter = notifications.clone();
    let subscription = nav.subscribe(move |_, _| counter.set(counter.get() + 1));
    nav.push(Payload::new(Feed));
    drop(subscription);
    nav.push(Payload::new(Settings));
    assert_eq!(notifications.get(), 1);
}

#[test]
fn observer_may_navigate_reentrantly() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    let redirect = nav.clone();
    let _subscription = nav.subscribe(move |change, route| {
        let landed_on_feed = route.last().map(|l| l.is::<Feed>()).unwrap_or(false);
        if matches!(change, RouteChange::Pushed { .. }) && landed_on_feed {
            redirect.push(Payload::new(Detail(0)));
        }
    });
    nav.push(Payload::new(Feed));
    assert_eq!(nav.count(), 2);
}

#[test]
fn dropping_handler_while_locked_is_safe() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    nav.pop(1);
    assert!(runtime.runtime().has_pending_tasks());
    drop(nav);
    assert!(!runtime.runtime().has_pending_tasks());
    advance_past_cooldown(&runtime);
}

#[test]
fn expired_timer_for_dropped_handler_is_noop() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    nav.push(Payload::new(Feed));
    nav.pop(1);
    let released = {
        let weak = Rc::downgrade(&nav.inner);
        drop(nav);
        weak.upgrade().is_none()
    };
    assert!(released);
    assert_eq!(runtime.advance(1_000), 0);
}

#[test]
fn handler_without_runtime_still_navigates() {
    let nav = NavigationHandler::new(RuntimeHandle::detached());
    nav.push(Payload::new(Feed));
    nav.push(Payload::new(Settings));
    assert!(nav.pop(1).is_popped());
    assert!(!nav.is_pop_locked());
    assert!(nav.pop(1).is_popped());
}

#[test]
fn clones_share_one_route() {
    let runtime = TestRuntime::new();
    let nav = handler(&runtime);
    let other = nav.clone();
    other.push(Payload::new(Feed));
    assert!(nav.ptr_eq(&other));
    assert_eq!(nav.count(), 1);
    assert!(nav.pop(1).is_popped());
    assert_eq!(other.pop(1), PopOutcome::Guarded);
}
