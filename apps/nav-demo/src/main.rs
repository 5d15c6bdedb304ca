use std::thread;
use std::time::Duration;

use nav_router_core::{NavigationConfig, Payload, PopAction, PopOutcome};
use nav_router_host::{
    BackButton, DestinationOptions, DestinationRegistry, NavigationHost, PointerEvent, PopButton,
    PushButton,
};
use nav_router_runtime_std::StdRuntime;

struct Mailboxes;
struct Inbox;
struct Thread {
    subject: &'static str,
}
struct Compose;

fn registry() -> DestinationRegistry<String> {
    let mut registry = DestinationRegistry::new();
    registry
        .register::<Mailboxes>(|_| "[Mailboxes]".to_owned())
        .register::<Inbox>(|_| "[Inbox]".to_owned())
        .register::<Thread>(|location| match location.view::<Thread>() {
            Some(thread) => format!("[Thread: {}]", thread.subject),
            None => "[Thread]".to_owned(),
        })
        .register_with::<Compose>(DestinationOptions::new().without_back_swipe(), |_| {
            "[Compose]".to_owned()
        });
    registry
}

fn show(step: &str, host: &NavigationHost<String>) {
    let screen = host.visible_screen().unwrap_or_else(|| "<nothing>".to_owned());
    let title = host.top_title().unwrap_or_default();
    let back = if host.shows_back_button() { "<" } else { " " };
    println!(
        "{step:<28} {back} {screen:<28} {title:<16} depth={}",
        host.handler().count()
    );
}

/// Sleeps until pending guard resets are due and runs them.
fn settle(runtime: &StdRuntime) {
    while let Some(wait) = runtime.time_until_next_task() {
        thread::sleep(wait);
        runtime.run_due_tasks();
    }
}

fn main() {
    env_logger::init();

    println!("=== Navigation Router Demo ===");
    println!("Scripted mail session on the std runtime.");
    println!();

    let runtime = StdRuntime::new();
    let config = NavigationConfig::new().with_pop_cooldown(Duration::from_millis(300));
    let handler = runtime.navigation_handler(config);
    let host = NavigationHost::new(handler.clone(), registry());
    host.set_root(Payload::new(Mailboxes));
    let scope = host.scope();
    show("start", &host);

    PushButton::new("Inbox", Payload::new(Inbox)).click(&handler);
    show("open inbox", &host);

    let thread = PushButton::new(
        "Thread",
        Payload::new(Thread {
            subject: "Weekend plans",
        }),
    )
    .click(&handler);
    scope.set_title(thread, "Weekend plans");
    show("open thread", &host);

    PushButton::new("Reply", Payload::new(Compose)).click(&handler);
    show("reply", &host);

    host.handle_pointer(&PointerEvent::down(2.0, 300.0));
    let swipe = host.handle_pointer(&PointerEvent::moved(160.0, 300.0));
    host.handle_pointer(&PointerEvent::up(160.0, 300.0));
    show(&format!("swipe on compose: {swipe:?}"), &host);

    let discard = PopButton::new("Discard", PopAction::last::<Inbox>());
    let outcome = discard.click(&handler);
    show(&format!("discard: {outcome:?}"), &host);

    let back = BackButton::default();
    let outcome = back.click(&handler);
    show(&format!("back (too soon): {outcome:?}"), &host);

    settle(&runtime);
    let outcome = back.click(&handler);
    show(&format!("back: {outcome:?}"), &host);

    if outcome != PopOutcome::Unchanged && runtime.take_frame_request() {
        log::info!("frame requested by the last navigation");
    }
    settle(&runtime);
    println!();
    println!("Done.");
}
