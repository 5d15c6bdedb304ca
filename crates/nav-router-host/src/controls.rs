//! Buttons that trigger navigation.
//!
//! Controls hold no route state; each click goes through the handler it is
//! given, so several controls on one screen share the same pop guard.

use log::debug;
use nav_router_core::{LocationId, NavigationHandler, Payload, PopAction, PopOutcome, UserData};

/// Pushes a fresh location built from its payload on every click.
#[derive(Clone, Debug)]
pub struct PushButton {
    label: String,
    payload: Payload,
    user_data: UserData,
}

impl PushButton {
    pub fn new(label: impl Into<String>, payload: Payload) -> Self {
        Self {
            label: label.into(),
            payload,
            user_data: UserData::new(),
        }
    }

    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn click(&self, handler: &NavigationHandler) -> LocationId {
        debug!("push button {:?} clicked", self.label);
        handler.push_with(self.payload.clone(), self.user_data.clone())
    }
}

#[derive(Clone, Debug)]
pub struct PopButton {
    label: String,
    action: PopAction,
}

impl PopButton {
    pub fn new(label: impl Into<String>, action: PopAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn action(&self) -> &PopAction {
        &self.action
    }

    pub fn click(&self, handler: &NavigationHandler) -> PopOutcome {
        debug!("pop button {:?} clicked: {:?}", self.label, self.action);
        self.action.apply(handler)
    }
}

/// Toolbar back button.
#[derive(Clone, Debug)]
pub struct BackButton {
    label: String,
}

impl BackButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn click(&self, handler: &NavigationHandler) -> PopOutcome {
        handler.pop(1)
    }
}

impl Default for BackButton {
    fn default() -> Self {
        Self::new("Back")
    }
}
