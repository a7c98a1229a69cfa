//! Push notification shaping and click routing.

use serde::{Deserialize, Serialize};

use crate::worker::Worker;

/// A shaped notification, ready for the host's notification surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub tag: String,
    pub actions: Vec<NotificationAction>,
}

/// One action button on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// What a notification click resolved to. The notification itself is
/// dismissed in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The root document was opened in a client view.
    Opened,
    /// Dismissed only.
    Dismissed,
}

impl Worker {
    /// Shape a push payload into a notification.
    ///
    /// The payload text becomes the body; without a payload the
    /// configured default body is used. Everything else is fixed
    /// metadata from the config.
    pub fn on_push(&self, payload: Option<&[u8]>) -> Notification {
        let n = &self.config.notification;
        let body = match payload {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => n.default_body.clone(),
        };

        Notification {
            title: n.title.clone(),
            body,
            icon: n.icon.clone(),
            badge: n.badge.clone(),
            vibrate: vec![200, 100, 200],
            tag: n.tag.clone(),
            actions: vec![
                NotificationAction { action: "open".into(), title: "Read Now".into() },
                NotificationAction { action: "close".into(), title: "Close".into() },
            ],
        }
    }

    /// Route a notification click by action name.
    ///
    /// Only "open" does anything: it asks the host for a client view
    /// on the root document. Every other action just dismisses.
    pub fn on_notification_click(&self, action: &str) -> ClickOutcome {
        if action == "open" {
            self.host.open_window("/");
            ClickOutcome::Opened
        } else {
            ClickOutcome::Dismissed
        }
    }
}
