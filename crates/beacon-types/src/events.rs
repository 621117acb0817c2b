use serde::{Deserialize, Serialize};

use crate::models::{Notification, RemoteMessage};

/// Events emitted by the notification center for the presentation layer.
///
/// These are the only coupling toward UI code: screens subscribe on the
/// event bus and never get called into directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientEvent {
    /// A push message arrived while the app was in the foreground.
    NotificationReceived { notification: Notification },

    /// A notification payload asked to open a specific chat.
    NavigateToChat {
        chat_id: String,
        sender: Option<String>,
        message_id: Option<String>,
    },
}

/// An inbound push delivery, tagged with the app-lifecycle state it
/// arrived in. The three states are disjoint: a given message reaches
/// the app through exactly one of them.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// App active — message arrives via a direct callback.
    Foreground(RemoteMessage),
    /// App suspended — handled without any UI attached.
    Background(RemoteMessage),
    /// The user tapped a delivered notification to return to the app.
    Opened(RemoteMessage),
}
