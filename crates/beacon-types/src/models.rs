use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of the platform permission prompt. Denial is a reportable
/// state, never an error — the app keeps running with reduced function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Platform does not gate notifications behind a prompt.
    NotRequired,
}

impl PermissionStatus {
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Denied)
    }
}

/// Display part of a push message — what the platform renders natively
/// when the app is not in the foreground.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayNotification {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Inbound push message as handed over by the delivery service.
///
/// Either part may be absent: data-only messages are silent, and
/// display-only messages carry no payload for the app to act on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteMessage {
    pub notification: Option<DisplayNotification>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl RemoteMessage {
    pub fn display_only(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            notification: Some(DisplayNotification {
                title: Some(title.into()),
                body: Some(body.into()),
            }),
            data: HashMap::new(),
        }
    }

    pub fn data_only(data: HashMap<String, String>) -> Self {
        Self {
            notification: None,
            data,
        }
    }

    pub fn with_data(
        title: impl Into<String>,
        body: impl Into<String>,
        data: HashMap<String, String>,
    ) -> Self {
        Self {
            notification: Some(DisplayNotification {
                title: Some(title.into()),
                body: Some(body.into()),
            }),
            data,
        }
    }
}

/// Structured push payload, classified from the wire-side `data` map.
///
/// Chat messages, calls, and everything else are distinct kinds here
/// rather than optional fields on one loose mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationPayload {
    ChatMessage {
        chat_id: String,
        message_id: Option<String>,
        sender: Option<String>,
    },
    Call {
        call_id: Option<String>,
        call_type: String,
        caller_name: String,
        chat_id: Option<String>,
    },
    Generic {
        #[serde(default)]
        data: HashMap<String, String>,
    },
}

impl NotificationPayload {
    /// Classify a raw data map. A `type=call` marker wins over the chat
    /// shape; a `chatId` marks a chat message; anything else is generic.
    pub fn classify(data: &HashMap<String, String>) -> Self {
        if data.get("type").is_some_and(|t| t == "call") {
            return Self::Call {
                call_id: data.get("callId").cloned(),
                call_type: data
                    .get("callType")
                    .cloned()
                    .unwrap_or_else(|| "voice".to_string()),
                caller_name: data
                    .get("callerName")
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                chat_id: data.get("chatId").cloned(),
            };
        }

        if let Some(chat_id) = data.get("chatId") {
            return Self::ChatMessage {
                chat_id: chat_id.clone(),
                message_id: data.get("messageId").cloned(),
                sender: data.get("sender").cloned(),
            };
        }

        Self::Generic { data: data.clone() }
    }

    /// Deep-link target carried by this payload, if any. Calls link to
    /// their chat when the caller has one.
    pub fn chat_link(&self) -> Option<ChatLink> {
        match self {
            Self::ChatMessage {
                chat_id,
                message_id,
                sender,
            } => Some(ChatLink {
                chat_id: chat_id.clone(),
                sender: sender.clone(),
                message_id: message_id.clone(),
            }),
            Self::Call {
                chat_id: Some(chat_id),
                caller_name,
                ..
            } => Some(ChatLink {
                chat_id: chat_id.clone(),
                sender: Some(caller_name.clone()),
                message_id: None,
            }),
            _ => None,
        }
    }
}

/// Deep-link target extracted from a notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLink {
    pub chat_id: String,
    pub sender: Option<String>,
    pub message_id: Option<String>,
}

/// A received push notification as persisted in the local log.
///
/// Created on receipt; the only later mutation is flipping `read` when
/// the badge is cleared. Removed only by a bulk clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub payload: NotificationPayload,
    pub timestamp_ms: i64,
    pub read: bool,
}

impl Notification {
    /// Build a log record from an inbound message. Title and body fall
    /// back from the display part to the data map.
    pub fn from_remote(msg: &RemoteMessage) -> Self {
        let display = msg.notification.as_ref();
        let title = display
            .and_then(|n| n.title.clone())
            .or_else(|| msg.data.get("title").cloned())
            .unwrap_or_default();
        let body = display
            .and_then(|n| n.body.clone())
            .or_else(|| msg.data.get("body").cloned())
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4(),
            title,
            body,
            payload: NotificationPayload::classify(&msg.data),
            timestamp_ms: Utc::now().timestamp_millis(),
            read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn classify_chat_message() {
        let data = map(&[("chatId", "c1"), ("sender", "Bob"), ("messageId", "m1")]);
        let payload = NotificationPayload::classify(&data);
        assert_eq!(
            payload,
            NotificationPayload::ChatMessage {
                chat_id: "c1".into(),
                message_id: Some("m1".into()),
                sender: Some("Bob".into()),
            }
        );
    }

    #[test]
    fn classify_call_wins_over_chat_shape() {
        let data = map(&[
            ("type", "call"),
            ("callType", "video"),
            ("callerName", "Alice"),
            ("chatId", "chat_alice"),
        ]);
        let payload = NotificationPayload::classify(&data);
        match &payload {
            NotificationPayload::Call {
                call_type,
                caller_name,
                chat_id,
                ..
            } => {
                assert_eq!(call_type, "video");
                assert_eq!(caller_name, "Alice");
                assert_eq!(chat_id.as_deref(), Some("chat_alice"));
            }
            other => panic!("expected call payload, got {other:?}"),
        }
        // A call still deep-links into its chat, attributed to the caller.
        let link = payload.chat_link().expect("call with chatId links");
        assert_eq!(link.chat_id, "chat_alice");
        assert_eq!(link.sender.as_deref(), Some("Alice"));
        assert_eq!(link.message_id, None);
    }

    #[test]
    fn classify_generic_keeps_raw_data() {
        let data = map(&[("campaign", "spring")]);
        let payload = NotificationPayload::classify(&data);
        assert_eq!(payload, NotificationPayload::Generic { data: data.clone() });
        assert!(payload.chat_link().is_none());
    }

    #[test]
    fn call_defaults_applied() {
        let data = map(&[("type", "call")]);
        match NotificationPayload::classify(&data) {
            NotificationPayload::Call {
                call_type,
                caller_name,
                chat_id,
                call_id,
            } => {
                assert_eq!(call_type, "voice");
                assert_eq!(caller_name, "Unknown");
                assert_eq!(chat_id, None);
                assert_eq!(call_id, None);
            }
            other => panic!("expected call payload, got {other:?}"),
        }
    }

    #[test]
    fn record_title_falls_back_to_data() {
        let msg = RemoteMessage::data_only(map(&[("title", "Ping"), ("body", "from data")]));
        let record = Notification::from_remote(&msg);
        assert_eq!(record.title, "Ping");
        assert_eq!(record.body, "from data");
        assert!(!record.read);
    }

    #[test]
    fn record_prefers_display_part() {
        let msg = RemoteMessage::with_data("Shown", "Rendered", map(&[("title", "hidden")]));
        let record = Notification::from_remote(&msg);
        assert_eq!(record.title, "Shown");
        assert_eq!(record.body, "Rendered");
    }
}
