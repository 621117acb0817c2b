use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use beacon_types::models::{PermissionStatus, RemoteMessage};

use crate::error::{SubscriptionError, TokenError};

/// Capability boundary toward the push delivery service.
///
/// Production wires this to the platform messaging SDK; tests and the
/// demo use [`StaticProvider`]. The manager treats the service as
/// opaque — tokens, permission prompts, and topic fan-out all live
/// behind this trait.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Prompt the platform for notification permission. Denial is an
    /// outcome, not an error.
    async fn request_permission(&self) -> PermissionStatus;

    /// Current registration token for this install.
    async fn registration_token(&self) -> Result<String, TokenError>;

    async fn subscribe_to_topic(&self, topic: &str) -> Result<(), SubscriptionError>;

    async fn unsubscribe_from_topic(&self, topic: &str) -> Result<(), SubscriptionError>;

    /// The notification that launched the app from a quit state, if
    /// any. Meaningful once at startup; later calls return `None`.
    async fn initial_notification(&self) -> Option<RemoteMessage>;
}

/// In-process provider with canned behavior.
///
/// Serves the demo and the test suite: token and permission outcome are
/// fixed at construction, failures can be injected, and topic calls are
/// recorded for inspection.
pub struct StaticProvider {
    token: String,
    permission: PermissionStatus,
    fail_token: AtomicBool,
    fail_topics: bool,
    initial: Mutex<Option<RemoteMessage>>,
    topics: Mutex<Vec<String>>,
}

impl StaticProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            permission: PermissionStatus::Granted,
            fail_token: AtomicBool::new(false),
            fail_topics: false,
            initial: Mutex::new(None),
            topics: Mutex::new(Vec::new()),
        }
    }

    pub fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    /// Seed the quit-state notification surfaced on the next
    /// `initial_notification` call.
    pub fn with_initial_notification(self, msg: RemoteMessage) -> Self {
        *self.initial.lock().unwrap_or_else(PoisonError::into_inner) = Some(msg);
        self
    }

    pub fn with_failing_topics(mut self) -> Self {
        self.fail_topics = true;
        self
    }

    /// Toggle token-fetch failure at runtime, e.g. to exercise retry.
    pub fn set_token_failure(&self, fail: bool) {
        self.fail_token.store(fail, Ordering::Relaxed);
    }

    /// Topics currently subscribed, in subscription order.
    pub fn subscribed_topics(&self) -> Vec<String> {
        self.topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PushProvider for StaticProvider {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission
    }

    async fn registration_token(&self) -> Result<String, TokenError> {
        if self.fail_token.load(Ordering::Relaxed) {
            return Err(TokenError("delivery service unreachable".into()));
        }
        Ok(self.token.clone())
    }

    async fn subscribe_to_topic(&self, topic: &str) -> Result<(), SubscriptionError> {
        if self.fail_topics {
            return Err(SubscriptionError {
                topic: topic.to_string(),
                reason: "delivery service rejected the request".into(),
            });
        }
        self.topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(topic.to_string());
        debug!(topic, "subscribed to topic");
        Ok(())
    }

    async fn unsubscribe_from_topic(&self, topic: &str) -> Result<(), SubscriptionError> {
        if self.fail_topics {
            return Err(SubscriptionError {
                topic: topic.to_string(),
                reason: "delivery service rejected the request".into(),
            });
        }
        self.topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|t| t != topic);
        debug!(topic, "unsubscribed from topic");
        Ok(())
    }

    async fn initial_notification(&self) -> Option<RemoteMessage> {
        self.initial
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
