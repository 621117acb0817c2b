use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use beacon_store::KeyValueStore;
use beacon_types::events::{ClientEvent, Delivery};
use beacon_types::models::{Notification, NotificationPayload, PermissionStatus, RemoteMessage};

use crate::bus::EventBus;
use crate::error::{SubscriptionError, TokenError};
use crate::provider::PushProvider;

/// Fixed storage keys. The serialized log and the cached token live
/// side by side in the same key-value store.
const LOG_KEY: &str = "stored_notifications";
const TOKEN_KEY: &str = "push_token";
const BADGE_KEY: &str = "badge_count";

/// Outcome of [`NotificationCenter::initialize`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub token: String,
    pub permission: PermissionStatus,
}

/// Notification lifecycle manager.
///
/// Single owner of the notification log and the badge counter: the
/// three delivery handlers and every UI-triggered operation funnel
/// through here, so nothing else writes the persisted state. Constructed
/// once at process start and handed to the presentation layer — there is
/// no implicit global instance.
///
/// Storage failures never escape: reads fall back to an empty log or a
/// zero count, writes are logged and dropped. The worst case is a
/// notification silently missing from the log.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<CenterInner>,
}

struct CenterInner {
    provider: Arc<dyn PushProvider>,
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
}

impl NotificationCenter {
    pub fn new(provider: Arc<dyn PushProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(CenterInner {
                provider,
                store,
                events: EventBus::new(),
            }),
        }
    }

    /// Event bus the presentation layer subscribes on.
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Register for push delivery.
    ///
    /// Requests permission (denial is reported, not raised), fetches and
    /// caches the registration token, and surfaces the quit-state launch
    /// notification as a deep link. Fails only when the delivery service
    /// cannot issue a token; calling again retries the fetch.
    pub async fn initialize(&self) -> Result<Registration, TokenError> {
        let permission = self.inner.provider.request_permission().await;
        if permission == PermissionStatus::Denied {
            warn!("notification permission denied, continuing without alerts");
        }

        let token = self.inner.provider.registration_token().await?;
        if let Err(e) = self.inner.store.set(TOKEN_KEY, &token) {
            warn!("failed to cache registration token: {e}");
        }
        info!("registered for push delivery");

        // Quit-state launch: the triggering notification surfaces exactly
        // once here. It is never appended — whichever path received it
        // already did, or it was display-only and is exempt from the log.
        if let Some(msg) = self.inner.provider.initial_notification().await {
            self.handle_opened(&msg);
        }

        Ok(Registration { token, permission })
    }

    /// Registration token cached by the last successful `initialize`.
    pub fn cached_token(&self) -> Option<String> {
        match self.inner.store.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!("cached token unavailable: {e}");
                None
            }
        }
    }

    /// Full notification log, most-recent-last as stored.
    pub fn stored_notifications(&self) -> Vec<Notification> {
        self.load_log()
    }

    /// Unread counter. Falls back to a recount of the log when the
    /// counter key is missing, and to zero when storage is down.
    pub fn badge_count(&self) -> u32 {
        match self.inner.store.get(BADGE_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                warn!("corrupt badge counter '{raw}', recounting");
                self.unread_in_log()
            }),
            Ok(None) => self.unread_in_log(),
            Err(e) => {
                warn!("badge counter unavailable: {e}");
                0
            }
        }
    }

    pub fn set_badge_count(&self, count: u32) {
        if let Err(e) = self.inner.store.set(BADGE_KEY, &count.to_string()) {
            warn!("failed to persist badge counter: {e}");
        }
    }

    /// Reset the counter and mark every stored record read. Idempotent.
    pub fn clear_badge_count(&self) {
        let mut log = self.load_log();
        for record in &mut log {
            record.read = true;
        }
        self.persist_log(&log);
        self.set_badge_count(0);
    }

    /// Wipe the log and the counter. Idempotent.
    pub fn clear_all_notifications(&self) {
        if let Err(e) = self.inner.store.remove(LOG_KEY) {
            warn!("failed to clear notification log: {e}");
        }
        if let Err(e) = self.inner.store.remove(BADGE_KEY) {
            warn!("failed to clear badge counter: {e}");
        }
    }

    pub async fn subscribe_to_topic(&self, topic: &str) -> Result<(), SubscriptionError> {
        self.inner.provider.subscribe_to_topic(topic).await
    }

    pub async fn unsubscribe_from_topic(&self, topic: &str) -> Result<(), SubscriptionError> {
        self.inner.provider.unsubscribe_from_topic(topic).await
    }

    // ── Delivery handlers ───────────────────────────────────────────────

    pub fn handle_delivery(&self, delivery: Delivery) {
        match delivery {
            Delivery::Foreground(msg) => self.handle_foreground(&msg),
            Delivery::Background(msg) => self.handle_background(&msg),
            Delivery::Opened(msg) => self.handle_opened(&msg),
        }
    }

    /// Foreground receipt: append, recount, and tell the UI.
    pub fn handle_foreground(&self, msg: &RemoteMessage) {
        let record = self.append(msg);
        self.inner.events.emit(&ClientEvent::NotificationReceived {
            notification: record,
        });
    }

    /// Background receipt: append only. The UI catches up on its next
    /// foreground query.
    pub fn handle_background(&self, msg: &RemoteMessage) {
        self.append(msg);
    }

    /// The user tapped a delivered notification (or launched the app
    /// through one): dispatch the deep link, never re-append.
    pub fn handle_opened(&self, msg: &RemoteMessage) {
        let payload = NotificationPayload::classify(&msg.data);
        if let Some(link) = payload.chat_link() {
            debug!(chat_id = %link.chat_id, "dispatching chat deep link");
            self.inner.events.emit(&ClientEvent::NavigateToChat {
                chat_id: link.chat_id,
                sender: link.sender,
                message_id: link.message_id,
            });
        }
    }

    // ── Log bookkeeping ─────────────────────────────────────────────────

    /// Append a record and bring the persisted counter back in line with
    /// the log. Every mutation path goes through here or the clears.
    fn append(&self, msg: &RemoteMessage) -> Notification {
        let record = Notification::from_remote(msg);
        let mut log = self.load_log();
        log.push(record.clone());
        self.persist_log(&log);

        let unread = log.iter().filter(|n| !n.read).count() as u32;
        self.set_badge_count(unread);
        record
    }

    fn unread_in_log(&self) -> u32 {
        self.load_log().iter().filter(|n| !n.read).count() as u32
    }

    fn load_log(&self) -> Vec<Notification> {
        let raw = match self.inner.store.get(LOG_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("notification log unavailable, treating as empty: {e}");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("corrupt notification log, discarding: {e}");
            Vec::new()
        })
    }

    fn persist_log(&self, log: &[Notification]) {
        match serde_json::to_string(log) {
            Ok(raw) => {
                if let Err(e) = self.inner.store.set(LOG_KEY, &raw) {
                    warn!("failed to persist notification log: {e}");
                }
            }
            Err(e) => warn!("failed to serialize notification log: {e}"),
        }
    }
}

/// Consume deliveries from the platform bridge, one at a time.
///
/// This is the installed handler for all three delivery states: the host
/// pushes `Delivery` values into the channel from its platform callbacks,
/// and each one runs to completion before the next is taken.
pub async fn run_delivery_loop(
    center: NotificationCenter,
    mut deliveries: mpsc::UnboundedReceiver<Delivery>,
) {
    while let Some(delivery) = deliveries.recv().await {
        center.handle_delivery(delivery);
    }
    debug!("delivery channel closed, stopping loop");
}
