use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use beacon_types::api::{DeliveryKind, SentNotification};

/// A registered device token.
#[derive(Debug, Clone)]
pub struct Device {
    pub token: String,
    pub user_id: String,
    pub device_info: HashMap<String, String>,
    pub registered_at: DateTime<Utc>,
}

/// Volatile demo state: registered devices and the send history.
/// Everything here is lost on restart, which is the point — the backend
/// only exists for manual testing of the client.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    devices: Vec<Device>,
    history: Vec<SentNotification>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device, replacing any existing entry with the same
    /// token.
    pub async fn register_device(&self, device: Device) {
        let mut inner = self.inner.write().await;
        inner.devices.retain(|d| d.token != device.token);
        inner.devices.push(device);
    }

    pub async fn devices(&self) -> Vec<Device> {
        self.inner.read().await.devices.clone()
    }

    pub async fn record(&self, entry: SentNotification) {
        self.inner.write().await.history.push(entry);
    }

    /// Send history, newest first, optionally filtered by kind. Returns
    /// the page and the unfiltered total.
    pub async fn history(
        &self,
        limit: usize,
        kind: Option<DeliveryKind>,
    ) -> (Vec<SentNotification>, usize) {
        let inner = self.inner.read().await;
        let total = inner.history.len();

        let mut items: Vec<SentNotification> = inner
            .history
            .iter()
            .filter(|n| kind.is_none_or(|k| n.kind == k))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        items.truncate(limit);

        (items, total)
    }

    pub async fn clear_history(&self) -> usize {
        let mut inner = self.inner.write().await;
        let cleared = inner.history.len();
        inner.history.clear();
        cleared
    }

    pub async fn counts(&self) -> (usize, usize) {
        let inner = self.inner.read().await;
        (inner.devices.len(), inner.history.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn device(token: &str, user: &str) -> Device {
        Device {
            token: token.to_string(),
            user_id: user.to_string(),
            device_info: HashMap::new(),
            registered_at: Utc::now(),
        }
    }

    fn entry(kind: DeliveryKind, target: &str, age_secs: i64) -> SentNotification {
        SentNotification {
            id: Uuid::new_v4(),
            kind,
            target: target.to_string(),
            title: "New Message".into(),
            body: "You have a new message".into(),
            data: HashMap::new(),
            sent_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn reregistration_replaces_same_token() {
        let registry = Registry::new();
        registry.register_device(device("tok-a", "alice")).await;
        registry.register_device(device("tok-b", "bob")).await;
        registry.register_device(device("tok-a", "alice2")).await;

        let devices = registry.devices().await;
        assert_eq!(devices.len(), 2);
        let alice = devices.iter().find(|d| d.token == "tok-a").unwrap();
        assert_eq!(alice.user_id, "alice2");
    }

    #[tokio::test]
    async fn history_filters_sorts_and_limits() {
        let registry = Registry::new();
        registry.record(entry(DeliveryKind::Direct, "tok", 30)).await;
        registry.record(entry(DeliveryKind::Topic, "news", 20)).await;
        registry.record(entry(DeliveryKind::Direct, "tok", 10)).await;
        registry.record(entry(DeliveryKind::Call, "tok", 0)).await;

        let (all, total) = registry.history(50, None).await;
        assert_eq!(total, 4);
        assert_eq!(all.len(), 4);
        // Newest first.
        assert!(all.windows(2).all(|w| w[0].sent_at >= w[1].sent_at));

        let (direct, total) = registry.history(50, Some(DeliveryKind::Direct)).await;
        assert_eq!(total, 4);
        assert_eq!(direct.len(), 2);
        assert!(direct.iter().all(|n| n.kind == DeliveryKind::Direct));

        let (page, _) = registry.history(1, None).await;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].kind, DeliveryKind::Call);
    }

    #[tokio::test]
    async fn clear_history_reports_count() {
        let registry = Registry::new();
        registry.record(entry(DeliveryKind::Direct, "tok", 0)).await;
        registry.record(entry(DeliveryKind::Topic, "news", 0)).await;

        assert_eq!(registry.clear_history().await, 2);
        assert_eq!(registry.clear_history().await, 0);
        let (items, total) = registry.history(50, None).await;
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }
}
