use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Device registration --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterDeviceRequest {
    pub token: String,
    pub user_id: Option<String>,
    pub device_info: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub struct RegisterDeviceResponse {
    pub message: String,
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeviceSummary {
    pub device_id: String,
    pub user_id: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<DeviceSummary>,
    pub count: usize,
}

// -- Sending --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendNotificationRequest {
    pub token: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendTopicNotificationRequest {
    pub topic: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulateCallRequest {
    pub token: String,
    pub caller_name: Option<String>,
    pub call_type: Option<String>,
}

/// Simulated delivery-service acknowledgement. The demo backend never
/// talks to a real push service; it answers as one would.
#[derive(Debug, Serialize)]
pub struct DeliveryReceipt {
    pub message_id: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    pub message: String,
    pub notification_id: Uuid,
    pub receipt: DeliveryReceipt,
}

#[derive(Debug, Serialize)]
pub struct SendTopicNotificationResponse {
    pub message: String,
    pub notification_id: Uuid,
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct SimulateCallResponse {
    pub message: String,
    pub notification_id: Uuid,
    pub call_id: String,
}

// -- History --

/// How a recorded notification was targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryKind {
    Direct,
    Topic,
    Call,
}

/// One entry in the backend's volatile send history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentNotification {
    pub id: Uuid,
    pub kind: DeliveryKind,
    /// Device token or topic name the push was addressed to.
    pub target: String,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub notifications: Vec<SentNotification>,
    pub count: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub message: String,
    pub cleared: usize,
}

// -- Service meta --

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub timestamp: DateTime<Utc>,
    pub devices: usize,
    pub notifications_sent: usize,
}
