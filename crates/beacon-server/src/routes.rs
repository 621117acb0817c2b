use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use beacon_types::api::{
    ClearedResponse, DeliveryKind, DeliveryReceipt, DeviceSummary, DevicesResponse,
    HealthResponse, HistoryResponse, RegisterDeviceRequest, RegisterDeviceResponse,
    SendNotificationRequest, SendNotificationResponse, SendTopicNotificationRequest,
    SendTopicNotificationResponse, SentNotification, ServiceInfo, SimulateCallRequest,
    SimulateCallResponse,
};

use crate::state::{Device, Registry};

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub started_at: Instant,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub kind: Option<DeliveryKind>,
}

fn default_limit() -> usize {
    50
}

/// Tokens are opaque and potentially sensitive; only a short prefix ever
/// leaves the server.
fn abbreviate(token: &str) -> String {
    let prefix: String = token.chars().take(10).collect();
    format!("{prefix}...")
}

// ── Handlers ────────────────────────────────────────────────────────────

pub async fn index() -> Json<ServiceInfo> {
    let endpoints = [
        ("POST /register-device", "Register a device token"),
        ("GET /devices", "List registered devices"),
        ("POST /send-notification", "Send a notification to a device"),
        ("POST /send-topic-notification", "Send a notification to a topic"),
        ("POST /simulate-call", "Simulate an incoming call notification"),
        ("GET /notifications", "Send history (newest first)"),
        ("DELETE /notifications", "Clear the send history"),
        ("GET /health", "Health check"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect::<BTreeMap<_, _>>();

    Json(ServiceInfo {
        message: "Beacon demo delivery backend".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        endpoints,
    })
}

pub async fn register_device(
    State(state): State<AppState>,
    Json(req): Json<RegisterDeviceRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.token.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let user_id = req.user_id.unwrap_or_else(|| "anonymous".into());
    let device = Device {
        token: req.token.clone(),
        user_id: user_id.clone(),
        device_info: req.device_info.unwrap_or_default(),
        registered_at: Utc::now(),
    };
    state.registry.register_device(device).await;

    info!(user = %user_id, "device registered");
    Ok(Json(RegisterDeviceResponse {
        message: "Device registered successfully".into(),
        device_id: abbreviate(&req.token),
    }))
}

pub async fn list_devices(State(state): State<AppState>) -> Json<DevicesResponse> {
    let devices: Vec<DeviceSummary> = state
        .registry
        .devices()
        .await
        .into_iter()
        .map(|d| DeviceSummary {
            device_id: abbreviate(&d.token),
            user_id: d.user_id,
            registered_at: d.registered_at,
        })
        .collect();

    let count = devices.len();
    Json(DevicesResponse { devices, count })
}

pub async fn send_notification(
    State(state): State<AppState>,
    Json(req): Json<SendNotificationRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.token.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let entry = SentNotification {
        id: Uuid::new_v4(),
        kind: DeliveryKind::Direct,
        target: req.token.clone(),
        title: req.title.unwrap_or_else(|| "New Message".into()),
        body: req.body.unwrap_or_else(|| "You have a new message".into()),
        data: req.data.unwrap_or_default(),
        sent_at: Utc::now(),
    };
    state.registry.record(entry.clone()).await;

    // A real deployment would hand the message to the delivery service
    // here; the demo answers with the receipt one would return.
    info!(target = %abbreviate(&req.token), title = %entry.title, "direct notification recorded");
    Ok(Json(SendNotificationResponse {
        message: "Notification sent successfully".into(),
        notification_id: entry.id,
        receipt: DeliveryReceipt {
            message_id: format!("msg_{}", Uuid::new_v4().simple()),
            success: true,
        },
    }))
}

pub async fn send_topic_notification(
    State(state): State<AppState>,
    Json(req): Json<SendTopicNotificationRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.topic.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let entry = SentNotification {
        id: Uuid::new_v4(),
        kind: DeliveryKind::Topic,
        target: req.topic.clone(),
        title: req.title.unwrap_or_else(|| "New Message".into()),
        body: req.body.unwrap_or_else(|| "You have a new message".into()),
        data: req.data.unwrap_or_default(),
        sent_at: Utc::now(),
    };
    state.registry.record(entry.clone()).await;

    info!(topic = %req.topic, title = %entry.title, "topic notification recorded");
    Ok(Json(SendTopicNotificationResponse {
        message: "Topic notification sent successfully".into(),
        notification_id: entry.id,
        topic: req.topic,
    }))
}

pub async fn simulate_call(
    State(state): State<AppState>,
    Json(req): Json<SimulateCallRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.token.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let call_type = req.call_type.unwrap_or_else(|| "voice".into());
    let caller_name = req.caller_name.unwrap_or_else(|| "Unknown".into());
    let call_id = format!("call_{}", Uuid::new_v4().simple());

    // Same payload shape the client classifies as a call.
    let data: HashMap<String, String> = [
        ("type".to_string(), "call".to_string()),
        ("callType".to_string(), call_type.clone()),
        ("callerName".to_string(), caller_name.clone()),
        ("callId".to_string(), call_id.clone()),
        ("chatId".to_string(), format!("chat_{}", caller_name.to_lowercase())),
        ("sender".to_string(), caller_name.clone()),
    ]
    .into_iter()
    .collect();

    let entry = SentNotification {
        id: Uuid::new_v4(),
        kind: DeliveryKind::Call,
        target: req.token.clone(),
        title: format!("{} call", capitalize(&call_type)),
        body: format!("Incoming {call_type} call from {caller_name}"),
        data,
        sent_at: Utc::now(),
    };
    state.registry.record(entry.clone()).await;

    info!(target = %abbreviate(&req.token), caller = %caller_name, "call notification recorded");
    Ok(Json(SimulateCallResponse {
        message: "Call notification sent successfully".into(),
        notification_id: entry.id,
        call_id,
    }))
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let (notifications, total) = state.registry.history(query.limit.min(200), query.kind).await;
    let count = notifications.len();
    Json(HistoryResponse {
        notifications,
        count,
        total,
    })
}

pub async fn clear_history(State(state): State<AppState>) -> Json<ClearedResponse> {
    let cleared = state.registry.clear_history().await;
    info!(cleared, "notification history cleared");
    Json(ClearedResponse {
        message: "Notification history cleared".into(),
        cleared,
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (devices, notifications_sent) = state.registry.counts().await;
    Json(HealthResponse {
        status: "healthy".into(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
        devices,
        notifications_sent,
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
