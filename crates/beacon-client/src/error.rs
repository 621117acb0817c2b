use thiserror::Error;

/// The delivery service could not issue a registration token.
///
/// Retryable: the next `initialize()` attempts the fetch again.
#[derive(Debug, Clone, Error)]
#[error("registration token unavailable: {0}")]
pub struct TokenError(pub String);

/// A topic subscription change was rejected by the delivery service.
/// Local state is never touched by a failed subscription call.
#[derive(Debug, Clone, Error)]
#[error("topic '{topic}' subscription change failed: {reason}")]
pub struct SubscriptionError {
    pub topic: String,
    pub reason: String,
}
