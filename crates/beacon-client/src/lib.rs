//! Beacon client: the push notification lifecycle manager.
//!
//! Bridges inbound push deliveries — foreground, background, and
//! opened/quit-state — into a persisted notification log, a badge
//! counter, and in-process events for the presentation layer:
//! - `NotificationCenter`: single owner of the log and counter
//! - `PushProvider`: capability trait over the delivery service
//! - `EventBus`: callback registry with explicit subscription handles
//! - `run_delivery_loop`: drives deliveries through the center one at
//!   a time

pub mod bus;
pub mod center;
pub mod error;
pub mod provider;

pub use bus::{EventBus, SubscriptionId};
pub use center::{NotificationCenter, Registration, run_delivery_loop};
pub use error::{SubscriptionError, TokenError};
pub use provider::{PushProvider, StaticProvider};
