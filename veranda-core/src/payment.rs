use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Settlement state reported by the backend for a gateway order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Processing,
    Success,
    Failed,
    Pending,
}

impl PaymentStatus {
    /// Settled states stop the poll loop; pending/processing keep it going.
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Failed)
    }
}

/// Gateway order created by the backend. Opaque to the client: the id
/// is whatever token the payment provider issued, the amount is in
/// minor units and is the authoritative charge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Settlement details retained for the confirmation screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settlement {
    pub order_id: String,
    pub amount_paid: i64,
    pub settled_at: DateTime<Utc>,
}

/// Terminal result of the payment wait.
///
/// `PendingTimeout` is not a failure: funds may already be held and
/// settlement merely delayed. Callers must present it with a manual
/// re-check action, never as a declined payment.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Success(Settlement),
    Failed { reason: Option<String> },
    PendingTimeout,
}
