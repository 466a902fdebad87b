use crate::gateway::{ApiGateway, GatewayError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use url::Url;
use veranda_core::payment::{PaymentOutcome, PaymentStatus, Settlement};

pub const VERIFY_ENDPOINT: &str = "/payment/status/verify-payment";

const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Recover the order reference from the gateway redirect URL. This is
/// the only state the result page has; without it there is nothing to
/// poll.
pub fn order_ref_from_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "order_id")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Redirect URL carries no order reference")]
    MissingOrderRef,
}

#[derive(Debug, Deserialize)]
struct VerifyEnvelope {
    data: VerifyData,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: PaymentStatus,
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    order_response: Option<OrderResponse>,
    #[serde(default, rename = "createdAt")]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    amount_paid: i64,
}

/// Polls the backend for settlement of a gateway order.
///
/// One task, one `select!` over the cancel signal, the deadline and
/// the interval tick, so reaching any terminal state tears down every
/// timer at once. A failed individual poll keeps the loop alive: a
/// network blip must not read as a declined payment.
pub struct StatusPoller {
    gateway: Arc<ApiGateway>,
    interval: Duration,
    deadline: Duration,
}

impl StatusPoller {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self::with_timing(gateway, DEFAULT_INTERVAL, DEFAULT_DEADLINE)
    }

    pub fn with_timing(gateway: Arc<ApiGateway>, interval: Duration, deadline: Duration) -> Self {
        Self {
            gateway,
            interval,
            deadline,
        }
    }

    pub fn spawn(&self, order_id: String) -> PollHandle {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let gateway = Arc::clone(&self.gateway);
        let interval = self.interval;
        let deadline_after = self.deadline;

        let task = tokio::spawn(async move {
            let deadline = tokio::time::sleep(deadline_after);
            tokio::pin!(deadline);

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick resolves immediately; burn it so polls
            // start one interval in
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel_rx.changed() => {
                        info!(%order_id, "Payment poll torn down");
                        return None;
                    }
                    _ = &mut deadline => {
                        info!(%order_id, "Settlement deadline elapsed, payment still pending");
                        return Some(PaymentOutcome::PendingTimeout);
                    }
                    _ = ticker.tick() => {
                        match check_status(&gateway, &order_id).await {
                            Ok(Some(outcome)) => return Some(outcome),
                            Ok(None) => {}
                            Err(err) => {
                                warn!(%order_id, error = %err, "Status poll failed, will retry");
                            }
                        }
                    }
                }
            }
        });

        PollHandle { cancel_tx, task }
    }
}

async fn check_status(
    gateway: &ApiGateway,
    order_id: &str,
) -> Result<Option<PaymentOutcome>, GatewayError> {
    let path = format!("{}?order_id={}", VERIFY_ENDPOINT, order_id);
    let response = gateway.get(&path).await?;
    let envelope: VerifyEnvelope = response.json().await?;

    match envelope.data.status {
        PaymentStatus::Success => {
            let settlement = Settlement {
                order_id: envelope
                    .data
                    .order_id
                    .unwrap_or_else(|| order_id.to_string()),
                amount_paid: envelope
                    .data
                    .order_response
                    .map(|r| r.amount_paid)
                    .unwrap_or_default(),
                settled_at: envelope.data.created_at.unwrap_or_else(Utc::now),
            };
            info!(%order_id, amount_paid = settlement.amount_paid, "Payment settled");
            Ok(Some(PaymentOutcome::Success(settlement)))
        }
        PaymentStatus::Failed => {
            info!(%order_id, "Payment settled as failed");
            Ok(Some(PaymentOutcome::Failed {
                reason: envelope.message,
            }))
        }
        PaymentStatus::Pending | PaymentStatus::Processing => Ok(None),
    }
}

/// Handle to a running poll. Dropping it does not stop the task; call
/// `cancel` on teardown.
pub struct PollHandle {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<Option<PaymentOutcome>>,
}

impl PollHandle {
    /// Stop the poll. Idempotent: cancelling twice, or after the poll
    /// has already settled, is a no-op.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Wait for the poll to finish. `None` means it was torn down
    /// before reaching a terminal state.
    pub async fn outcome(self) -> Option<PaymentOutcome> {
        self.task.await.unwrap_or(None)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_ref_extracted_from_redirect_url() {
        let url =
            Url::parse("http://localhost:5173/payment-success?order_id=order_abc123").unwrap();
        assert_eq!(order_ref_from_url(&url), Some("order_abc123".to_string()));
    }

    #[test]
    fn test_missing_or_empty_order_ref_is_none() {
        let no_param = Url::parse("http://localhost:5173/payment-success").unwrap();
        assert_eq!(order_ref_from_url(&no_param), None);

        let empty = Url::parse("http://localhost:5173/payment-success?order_id=").unwrap();
        assert_eq!(order_ref_from_url(&empty), None);
    }

    #[test]
    fn test_verify_envelope_decodes_backend_shape() {
        let raw = r#"{
            "data": {
                "status": "success",
                "order_id": "order_abc123",
                "order_response": { "amount_paid": 4897, "method": "upi" },
                "createdAt": "2024-03-10T12:30:00Z"
            }
        }"#;
        let envelope: VerifyEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.data.status, PaymentStatus::Success);
        assert_eq!(envelope.data.order_response.unwrap().amount_paid, 4897);
    }
}
