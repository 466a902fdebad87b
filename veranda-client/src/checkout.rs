use crate::gateway::{ApiGateway, GatewayError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use url::Url;
use veranda_core::booking::{BookingDraft, BookingError, GuestContact, Meal, RoomFacilities};
use veranda_core::payment::PaymentOrder;
use veranda_core::pricing::PriceBreakdown;
use veranda_store::app_config::GatewayConfig;

pub const ORDER_ENDPOINT: &str = "/payment/get-order";

/// Creates the gateway order and prepares the hosted widget handoff.
///
/// The widget must never open without a confirmed backend order: any
/// failure before that point returns an error and nothing external
/// happens.
pub struct CheckoutInitiator {
    gateway: Arc<ApiGateway>,
    config: GatewayConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Contact(#[from] BookingError),

    #[error("Booking total must be positive, got {0}")]
    InvalidTotal(i64),

    #[error("Order creation rejected: {0}")]
    OrderCreationFailed(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Could not build redirect URL: {0}")]
    InvalidRedirect(String),
}

/// Order creation payload, field-for-field what the backend expects.
#[derive(Debug, Serialize)]
struct OrderPayload<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    address: &'a str,
    room_id: &'a str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: GuestCounts,
    pricing: &'a PriceBreakdown,
    room_facilities: &'a RoomFacilities,
    food_inclusions: &'a [Meal],
    rooms: u32,
}

#[derive(Debug, Serialize)]
struct GuestCounts {
    adults: u32,
    children: u32,
    infants: u32,
    total: u32,
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<PaymentOrder>,
}

/// Configuration handed to the hosted checkout widget.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WidgetOptions {
    pub key: String,
    pub amount: i64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub callback_url: String,
    pub prefill: WidgetPrefill,
    pub notes: WidgetNotes,
    pub theme: WidgetTheme,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WidgetPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WidgetNotes {
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub rooms: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WidgetTheme {
    pub color: String,
}

impl CheckoutInitiator {
    pub fn new(gateway: Arc<ApiGateway>, config: GatewayConfig) -> Self {
        Self { gateway, config }
    }

    /// Create the gateway order for this draft and return the widget
    /// configuration to open it with.
    pub async fn begin(
        &self,
        draft: &BookingDraft,
        contact: &GuestContact,
    ) -> Result<WidgetOptions, CheckoutError> {
        contact.validate()?;
        if draft.price.total_amount <= 0 {
            return Err(CheckoutError::InvalidTotal(draft.price.total_amount));
        }

        let payload = OrderPayload {
            name: &contact.name,
            email: &contact.email,
            phone: &contact.phone,
            address: &contact.address,
            room_id: &draft.room_id,
            check_in: draft.stay.check_in,
            check_out: draft.stay.check_out,
            guests: GuestCounts {
                adults: draft.occupancy.adults,
                children: draft.occupancy.children,
                infants: draft.occupancy.infants,
                total: draft.occupancy.total_guests(),
            },
            pricing: &draft.price,
            room_facilities: &draft.room.facilities,
            food_inclusions: &draft.food_inclusions,
            rooms: draft.occupancy.rooms,
        };

        let response = self.gateway.post_json(ORDER_ENDPOINT, &payload).await?;
        if !response.status().is_success() {
            return Err(CheckoutError::OrderCreationFailed(format!(
                "backend returned {}",
                response.status()
            )));
        }

        let envelope: OrderEnvelope = response.json().await.map_err(GatewayError::Transport)?;
        let order = match (envelope.success, envelope.data) {
            (true, Some(order)) => order,
            _ => {
                return Err(CheckoutError::OrderCreationFailed(
                    envelope
                        .message
                        .unwrap_or_else(|| "Failed to create payment order".to_string()),
                ))
            }
        };

        info!(order_id = %order.id, amount = order.amount, "Payment order created");
        self.widget_options(draft, contact, &order)
    }

    fn widget_options(
        &self,
        draft: &BookingDraft,
        contact: &GuestContact,
        order: &PaymentOrder,
    ) -> Result<WidgetOptions, CheckoutError> {
        // The redirect URL is the only channel carrying the order
        // reference to the result page
        let mut callback = Url::parse(&format!("{}/payment-success", self.config.redirect_base))
            .map_err(|e| CheckoutError::InvalidRedirect(e.to_string()))?;
        callback
            .query_pairs_mut()
            .append_pair("order_id", &order.id);

        Ok(WidgetOptions {
            key: self.config.merchant_key.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            name: self.config.display_name.clone(),
            description: format!("Booking for {}", draft.room.room_type),
            order_id: order.id.clone(),
            callback_url: callback.into(),
            prefill: WidgetPrefill {
                name: contact.name.clone(),
                email: contact.email.clone(),
                contact: contact.phone.clone(),
            },
            notes: WidgetNotes {
                room_id: draft.room_id.clone(),
                check_in: draft.stay.check_in,
                check_out: draft.stay.check_out,
                guests: draft.occupancy.total_guests(),
                rooms: draft.occupancy.rooms,
            },
            theme: WidgetTheme {
                color: self.config.theme_color.clone(),
            },
        })
    }
}

/// The hosted checkout widget. Its internals (card entry, 3DS, the
/// actual charge) are the provider's; the engine only hands over the
/// options and gets the user back via the callback URL.
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    async fn open(&self, options: WidgetOptions) -> Result<(), WidgetError>;
}

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("Payment widget failed to open: {0}")]
    OpenFailed(String),
}

/// Headless stand-in that records the handoff in the log. Real hosts
/// bridge `PaymentWidget` to the provider's SDK.
pub struct LoggingWidget;

#[async_trait]
impl PaymentWidget for LoggingWidget {
    async fn open(&self, options: WidgetOptions) -> Result<(), WidgetError> {
        info!(
            order_id = %options.order_id,
            amount = options.amount,
            currency = %options.currency,
            callback_url = %options.callback_url,
            "Opening hosted payment widget"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veranda_core::booking::{MealPlan, Occupancy, RoomSnapshot, Stay};
    use veranda_core::pricing::{quote, FeeSchedule};

    fn sample_draft() -> BookingDraft {
        let stay = Stay {
            check_in: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
        };
        let occupancy = Occupancy {
            adults: 2,
            children: 1,
            infants: 0,
            rooms: 1,
        };
        let price = quote(2000, stay.check_in, stay.check_out, 1, &FeeSchedule::default()).unwrap();
        let room = RoomSnapshot {
            room_type: "Deluxe Suite".to_string(),
            facilities: RoomFacilities::default(),
            meal_plan: MealPlan::default(),
            image_refs: vec![],
        };
        BookingDraft::new("room-42".to_string(), room, stay, occupancy, price).unwrap()
    }

    fn sample_config() -> GatewayConfig {
        serde_json::from_value(serde_json::json!({
            "merchant_key": "rzp_test_key",
            "currency": "INR",
            "display_name": "Veranda Stays",
            "theme_color": "#3399cc",
            "redirect_base": "http://localhost:5173"
        }))
        .unwrap()
    }

    fn sample_contact() -> GuestContact {
        GuestContact {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "12 Hill Road, Pune".to_string(),
        }
    }

    #[test]
    fn test_callback_url_carries_order_reference() {
        let gateway = Arc::new(ApiGateway::new("http://localhost:8000").unwrap());
        let initiator = CheckoutInitiator::new(gateway, sample_config());
        let order = PaymentOrder {
            id: "order_abc123".to_string(),
            amount: 4720,
            currency: "INR".to_string(),
        };

        let options = initiator
            .widget_options(&sample_draft(), &sample_contact(), &order)
            .unwrap();

        assert_eq!(
            options.callback_url,
            "http://localhost:5173/payment-success?order_id=order_abc123"
        );
        assert_eq!(options.order_id, "order_abc123");
        assert_eq!(options.amount, 4720);
        assert_eq!(options.prefill.contact, "+91 98765 43210");
    }

    #[test]
    fn test_widget_amount_is_the_backend_amount() {
        // The backend's figure wins even when it disagrees with the
        // client-side breakdown
        let gateway = Arc::new(ApiGateway::new("http://localhost:8000").unwrap());
        let initiator = CheckoutInitiator::new(gateway, sample_config());
        let draft = sample_draft();
        let order = PaymentOrder {
            id: "order_x".to_string(),
            amount: draft.price.total_amount + 10,
            currency: "INR".to_string(),
        };

        let options = initiator
            .widget_options(&draft, &sample_contact(), &order)
            .unwrap();
        assert_eq!(options.amount, draft.price.total_amount + 10);
    }
}
