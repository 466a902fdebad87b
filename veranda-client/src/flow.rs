use crate::checkout::{CheckoutError, CheckoutInitiator, PaymentWidget, WidgetError, WidgetOptions};
use crate::poller::{order_ref_from_url, PollError, PollHandle, StatusPoller};
use std::sync::Arc;
use tracing::info;
use url::Url;
use veranda_core::booking::{BookingDraft, BookingError, GuestContact, Occupancy, RoomSnapshot, Stay};
use veranda_core::pricing::{self, FeeSchedule, PricingError};
use veranda_store::draft_repo::{DraftStore, DraftStoreError};

/// Composes the booking pipeline: quote, draft, order, widget, poll.
///
/// Each method is one page of the flow. `prepare` runs on the room
/// page, `checkout` on the checkout page, `confirm` on the result
/// page the gateway redirects back to.
pub struct BookingFlow {
    store: Arc<dyn DraftStore>,
    checkout: CheckoutInitiator,
    widget: Arc<dyn PaymentWidget>,
    poller: StatusPoller,
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Recoverable: the caller navigates back to room selection
    /// instead of rendering an error.
    #[error("No booking draft is present")]
    MissingDraft,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Draft(#[from] DraftStoreError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Widget(#[from] WidgetError),

    #[error(transparent)]
    Poll(#[from] PollError),
}

impl BookingFlow {
    pub fn new(
        store: Arc<dyn DraftStore>,
        checkout: CheckoutInitiator,
        widget: Arc<dyn PaymentWidget>,
        poller: StatusPoller,
    ) -> Self {
        Self {
            store,
            checkout,
            widget,
            poller,
        }
    }

    /// Quote the stay and persist the draft for the checkout page.
    pub async fn prepare(
        &self,
        room_id: String,
        room: RoomSnapshot,
        stay: Stay,
        occupancy: Occupancy,
        nightly_rate: i64,
        fees: &FeeSchedule,
    ) -> Result<BookingDraft, FlowError> {
        let price = pricing::quote(nightly_rate, stay.check_in, stay.check_out, occupancy.rooms, fees)?;
        let draft = BookingDraft::new(room_id, room, stay, occupancy, price)?;
        self.store.save(&draft).await?;
        info!(draft_id = %draft.id, room_id = %draft.room_id, total = draft.price.total_amount,
            "Booking draft stored");
        Ok(draft)
    }

    /// Read the draft back, create the gateway order and open the
    /// widget. The widget only opens after the backend confirms the
    /// order.
    pub async fn checkout(&self, contact: &GuestContact) -> Result<WidgetOptions, FlowError> {
        let draft = self.store.load().await.ok_or(FlowError::MissingDraft)?;
        let options = self.checkout.begin(&draft, contact).await?;
        self.widget.open(options.clone()).await?;
        Ok(options)
    }

    /// Result-page entry: pull the order reference out of the redirect
    /// URL and start polling for settlement.
    pub fn confirm(&self, redirect_url: &Url) -> Result<PollHandle, FlowError> {
        let order_id = order_ref_from_url(redirect_url).ok_or(PollError::MissingOrderRef)?;
        info!(%order_id, "Polling for payment settlement");
        Ok(self.poller.spawn(order_id))
    }
}
