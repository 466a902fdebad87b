use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;
use veranda_client::{
    ApiGateway, BookingFlow, CheckoutInitiator, FlowError, LoggingWidget, StatusPoller,
};
use veranda_core::booking::{GuestContact, MealPlan, Occupancy, RoomFacilities, RoomSnapshot, Stay};
use veranda_core::payment::PaymentOutcome;
use veranda_store::app_config::Config;
use veranda_store::draft_repo::{DraftStore, SessionDraftStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veranda=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Veranda booking engine targeting {}", config.api.base_url);

    let gateway =
        Arc::new(ApiGateway::new(&config.api.base_url).expect("Failed to build API gateway"));
    let store: Arc<dyn DraftStore> = Arc::new(SessionDraftStore::new());
    let checkout = CheckoutInitiator::new(Arc::clone(&gateway), config.gateway.clone());
    let poller = StatusPoller::with_timing(
        Arc::clone(&gateway),
        Duration::from_secs(config.polling.interval_seconds),
        Duration::from_secs(config.polling.deadline_seconds),
    );
    let flow = BookingFlow::new(store, checkout, Arc::new(LoggingWidget), poller);

    // Drive one booking end-to-end against the configured backend:
    // room page -> checkout page -> result page.
    let today = Utc::now().date_naive();
    let stay = Stay {
        check_in: today + ChronoDuration::days(7),
        check_out: today + ChronoDuration::days(9),
    };
    let occupancy = Occupancy {
        adults: 2,
        children: 0,
        infants: 0,
        rooms: 1,
    };
    let room = RoomSnapshot {
        room_type: "Deluxe Suite".to_string(),
        facilities: RoomFacilities {
            air_conditioned: true,
            bed_count: 2,
            hot_water: true,
            minibar: false,
        },
        meal_plan: MealPlan {
            breakfast: true,
            lunch: false,
            dinner: false,
        },
        image_refs: vec!["rooms/deluxe-1.jpg".to_string()],
    };
    let contact = GuestContact {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "+91 98765 43210".to_string(),
        address: "12 Hill Road, Pune".to_string(),
    };

    let fees = config.fees.schedule();
    let draft = match flow
        .prepare("room-42".to_string(), room, stay, occupancy, 200_000, &fees)
        .await
    {
        Ok(draft) => draft,
        Err(err) => {
            tracing::error!("Could not prepare booking: {}", err);
            return;
        }
    };
    tracing::info!(
        "Quoted {} nights at {} = {} {}",
        draft.price.nights,
        draft.price.base_price,
        draft.price.total_amount,
        config.gateway.currency
    );

    let options = match flow.checkout(&contact).await {
        Ok(options) => options,
        Err(FlowError::MissingDraft) => {
            tracing::warn!("No draft present, returning to room selection");
            return;
        }
        Err(err) => {
            tracing::error!("Checkout failed: {}", err);
            return;
        }
    };

    // The gateway would redirect the user here after payment
    let redirect = match Url::parse(&options.callback_url) {
        Ok(url) => url,
        Err(err) => {
            tracing::error!("Bad callback URL: {}", err);
            return;
        }
    };

    let handle = match flow.confirm(&redirect) {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!("Cannot verify payment: {}", err);
            return;
        }
    };

    match handle.outcome().await {
        Some(PaymentOutcome::Success(settlement)) => {
            tracing::info!(
                "Payment confirmed: order {} settled {} at {}",
                settlement.order_id,
                settlement.amount_paid,
                settlement.settled_at
            );
        }
        Some(PaymentOutcome::Failed { reason }) => {
            tracing::warn!(
                "Payment failed: {}",
                reason.unwrap_or_else(|| "no reason given".to_string())
            );
        }
        Some(PaymentOutcome::PendingTimeout) => {
            // Not a failure: funds may be held while settlement lags
            tracing::warn!(
                "Payment still processing after the deadline; re-check the order status manually"
            );
        }
        None => {
            tracing::info!("Payment verification was cancelled");
        }
    }
}
