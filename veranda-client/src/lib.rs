pub mod checkout;
pub mod flow;
pub mod gateway;
pub mod poller;

pub use checkout::{CheckoutError, CheckoutInitiator, LoggingWidget, PaymentWidget, WidgetOptions};
pub use flow::{BookingFlow, FlowError};
pub use gateway::{ApiGateway, GatewayError};
pub use poller::{order_ref_from_url, PollError, PollHandle, StatusPoller};
