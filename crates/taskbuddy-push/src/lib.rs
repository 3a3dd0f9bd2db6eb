pub mod compose;
pub mod dispatch;
pub mod relay;
pub mod report;

pub use compose::{Notification, compose};
pub use dispatch::{DeliveryOutcome, Dispatcher};
pub use relay::{DeliveryError, ExpoRelay, PushRelay};
pub use report::DispatchReport;
