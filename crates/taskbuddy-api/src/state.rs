use std::sync::Arc;

use taskbuddy_db::Database;
use taskbuddy_push::{Dispatcher, ExpoRelay};

/// Shared application state for all route handlers. The registry store is
/// passed in explicitly; there is no module-level singleton.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub dispatcher: Dispatcher<ExpoRelay>,
}
