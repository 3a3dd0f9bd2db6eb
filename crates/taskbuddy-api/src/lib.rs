pub mod devices;
pub mod notify;
pub mod state;
pub mod webhook;
