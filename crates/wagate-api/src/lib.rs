//! WAGate API - HTTP surface for the campaign core
//!
//! The REST layer over the campaign service: customer, group, template,
//! and campaign CRUD, the CSV import endpoint, and the short-URL
//! redirector. The production session layer sits in front of this
//! router; device scoping here resolves the `X-Device-ID` header against
//! the device registry.

pub mod context;
pub mod handlers;
pub mod routes;

pub use context::{AppState, DeviceContext};
pub use routes::create_router;
