//! WAGate Core - Campaign engine
//!
//! This crate provides the campaign business logic for WAGate: customer,
//! group, template, and campaign usecases, the template expansion and URL
//! shortening pipeline, the paced dispatch worker, and the customer
//! validation worker. The WhatsApp subsystem is consumed only through the
//! narrow capability traits in [`whatsapp`].

pub mod campaign;
pub mod whatsapp;

pub use campaign::dispatch::DispatchWorker;
pub use campaign::validation::ValidationWorker;
pub use campaign::CampaignService;
pub use whatsapp::{DeviceManager, DeviceRegistry, WhatsAppClient};
