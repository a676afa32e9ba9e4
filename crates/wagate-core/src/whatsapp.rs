//! WhatsApp capability traits
//!
//! The campaign core touches the WhatsApp subsystem through exactly two
//! seams: a per-device client capable of sending text and probing account
//! existence, and a registry resolving device ids to clients. The
//! protocol implementation registers clients here after QR login; the
//! core never retains a client handle beyond a single operation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use wagate_common::Result;

/// A logged-in (or logged-out) WhatsApp session for one device
#[async_trait]
pub trait WhatsAppClient: Send + Sync {
    /// Whether the session currently holds a usable login
    fn is_logged_in(&self) -> bool;

    /// Send a text message; `phone` is digits without the `+` prefix.
    /// Returns the provider message id.
    async fn send_text(&self, phone: &str, message: &str) -> Result<String>;

    /// Whether an account exists on the network for the given JID
    async fn is_on_network(&self, jid: &str) -> Result<bool>;
}

/// Resolves device ids to their client sessions
pub trait DeviceRegistry: Send + Sync {
    fn get_device(&self, device_id: &str) -> Option<Arc<dyn WhatsAppClient>>;
}

/// Build the network JID for a phone number
pub fn network_jid(phone: &str) -> String {
    format!("{}@s.whatsapp.net", phone.trim_start_matches('+'))
}

/// Registry of connected device clients.
///
/// The device lifecycle (QR login, reconnects) lives outside the core;
/// it calls [`DeviceManager::register`] and [`DeviceManager::unregister`]
/// as sessions come and go.
#[derive(Default)]
pub struct DeviceManager {
    clients: RwLock<HashMap<String, Arc<dyn WhatsAppClient>>>,
}

impl DeviceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, device_id: impl Into<String>, client: Arc<dyn WhatsAppClient>) {
        self.clients
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(device_id.into(), client);
    }

    pub fn unregister(&self, device_id: &str) {
        self.clients
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(device_id);
    }

    pub fn device_ids(&self) -> Vec<String> {
        self.clients
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

impl DeviceRegistry for DeviceManager {
    fn get_device(&self, device_id: &str) -> Option<Arc<dyn WhatsAppClient>> {
        self.clients
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(device_id)
            .cloned()
    }
}
