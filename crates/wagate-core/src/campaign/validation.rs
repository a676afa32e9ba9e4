//! Customer validation
//!
//! Classifies customers along two axes: phone format (the shared phone
//! rule) and account existence on the network (probed through the
//! device's client). On-demand entry points serve the API; a background
//! worker drains small batches per device on a slow cadence.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info, warn};
use uuid::Uuid;
use wagate_common::types::ValidationStatus;
use wagate_common::validation::validate_phone_number;
use wagate_common::{Error, Result};
use wagate_storage::models::Customer;
use wagate_storage::CampaignStore;

use crate::whatsapp::{network_jid, DeviceRegistry, WhatsAppClient};

use super::CampaignService;

/// Seconds between background validation passes
const TICK_SECS: u64 = 30;

/// Customers processed per device per background pass
const BATCH_PER_DEVICE: i64 = 10;

/// Cap for one on-demand bulk validation call
const BULK_LIMIT: i64 = 1000;

/// Pause between consecutive network probes in a bulk run
const PROBE_PAUSE: Duration = Duration::from_millis(100);

/// Classify the phone format with the shared rule
fn classify_phone(phone: &str) -> ValidationStatus {
    if validate_phone_number(phone).is_ok() {
        ValidationStatus::Valid
    } else {
        ValidationStatus::Invalid
    }
}

/// Probe account existence; `None` means the probe could not run
async fn probe_network(
    client: &Arc<dyn WhatsAppClient>,
    phone: &str,
) -> Option<ValidationStatus> {
    let jid = network_jid(phone);
    match client.is_on_network(&jid).await {
        Ok(true) => Some(ValidationStatus::Valid),
        Ok(false) => Some(ValidationStatus::Invalid),
        Err(e) => {
            warn!(jid = %jid, error = %e, "Network existence probe failed");
            None
        }
    }
}

impl CampaignService {
    /// Validate a single customer now.
    ///
    /// The network check runs only when the format check passed and a
    /// logged-in client exists for the device; otherwise the field stays
    /// pending.
    pub async fn validate_customer(&self, device_id: &str, id: Uuid) -> Result<()> {
        let customer = self
            .store()
            .get_customer(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("customer not found".to_string()))?;

        let phone_valid = classify_phone(&customer.phone);

        let mut network_exists = ValidationStatus::Pending;
        if phone_valid == ValidationStatus::Valid {
            if let Some(client) = self.devices().get_device(device_id) {
                if client.is_logged_in() {
                    if let Some(status) = probe_network(&client, &customer.phone).await {
                        network_exists = status;
                    }
                }
            }
        }

        self.store()
            .update_customer_validation(id, phone_valid, network_exists)
            .await?;

        info!(
            customer_id = %id,
            phone = %customer.phone,
            phone_valid = %phone_valid,
            network_exists = %network_exists,
            "Customer validated"
        );

        Ok(())
    }

    /// Validate pending customers for a device in one bounded pass.
    ///
    /// Processes at most 1000 customers; callers repeat to drain larger
    /// backlogs. Requires a connected client.
    pub async fn validate_pending_customers(&self, device_id: &str) -> Result<usize> {
        let customers = self
            .store()
            .customers_for_validation(device_id, BULK_LIMIT)
            .await?;

        if customers.is_empty() {
            return Ok(0);
        }

        let client = self
            .devices()
            .get_device(device_id)
            .filter(|c| c.is_logged_in())
            .ok_or_else(|| {
                Error::DeviceNotConnected("whatsapp client not connected".to_string())
            })?;

        info!(
            device_id = %device_id,
            count = customers.len(),
            "Starting bulk validation"
        );

        let total = customers.len();
        for customer in customers {
            let phone_valid = classify_phone(&customer.phone);

            let mut network_exists = ValidationStatus::Pending;
            if phone_valid == ValidationStatus::Valid {
                if let Some(status) = probe_network(&client, &customer.phone).await {
                    network_exists = status;
                }
            }

            if let Err(e) = self
                .store()
                .update_customer_validation(customer.id, phone_valid, network_exists)
                .await
            {
                error!(customer_id = %customer.id, error = %e, "Failed to update customer validation");
            }

            // Spacing between probes keeps the provider rate limiter quiet
            tokio::time::sleep(PROBE_PAUSE).await;
        }

        info!(device_id = %device_id, "Bulk validation completed");
        Ok(total)
    }
}

struct WorkerState {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Background validation worker.
///
/// Slow loop visiting each device with queued work, classifying a small
/// batch of customers per pass. Per-customer errors are logged, never
/// fatal to the loop.
pub struct ValidationWorker {
    inner: Arc<ValidationInner>,
    state: Mutex<Option<WorkerState>>,
}

struct ValidationInner {
    store: Arc<dyn CampaignStore>,
    devices: Arc<dyn DeviceRegistry>,
}

impl ValidationWorker {
    pub fn new(store: Arc<dyn CampaignStore>, devices: Arc<dyn DeviceRegistry>) -> Self {
        Self {
            inner: Arc::new(ValidationInner { store, devices }),
            state: Mutex::new(None),
        }
    }

    /// Spawn the worker loop; a no-op if it is already running
    pub async fn start(&self) {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.as_ref() {
            if !existing.handle.is_finished() {
                info!("Validation worker already running");
                return;
            }
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let inner = Arc::clone(&self.inner);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(TICK_SECS));
            info!("Validation worker started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        info!("Validation worker stopping");
                        return;
                    }
                    _ = ticker.tick() => {
                        inner.process_batch().await;
                    }
                }
            }
        });

        *state = Some(WorkerState {
            shutdown: shutdown_tx,
            handle,
        });
    }

    /// Stop the worker and wait for the loop to exit
    pub async fn stop(&self) {
        let state = self.state.lock().await.take();
        if let Some(state) = state {
            let _ = state.shutdown.send(true);
            if let Err(e) = state.handle.await {
                error!(error = %e, "Validation worker task failed");
            }
            info!("Validation worker stopped");
        }
    }
}

impl ValidationInner {
    async fn process_batch(&self) {
        let device_ids = match self.store.active_device_ids().await {
            Ok(ids) => ids,
            Err(_) => return,
        };

        for device_id in device_ids {
            let customers = match self
                .store
                .customers_for_validation(&device_id, BATCH_PER_DEVICE)
                .await
            {
                Ok(customers) => customers,
                Err(_) => continue,
            };

            let client = self.devices.get_device(&device_id);

            for customer in customers {
                self.validate_one(&client, &customer).await;
            }
        }
    }

    async fn validate_one(
        &self,
        client: &Option<Arc<dyn WhatsAppClient>>,
        customer: &Customer,
    ) {
        let phone_valid = classify_phone(&customer.phone);

        // Without a usable client the prior classification stands
        let mut network_exists = ValidationStatus::from_str(&customer.network_exists)
            .unwrap_or(ValidationStatus::Pending);
        if phone_valid == ValidationStatus::Valid {
            if let Some(client) = client.as_ref().filter(|c| c.is_logged_in()) {
                if let Some(status) = probe_network(client, &customer.phone).await {
                    network_exists = status;
                }
            }
        }

        if let Err(e) = self
            .store
            .update_customer_validation(customer.id, phone_valid, network_exists)
            .await
        {
            error!(customer_id = %customer.id, error = %e, "Failed to update customer validation");
        }
    }
}
