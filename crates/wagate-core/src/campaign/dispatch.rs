//! Dispatch worker
//!
//! Tick-driven loop draining the outbound queue: every 10 seconds it
//! visits each device owning pending items, sends at most one message
//! per device, and pauses a jittered delay between consecutive sends on
//! the same device. Failures are terminal per queue item; there is no
//! automatic retry.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use wagate_common::config::CampaignConfig;
use wagate_common::types::MessageStatus;
use wagate_storage::models::QueueItem;
use wagate_storage::CampaignStore;

use crate::whatsapp::DeviceRegistry;

/// Seconds between queue passes
const TICK_SECS: u64 = 10;

/// Pick a uniform random delay within the configured jitter range
fn random_delay(min_secs: u64, max_secs: u64) -> Duration {
    if min_secs >= max_secs {
        return Duration::from_secs(min_secs);
    }
    Duration::from_secs(rand::thread_rng().gen_range(min_secs..=max_secs))
}

struct WorkerState {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Paced outbound queue worker.
///
/// `start` is idempotent; `stop` signals the loop and awaits its task,
/// letting any in-flight send record its terminal status first.
pub struct DispatchWorker {
    inner: Arc<DispatchInner>,
    state: Mutex<Option<WorkerState>>,
}

struct DispatchInner {
    store: Arc<dyn CampaignStore>,
    devices: Arc<dyn DeviceRegistry>,
    config: CampaignConfig,
}

impl DispatchWorker {
    pub fn new(
        store: Arc<dyn CampaignStore>,
        devices: Arc<dyn DeviceRegistry>,
        config: CampaignConfig,
    ) -> Self {
        Self {
            inner: Arc::new(DispatchInner {
                store,
                devices,
                config,
            }),
            state: Mutex::new(None),
        }
    }

    /// Spawn the worker loop; a no-op if it is already running
    pub async fn start(&self) {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.as_ref() {
            if !existing.handle.is_finished() {
                info!("Dispatch worker already running");
                return;
            }
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let inner = Arc::clone(&self.inner);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(TICK_SECS));
            info!("Dispatch worker started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        info!("Dispatch worker stopping");
                        return;
                    }
                    _ = ticker.tick() => {
                        inner.process_batch(&mut shutdown_rx).await;
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
                error!(error = %e, "Dispatch worker task failed");
            }
            info!("Dispatch worker stopped");
        }
    }
}

impl DispatchInner {
    /// One queue pass: at most one send per device with pending work
    async fn process_batch(&self, shutdown: &mut watch::Receiver<bool>) {
        let device_ids = match self.store.active_device_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "Failed to get active device ids");
                return;
            }
        };

        if device_ids.is_empty() {
            return;
        }

        debug!(devices = ?device_ids, "Processing queue for devices");

        for device_id in device_ids {
            if *shutdown.borrow() {
                return;
            }

            let messages = match self.store.pending_messages(&device_id, 1).await {
                Ok(messages) => messages,
                Err(e) => {
                    error!(device_id = %device_id, error = %e, "Failed to get pending messages");
                    continue;
                }
            };

            for message in messages {
                if *shutdown.borrow() {
                    return;
                }

                let sent = self.send_message(&message).await;

                // A device-side refusal skips the pacing delay; only an
                // actual send attempt spaces out the next one
                if sent {
                    let delay =
                        random_delay(self.config.min_delay_secs, self.config.max_delay_secs);
                    debug!(device_id = %device_id, delay_secs = delay.as_secs(), "Pacing delay before next message");

                    tokio::select! {
                        _ = shutdown.changed() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Attempt one queue item. Returns whether a send was attempted
    /// against the network (and thus whether the pacing delay applies).
    async fn send_message(&self, item: &QueueItem) -> bool {
        info!(
            message_id = %item.id,
            campaign_id = %item.campaign_id,
            phone = %item.phone,
            device_id = %item.device_id,
            "Sending campaign message"
        );

        if let Err(e) = self
            .store
            .update_message_status(item.id, MessageStatus::Sending, None)
            .await
        {
            error!(error = %e, "Failed to mark message as sending");
        }

        let client = match self.devices.get_device(&item.device_id) {
            Some(client) => client,
            None => {
                let msg = format!("Device {} not found", item.device_id);
                self.mark_failed(item, &msg).await;
                return false;
            }
        };

        if !client.is_logged_in() {
            let msg = format!("Device {} not connected", item.device_id);
            self.mark_failed(item, &msg).await;
            return false;
        }

        let phone = item.phone.trim_start_matches('+');
        match client.send_text(phone, &item.message).await {
            Ok(_) => {
                if let Err(e) = self
                    .store
                    .update_message_status(item.id, MessageStatus::Sent, None)
                    .await
                {
                    error!(error = %e, "Failed to mark message as sent");
                }

                info!(
                    phone = %item.phone,
                    campaign_id = %item.campaign_id,
                    "Campaign message sent"
                );

                self.check_campaign_completion(item).await;
            }
            Err(e) => {
                self.mark_failed(item, &e.to_string()).await;
                warn!(phone = %item.phone, error = %e, "Failed to send campaign message");
            }
        }

        true
    }

    async fn mark_failed(&self, item: &QueueItem, error_msg: &str) {
        warn!(message_id = %item.id, "{}", error_msg);
        if let Err(e) = self
            .store
            .update_message_status(item.id, MessageStatus::Failed, Some(error_msg))
            .await
        {
            error!(error = %e, "Failed to mark message as failed");
        }
    }

    /// Log when a running campaign has drained its current queue.
    ///
    /// The campaign stays running so customers added later still flow.
    async fn check_campaign_completion(&self, item: &QueueItem) {
        let stats = match self.store.campaign_stats(item.campaign_id).await {
            Ok(stats) => stats,
            Err(_) => return,
        };

        if stats.pending_messages == 0 && stats.total_messages > 0 {
            info!(
                campaign_id = %item.campaign_id,
                total = stats.total_messages,
                sent = stats.sent_messages,
                failed = stats.failed_messages,
                "All current campaign messages processed"
            );
        }
    }
}
