//! Campaign engine
//!
//! [`CampaignService`] implements every campaign usecase; its impl blocks
//! are split per concern across this module's files. The two background
//! workers ([`dispatch::DispatchWorker`], [`validation::ValidationWorker`])
//! drain the persistent queue and classify customers against it.

pub mod campaigns;
pub mod customers;
pub mod dispatch;
pub mod groups;
pub mod importer;
pub mod shortener;
pub mod template;
pub mod templates;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use wagate_common::config::CampaignConfig;
use wagate_storage::CampaignStore;

use crate::whatsapp::DeviceRegistry;

/// Campaign business logic over the store and the device registry
pub struct CampaignService {
    store: Arc<dyn CampaignStore>,
    devices: Arc<dyn DeviceRegistry>,
    config: CampaignConfig,
}

impl CampaignService {
    pub fn new(
        store: Arc<dyn CampaignStore>,
        devices: Arc<dyn DeviceRegistry>,
        config: CampaignConfig,
    ) -> Self {
        Self {
            store,
            devices,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn CampaignStore> {
        &self.store
    }

    pub(crate) fn devices(&self) -> &Arc<dyn DeviceRegistry> {
        &self.devices
    }

    pub(crate) fn config(&self) -> &CampaignConfig {
        &self.config
    }
}
