//! Customer usecases

use tracing::info;
use uuid::Uuid;
use wagate_common::types::{Pagination, ValidationStatus};
use wagate_common::validation::validate_phone_number;
use wagate_common::{Error, Result};
use wagate_storage::models::{CreateCustomer, Customer};

use super::CampaignService;

/// One page of customers plus paging metadata
#[derive(Debug, Clone)]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl CampaignService {
    pub async fn create_customer(&self, input: CreateCustomer) -> Result<Customer> {
        validate_phone_number(&input.phone)?;

        if self
            .store()
            .get_customer_by_phone(&input.device_id, &input.phone)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(
                "customer with this phone already exists".to_string(),
            ));
        }

        let customer = self.store().create_customer(input).await?;

        info!(
            device_id = %customer.device_id,
            phone = %customer.phone,
            id = %customer.id,
            "Customer created"
        );

        Ok(customer)
    }

    pub async fn get_customer(&self, device_id: &str, id: Uuid) -> Result<Customer> {
        self.store()
            .get_customer(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("customer not found".to_string()))
    }

    pub async fn list_customers(
        &self,
        device_id: &str,
        page: i64,
        page_size: i64,
        search: Option<&str>,
    ) -> Result<CustomerPage> {
        let paging = Pagination::new(page, page_size);
        let (customers, total) = self
            .store()
            .list_customers(device_id, paging.page_size, paging.offset(), search)
            .await?;

        Ok(CustomerPage {
            customers,
            total,
            page: paging.page,
            page_size: paging.page_size,
            total_pages: paging.total_pages(total),
        })
    }

    pub async fn update_customer(
        &self,
        device_id: &str,
        id: Uuid,
        input: CreateCustomer,
    ) -> Result<Customer> {
        validate_phone_number(&input.phone)?;

        let mut customer = self
            .store()
            .get_customer(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("customer not found".to_string()))?;

        // A new phone invalidates both prior classifications
        let phone_changed = customer.phone != input.phone;

        customer.phone = input.phone;
        customer.full_name = input.full_name;
        customer.company = input.company;
        customer.country = input.country;
        customer.gender = input.gender;
        customer.birth_year = input.birth_year;

        if phone_changed {
            customer.phone_valid = ValidationStatus::Pending.as_str().to_string();
            customer.network_exists = ValidationStatus::Pending.as_str().to_string();
        }

        self.store().update_customer(&customer).await?;
        Ok(customer)
    }

    pub async fn delete_customer(&self, device_id: &str, id: Uuid) -> Result<()> {
        if !self.store().delete_customer(device_id, id).await? {
            return Err(Error::NotFound("customer not found".to_string()));
        }
        Ok(())
    }

    pub async fn delete_customers(&self, device_id: &str, ids: &[Uuid]) -> Result<u64> {
        self.store().delete_customers(device_id, ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::test_support::{service_with, MemStore};
    use std::sync::Arc;

    fn create_input(phone: &str) -> CreateCustomer {
        CreateCustomer {
            device_id: "pantone".to_string(),
            phone: phone.to_string(),
            full_name: None,
            company: None,
            country: None,
            gender: None,
            birth_year: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_customer() {
        let (service, _) = service_with(Arc::new(MemStore::new()));

        let created = service
            .create_customer(create_input("+15551230001"))
            .await
            .unwrap();
        assert_eq!(created.phone_valid, "pending");
        assert_eq!(created.network_exists, "pending");
        assert!(!created.is_ready());

        let page = service
            .list_customers("pantone", 1, 20, None)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.customers[0].id, created.id);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_phone() {
        let (service, _) = service_with(Arc::new(MemStore::new()));

        assert!(matches!(
            service.create_customer(create_input("15551230001")).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            service.create_customer(create_input("+0555123000")).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_phone() {
        let (service, _) = service_with(Arc::new(MemStore::new()));

        service
            .create_customer(create_input("+15551230001"))
            .await
            .unwrap();
        assert!(matches!(
            service.create_customer(create_input("+15551230001")).await,
            Err(Error::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_phone_change_resets_validation() {
        let store = Arc::new(MemStore::new());
        let (service, _) = service_with(store.clone());

        let customer = service
            .create_customer(create_input("+15551230001"))
            .await
            .unwrap();
        store.set_validation(customer.id, "valid", "valid");

        // Same phone keeps the classification
        let updated = service
            .update_customer("pantone", customer.id, create_input("+15551230001"))
            .await
            .unwrap();
        assert_eq!(updated.phone_valid, "valid");
        assert!(updated.is_ready());

        // A new phone resets both fields
        let updated = service
            .update_customer("pantone", customer.id, create_input("+15551230002"))
            .await
            .unwrap();
        assert_eq!(updated.phone_valid, "pending");
        assert_eq!(updated.network_exists, "pending");
        assert!(!updated.is_ready());
    }
}
