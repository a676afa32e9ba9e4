//! CSV customer import

use std::collections::HashMap;
use tracing::info;
use wagate_common::validation::validate_phone_number;
use wagate_common::{Error, Result};
use wagate_storage::models::CreateCustomer;

use super::CampaignService;

/// Outcome of a CSV import: rows written and per-row error messages
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub imported: usize,
    pub errors: Vec<String>,
}

/// Parse a header-keyed CSV blob into customer inputs.
///
/// Only the `phone` column is required. Headers match case-insensitively
/// after trimming; `full_name` falls back to `name`. Rows with a missing
/// or malformed phone are reported and skipped, other rows still import.
pub fn parse_customers_csv(
    device_id: &str,
    data: &[u8],
) -> Result<(Vec<CreateCustomer>, Vec<String>)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| Error::Validation(format!("failed to read CSV header: {}", e)))?;

    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_lowercase(), i))
        .collect();

    let phone_idx = *columns
        .get("phone")
        .ok_or_else(|| Error::Validation("CSV must have 'phone' column".to_string()))?;

    let name_idx = columns.get("full_name").or_else(|| columns.get("name"));
    let company_idx = columns.get("company");
    let country_idx = columns.get("country");
    let gender_idx = columns.get("gender");
    let birth_year_idx = columns.get("birth_year");

    let field = |record: &csv::StringRecord, idx: Option<&usize>| -> Option<String> {
        idx.and_then(|&i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let mut customers = Vec::new();
    let mut errors = Vec::new();
    let mut line = 1; // header is line 1

    for record in reader.records() {
        line += 1;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                errors.push(format!("Line {}: {}", line, e));
                continue;
            }
        };

        let phone = record.get(phone_idx).map(str::trim).unwrap_or("");
        if phone.is_empty() {
            errors.push(format!("Line {}: empty phone", line));
            continue;
        }

        let phone = if phone.starts_with('+') {
            phone.to_string()
        } else {
            format!("+{}", phone)
        };

        if let Err(e) = validate_phone_number(&phone) {
            errors.push(format!("Line {}: {}", line, e));
            continue;
        }

        let birth_year = field(&record, birth_year_idx)
            .and_then(|v| v.parse::<i32>().ok())
            // Implausible years are dropped, not reported
            .filter(|y| *y > 1900 && *y < 2100);

        customers.push(CreateCustomer {
            device_id: device_id.to_string(),
            phone,
            full_name: field(&record, name_idx),
            company: field(&record, company_idx),
            country: field(&record, country_idx),
            gender: field(&record, gender_idx),
            birth_year,
        });
    }

    Ok((customers, errors))
}

impl CampaignService {
    /// Bulk-create customers from a CSV upload
    pub async fn import_customers_csv(
        &self,
        device_id: &str,
        data: &[u8],
    ) -> Result<ImportOutcome> {
        let (customers, errors) = parse_customers_csv(device_id, data)?;

        if customers.is_empty() {
            return Err(Error::Validation(
                "no valid customers found in CSV".to_string(),
            ));
        }

        let imported = self.store().bulk_create_customers(customers).await?;

        info!(
            device_id = %device_id,
            imported = imported,
            row_errors = errors.len(),
            "CSV import completed"
        );

        Ok(ImportOutcome { imported, errors })
    }
}
