//! Template expansion
//!
//! Message templates carry a fixed set of bracketed placeholders. All of
//! them except `[GROUP]` expand from customer fields; `[GROUP]` is
//! resolved by the enqueuer, which knows the recipient's group
//! memberships. Unknown bracketed tokens pass through untouched.

use wagate_storage::models::Customer;

/// Expand customer placeholders in the given content.
///
/// Absent fields (and every field when `customer` is `None`) expand to
/// the empty string.
pub fn render(content: &str, customer: Option<&Customer>) -> String {
    match customer {
        Some(customer) => content
            .replace("[NAME]", customer.full_name.as_deref().unwrap_or(""))
            .replace("[PHONE]", &customer.phone)
            .replace("[COUNTRY]", customer.country.as_deref().unwrap_or(""))
            .replace("[COMPANY]", customer.company.as_deref().unwrap_or("")),
        None => content
            .replace("[NAME]", "")
            .replace("[PHONE]", "")
            .replace("[COUNTRY]", "")
            .replace("[COMPANY]", ""),
    }
}

/// Substitute the `[GROUP]` placeholder with the recipient's group names
pub fn substitute_group(content: &str, group_names: &str) -> String {
    content.replace("[GROUP]", group_names)
}
