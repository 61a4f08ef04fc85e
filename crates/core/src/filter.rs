//! The dashboard filter/search engine.
//!
//! Filtering is a pure function over the mirror's ordered record list. The
//! three dimensions combine with AND: a free-text query (OR across fields),
//! an exact status match, and an exact device match.

use crate::customer::{Customer, CustomerRecord, Status};

/// Active dashboard filter.
///
/// `None` means "all" for the two exact-match dimensions; an empty query
/// matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub query: String,
    pub status: Option<Status>,
    pub device: Option<String>,
}

impl ListFilter {
    /// Whether a single record passes all three filter dimensions.
    pub fn matches(&self, record: &CustomerRecord) -> bool {
        let customer = &record.customer;

        let matches_query = matches_query(customer, &self.query.to_lowercase());
        let matches_status = self
            .status
            .map_or(true, |wanted| customer.status.value == wanted);
        let matches_device = self
            .device
            .as_deref()
            .map_or(true, |wanted| customer.device.value == wanted);

        matches_query && matches_status && matches_device
    }
}

/// Case-insensitive substring search across name, phone, address, device,
/// and the status wire name. An empty needle matches everything.
fn matches_query(customer: &Customer, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }

    customer.name.value.to_lowercase().contains(needle_lower)
        || customer.phone.value.to_lowercase().contains(needle_lower)
        || customer.address.value.to_lowercase().contains(needle_lower)
        || customer.device.value.to_lowercase().contains(needle_lower)
        || customer.status.value.as_str().contains(needle_lower)
}

/// Apply `filter` to an ordered slice, returning the matching records in
/// their original order. Never re-sorts.
pub fn filter_records<'a>(
    records: &'a [CustomerRecord],
    filter: &ListFilter,
) -> Vec<&'a CustomerRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Distinct, sorted, non-empty device names across the given records.
///
/// Drives the device filter dropdown; derived from the data rather than
/// configured, so it always reflects what is actually in the store.
pub fn device_options<'a>(records: impl IntoIterator<Item = &'a CustomerRecord>) -> Vec<String> {
    let mut devices: Vec<String> = records
        .into_iter()
        .map(|r| r.customer.device.value.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect();
    devices.sort();
    devices.dedup();
    devices
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
