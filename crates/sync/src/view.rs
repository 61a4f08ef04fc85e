//! Dashboard projection: filter + window applied to a mirror's contents.
//!
//! [`project`] is the single place where list state becomes a response
//! payload; the stateless REST listing and the stateful WebSocket view both
//! go through it so they can never disagree on the shape.

use serde::Serialize;
use werkstatt_core::customer::{CustomerRecord, Status};
use werkstatt_core::filter::{filter_records, ListFilter};
use werkstatt_core::page::VisibleWindow;

use crate::mirror::LoadPhase;

/// The visible slice of a collection plus the counters the dashboard
/// renders around it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub data: Vec<CustomerRecord>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total: usize,
    pub total_filtered: usize,
    pub visible: usize,
    pub has_more: bool,
}

/// A [`Projection`] plus the device dropdown options, as pushed to
/// WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    #[serde(flatten)]
    pub view: Projection,
    pub devices: Vec<String>,
}

/// Apply `filter` and `window` to an ordered record list.
///
/// The input order is preserved; the window clamps to the filtered length.
pub fn project(
    records: &[CustomerRecord],
    phase: &LoadPhase,
    filter: &ListFilter,
    window: VisibleWindow,
) -> Projection {
    let total = records.len();
    let filtered = filter_records(records, filter);
    let total_filtered = filtered.len();
    let visible = window.visible_in(total_filtered);

    Projection {
        data: filtered.into_iter().take(visible).cloned().collect(),
        loading: matches!(phase, LoadPhase::Loading),
        error: match phase {
            LoadPhase::Failed(reason) => Some(reason.clone()),
            _ => None,
        },
        total,
        total_filtered,
        visible,
        has_more: window.has_more(total_filtered),
    }
}

/// Per-session dashboard state: the current filter and how far the list
/// has been scrolled.
///
/// Changing any filter dimension snaps the window back to one page, even
/// when a larger window had been reached.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    filter: ListFilter,
    window: VisibleWindow,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
        self.window.reset();
    }

    pub fn set_status(&mut self, status: Option<Status>) {
        self.filter.status = status;
        self.window.reset();
    }

    pub fn set_device(&mut self, device: Option<String>) {
        self.filter.device = device;
        self.window.reset();
    }

    /// Reveal one more page.
    pub fn load_more(&mut self) {
        self.window.extend();
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn window(&self) -> VisibleWindow {
        self.window
    }

    /// Project the current view over a mirror's contents.
    pub fn snapshot(
        &self,
        records: &[CustomerRecord],
        phase: &LoadPhase,
        devices: Vec<String>,
    ) -> ViewSnapshot {
        ViewSnapshot {
            view: project(records, phase, &self.filter, self.window),
            devices,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use werkstatt_core::customer::{Customer, EditableField};
    use werkstatt_core::page::PAGE_SIZE;

    fn record(id: usize, device: &str, status: Status) -> CustomerRecord {
        CustomerRecord {
            id: format!("c{id}"),
            customer: Customer {
                name: EditableField::new(format!("Kunde {id}")),
                address: EditableField::new("Musterweg 1, Stuttgart".to_string()),
                phone: EditableField::new("0711 123456".to_string()),
                device: EditableField::new(device.to_string()),
                error_description: EditableField::new("Defekt".to_string()),
                notes: EditableField::new(String::new()),
                status: EditableField::new(status),
                error_code: None,
                ticket_type: None,
                created_at: Utc::now() - Duration::minutes(id as i64),
            },
        }
    }

    fn records(count: usize) -> Vec<CustomerRecord> {
        (1..=count)
            .map(|i| record(i, "Miele W1", Status::InProgress))
            .collect()
    }

    #[test]
    fn projects_first_page_by_default() {
        let records = records(60);
        let view = DashboardView::new();
        let projection = view.snapshot(&records, &LoadPhase::Ready, Vec::new());

        assert_eq!(projection.view.total, 60);
        assert_eq!(projection.view.total_filtered, 60);
        assert_eq!(projection.view.visible, PAGE_SIZE);
        assert_eq!(projection.view.data.len(), PAGE_SIZE);
        assert!(projection.view.has_more);
        assert!(!projection.view.loading);
    }

    #[test]
    fn load_more_reveals_next_page() {
        let records = records(60);
        let mut view = DashboardView::new();
        view.load_more();

        let projection = view.snapshot(&records, &LoadPhase::Ready, Vec::new());
        assert_eq!(projection.view.visible, 2 * PAGE_SIZE);
        assert!(projection.view.has_more);
    }

    #[test]
    fn filter_change_resets_the_window() {
        let records = records(60);
        let mut view = DashboardView::new();
        view.load_more();
        view.load_more();
        view.set_query("kunde");

        let projection = view.snapshot(&records, &LoadPhase::Ready, Vec::new());
        assert_eq!(projection.view.visible, PAGE_SIZE, "back to one page");
    }

    #[test]
    fn status_filter_narrows_counts() {
        let mut records = records(10);
        records.push(record(11, "Miele W1", Status::Completed));
        let mut view = DashboardView::new();
        view.set_status(Some(Status::Completed));

        let projection = view.snapshot(&records, &LoadPhase::Ready, Vec::new());
        assert_eq!(projection.view.total, 11);
        assert_eq!(projection.view.total_filtered, 1);
        assert_eq!(projection.view.data[0].id, "c11");
    }

    #[test]
    fn loading_phase_is_passed_through() {
        let view = DashboardView::new();
        let projection = view.snapshot(&[], &LoadPhase::Loading, Vec::new());

        assert!(projection.view.loading);
        assert_eq!(projection.view.error, None);
        assert!(projection.view.data.is_empty());
    }

    #[test]
    fn failed_phase_carries_the_reason() {
        let view = DashboardView::new();
        let projection = view.snapshot(
            &[],
            &LoadPhase::Failed("connection refused".to_string()),
            Vec::new(),
        );

        assert_eq!(
            projection.view.error.as_deref(),
            Some("connection refused")
        );
        assert!(!projection.view.loading);
    }

    #[test]
    fn snapshot_serializes_flat_camel_case() {
        let view = DashboardView::new();
        let snapshot = view.snapshot(
            &records(1),
            &LoadPhase::Ready,
            vec!["Miele W1".to_string()],
        );

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["totalFiltered"], 1);
        assert_eq!(json["hasMore"], false);
        assert_eq!(json["devices"][0], "Miele W1");
        assert!(json.get("error").is_none(), "error omitted when unset");
        assert!(json.get("view").is_none(), "projection is flattened");
    }
}
