//! Serializable view of a session, as rendered by the browser frontend.

use serde::Serialize;

use super::controller::{Resource, ResourceState, Selection, Session};
use crate::client::ContentApi;
use crate::project::{Table, TableRow, format_average};

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub instance: String,
    /// Whether a token is set. The token itself is never sent back.
    pub token_set: bool,
    pub ready: bool,
    pub datasets: ResourceView,
    pub dashboards: DashboardsView,
    pub dataflows: ResourceView,
    pub selection: Selection,
    pub selected_title: Option<String>,
    pub cards: Table,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceView {
    pub state: ResourceState,
    pub table: Table,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardsView {
    pub state: ResourceState,
    pub table: Table,
    /// Options for the dashboard selector.
    pub titles: Vec<String>,
    /// Average cards per dashboard, two decimals.
    pub average_cards: Option<String>,
}

const DATASET_COLUMNS: &[&str] = &["Dataset ID", "Name", "Type"];
const PAGE_COLUMNS: &[&str] = &["Page ID", "Title", "Owner"];
const DATAFLOW_COLUMNS: &[&str] = &[
    "Dataflow ID",
    "Name",
    "Inputs",
    "Outputs",
    "Input Dataset IDs",
    "Output Dataset IDs",
];
const CARD_COLUMNS: &[&str] = &["Card ID", "Title"];

fn view<R: TableRow>(resource: &Resource<R>, columns: &[&'static str]) -> ResourceView {
    ResourceView {
        state: resource.state().clone(),
        table: Table::from_rows(resource.rows(), columns),
    }
}

impl<A: ContentApi> Session<A> {
    pub fn snapshot(&self) -> SessionSnapshot {
        let credentials = self.credentials();
        let dashboards = view(self.dashboards(), PAGE_COLUMNS);

        SessionSnapshot {
            instance: credentials.instance().to_string(),
            token_set: credentials.has_token(),
            ready: credentials.is_complete(),
            datasets: view(self.datasets(), DATASET_COLUMNS),
            dashboards: DashboardsView {
                state: dashboards.state,
                table: dashboards.table,
                titles: self.dashboard_titles().to_vec(),
                average_cards: self.average_cards().map(format_average),
            },
            dataflows: view(self.dataflows(), DATAFLOW_COLUMNS),
            selection: self.selection().clone(),
            selected_title: self.selected_title().map(str::to_string),
            cards: Table::from_rows(self.cards(), CARD_COLUMNS),
        }
    }
}
