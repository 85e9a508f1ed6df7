//! Session view controller.
//!
//! Owns everything one interactive session knows: the credentials, the last
//! fetched collection of each resource, and the dashboard drill-down state.
//! Each user action maps to one method; each method performs its network
//! calls synchronously and returns the notices to show.
//!
//! Per resource the state moves `Idle → Fetching → Loaded | Failed` and may
//! start over at any time. The drill-down moves
//! `NoSelection → Selected(page) → CardsLoaded(page)`.

use std::collections::HashMap;

use serde::Serialize;

use super::credentials::Credentials;
use crate::activity::ActivityLog;
use crate::client::fetch::{Fetched, fetch_records};
use crate::client::{ContentApi, DomoClient, Endpoint};
use crate::config::ViewerConfig;
use crate::model::{Card, Dataflow, Dataset, Page, decode_all};
use crate::notice::Notice;
use crate::project::{
    self, CardRow, DataflowRow, DatasetRow, PageRow, average_cards_per_dashboard,
};

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

/// The three independently fetchable collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Datasets,
    Dashboards,
    Dataflows,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Datasets => "datasets",
            Self::Dashboards => "dashboards",
            Self::Dataflows => "dataflows",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResourceState {
    Idle,
    Fetching,
    Loaded { rows: usize },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Selection {
    NoSelection,
    Selected { page_id: String },
    CardsLoaded { page_id: String },
}

/// Rows of one collection plus where its fetch cycle stands.
#[derive(Debug, Clone)]
pub struct Resource<R> {
    state: ResourceState,
    rows: Vec<R>,
}

impl<R> Default for Resource<R> {
    fn default() -> Self {
        Self {
            state: ResourceState::Idle,
            rows: Vec::new(),
        }
    }
}

impl<R> Resource<R> {
    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Replace the collection wholesale. A failed fetch empties it.
    fn finish(&mut self, ok: bool, rows: Vec<R>) {
        if ok {
            self.state = ResourceState::Loaded { rows: rows.len() };
            self.rows = rows;
        } else {
            self.state = ResourceState::Failed;
            self.rows = Vec::new();
        }
    }
}

/// Title → page id lookup behind the dashboard selector.
///
/// Duplicate titles keep the id of the last page carrying that title; the
/// selector lists each title once, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct DashboardIndex {
    titles: Vec<String>,
    ids: HashMap<String, String>,
}

impl DashboardIndex {
    pub fn build(pages: &[Page]) -> Self {
        let mut index = Self::default();
        for page in pages {
            let (Some(title), Some(id)) = (&page.title, &page.id) else {
                continue;
            };
            if index.ids.insert(title.clone(), id.clone()).is_none() {
                index.titles.push(title.clone());
            }
        }
        index
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn id_for(&self, title: &str) -> Option<&str> {
        self.ids.get(title).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Fetch every page's cards after loading dashboards.
    pub eager_card_counts: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            eager_card_counts: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One interactive session against a content API.
pub struct Session<A> {
    api: A,
    options: SessionOptions,
    log: Option<ActivityLog>,
    credentials: Credentials,
    datasets: Resource<DatasetRow>,
    dashboards: Resource<PageRow>,
    dashboard_index: DashboardIndex,
    card_counts_fetched: bool,
    dataflows: Resource<DataflowRow>,
    selection: Selection,
    selected_title: Option<String>,
    cards: Vec<CardRow>,
}

impl Session<DomoClient> {
    /// A session talking to the real platform, configured from `config`.
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(
            DomoClient::from_config(&config.api),
            SessionOptions {
                eager_card_counts: config.dashboards.eager_card_counts,
            },
        )
        .with_log(ActivityLog::from_config(&config.logging))
    }
}

impl<A: ContentApi> Session<A> {
    pub fn new(api: A, options: SessionOptions) -> Self {
        Self {
            api,
            options,
            log: None,
            credentials: Credentials::default(),
            datasets: Resource::default(),
            dashboards: Resource::default(),
            dashboard_index: DashboardIndex::default(),
            card_counts_fetched: false,
            dataflows: Resource::default(),
            selection: Selection::NoSelection,
            selected_title: None,
            cards: Vec::new(),
        }
    }

    pub fn with_log(mut self, log: Option<ActivityLog>) -> Self {
        self.log = log;
        self
    }

    // -- Credentials --

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn set_credentials(&mut self, instance: &str, token: &str) {
        self.credentials.set_instance(instance);
        self.credentials.set_token(token);
    }

    // -- Accessors --

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn datasets(&self) -> &Resource<DatasetRow> {
        &self.datasets
    }

    pub fn dashboards(&self) -> &Resource<PageRow> {
        &self.dashboards
    }

    pub fn dataflows(&self) -> &Resource<DataflowRow> {
        &self.dataflows
    }

    pub fn dashboard_titles(&self) -> &[String] {
        self.dashboard_index.titles()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_title(&self) -> Option<&str> {
        self.selected_title.as_deref()
    }

    pub fn cards(&self) -> &[CardRow] {
        &self.cards
    }

    /// Average cards per dashboard, when card counts were fetched.
    pub fn average_cards(&self) -> Option<f64> {
        if !self.card_counts_fetched {
            return None;
        }
        average_cards_per_dashboard(self.dashboards.rows())
    }

    // -- Actions --

    /// Fetch one of the three collections.
    pub fn fetch(&mut self, kind: ResourceKind) -> Vec<Notice> {
        match kind {
            ResourceKind::Datasets => self.fetch_datasets(),
            ResourceKind::Dashboards => self.fetch_dashboards(),
            ResourceKind::Dataflows => self.fetch_dataflows(),
        }
    }

    pub fn fetch_datasets(&mut self) -> Vec<Notice> {
        if let Some(warning) = self.precondition() {
            return vec![warning];
        }

        self.datasets.state = ResourceState::Fetching;
        let fetched = self.get(&Endpoint::Datasets);
        let rows: Vec<DatasetRow> = decode_all::<Dataset>(fetched.records)
            .iter()
            .map(project::dataset_row)
            .collect();

        let mut notices = fetched.notices;
        notices.extend(retrieved(fetched.ok, rows.len(), "datasets"));
        self.datasets.finish(fetched.ok, rows);
        notices
    }

    pub fn fetch_dataflows(&mut self) -> Vec<Notice> {
        if let Some(warning) = self.precondition() {
            return vec![warning];
        }

        self.dataflows.state = ResourceState::Fetching;
        let fetched = self.get(&Endpoint::Dataflows);
        let rows: Vec<DataflowRow> = decode_all::<Dataflow>(fetched.records)
            .iter()
            .map(project::dataflow_row)
            .collect();

        let mut notices = fetched.notices;
        notices.extend(retrieved(fetched.ok, rows.len(), "dataflows"));
        self.dataflows.finish(fetched.ok, rows);
        notices
    }

    /// Load dashboards and, when enabled, each dashboard's card count.
    ///
    /// Reloading clears the current drill-down selection.
    pub fn fetch_dashboards(&mut self) -> Vec<Notice> {
        if let Some(warning) = self.precondition() {
            return vec![warning];
        }

        self.dashboards.state = ResourceState::Fetching;
        let fetched = self.get(&Endpoint::Pages);
        let pages: Vec<Page> = decode_all(fetched.records);
        let mut notices = fetched.notices;

        let counts: Option<Vec<usize>> = (fetched.ok && self.options.eager_card_counts)
            .then(|| pages.iter().map(|page| self.count_cards(page, &mut notices)).collect());

        let rows: Vec<PageRow> = pages
            .iter()
            .enumerate()
            .map(|(i, page)| {
                project::page_row(page, counts.as_ref().map(|counts| counts[i]))
            })
            .collect();

        notices.extend(retrieved(fetched.ok, rows.len(), "dashboards"));

        self.dashboard_index = DashboardIndex::build(&pages);
        self.card_counts_fetched = counts.is_some();
        self.dashboards.finish(fetched.ok, rows);
        self.clear_selection();
        notices
    }

    /// Drill into the dashboard with the given title and load its cards.
    pub fn select_dashboard(&mut self, title: &str) -> Vec<Notice> {
        if let Some(warning) = self.precondition() {
            return vec![warning];
        }

        let Some(page_id) = self.dashboard_index.id_for(title).map(str::to_string) else {
            self.clear_selection();
            return vec![Notice::warning(format!("Unknown dashboard '{title}'."))];
        };

        self.selection = Selection::Selected {
            page_id: page_id.clone(),
        };
        self.selected_title = Some(title.to_string());

        let fetched = self.get(&Endpoint::cards(page_id.as_str()));
        self.cards = decode_all::<Card>(fetched.records)
            .iter()
            .map(project::card_row)
            .collect();
        self.selection = Selection::CardsLoaded { page_id };

        let mut notices = fetched.notices;
        if fetched.ok && self.cards.is_empty() {
            notices.push(Notice::info(format!("Dashboard '{title}' has no cards.")));
        }
        notices
    }

    // -- Internal --

    fn precondition(&self) -> Option<Notice> {
        self.credentials
            .check()
            .err()
            .map(|problem| Notice::warning(problem.to_string()))
    }

    fn get(&self, endpoint: &Endpoint) -> Fetched {
        fetch_records(&self.api, &self.credentials, endpoint, self.log.as_ref())
    }

    /// Cards on one page; any failure counts as zero.
    fn count_cards(&self, page: &Page, notices: &mut Vec<Notice>) -> usize {
        let Some(id) = &page.id else {
            return 0;
        };
        let fetched = self.get(&Endpoint::cards(id.as_str()));
        notices.extend(fetched.notices);
        fetched.records.len()
    }

    fn clear_selection(&mut self) {
        self.selection = Selection::NoSelection;
        self.selected_title = None;
        self.cards.clear();
    }
}

fn retrieved(ok: bool, count: usize, label: &str) -> Option<Notice> {
    match (ok, count) {
        (false, _) => None,
        (true, 0) => Some(Notice::info(format!("No {label} returned."))),
        (true, n) => Some(Notice::success(format!("Retrieved {n} {label}"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::{Value, json};

    use super::*;
    use crate::client::FetchError;
    use crate::notice::Level;

    /// Answers from a fixed table keyed by endpoint path; records every call.
    #[derive(Default)]
    struct Scripted {
        responses: HashMap<String, Result<Value, u16>>,
        calls: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn on(mut self, endpoint: Endpoint, response: Result<Value, u16>) -> Self {
            self.responses.insert(endpoint.path().unwrap(), response);
            self
        }
    }

    impl ContentApi for Scripted {
        fn get(&self, _: &Credentials, endpoint: &Endpoint) -> Result<Value, FetchError> {
            let path = endpoint.path()?;
            self.calls.borrow_mut().push(path.clone());
            match self.responses.get(&path) {
                Some(Ok(value)) => Ok(value.clone()),
                Some(Err(status)) => Err(FetchError::status(*status, "boom")),
                None => Err(FetchError::status(404, "not scripted")),
            }
        }
    }

    fn session(api: Scripted) -> Session<Scripted> {
        let mut session = Session::new(api, SessionOptions::default());
        session.set_credentials("acme-1", "t123");
        session
    }

    #[test]
    fn missing_credentials_make_no_calls() {
        let mut session = Session::new(Scripted::default(), SessionOptions::default());
        for kind in [
            ResourceKind::Datasets,
            ResourceKind::Dashboards,
            ResourceKind::Dataflows,
        ] {
            let notices = session.fetch(kind);
            assert_eq!(notices.len(), 1);
            assert_eq!(notices[0].level, Level::Warning);
        }
        assert!(session.select_dashboard("Sales")[0].level == Level::Warning);
        assert!(session.api().calls.borrow().is_empty());
        assert_eq!(session.datasets().state(), &ResourceState::Idle);
    }

    #[test]
    fn incomplete_credentials_leave_loaded_rows_untouched() {
        let api = Scripted::default().on(
            Endpoint::Datasets,
            Ok(json!({"dataSources": [{"id": "d1"}]})),
        );
        let mut session = session(api);
        session.fetch_datasets();
        session.set_credentials("acme-1", "");

        session.fetch_datasets();

        assert_eq!(session.datasets().rows().len(), 1);
        assert_eq!(session.api().calls.borrow().len(), 1);
    }

    #[test]
    fn datasets_load_with_defaults() {
        let api = Scripted::default().on(
            Endpoint::Datasets,
            Ok(json!({"dataSources": [
                {"id": "d1", "name": "Orders", "type": "csv"},
                {"name": "Loose"}
            ]})),
        );
        let mut session = session(api);

        let notices = session.fetch_datasets();

        assert_eq!(session.datasets().state(), &ResourceState::Loaded { rows: 2 });
        assert_eq!(session.datasets().rows()[1].dataset_id, "N/A");
        assert_eq!(session.datasets().rows()[1].kind, "N/A");
        assert_eq!(notices, vec![Notice::success("Retrieved 2 datasets")]);
    }

    #[test]
    fn datasets_without_key_fail_and_empty() {
        let api = Scripted::default().on(Endpoint::Datasets, Ok(json!({"message": "?"})));
        let mut session = session(api);

        let notices = session.fetch_datasets();

        assert_eq!(session.datasets().state(), &ResourceState::Failed);
        assert!(session.datasets().rows().is_empty());
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, Level::Warning);
    }

    #[test]
    fn http_failure_empties_previous_rows() {
        let mut session = session(Scripted::default().on(
            Endpoint::Dataflows,
            Ok(json!([{"id": 1, "name": "a"}])),
        ));
        session.fetch_dataflows();
        assert_eq!(session.dataflows().rows().len(), 1);

        session.api.responses.insert(
            Endpoint::Dataflows.path().unwrap(),
            Err(500),
        );
        let notices = session.fetch_dataflows();

        assert_eq!(session.dataflows().state(), &ResourceState::Failed);
        assert!(session.dataflows().rows().is_empty());
        assert_eq!(notices[0].level, Level::Error);
        assert!(notices[0].message.contains("500"));
    }

    #[test]
    fn dashboards_fan_out_for_card_counts() {
        let api = Scripted::default()
            .on(
                Endpoint::Pages,
                Ok(json!([
                    {"id": "p1", "title": "A"},
                    {"id": "p2", "title": "B"},
                    {"id": "p3", "title": "C"},
                    "junk"
                ])),
            )
            .on(Endpoint::cards("p1"), Ok(json!([{}, {}])))
            .on(Endpoint::cards("p2"), Ok(json!([{}, {}, {}, {}])))
            .on(Endpoint::cards("p3"), Ok(json!([{}, {}, {}, {}, {}, {}])));
        let mut session = session(api);

        session.fetch_dashboards();

        let counts: Vec<_> = session.dashboards().rows().iter().map(|r| r.cards).collect();
        assert_eq!(counts, [Some(2), Some(4), Some(6)]);
        assert_eq!(session.average_cards(), Some(4.0));
        assert_eq!(session.api().calls.borrow().len(), 4);
    }

    #[test]
    fn failed_card_count_degrades_to_zero() {
        let api = Scripted::default()
            .on(
                Endpoint::Pages,
                Ok(json!([{"id": "p1", "title": "A"}, {"id": "p2", "title": "B"}])),
            )
            .on(Endpoint::cards("p1"), Ok(json!([{}, {}])))
            .on(Endpoint::cards("p2"), Err(403));
        let mut session = session(api);

        let notices = session.fetch_dashboards();

        let counts: Vec<_> = session.dashboards().rows().iter().map(|r| r.cards).collect();
        assert_eq!(counts, [Some(2), Some(0)]);
        assert_eq!(session.average_cards(), Some(1.0));
        assert!(notices.iter().any(|n| n.level == Level::Error));
        assert!(notices.iter().any(|n| n.message == "Retrieved 2 dashboards"));
    }

    #[test]
    fn counts_skipped_when_disabled() {
        let api = Scripted::default().on(Endpoint::Pages, Ok(json!([{"id": "p1", "title": "A"}])));
        let mut session = Session::new(
            api,
            SessionOptions {
                eager_card_counts: false,
            },
        );
        session.set_credentials("acme-1", "t123");

        session.fetch_dashboards();

        assert_eq!(session.dashboards().rows()[0].cards, None);
        assert_eq!(session.average_cards(), None);
        assert_eq!(session.api().calls.borrow().len(), 1);
    }

    #[test]
    fn empty_dashboards_average_zero() {
        let api = Scripted::default().on(Endpoint::Pages, Ok(json!([])));
        let mut session = session(api);

        let notices = session.fetch_dashboards();

        assert_eq!(session.average_cards(), Some(0.0));
        assert_eq!(notices, vec![Notice::info("No dashboards returned.")]);
    }

    #[test]
    fn selecting_title_loads_cards_for_its_page() {
        let api = Scripted::default()
            .on(
                Endpoint::Pages,
                Ok(json!([{"id": "p1", "title": "Sales"}, {"id": "p2", "title": "Ops"}])),
            )
            .on(Endpoint::cards("p1"), Ok(json!([{"id": "c1", "title": "Revenue"}])))
            .on(Endpoint::cards("p2"), Ok(json!([{"id": "c2", "title": "Uptime"}])));
        let mut session = session(api);
        session.fetch_dashboards();

        session.select_dashboard("Ops");

        assert_eq!(
            session.selection(),
            &Selection::CardsLoaded {
                page_id: "p2".into()
            }
        );
        assert_eq!(session.selected_title(), Some("Ops"));
        assert_eq!(session.cards()[0].card_id, "c2");

        session.select_dashboard("Sales");
        assert_eq!(session.cards()[0].title, "Revenue");
    }

    #[test]
    fn unknown_title_clears_selection() {
        let api = Scripted::default()
            .on(Endpoint::Pages, Ok(json!([{"id": "p1", "title": "Sales"}])))
            .on(Endpoint::cards("p1"), Ok(json!([{"id": "c1"}])));
        let mut session = session(api);
        session.fetch_dashboards();
        session.select_dashboard("Sales");

        let notices = session.select_dashboard("Nope");

        assert_eq!(notices[0].level, Level::Warning);
        assert_eq!(session.selection(), &Selection::NoSelection);
        assert!(session.cards().is_empty());
    }

    #[test]
    fn reloading_dashboards_resets_selection() {
        let api = Scripted::default()
            .on(Endpoint::Pages, Ok(json!([{"id": "p1", "title": "Sales"}])))
            .on(Endpoint::cards("p1"), Ok(json!([{"id": "c1"}])));
        let mut session = session(api);
        session.fetch_dashboards();
        session.select_dashboard("Sales");

        session.fetch_dashboards();

        assert_eq!(session.selection(), &Selection::NoSelection);
        assert!(session.cards().is_empty());
    }

    #[test]
    fn duplicate_titles_last_wins() {
        let pages: Vec<Page> = decode_all(
            [
                json!({"id": "p1", "title": "Sales"}),
                json!({"id": "p2", "title": "Ops"}),
                json!({"id": "p3", "title": "Sales"}),
                json!({"title": "No id"}),
            ]
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        );
        let index = DashboardIndex::build(&pages);
        assert_eq!(index.titles(), ["Sales", "Ops"]);
        assert_eq!(index.id_for("Sales"), Some("p3"));
        assert_eq!(index.id_for("No id"), None);
    }
}
