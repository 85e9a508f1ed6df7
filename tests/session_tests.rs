/// Session controller scenarios driven through a counting fake API.
///
/// Covers the user-visible behavior of the viewer without any network:
/// credential preconditions, normalization defaults, the dashboard → cards
/// drill-down and the serialized snapshot the browser renders.
use std::cell::Cell;

use serde_json::{Value, json};

use domo_viewer::client::{ContentApi, Endpoint, FetchError};
use domo_viewer::notice::{Level, Notice};
use domo_viewer::project::format_average;
use domo_viewer::session::{
    Credentials, ResourceKind, ResourceState, Selection, Session, SessionOptions,
};

/// Serves the demo instance: one "Sales" dashboard owned by Ann with a
/// single "Revenue" card.
#[derive(Default)]
struct DemoApi {
    calls: Cell<usize>,
}

impl ContentApi for DemoApi {
    fn get(&self, credentials: &Credentials, endpoint: &Endpoint) -> Result<Value, FetchError> {
        self.calls.set(self.calls.get() + 1);
        assert_eq!(credentials.instance(), "acme-1");
        assert_eq!(credentials.token(), "t123");

        match endpoint {
            Endpoint::Pages => Ok(json!([
                {"id": "p1", "title": "Sales", "owners": [{"displayName": "Ann"}]}
            ])),
            Endpoint::Cards { page_id } if page_id == "p1" => {
                Ok(json!([{"id": "c1", "title": "Revenue"}]))
            }
            Endpoint::Cards { .. } => Err(FetchError::status(404, "no page")),
            Endpoint::Datasets => Ok(json!({"dataSources": [
                {"id": "d1", "name": "Orders", "type": "csv"},
                {"id": "d2"}
            ]})),
            Endpoint::Dataflows => Ok(json!([
                {
                    "id": 11,
                    "name": "Join orders",
                    "inputs": [{"dataSourceId": "d1"}, {"id": "d2"}],
                    "outputs": ["d3"]
                },
                "not a record"
            ])),
        }
    }
}

fn ready_session() -> Session<DemoApi> {
    let mut session = Session::new(DemoApi::default(), SessionOptions::default());
    session.set_credentials("acme-1", "t123");
    session
}

#[test]
fn end_to_end_dashboard_drill_down() {
    let mut session = ready_session();

    let notices = session.fetch(ResourceKind::Dashboards);
    assert_eq!(notices, vec![Notice::success("Retrieved 1 dashboards")]);

    let row = &session.dashboards().rows()[0];
    assert_eq!(row.page_id, "p1");
    assert_eq!(row.title, "Sales");
    assert_eq!(row.owner, "Ann");
    assert_eq!(session.dashboard_titles(), ["Sales"]);

    let notices = session.select_dashboard("Sales");
    assert!(notices.is_empty());
    assert_eq!(
        session.selection(),
        &Selection::CardsLoaded {
            page_id: "p1".into()
        }
    );
    assert_eq!(session.cards().len(), 1);
    assert_eq!(session.cards()[0].card_id, "c1");
    assert_eq!(session.cards()[0].title, "Revenue");
}

#[test]
fn incomplete_credentials_make_no_calls() {
    let mut session = Session::new(DemoApi::default(), SessionOptions::default());
    session.set_credentials("acme-1", "   ");

    let notices = session.fetch(ResourceKind::Datasets);

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, Level::Warning);
    assert_eq!(session.api().calls.get(), 0);
    assert_eq!(session.datasets().state(), &ResourceState::Idle);
    assert!(session.datasets().rows().is_empty());
}

#[test]
fn invalid_instance_is_refused_before_any_call() {
    let mut session = Session::new(DemoApi::default(), SessionOptions::default());
    session.set_credentials("acme.evil.com/x", "t123");

    let notices = session.fetch(ResourceKind::Dataflows);

    assert_eq!(notices[0].level, Level::Warning);
    assert_eq!(session.api().calls.get(), 0);
}

#[test]
fn datasets_default_missing_fields() {
    let mut session = ready_session();

    session.fetch(ResourceKind::Datasets);

    let rows = session.datasets().rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].dataset_id, "d2");
    assert_eq!(rows[1].name, "N/A");
    assert_eq!(rows[1].kind, "N/A");
}

#[test]
fn dataflows_resolve_mixed_input_shapes() {
    let mut session = ready_session();

    session.fetch(ResourceKind::Dataflows);

    let rows = session.dataflows().rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].dataflow_id, "11");
    assert_eq!(rows[0].input_ids, ["d1", "d2"]);
    assert_eq!(rows[0].input_count, 2);
    assert_eq!(rows[0].output_ids, ["d3"]);
    assert_eq!(rows[0].output_count, 1);
}

#[test]
fn average_cards_renders_two_decimals() {
    let mut session = ready_session();
    session.fetch(ResourceKind::Dashboards);

    assert_eq!(session.average_cards().map(format_average).as_deref(), Some("1.00"));
    // pages + one cards call per page
    assert_eq!(session.api().calls.get(), 2);
}

#[test]
fn snapshot_hides_token() {
    let mut session = ready_session();
    session.fetch(ResourceKind::Dashboards);
    session.select_dashboard("Sales");

    let snapshot = serde_json::to_value(session.snapshot()).unwrap();

    assert_eq!(snapshot["instance"], "acme-1");
    assert_eq!(snapshot["token_set"], true);
    assert!(!snapshot.to_string().contains("t123"));
    assert_eq!(snapshot["dashboards"]["state"], json!({"status": "loaded", "rows": 1}));
    assert_eq!(snapshot["dashboards"]["titles"], json!(["Sales"]));
    assert_eq!(snapshot["dashboards"]["average_cards"], "1.00");
    assert_eq!(
        snapshot["selection"],
        json!({"status": "cards_loaded", "page_id": "p1"})
    );
    assert_eq!(
        snapshot["cards"],
        json!({"columns": ["Card ID", "Title"], "rows": [["c1", "Revenue"]]})
    );
}
