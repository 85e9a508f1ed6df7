//! Tabular projection: typed records → display rows.
//!
//! Pure mapping, no I/O. Each row type knows its column headers and how to
//! render its cells, so every surface (browser grid, terminal table, CSV)
//! shows the same columns.

use serde::Serialize;

use crate::model::{Card, Dataflow, Dataset, Page};

/// Shown when an owner or dataset field is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// A row that can be rendered as a list of text cells.
pub trait TableRow {
    fn headers(&self) -> Vec<&'static str>;
    fn cells(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRow {
    #[serde(rename = "Page ID")]
    pub page_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Owner")]
    pub owner: String,
    /// Only present when cards were fetched eagerly.
    #[serde(rename = "Cards", skip_serializing_if = "Option::is_none")]
    pub cards: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRow {
    #[serde(rename = "Card ID")]
    pub card_id: String,
    #[serde(rename = "Title")]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    #[serde(rename = "Dataset ID")]
    pub dataset_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataflowRow {
    #[serde(rename = "Dataflow ID")]
    pub dataflow_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Inputs")]
    pub input_count: usize,
    #[serde(rename = "Outputs")]
    pub output_count: usize,
    #[serde(rename = "Input Dataset IDs")]
    pub input_ids: Vec<String>,
    #[serde(rename = "Output Dataset IDs")]
    pub output_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

pub fn page_row(page: &Page, cards: Option<usize>) -> PageRow {
    PageRow {
        page_id: page.id.clone().unwrap_or_default(),
        title: page.title.clone().unwrap_or_default(),
        owner: page.owner_name().unwrap_or(NOT_AVAILABLE).to_string(),
        cards,
    }
}

pub fn card_row(card: &Card) -> CardRow {
    CardRow {
        card_id: card.id.clone().unwrap_or_default(),
        title: card.title.clone().unwrap_or_default(),
    }
}

pub fn dataset_row(dataset: &Dataset) -> DatasetRow {
    let or_na = |field: &Option<String>| field.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
    DatasetRow {
        dataset_id: or_na(&dataset.id),
        name: or_na(&dataset.name),
        kind: or_na(&dataset.kind),
    }
}

pub fn dataflow_row(flow: &Dataflow) -> DataflowRow {
    let input_ids = flow.input_ids();
    let output_ids = flow.output_ids();
    DataflowRow {
        dataflow_id: flow.id.clone().unwrap_or_default(),
        name: flow.name.clone().unwrap_or_default(),
        input_count: input_ids.len(),
        output_count: output_ids.len(),
        input_ids,
        output_ids,
    }
}

/// Mean number of cards per dashboard; 0 when there are no dashboards.
pub fn average_card_count(counts: &[usize]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    counts.iter().sum::<usize>() as f64 / counts.len() as f64
}

/// Average over the loaded rows. `None` unless every row carries a count.
pub fn average_cards_per_dashboard(rows: &[PageRow]) -> Option<f64> {
    let counts: Option<Vec<usize>> = rows.iter().map(|row| row.cards).collect();
    counts.map(|counts| average_card_count(&counts))
}

pub fn format_average(avg: f64) -> String {
    format!("{avg:.2}")
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

impl TableRow for PageRow {
    fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec!["Page ID", "Title", "Owner"];
        if self.cards.is_some() {
            headers.push("Cards");
        }
        headers
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.page_id.clone(), self.title.clone(), self.owner.clone()];
        if let Some(count) = self.cards {
            cells.push(count.to_string());
        }
        cells
    }
}

impl TableRow for CardRow {
    fn headers(&self) -> Vec<&'static str> {
        vec!["Card ID", "Title"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.card_id.clone(), self.title.clone()]
    }
}

impl TableRow for DatasetRow {
    fn headers(&self) -> Vec<&'static str> {
        vec!["Dataset ID", "Name", "Type"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.dataset_id.clone(), self.name.clone(), self.kind.clone()]
    }
}

impl TableRow for DataflowRow {
    fn headers(&self) -> Vec<&'static str> {
        vec![
            "Dataflow ID",
            "Name",
            "Inputs",
            "Outputs",
            "Input Dataset IDs",
            "Output Dataset IDs",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.dataflow_id.clone(),
            self.name.clone(),
            self.input_count.to_string(),
            self.output_count.to_string(),
            self.input_ids.join(", "),
            self.output_ids.join(", "),
        ]
    }
}

/// Column-oriented view of a row set, as shipped to the browser grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from rows; an empty row set uses `empty_headers`.
    pub fn from_rows<R: TableRow>(rows: &[R], empty_headers: &[&'static str]) -> Self {
        let columns = rows
            .first()
            .map(|row| row.headers())
            .unwrap_or_else(|| empty_headers.to_vec());
        Self {
            columns,
            rows: rows.iter().map(|row| row.cells()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
