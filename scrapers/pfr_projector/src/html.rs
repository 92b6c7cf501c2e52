//! Parsing helpers for pro-football-reference pages.
//!
//! PFR renders the first table of a page normally and ships most of the
//! others inside HTML comments, to be un-commented by javascript. [`StatsPage`]
//! parses both so callers can look a table up by id without caring where it
//! lives. Individual stats are addressed by the `data-stat` attribute of a
//! row's cells.

use scraper::{node::Node, ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ScrapeError;

/// Parses a selector literal.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("selector literal must be valid")
}

pub struct StatsPage {
    doc: Html,
    hidden: Vec<Html>,
}

impl StatsPage {
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let hidden = doc
            .tree
            .nodes()
            .filter_map(|node| match node.value() {
                Node::Comment(comment) => {
                    let text: &str = &comment.comment;
                    text.contains("<table").then(|| Html::parse_fragment(text))
                }
                _ => None,
            })
            .collect();
        Self { doc, hidden }
    }

    pub fn document(&self) -> &Html {
        &self.doc
    }

    /// Finds `table#id`, in the visible markup first and then inside comments.
    pub fn table(&self, id: &str) -> Option<ElementRef<'_>> {
        let tables = selector("table");
        std::iter::once(&self.doc)
            .chain(self.hidden.iter())
            .flat_map(|doc| doc.select(&tables))
            .find(|table| table.value().id() == Some(id))
    }

    pub fn require_table(&self, id: &str) -> Result<ElementRef<'_>, ScrapeError> {
        self.table(id)
            .ok_or_else(|| ScrapeError::MissingElement(format!("table#{}", id)))
    }
}

/// Body rows of a table.
pub fn body_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let rows = selector("tbody tr");
    table.select(&rows).collect::<Vec<_>>().into_iter()
}

/// The body row with the given id, e.g. `passing.2023`.
pub fn row_by_id<'a>(table: ElementRef<'a>, id: &str) -> Option<StatRow<'a>> {
    body_rows(table)
        .find(|row| row.value().id() == Some(id))
        .map(StatRow::new)
}

/// A table row whose cells are addressed by their `data-stat` attribute.
#[derive(Clone, Copy)]
pub struct StatRow<'a> {
    row: ElementRef<'a>,
}

impl<'a> StatRow<'a> {
    pub fn new(row: ElementRef<'a>) -> Self {
        Self { row }
    }

    pub fn cell(&self, data_stat: &str) -> Option<ElementRef<'a>> {
        let cells = selector("th, td");
        self.row
            .select(&cells)
            .find(|cell| cell.value().attr("data-stat") == Some(data_stat))
    }

    /// Trimmed text of a cell, `None` when the cell does not exist.
    pub fn text(&self, label: &str, data_stat: &str) -> Option<String> {
        match self.cell(data_stat) {
            Some(cell) => Some(cell.text().collect::<String>().trim().to_string()),
            None => {
                debug!("Did not find stat {} using attribute {}", label, data_stat);
                None
            }
        }
    }

    /// Numeric cell. Missing and empty cells are `None`; anything else that
    /// does not parse is an error.
    pub fn number(&self, label: &str, data_stat: &str) -> Result<Option<f64>, ScrapeError> {
        let Some(raw) = self.text(label, data_stat) else {
            return Ok(None);
        };
        if raw.is_empty() {
            debug!("Value empty for {}. Substituting default value", label);
            return Ok(None);
        }
        raw.replace([',', '%'], "")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ScrapeError::Stat {
                label: label.to_string(),
                raw,
            })
    }

    pub fn integer(&self, label: &str, data_stat: &str) -> Result<Option<i64>, ScrapeError> {
        let Some(raw) = self.text(label, data_stat) else {
            return Ok(None);
        };
        if raw.is_empty() {
            debug!("Value empty for {}. Substituting default value", label);
            return Ok(None);
        }
        raw.replace(',', "")
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ScrapeError::Stat {
                label: label.to_string(),
                raw,
            })
    }

    /// First link target inside a cell.
    pub fn href(&self, data_stat: &str) -> Option<String> {
        let link = selector("a");
        self.cell(data_stat)?
            .select(&link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
    }
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
