//! In-memory representation of one worksheet: a header row followed by
//! sparse rows keyed by column name.

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Ordered `(column, value)` pairs. Columns without a value are missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<Cell>) -> Self {
        self.set(column, value);
        self
    }

    /// Sets `column`, or removes it when `value` is `None`.
    pub fn with_opt(mut self, column: &str, value: Option<f64>) -> Self {
        self.set_opt(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: impl Into<Cell>) {
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| c == column) {
            Some((_, cell)) => *cell = value,
            None => self.cells.push((column.to_string(), value)),
        }
    }

    pub fn set_opt(&mut self, column: &str, value: Option<f64>) {
        match value {
            Some(v) if v.is_finite() => self.set(column, v),
            _ => self.remove(column),
        }
    }

    pub fn remove(&mut self, column: &str) {
        self.cells.retain(|(c, _)| c != column);
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        match self.get(column)? {
            Cell::Number(n) => Some(*n),
            Cell::Text(t) => t.trim().parse().ok(),
        }
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            Cell::Text(t) => Some(t.as_str()),
            Cell::Number(_) => None,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn add_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
    }

    fn register(&mut self, row: &Row) {
        let new: Vec<String> = row
            .columns()
            .filter(|c| !self.has_column(c))
            .map(str::to_string)
            .collect();
        self.columns.extend(new);
    }

    pub fn push(&mut self, row: Row) {
        self.register(&row);
        self.rows.push(row);
    }

    pub fn insert(&mut self, index: usize, row: Row) {
        self.register(&row);
        self.rows.insert(index.min(self.rows.len()), row);
    }

    /// Replaces the first row matching `same`, or appends `row`.
    pub fn upsert_by(&mut self, row: Row, same: impl Fn(&Row) -> bool) {
        self.register(&row);
        match self.rows.iter_mut().find(|r| same(r)) {
            Some(existing) => *existing = row,
            None => self.rows.push(row),
        }
    }

    pub fn retain(&mut self, keep: impl FnMut(&Row) -> bool) {
        self.rows.retain(keep);
    }

    /// Sum of a numeric column, treating missing values as 0.
    pub fn column_sum(&self, column: &str) -> f64 {
        self.rows.iter().filter_map(|r| r.number(column)).sum()
    }

    /// Re-derives the column list after rows were edited in place.
    pub fn refresh_columns(&mut self) {
        let rows = std::mem::take(&mut self.rows);
        for row in &rows {
            self.register(row);
        }
        self.rows = rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_unions_columns_in_first_seen_order() {
        let mut table = Table::new();
        table.push(Row::new().with("Total Plays", 1050.0).with("Run Plays", 441.0));
        table.push(
            Row::new()
                .with("Pos", "QB")
                .with("Player Name", "Kyler Murray")
                .with("Run Plays", 1.0),
        );

        assert_eq!(
            table.columns(),
            &["Total Plays", "Run Plays", "Pos", "Player Name"]
        );
        assert_eq!(table.rows()[1].text("Pos"), Some("QB"));
        assert_eq!(table.rows()[1].number("Total Plays"), None);
    }

    #[test]
    fn test_upsert_replaces_matching_row() {
        let mut table = Table::new();
        table.push(Row::new().with("Player Name", "A").with("Rush Share", 10.0));
        table.push(Row::new().with("Player Name", "B").with("Rush Share", 20.0));
        table.upsert_by(
            Row::new().with("Player Name", "A").with("Rush Share", 30.0),
            |r| r.text("Player Name") == Some("A"),
        );
        table.upsert_by(
            Row::new().with("Player Name", "C").with("Rush Share", 5.0),
            |r| r.text("Player Name") == Some("C"),
        );

        assert_eq!(table.len(), 3);
        assert_eq!(table.column_sum("Rush Share"), 55.0);
    }

    #[test]
    fn test_set_opt_drops_missing_and_nan() {
        let row = Row::new()
            .with_opt("Carries", Some(120.0))
            .with_opt("Targets", None)
            .with_opt("Completion %", Some(f64::NAN));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Carries"]);
    }
}
