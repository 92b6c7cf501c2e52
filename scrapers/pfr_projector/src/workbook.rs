use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{ColNum, Format, RowNum};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{
    error::WorkbookError,
    sheet::{Cell, Row, Table},
};

/// The projections spreadsheet. Every sheet is held in memory; saving
/// rewrites the whole file, which is how a single sheet gets replaced.
#[derive(Debug)]
pub struct ProjectionWorkbook {
    path: PathBuf,
    sheets: Vec<(String, Table)>,
}

impl ProjectionWorkbook {
    /// Opens `path`, or starts an empty workbook when the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WorkbookError> {
        let path = path.into();
        if !path.exists() {
            debug!("Workbook {:?} does not exist yet", path);
            return Ok(Self {
                path,
                sheets: Vec::new(),
            });
        }

        let mut reader: Xlsx<_> = open_workbook(&path)?;
        let mut sheets = Vec::new();
        for name in reader.sheet_names() {
            let range = reader.worksheet_range(&name)?;
            let mut rows = range.rows();
            let mut table = Table::new();

            let headers: Vec<Option<String>> = match rows.next() {
                Some(header) => header.iter().map(header_name).collect(),
                None => Vec::new(),
            };
            for header in headers.iter().flatten() {
                table.add_column(header);
            }

            for cells in rows {
                let mut row = Row::new();
                for (header, data) in headers.iter().zip(cells) {
                    if let (Some(header), Some(cell)) = (header, to_cell(data)) {
                        row.set(header, cell);
                    }
                }
                if !row.is_empty() {
                    table.push(row);
                }
            }
            sheets.push((name, table));
        }

        Ok(Self { path, sheets })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(name, _)| name.as_str())
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Replaces the sheet in place, or appends it as the last sheet.
    pub fn put_sheet(&mut self, name: &str, table: Table) {
        match self.sheets.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = table,
            None => self.sheets.push((name.to_string(), table)),
        }
    }

    pub fn save(&self) -> Result<(), WorkbookError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let header_format = Format::new().set_bold();

        for (name, table) in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name)?;

            for (col, column) in table.columns().iter().enumerate() {
                let col = col_num(col, name)?;
                worksheet.write_string_with_format(0, col, column, &header_format)?;
            }

            for (index, row) in table.rows().iter().enumerate() {
                let row_num = RowNum::try_from(index + 1)
                    .map_err(|_| WorkbookError::TooLarge { sheet: name.clone() })?;
                for (col, column) in table.columns().iter().enumerate() {
                    let col = col_num(col, name)?;
                    match row.get(column) {
                        Some(Cell::Number(n)) => {
                            worksheet.write_number(row_num, col, *n)?;
                        }
                        Some(Cell::Text(t)) => {
                            worksheet.write_string(row_num, col, t)?;
                        }
                        None => {}
                    }
                }
            }
        }

        workbook.save(&self.path)?;
        info!("Saved workbook {:?}", self.path);
        Ok(())
    }
}

fn col_num(index: usize, sheet: &str) -> Result<ColNum, WorkbookError> {
    ColNum::try_from(index).map_err(|_| WorkbookError::TooLarge {
        sheet: sheet.to_string(),
    })
}

fn header_name(data: &Data) -> Option<String> {
    match to_cell(data)? {
        Cell::Text(t) => Some(t),
        Cell::Number(n) => Some(n.to_string()),
    }
}

fn to_cell(data: &Data) -> Option<Cell> {
    match data {
        Data::Int(i) => Some(Cell::Number(*i as f64)),
        Data::Float(f) if f.is_finite() => Some(Cell::Number(*f)),
        Data::String(s) if !s.is_empty() => Some(Cell::Text(s.clone())),
        Data::Bool(b) => Some(Cell::Text(b.to_string())),
        _ => None,
    }
}
