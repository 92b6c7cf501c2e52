// Error types for the scraping and spreadsheet layers
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Request unsuccessful for {url}. Response code: {status}")]
    Status { url: String, status: u16 },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not find {0} in page")]
    MissingElement(String),
    #[error("Could not parse stat {label} from value {raw:?}")]
    Stat { label: String, raw: String },
}

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Workbook read error: {0}")]
    Read(#[from] calamine::XlsxError),
    #[error("Workbook write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    #[error("Sheet {sheet} is too large to write")]
    TooLarge { sheet: String },
}
