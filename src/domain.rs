use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum TVError {
    IoError(Error),
    PolarsError(PolarsError),
    ParseError(String),
    LoadingFailed(String),
    InvalidTable(String),
    Clipboard(String),
    NothingLoaded,
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl fmt::Display for TVError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TVError::IoError(e) => write!(f, "I/O error: {e}"),
            TVError::PolarsError(e) => write!(f, "Data error: {e}"),
            TVError::ParseError(msg) => write!(f, "Could not parse file: {msg}"),
            TVError::LoadingFailed(msg) => write!(f, "Loading failed: {msg}"),
            TVError::InvalidTable(msg) => write!(f, "Invalid table: {msg}"),
            TVError::Clipboard(msg) => write!(f, "Clipboard error: {msg}"),
            TVError::NothingLoaded => write!(f, "No data loaded"),
            TVError::FileNotFound => write!(f, "File not found"),
            TVError::PermissionDenied => write!(f, "Permission denied"),
            TVError::UnknownFileType => {
                write!(f, "Unknown file type (expected .csv, .json, .jsonl or .ndjson)")
            }
        }
    }
}

impl std::error::Error for TVError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TVError::IoError(e) => Some(e),
            TVError::PolarsError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Error> for TVError {
    fn from(err: Error) -> Self {
        TVError::IoError(err)
    }
}

impl From<PolarsError> for TVError {
    fn from(err: PolarsError) -> Self {
        TVError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
pub struct TVConfig {
    /// Milliseconds the controller waits for a terminal event per tick.
    pub event_poll_time: u64,
    /// Upper bound for the width of the field name column in the record view.
    pub max_column_width: usize,
    /// Column searched with a case-insensitive substring.
    pub id_column: String,
    /// Columns offered as exact-match pick lists, if present in the loaded table.
    pub filter_columns: Vec<String>,
}

impl Default for TVConfig {
    fn default() -> Self {
        TVConfig {
            event_poll_time: 100,
            max_column_width: 40,
            id_column: "reraNo".to_string(),
            filter_columns: vec![
                "projectStatus".to_string(),
                "state".to_string(),
                "district".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    OpenFile,
    ExportFile,
    SearchId,
}

impl CMDMode {
    pub fn prompt(&self) -> &'static str {
        match self {
            CMDMode::OpenFile => "Open: ",
            CMDMode::ExportFile => "Export to: ",
            CMDMode::SearchId => "Search: ",
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Message {
    Quit,
    NextRecord,
    PreviousRecord,
    FirstRecord,
    LastRecord,
    MoveUp,
    MoveDown,
    ScrollUp,
    ScrollDown,
    Enter,
    Exit,
    ApplyFilters,
    ClearFilters,
    OpenFile,
    ExportFile,
    CopyRecord,
    Help,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
q  Ctrl-C  Quit, Ctrl-C also while typing
Left  p    Previous record
Right n    Next record
Home End   First / last record
Up k       Previous filter / pick list entry
Down j     Next filter / pick list entry
PgUp PgDn  Scroll record fields / pick list
Enter      Edit selected filter
a          Apply filters
c          Clear filters
o          Open a CSV / JSON file
e          Export filtered records to CSV
y          Copy current record to clipboard
?          Show this help
Esc        Close popup / cancel input";
