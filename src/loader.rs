use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::TVError;
use crate::table::{Column, ColumnKind, Table, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Csv,
    Json,
    JsonLines,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<FileFormat, TVError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileFormat::Csv),
            Some("JSON") => Ok(FileFormat::Json),
            Some("JSONL") | Some("NDJSON") => Ok(FileFormat::JsonLines),
            _ => Err(TVError::UnknownFileType),
        }
    }
}

#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub format: FileFormat,
}

/// Parses an uploaded byte stream into a [`Table`] named `name`.
pub fn parse(bytes: Vec<u8>, format: FileFormat, name: &str) -> Result<Table, TVError> {
    let start_time = Instant::now();
    let df = read_frame(bytes, format).map_err(|e| TVError::ParseError(e.to_string()))?;

    // Each column is converted in its own task
    let c_: Result<Vec<Column>, PolarsError> = df
        .get_column_names()
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect();
    let columns = c_.map_err(|e| TVError::ParseError(e.to_string()))?;

    for c in columns.iter() {
        debug!("Column: {}", c.as_string());
    }
    let table = Table::new(name, columns)?;
    debug!(
        "Parsed {:?} into {} rows in {}ms",
        format,
        table.nrows(),
        start_time.elapsed().as_millis()
    );
    Ok(table)
}

/// Reads, detects and parses the file at `path`. `~` and environment variables are expanded.
pub fn load_file(path: &str) -> Result<Table, TVError> {
    let start_time = Instant::now();
    let file_info = get_file_info(expand_path(path)?)?;
    let bytes = fs::read(&file_info.path)?;

    let name = file_info
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("???")
        .to_string();
    let table = parse(bytes, file_info.format, &name)?;

    info!(
        "Loaded {} ({} bytes) in {}ms ...",
        file_info.path.display(),
        file_info.file_size,
        start_time.elapsed().as_millis()
    );
    Ok(table)
}

pub fn expand_path(path: &str) -> Result<PathBuf, TVError> {
    let expanded = shellexpand::full(path.trim())
        .map_err(|e| TVError::LoadingFailed(e.to_string()))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, TVError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TVError::FileNotFound,
        ErrorKind::PermissionDenied => TVError::PermissionDenied,
        _ => TVError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(TVError::LoadingFailed("Not a file!".into()));
    }

    let file_size = metadata.len();
    let format = FileFormat::from_path(&path)?;

    Ok(FileInfo {
        path,
        file_size,
        format,
    })
}

// Dtypes are inferred from every row, so a column that turns to text late still loads.
fn read_frame(bytes: Vec<u8>, format: FileFormat) -> Result<DataFrame, PolarsError> {
    let reader = Cursor::new(bytes);
    match format {
        FileFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .into_reader_with_file_handle(reader)
            .finish(),
        FileFormat::Json => JsonReader::new(reader)
            .with_json_format(JsonFormat::Json)
            .infer_schema_len(None)
            .finish(),
        FileFormat::JsonLines => JsonReader::new(reader)
            .with_json_format(JsonFormat::JsonLines)
            .infer_schema_len(None)
            .finish(),
    }
}

fn is_integer_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn is_float_type(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<Column, PolarsError> {
    let column = df.column(col_name)?;
    let dtype = column.dtype();

    let (kind, data) = if is_integer_type(dtype) {
        let col = column.cast(&DataType::Int64)?;
        let values = col.i64()?.into_iter().map(Value::from).collect();
        (ColumnKind::Integer, values)
    } else if is_float_type(dtype) {
        let col = column.cast(&DataType::Float64)?;
        let values = col.f64()?.into_iter().map(Value::from).collect();
        (ColumnKind::Float, values)
    } else {
        let col = column.cast(&DataType::String)?;
        let values = col
            .str()?
            .into_iter()
            .map(|v| Value::from(v.map(str::to_string)))
            .collect();
        (ColumnKind::Text, values)
    };

    Ok(Column::new(col_name, kind, data))
}
