use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use thiserror::Error;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal ingestion failure. Raised at startup only; the dashboard does not
/// start without a well-formed dataset.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("reading parquet batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("parquet schema: {0}")]
    Schema(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a shipment dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the source column names (the usual case)
/// * `.json`    – records-oriented array, `df.to_json(orient='records')`
/// * `.parquet` – flat typed columns with the same names
pub fn load_file(path: &Path) -> Result<Dataset, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedExtension(other.to_string())),
    };

    info!(
        "loaded {} shipment records from {}",
        dataset.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = std::fs::File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

/// Parse CSV from any reader. Split out so tests can feed in-memory bytes.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, DataLoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let records = csv_reader
        .deserialize::<Record>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected schema: a top-level array of objects keyed by the source
/// column names, e.g.
///
/// ```json
/// [
///   {
///     "Mode_of_Shipment": "Ship",
///     "Warehouse_block": "A",
///     "Product_importance": "low",
///     "Gender": "F",
///     "Customer_care_calls": 4,
///     "Cost_of_the_Product": 177.0,
///     "Discount_offered": 44.0,
///     "Reached.on.Time_Y.N": 1
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset, DataLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<Record> = serde_json::from_str(&text)?;
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per record field. Works with
/// files written by both Pandas (`df.to_parquet()`) and Polars
/// (`df.write_parquet()`); integer and float column widths are promoted
/// as needed.
fn load_parquet(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = std::fs::File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        append_batch(&batch, &mut records)?;
    }
    Ok(Dataset::from_records(records))
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>, DataLoadError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| DataLoadError::Schema(format!("missing column {name:?}")))?;
    Ok(batch.column(idx))
}

fn append_batch(batch: &RecordBatch, records: &mut Vec<Record>) -> Result<(), DataLoadError> {
    let mode = column(batch, "Mode_of_Shipment")?;
    let block = column(batch, "Warehouse_block")?;
    let importance = column(batch, "Product_importance")?;
    let gender = column(batch, "Gender")?;
    let calls = column(batch, "Customer_care_calls")?;
    let cost = column(batch, "Cost_of_the_Product")?;
    let discount = column(batch, "Discount_offered")?;
    let on_time = column(batch, "Reached.on.Time_Y.N")?;

    for row in 0..batch.num_rows() {
        records.push(Record {
            shipment_mode: str_at(mode, row, "Mode_of_Shipment")?,
            warehouse_block: str_at(block, row, "Warehouse_block")?,
            product_importance: str_at(importance, row, "Product_importance")?,
            gender: str_at(gender, row, "Gender")?,
            customer_care_calls: calls_at(calls, row)?,
            cost_of_product: f64_at(cost, row, "Cost_of_the_Product")?,
            discount_offered: f64_at(discount, row, "Discount_offered")?,
            on_time: flag_at(on_time, row)?,
        });
    }
    Ok(())
}

// -- Arrow column helpers --

fn str_at(col: &Arc<dyn Array>, row: usize, name: &str) -> Result<String, DataLoadError> {
    if col.is_null(row) {
        return Err(DataLoadError::Schema(format!("null in column {name:?}")));
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => Err(DataLoadError::Schema(format!(
            "column {name:?} has type {other:?}, expected Utf8"
        ))),
    }
}

fn i64_at(col: &Arc<dyn Array>, row: usize, name: &str) -> Result<i64, DataLoadError> {
    if col.is_null(row) {
        return Err(DataLoadError::Schema(format!("null in column {name:?}")));
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .ok_or_else(|| DataLoadError::Schema(format!("column {name:?} downcast")))?;
            Ok(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| DataLoadError::Schema(format!("column {name:?} downcast")))?;
            Ok(arr.value(row))
        }
        other => Err(DataLoadError::Schema(format!(
            "column {name:?} has type {other:?}, expected an integer type"
        ))),
    }
}

fn f64_at(col: &Arc<dyn Array>, row: usize, name: &str) -> Result<f64, DataLoadError> {
    if col.is_null(row) {
        return Err(DataLoadError::Schema(format!("null in column {name:?}")));
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| DataLoadError::Schema(format!("column {name:?} downcast")))?;
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| DataLoadError::Schema(format!("column {name:?} downcast")))?;
            Ok(arr.value(row) as f64)
        }
        // Integer-typed cost/discount columns are common in exported data.
        DataType::Int32 | DataType::Int64 => Ok(i64_at(col, row, name)? as f64),
        other => Err(DataLoadError::Schema(format!(
            "column {name:?} has type {other:?}, expected a numeric type"
        ))),
    }
}

fn calls_at(col: &Arc<dyn Array>, row: usize) -> Result<u32, DataLoadError> {
    let n = i64_at(col, row, "Customer_care_calls")?;
    u32::try_from(n).map_err(|_| {
        DataLoadError::Schema(format!("Customer_care_calls out of range: {n}"))
    })
}

fn flag_at(col: &Arc<dyn Array>, row: usize) -> Result<bool, DataLoadError> {
    // Some writers emit the indicator as a boolean column directly.
    if let DataType::Boolean = col.data_type() {
        let arr = col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .ok_or_else(|| DataLoadError::Schema("on-time flag downcast".to_string()))?;
        return Ok(arr.value(row));
    }
    match i64_at(col, row, "Reached.on.Time_Y.N")? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DataLoadError::Schema(format!(
            "on-time flag must be 0 or 1, got {other}"
        ))),
    }
}
