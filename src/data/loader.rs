use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::clean::{CleaningReport, build_dataset};
use super::model::{BookingDataset, RawBooking, RawNumber, country_code};
use super::season::Month;

pub const COL_IS_CANCELED: &str = "is_canceled";
pub const COL_ADULTS: &str = "adults";
pub const COL_CHILDREN: &str = "children";
pub const COL_BABIES: &str = "babies";
pub const COL_ADR: &str = "adr";
pub const COL_MONTH: &str = "arrival_date_month";
pub const COL_COUNTRY: &str = "country";

/// Columns that must be present in every input; anything else is ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_IS_CANCELED,
    COL_ADULTS,
    COL_CHILDREN,
    COL_BABIES,
    COL_ADR,
    COL_MONTH,
    COL_COUNTRY,
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and clean a booking dataset. Any error here is fatal to startup.
pub fn load_dataset(path: &Path) -> Result<(BookingDataset, CleaningReport)> {
    let rows = load_file(path).with_context(|| format!("loading {}", path.display()))?;
    log::info!("Read {} raw rows from {}", rows.len(), path.display());
    Ok(build_dataset(&rows))
}

/// Load raw bookings from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the booking columns
/// * `.json`    – `[{ "is_canceled": 0, "adults": 2, ... }, ...]`
/// * `.parquet` – one column per booking field
pub fn load_file(path: &Path) -> Result<Vec<RawBooking>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Column positions of the booking fields within a CSV header.
struct CsvLayout {
    is_canceled: usize,
    adults: usize,
    children: usize,
    babies: usize,
    adr: usize,
    month: usize,
    country: usize,
}

impl CsvLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .with_context(|| format!("CSV missing '{name}' column"))
        };
        Ok(CsvLayout {
            is_canceled: find(COL_IS_CANCELED)?,
            adults: find(COL_ADULTS)?,
            children: find(COL_CHILDREN)?,
            babies: find(COL_BABIES)?,
            adr: find(COL_ADR)?,
            month: find(COL_MONTH)?,
            country: find(COL_COUNTRY)?,
        })
    }
}

fn load_csv(path: &Path) -> Result<Vec<RawBooking>> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// Parse bookings from any CSV source.
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawBooking>> {
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let layout = CsvLayout::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let month = cell(layout.month)
            .parse::<Month>()
            .with_context(|| format!("CSV row {row_no}: bad '{COL_MONTH}'"))?;

        rows.push(RawBooking {
            is_canceled: RawNumber::parse(cell(layout.is_canceled)),
            adults: RawNumber::parse(cell(layout.adults)),
            children: RawNumber::parse(cell(layout.children)),
            babies: RawNumber::parse(cell(layout.babies)),
            adr: RawNumber::parse(cell(layout.adr)),
            month,
            country: country_code(cell(layout.country)),
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "is_canceled": 0, "adults": 2, "children": null, "babies": 0,
///     "adr": 75.5, "arrival_date_month": "July", "country": "PRT" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<RawBooking>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

/// Parse bookings from a JSON document.
pub fn parse_json(text: &str) -> Result<Vec<RawBooking>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let month = obj
            .get(COL_MONTH)
            .and_then(|v| v.as_str())
            .with_context(|| format!("Row {i}: missing or invalid '{COL_MONTH}'"))?
            .parse::<Month>()
            .with_context(|| format!("Row {i}: bad '{COL_MONTH}'"))?;

        let country = match obj.get(COL_COUNTRY) {
            Some(JsonValue::String(s)) => country_code(s),
            _ => String::new(),
        };

        rows.push(RawBooking {
            is_canceled: json_number(obj.get(COL_IS_CANCELED)),
            adults: json_number(obj.get(COL_ADULTS)),
            children: json_number(obj.get(COL_CHILDREN)),
            babies: json_number(obj.get(COL_BABIES)),
            adr: json_number(obj.get(COL_ADR)),
            month,
            country,
        });
    }
    Ok(rows)
}

fn json_number(val: Option<&JsonValue>) -> RawNumber {
    match val {
        None | Some(JsonValue::Null) => RawNumber::Missing,
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .map(RawNumber::Value)
            .unwrap_or_else(|| RawNumber::Invalid(n.to_string())),
        Some(JsonValue::String(s)) => RawNumber::parse(s),
        Some(JsonValue::Bool(b)) => RawNumber::Value(if *b { 1.0 } else { 0.0 }),
        Some(other) => RawNumber::Invalid(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of bookings.
///
/// Numeric columns may be any of Int32/Int64/Float32/Float64 (Pandas writes
/// `children` as Float64 because of missing values), Boolean, or Utf8.
/// `arrival_date_month` and `country` must be string columns.
fn load_parquet(path: &Path) -> Result<Vec<RawBooking>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let is_canceled = column(&batch, COL_IS_CANCELED)?;
        let adults = column(&batch, COL_ADULTS)?;
        let children = column(&batch, COL_CHILDREN)?;
        let babies = column(&batch, COL_BABIES)?;
        let adr = column(&batch, COL_ADR)?;
        let month = column(&batch, COL_MONTH)?;
        let country = column(&batch, COL_COUNTRY)?;

        let base = rows.len();
        for row in 0..batch.num_rows() {
            let row_no = base + row;
            let month_name = string_cell(month, row)
                .with_context(|| format!("Row {row_no}: failed to read '{COL_MONTH}'"))?
                .with_context(|| format!("Row {row_no}: null '{COL_MONTH}'"))?;
            let month = month_name
                .parse::<Month>()
                .with_context(|| format!("Row {row_no}: bad '{COL_MONTH}'"))?;
            let country = string_cell(country, row)
                .with_context(|| format!("Row {row_no}: failed to read '{COL_COUNTRY}'"))?
                .map(|c| country_code(&c))
                .unwrap_or_default();

            rows.push(RawBooking {
                is_canceled: numeric_cell(is_canceled, row)?,
                adults: numeric_cell(adults, row)?,
                children: numeric_cell(children, row)?,
                babies: numeric_cell(babies, row)?,
                adr: numeric_cell(adr, row)?,
                month,
                country,
            });
        }
    }

    Ok(rows)
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

/// Extract a numeric cell from an Arrow column at the given row.
fn numeric_cell(col: &ArrayRef, row: usize) -> Result<RawNumber> {
    if col.is_null(row) {
        return Ok(RawNumber::Missing);
    }
    let value = match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            RawNumber::Value(f64::from(arr.value(row)))
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            RawNumber::Value(arr.value(row) as f64)
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            RawNumber::from(f64::from(arr.value(row)))
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            RawNumber::from(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            RawNumber::Value(if arr.value(row) { 1.0 } else { 0.0 })
        }
        DataType::Utf8 | DataType::LargeUtf8 => match string_cell(col, row)? {
            Some(s) => RawNumber::parse(&s),
            None => RawNumber::Missing,
        },
        other => bail!("Unsupported numeric column type {other:?}"),
    };
    Ok(value)
}

/// Extract a string cell; `None` for nulls.
fn string_cell(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Utf8 => Ok(Some(col.as_string::<i32>().value(row).to_string())),
        DataType::LargeUtf8 => Ok(Some(col.as_string::<i64>().value(row).to_string())),
        other => bail!("Expected string column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "hotel,is_canceled,adults,children,babies,adr,arrival_date_month,country\n";

    fn csv_rows(body: &str) -> Result<Vec<RawBooking>> {
        let text = format!("{HEADER}{body}");
        read_csv(csv::Reader::from_reader(text.as_bytes()))
    }

    #[test]
    fn reads_csv_rows_and_ignores_extra_columns() {
        let rows = csv_rows(
            "Resort Hotel,0,2,,0,75.5,July,PRT\n\
             City Hotel,1,1,1.0,0,120,August,\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].children, RawNumber::Missing);
        assert_eq!(rows[0].adr, RawNumber::Value(75.5));
        assert_eq!(rows[0].month, Month::July);
        assert_eq!(rows[1].country, "");
        assert_eq!(rows[1].children, RawNumber::Value(1.0));
    }

    #[test]
    fn null_markers_are_missing_values() {
        let rows = csv_rows(
            "City Hotel,0,2,NULL,0,80,July,NULL\n\
             City Hotel,1,2,N/A,0,80,July,PRT\n\
             City Hotel,0,2,0,0,80,July,NULL\n",
        )
        .unwrap();
        assert_eq!(rows[0].children, RawNumber::Missing);
        assert_eq!(rows[1].children, RawNumber::Missing);
        assert_eq!(rows[0].country, "");
        assert_eq!(rows[2].country, "");
        assert_eq!(rows[1].country, "PRT");

        let (ds, report) = build_dataset(&rows);
        assert_eq!(report.rows_kept, 3);
        assert_eq!(report.rows_dropped(), 0);
        assert!(ds.records.iter().all(|r| r.children == 0));
    }

    #[test]
    fn unknown_month_is_an_error() {
        let err = csv_rows("Resort Hotel,0,2,0,0,75.5,Juli,PRT\n").unwrap_err();
        assert!(format!("{err:#}").contains("Juli"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let text = "is_canceled,adults,children,babies,adr,arrival_date_month\n0,2,0,0,1,July\n";
        let err = read_csv(csv::Reader::from_reader(text.as_bytes())).unwrap_err();
        assert!(err.to_string().contains("country"));
    }

    #[test]
    fn parses_json_records() {
        let rows = parse_json(
            r#"[
                {"is_canceled": 1, "adults": 2, "children": null, "babies": 0,
                 "adr": 99.0, "arrival_date_month": "May", "country": "GBR"},
                {"is_canceled": 0, "adults": "x", "babies": 0,
                 "adr": 10, "arrival_date_month": "June", "country": null}
            ]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].is_canceled, RawNumber::Value(1.0));
        assert_eq!(rows[0].children, RawNumber::Missing);
        assert_eq!(rows[1].adults, RawNumber::Invalid("x".into()));
        assert_eq!(rows[1].children, RawNumber::Missing);
        assert_eq!(rows[1].country, "");
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_file(Path::new("bookings.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
