// washgraph/src/loader.rs
//
// Transaction table loader — CSV (header row) or JSONL (one object per line).
//
// Expected columns, named as in the upstream NFT export:
//   token_id, from_account, to_account, price, tx_timestamp
// Extra columns are ignored. The table is fully materialized before any
// detection runs; the first malformed row aborts the whole load.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::ValueEnum;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::LoadError;
use crate::events::TransactionRecord;

pub const REQUIRED_COLUMNS: [&str; 5] =
    ["token_id", "from_account", "to_account", "price", "tx_timestamp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Csv,
    Jsonl,
}

impl InputFormat {
    /// `.jsonl` / `.ndjson` → Jsonl, anything else → Csv.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson") =>
                Self::Jsonl,
            _ => Self::Csv,
        }
    }
}

// ── Raw rows ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RawRow {
    token_id:     Option<String>,
    from_account: Option<String>,
    to_account:   Option<String>,
    price:        Option<String>,
    tx_timestamp: Option<String>,
}

// JSONL exports write ids and prices as numbers or strings interchangeably.
#[derive(Debug, Deserialize)]
struct JsonRow {
    token_id:     Option<serde_json::Value>,
    from_account: Option<serde_json::Value>,
    to_account:   Option<serde_json::Value>,
    price:        Option<serde_json::Value>,
    tx_timestamp: Option<serde_json::Value>,
}

fn json_scalar(v: Option<serde_json::Value>) -> Option<String> {
    match v? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b)   => Some(b.to_string()),
        _                            => None,
    }
}

impl From<JsonRow> for RawRow {
    fn from(r: JsonRow) -> Self {
        Self {
            token_id:     json_scalar(r.token_id),
            from_account: json_scalar(r.from_account),
            to_account:   json_scalar(r.to_account),
            price:        json_scalar(r.price),
            tx_timestamp: json_scalar(r.tx_timestamp),
        }
    }
}

impl RawRow {
    fn into_record(self, row: usize) -> Result<TransactionRecord, LoadError> {
        let required = |value: Option<String>, field: &'static str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| LoadError::MalformedRecord { row, field, reason: "missing value".into() })
        };

        let token_id     = required(self.token_id, "token_id")?;
        let from_account = required(self.from_account, "from_account")?;
        let to_account   = required(self.to_account, "to_account")?;
        let raw_price    = required(self.price, "price")?;
        let raw_ts       = required(self.tx_timestamp, "tx_timestamp")?;

        let price: f64 = raw_price.parse().map_err(|_| LoadError::MalformedRecord {
            row,
            field:  "price",
            reason: format!("not a number: {:?}", raw_price),
        })?;
        let tx_timestamp = parse_timestamp(&raw_ts).ok_or_else(|| LoadError::MalformedRecord {
            row,
            field:  "tx_timestamp",
            reason: format!("unrecognised timestamp: {:?}", raw_ts),
        })?;

        let record = TransactionRecord { token_id, from_account, to_account, price, tx_timestamp };
        record.validate(row)?;
        if record.price < 0.0 {
            warn!("row {}: negative price {} for token {}", row, record.price, record.token_id);
        }
        Ok(record)
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD[ T]HH:MM:SS[.f]` (taken as UTC), a bare
/// date, or integer Unix seconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    }
    raw.parse::<i64>().ok().and_then(|secs| DateTime::from_timestamp(secs, 0))
}

// ── Parsers ───────────────────────────────────────────────────────────────────

pub fn parse_csv(content: &str) -> Result<Vec<TransactionRecord>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(LoadError::MissingColumn(col));
        }
    }

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<RawRow>().enumerate() {
        records.push(row?.into_record(i + 1)?);
    }
    Ok(records)
}

pub fn parse_jsonl(content: &str) -> Result<Vec<TransactionRecord>, LoadError> {
    let mut records = Vec::new();
    // `line` in Json errors is physical; `row` in MalformedRecord counts data rows only.
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() { continue; }
        let row: JsonRow = serde_json::from_str(line)
            .map_err(|source| LoadError::Json { line: i + 1, source })?;
        records.push(RawRow::from(row).into_record(records.len() + 1)?);
    }
    Ok(records)
}

pub async fn load_transactions(path: &Path, format: InputFormat) -> Result<Vec<TransactionRecord>, LoadError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;

    let records = match format {
        InputFormat::Csv   => parse_csv(&content)?,
        InputFormat::Jsonl => parse_jsonl(&content)?,
    };
    info!("Loaded {} transactions from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const HEADER: &str = "token_id,from_account,to_account,price,tx_timestamp,collection_name\n";

    #[test]
    fn parses_csv_and_ignores_extra_columns() {
        let csv = format!(
            "{}T1,0xA,0xB,10.5,2021-09-01 12:30:00,Apes\nT1, 0xB ,0xA,10.5,2021-09-01T13:00:00Z,Apes\n",
            HEADER
        );
        let records = parse_csv(&csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].from_account, "0xA");
        assert_eq!(records[1].from_account, "0xB");
        assert_eq!(records[0].price, 10.5);
        assert_eq!(records[0].tx_timestamp.hour(), 12);
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "token_id,from_account,price,tx_timestamp\nT1,A,1,0\n";
        assert!(matches!(parse_csv(csv), Err(LoadError::MissingColumn("to_account"))));
    }

    #[test]
    fn empty_sender_aborts_load_with_row_number() {
        let csv = format!("{}T1,A,B,1,0,x\nT1,,B,1,0,x\nT1,A,B,1,0,x\n", HEADER);
        match parse_csv(&csv) {
            Err(LoadError::MalformedRecord { row: 2, field: "from_account", .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unparseable_price_and_timestamp_are_malformed() {
        let bad_price = format!("{}T1,A,B,ten,0,x\n", HEADER);
        assert!(matches!(parse_csv(&bad_price), Err(LoadError::MalformedRecord { field: "price", .. })));

        let bad_ts = format!("{}T1,A,B,1,yesterday,x\n", HEADER);
        assert!(matches!(parse_csv(&bad_ts), Err(LoadError::MalformedRecord { field: "tx_timestamp", .. })));

        let inf = format!("{}T1,A,B,inf,0,x\n", HEADER);
        assert!(matches!(parse_csv(&inf), Err(LoadError::MalformedRecord { field: "price", .. })));
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(parse_timestamp("1600000000").unwrap().timestamp(), 1_600_000_000);
        assert_eq!(parse_timestamp("2022-01-02").unwrap().day(), 2);
        assert_eq!(parse_timestamp("2022-01-02 03:04:05.250").unwrap().second(), 5);
        assert_eq!(parse_timestamp("2022-01-02T03:04:05+02:00").unwrap().hour(), 1);
        assert!(parse_timestamp("02/01/2022").is_none());
    }

    #[test]
    fn parses_jsonl_with_numeric_fields() {
        let jsonl = r#"
{"token_id": 42, "from_account": "A", "to_account": "B", "price": 1.25, "tx_timestamp": "2022-01-01T00:00:00Z"}

{"token_id": "42", "from_account": "B", "to_account": "A", "price": "1.25", "tx_timestamp": 1640995200, "extra": true}
"#;
        let records = parse_jsonl(jsonl).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].token_id, records[1].token_id);
        assert_eq!(records[0].tx_timestamp, records[1].tx_timestamp);
    }

    #[test]
    fn jsonl_null_field_is_malformed() {
        let jsonl = r#"{"token_id": "T", "from_account": null, "to_account": "B", "price": 1, "tx_timestamp": 0}"#;
        assert!(matches!(
            parse_jsonl(jsonl),
            Err(LoadError::MalformedRecord { row: 1, field: "from_account", .. })
        ));
        assert!(matches!(parse_jsonl("{not json"), Err(LoadError::Json { line: 1, .. })));
    }

    #[test]
    fn jsonl_rows_skip_blank_lines_but_json_errors_keep_line_numbers() {
        let ok  = r#"{"token_id": "T", "from_account": "A", "to_account": "B", "price": 1, "tx_timestamp": 0}"#;
        let bad = r#"{"token_id": "T", "from_account": "A", "to_account": "B", "price": "x", "tx_timestamp": 0}"#;

        let jsonl = format!("\n{}\n\n\n{}\n", ok, bad);
        assert!(matches!(
            parse_jsonl(&jsonl),
            Err(LoadError::MalformedRecord { row: 2, field: "price", .. })
        ));

        let jsonl = format!("{}\n\n{{oops\n", ok);
        assert!(matches!(parse_jsonl(&jsonl), Err(LoadError::Json { line: 3, .. })));
    }

    #[test]
    fn format_inferred_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("log.JSONL")), InputFormat::Jsonl);
        assert_eq!(InputFormat::from_path(Path::new("nft_transactions.csv")), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("dump")), InputFormat::Csv);
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_transactions(&dir.path().join("absent.csv"), InputFormat::Csv).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("absent.csv"));
    }
}
