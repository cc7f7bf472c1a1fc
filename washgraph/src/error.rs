// washgraph/src/error.rs
//
// Load-time error taxonomy. Every variant aborts the run before detection
// starts; the detection rules themselves never fail.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: invalid JSON: {source}")]
    Json {
        line:   usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("input is missing required column `{0}`")]
    MissingColumn(&'static str),

    /// A transaction with a missing or unusable mandatory field.
    #[error("row {row}: malformed `{field}`: {reason}")]
    MalformedRecord {
        row:    usize,
        field:  &'static str,
        reason: String,
    },
}
