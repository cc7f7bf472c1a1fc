// washgraph/src/config.rs
//
// Detector tuning + output format switches. Built from the CLI in main.rs;
// defaults reproduce the reference detection run.

use clap::ValueEnum;

/// How cluster identity is keyed for the repeated-cluster rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RecurrenceScope {
    /// Identity = (token id, account set). Repeats only within one asset.
    #[default]
    Asset,
    /// Identity = account set alone. The same group clustering under
    /// different tokens counts as a repeat.
    Accounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ArtifactFormat {
    #[default]
    Csv,
    Jsonl,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv   => "csv",
            Self::Jsonl => "jsonl",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Decimal places kept when testing zero-risk balances.
    pub price_decimals:     u32,
    /// Cluster members a single funder must pay before it is reported.
    pub min_funder_overlap: usize,
    pub recurrence_scope:   RecurrenceScope,
}

impl DetectorConfig {
    /// 10^price_decimals, capped where f64 stops resolving the fraction.
    pub fn rounding_scale(&self) -> f64 {
        10f64.powi(self.price_decimals.min(15) as i32)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            price_decimals:     8,
            min_funder_overlap: 2,
            recurrence_scope:   RecurrenceScope::Asset,
        }
    }
}
