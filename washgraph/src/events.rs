// washgraph/src/events.rs
//
// Shared domain types flowing through washgraph.
// TransactionRecord is what the loader hands the graph builder;
// Finding is what the workers emit and the dispatcher writes out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

// ── Transfers ─────────────────────────────────────────────────────────────────

/// One ownership transfer of one asset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub token_id:     String,
    pub from_account: String,
    pub to_account:   String,
    pub price:        f64, // asset-native unit
    pub tx_timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// Reject records the graph builder cannot place. `row` is 1-based.
    pub fn validate(&self, row: usize) -> Result<(), LoadError> {
        let missing = |field: &'static str| LoadError::MalformedRecord {
            row,
            field,
            reason: "empty value".into(),
        };
        if self.token_id.trim().is_empty()     { return Err(missing("token_id")); }
        if self.from_account.trim().is_empty() { return Err(missing("from_account")); }
        if self.to_account.trim().is_empty()   { return Err(missing("to_account")); }
        if !self.price.is_finite() {
            return Err(LoadError::MalformedRecord {
                row,
                field:  "price",
                reason: format!("non-finite value {}", self.price),
            });
        }
        Ok(())
    }
}

/// Edge payload in an asset graph. One per transaction, never merged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferEdge {
    pub timestamp: DateTime<Utc>,
    pub price:     f64,
}

// ── Cluster identity ──────────────────────────────────────────────────────────

/// Stable content hash of a cluster: SHA256[:16] over the sorted member list,
/// salted with the token id when recurrence is scoped per asset.
/// Identical across processes, unlike a HashSet-derived hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId(String);

impl ClusterId {
    pub fn compute<S: AsRef<str>>(token_id: Option<&str>, accounts: &[S]) -> Self {
        use sha2::{Digest, Sha256};

        let mut sorted: Vec<&str> = accounts.iter().map(|a| a.as_ref()).collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut h = Sha256::new();
        match token_id {
            Some(token) => {
                h.update(b"wg_cluster:asset:");
                h.update((token.len() as u64).to_le_bytes());
                h.update(token.as_bytes());
            }
            None => h.update(b"wg_cluster:accounts:"),
        }
        // Length-prefixed so ["ab","c"] and ["a","bc"] never collide.
        for account in sorted {
            h.update((account.len() as u64).to_le_bytes());
            h.update(account.as_bytes());
        }
        Self(hex::encode(&h.finalize()[..16]))
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Detection types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    SelfTrade,       // sender == receiver
    ZeroRisk,        // every balance in the cluster nets to zero
    CommonFunder,    // one sender feeds ≥2 cluster members
    CommonExit,      // the busiest receiver sits inside the cluster
    RepeatedCluster, // same cluster identity seen earlier in the run
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::SelfTrade,
        Category::ZeroRisk,
        Category::CommonFunder,
        Category::CommonExit,
        Category::RepeatedCluster,
    ];

    /// Artifact file stem. Matches the names the dashboard reads.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::SelfTrade       => "self_trades",
            Self::ZeroRisk        => "zero_risk",
            Self::CommonFunder    => "common_funder",
            Self::CommonExit      => "common_exit",
            Self::RepeatedCluster => "repeated_scc",
        }
    }

    /// Column header for delimited-text export.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::SelfTrade       => &["token_id", "account"],
            Self::ZeroRisk        => &["token_id", "accounts"],
            Self::CommonFunder    => &["token_id", "funder", "receivers"],
            Self::CommonExit      => &["token_id", "receiver"],
            Self::RepeatedCluster => &["token_id", "accounts"],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.file_stem())
    }
}

/// One reported rule match. Append-only; overlapping clusters may produce
/// identical findings and both are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Finding {
    SelfTrade       { token_id: String, account: String },
    ZeroRisk        { token_id: String, accounts: Vec<String> },
    CommonFunder    { token_id: String, funder: String, receivers: Vec<String> },
    CommonExit      { token_id: String, receiver: String },
    RepeatedCluster { token_id: String, accounts: Vec<String> },
}

const LIST_SEP: &str = ";";

impl Finding {
    pub fn category(&self) -> Category {
        match self {
            Self::SelfTrade { .. }       => Category::SelfTrade,
            Self::ZeroRisk { .. }        => Category::ZeroRisk,
            Self::CommonFunder { .. }    => Category::CommonFunder,
            Self::CommonExit { .. }      => Category::CommonExit,
            Self::RepeatedCluster { .. } => Category::RepeatedCluster,
        }
    }

    #[cfg(test)]
    pub fn token_id(&self) -> &str {
        match self {
            Self::SelfTrade { token_id, .. }
            | Self::ZeroRisk { token_id, .. }
            | Self::CommonFunder { token_id, .. }
            | Self::CommonExit { token_id, .. }
            | Self::RepeatedCluster { token_id, .. } => token_id,
        }
    }

    /// Flat row in `Category::columns` order; list fields are `;`-joined.
    pub fn to_row(&self) -> Vec<String> {
        match self {
            Self::SelfTrade { token_id, account } =>
                vec![token_id.clone(), account.clone()],
            Self::ZeroRisk { token_id, accounts }
            | Self::RepeatedCluster { token_id, accounts } =>
                vec![token_id.clone(), accounts.join(LIST_SEP)],
            Self::CommonFunder { token_id, funder, receivers } =>
                vec![token_id.clone(), funder.clone(), receivers.join(LIST_SEP)],
            Self::CommonExit { token_id, receiver } =>
                vec![token_id.clone(), receiver.clone()],
        }
    }

    pub fn to_jsonl(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
pub(crate) fn tx(token: &str, from: &str, to: &str, price: f64) -> TransactionRecord {
    TransactionRecord {
        token_id:     token.into(),
        from_account: from.into(),
        to_account:   to.into(),
        price,
        tx_timestamp: DateTime::from_timestamp(1_650_000_000, 0).unwrap(),
    }
}
