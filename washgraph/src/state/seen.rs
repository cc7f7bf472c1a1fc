// washgraph/src/state/seen.rs
//
// Cluster identities observed so far in this run. Only the repeated-cluster
// worker reads or writes it.
//
// Lifecycle: created empty by Pipeline::run, grows monotonically, dropped
// when the run returns. Nothing is persisted between runs.
// DashSet gives an atomic check-and-insert, so concurrent callers cannot
// both see an identity as new.

use dashmap::DashSet;

use crate::events::ClusterId;

#[derive(Debug, Default)]
pub struct SeenClusters {
    ids: DashSet<ClusterId>,
}

impl SeenClusters {
    pub fn new() -> Self { Self::default() }

    #[cfg(test)]
    pub fn has_seen(&self, id: &ClusterId) -> bool {
        self.ids.contains(id)
    }

    /// Record the identity. Returns true on the first sighting, false if it
    /// was already present.
    pub fn record(&self, id: &ClusterId) -> bool {
        self.ids.insert(id.clone())
    }

    pub fn len(&self) -> usize { self.ids.len() }
}
