// washgraph/src/workers/repeated_cluster.rs
//
// Repeated cluster worker — the same account group forming a cluster again.
// The first sighting of an identity records it and stays silent; every later
// sighting is reported. Stateful, so the pipeline calls it exactly once per
// cluster from its serial aggregation stage.

use crate::events::{ClusterId, Finding};
use crate::state::seen::SeenClusters;

pub fn analyze(token_id: &str, id: &ClusterId, accounts: &[String], seen: &SeenClusters) -> Option<Finding> {
    if seen.record(id) {
        return None; // first sighting
    }
    Some(Finding::RepeatedCluster {
        token_id: token_id.to_string(),
        accounts: accounts.to_vec(),
    })
}
