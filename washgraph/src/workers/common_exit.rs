// washgraph/src/workers/common_exit.rs
//
// Common exit worker — wash rings tend to drain into one wallet. Count
// incoming transfers per receiver over the transfers touching the cluster;
// if the busiest receiver is a cluster member, report it.
//
// Ties on the top count go to the receiver that received first, so the
// result never depends on hash-map iteration order.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::events::Finding;
use crate::workers::ClusterContext;

pub fn analyze(ctx: &ClusterContext<'_>) -> Option<Finding> {
    let mut counts: Vec<(NodeIndex, usize)> = Vec::new(); // first-seen order
    let mut slot:   HashMap<NodeIndex, usize> = HashMap::new();

    for t in &ctx.transfers {
        match slot.entry(t.to) {
            Entry::Occupied(e) => counts[*e.get()].1 += 1,
            Entry::Vacant(e) => {
                e.insert(counts.len());
                counts.push((t.to, 1));
            }
        }
    }

    // Strictly greater replaces, so the earliest receiver keeps a tie.
    let (top, _) = counts
        .into_iter()
        .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })?;

    if !ctx.cluster.contains(top) {
        return None;
    }
    Some(Finding::CommonExit {
        token_id: ctx.token_id(),
        receiver: ctx.account(top),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;
    use crate::events::{tx, TransactionRecord};
    use crate::workers::fixtures::{cluster_of, graph};

    fn run(records: &[TransactionRecord], member: &str) -> Option<Finding> {
        let g = graph(records);
        let c = cluster_of(&g, member);
        let config = DetectorConfig::default();
        analyze(&ClusterContext::new(&g, &c, &config))
    }

    fn receiver(f: Option<Finding>) -> Option<String> {
        match f? {
            Finding::CommonExit { receiver, .. } => Some(receiver),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn busiest_member_receiver_is_reported() {
        let records = [
            tx("T", "A", "B", 1.0),
            tx("T", "B", "C", 1.0),
            tx("T", "C", "B", 1.0),
            tx("T", "B", "A", 1.0),
            tx("T", "A", "B", 1.0),
        ];
        assert_eq!(receiver(run(&records, "A")).as_deref(), Some("B"));
    }

    #[test]
    fn tie_goes_to_first_receiver() {
        let records = [tx("T1", "A", "B", 10.0), tx("T1", "B", "A", 10.0)];
        assert_eq!(receiver(run(&records, "A")).as_deref(), Some("B"));

        let reversed = [tx("T1", "B", "A", 10.0), tx("T1", "A", "B", 10.0)];
        assert_eq!(receiver(run(&reversed, "A")).as_deref(), Some("A"));
    }

    #[test]
    fn outside_top_receiver_suppresses_finding() {
        let records = [
            tx("T", "A", "B", 1.0),
            tx("T", "B", "A", 1.0),
            tx("T", "A", "Z", 1.0),
            tx("T", "B", "Z", 1.0),
            tx("T", "A", "Z", 1.0),
        ];
        assert!(run(&records, "A").is_none());
    }

    #[test]
    fn singleton_sender_only_cluster_is_clean() {
        // S only sends, so its own cluster {S} never receives.
        let records = [tx("T", "S", "R", 1.0), tx("T", "S", "R", 1.0)];
        assert!(run(&records, "S").is_none());
        assert_eq!(receiver(run(&records, "R")).as_deref(), Some("R"));
    }
}
