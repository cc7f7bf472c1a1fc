// washgraph/src/workers/common_funder.rs
//
// Common funder worker — one wallet seeding several members of the same
// cluster. Over the transfers touching the cluster, collect each sender's
// distinct receivers; a sender paying at least `min_funder_overlap` (default
// 2) cluster members is reported with its full receiver set.
//
// The funder itself may be inside or outside the cluster. Several funders on
// one cluster give several findings.

use std::collections::{HashMap, HashSet};

use petgraph::graph::NodeIndex;

use crate::events::Finding;
use crate::workers::ClusterContext;

pub fn analyze(ctx: &ClusterContext<'_>) -> Vec<Finding> {
    let mut funders: Vec<NodeIndex> = Vec::new(); // first-seen order
    let mut targets: HashMap<NodeIndex, HashSet<NodeIndex>> = HashMap::new();

    for t in &ctx.transfers {
        targets
            .entry(t.from)
            .or_insert_with(|| {
                funders.push(t.from);
                HashSet::new()
            })
            .insert(t.to);
    }

    funders
        .into_iter()
        .filter_map(|funder| {
            let receivers = targets.get(&funder)?;
            let overlap   = receivers.iter().filter(|&&r| ctx.cluster.contains(r)).count();
            if overlap < ctx.config.min_funder_overlap {
                return None;
            }
            let mut names: Vec<String> = receivers.iter().map(|&r| ctx.account(r)).collect();
            names.sort();
            Some(Finding::CommonFunder {
                token_id:  ctx.token_id(),
                funder:    ctx.account(funder),
                receivers: names,
            })
        })
        .collect()
}
