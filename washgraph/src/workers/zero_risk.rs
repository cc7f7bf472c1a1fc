// washgraph/src/workers/zero_risk.rs
//
// Zero-risk position worker — circular wash trades net every participant to
// zero. Over every transfer touching the cluster (counterparties outside the
// cluster included), each sender is debited and each receiver credited the
// price. If every resulting balance rounds to zero, value only went round
// in a circle.
//
// Rounding to `price_decimals` (default 8) absorbs float accumulation noise:
// 0.1 + 0.2 - 0.3 is not 0.0, but it is at 8 decimals.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::events::Finding;
use crate::workers::ClusterContext;

pub fn analyze(ctx: &ClusterContext<'_>) -> Option<Finding> {
    let mut balances: HashMap<NodeIndex, f64> = HashMap::new();
    for t in &ctx.transfers {
        *balances.entry(t.from).or_default() -= t.edge.price;
        *balances.entry(t.to).or_default()   += t.edge.price;
    }

    let scale      = ctx.config.rounding_scale();
    let unbalanced = balances.values().filter(|&&b| (b * scale).round() != 0.0).count();
    if unbalanced > 0 {
        debug!(
            "zero_risk: token={} cluster={} unbalanced_accounts={}",
            ctx.graph.token_id, ctx.cluster.id, unbalanced
        );
        return None;
    }

    Some(Finding::ZeroRisk {
        token_id: ctx.token_id(),
        accounts: ctx.cluster.accounts.clone(),
    })
}
