// washgraph/src/workers/self_trade.rs
//
// Self-trade worker: an account selling the asset to itself. One finding per
// member per cluster, however many self-transfers that member made.

use crate::events::Finding;
use crate::workers::ClusterContext;

pub fn analyze(ctx: &ClusterContext<'_>) -> Vec<Finding> {
    ctx.cluster
        .nodes
        .iter()
        .filter(|&&n| ctx.graph.has_self_transfer(n))
        .map(|&n| Finding::SelfTrade {
            token_id: ctx.token_id(),
            account:  ctx.account(n),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;
    use crate::events::tx;
    use crate::workers::fixtures::{cluster_of, graph};

    #[test]
    fn single_self_transfer() {
        let g = graph(&[tx("T2", "A", "A", 5.0)]);
        let c = cluster_of(&g, "A");
        let config = DetectorConfig::default();
        let findings = analyze(&ClusterContext::new(&g, &c, &config));
        assert_eq!(findings, vec![Finding::SelfTrade { token_id: "T2".into(), account: "A".into() }]);
    }

    #[test]
    fn repeated_self_transfers_report_once() {
        let g = graph(&[
            tx("T", "A", "A", 5.0),
            tx("T", "A", "A", 6.0),
            tx("T", "A", "A", 7.0),
        ]);
        let c = cluster_of(&g, "A");
        let config = DetectorConfig::default();
        assert_eq!(analyze(&ClusterContext::new(&g, &c, &config)).len(), 1);
    }

    #[test]
    fn cycle_without_self_edge_is_clean() {
        let g = graph(&[tx("T1", "A", "B", 10.0), tx("T1", "B", "A", 10.0)]);
        let c = cluster_of(&g, "A");
        let config = DetectorConfig::default();
        assert!(analyze(&ClusterContext::new(&g, &c, &config)).is_empty());
    }

    #[test]
    fn self_edge_inside_larger_cluster() {
        let g = graph(&[
            tx("T", "A", "B", 1.0),
            tx("T", "B", "A", 1.0),
            tx("T", "B", "B", 1.0),
        ]);
        let c = cluster_of(&g, "A");
        let config = DetectorConfig::default();
        let findings = analyze(&ClusterContext::new(&g, &c, &config));
        assert_eq!(findings, vec![Finding::SelfTrade { token_id: "T".into(), account: "B".into() }]);
    }
}
