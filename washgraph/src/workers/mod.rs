pub mod common_exit;
pub mod common_funder;
pub mod repeated_cluster;
pub mod self_trade;
pub mod zero_risk;

use petgraph::graph::NodeIndex;

use crate::config::DetectorConfig;
use crate::events::Finding;
use crate::state::graph::{AssetGraph, Cluster, Transfer};

/// Everything a per-cluster worker needs: the asset graph, the cluster, and
/// the transfers touching it (sender or receiver is a member).
pub struct ClusterContext<'a> {
    pub graph:     &'a AssetGraph,
    pub cluster:   &'a Cluster,
    pub transfers: Vec<Transfer<'a>>,
    pub config:    &'a DetectorConfig,
}

impl<'a> ClusterContext<'a> {
    pub fn new(graph: &'a AssetGraph, cluster: &'a Cluster, config: &'a DetectorConfig) -> Self {
        Self {
            graph,
            cluster,
            transfers: graph.transfers_touching(&cluster.nodes),
            config,
        }
    }

    pub fn token_id(&self) -> String { self.graph.token_id.clone() }

    pub fn account(&self, n: NodeIndex) -> String { self.graph.account(n).to_string() }
}

/// Run the four stateless workers on one cluster and collect their findings.
/// Workers cannot fail; one that finds nothing contributes nothing.
/// The repeated-cluster worker is stateful and runs in the aggregation stage.
pub fn run_all(ctx: &ClusterContext<'_>) -> Vec<Finding> {
    let mut findings = self_trade::analyze(ctx);
    findings.extend(zero_risk::analyze(ctx));
    findings.extend(common_funder::analyze(ctx));
    findings.extend(common_exit::analyze(ctx));
    findings
}


#[cfg(test)]
mod tests {
    use super::fixtures::{cluster_of, graph};
    use super::*;
    use crate::events::{tx, Category};

    #[test]
    fn closed_loop_of_two_yields_zero_risk_and_exit_only() {
        let g = graph(&[tx("T1", "A", "B", 10.0), tx("T1", "B", "A", 10.0)]);
        let c = cluster_of(&g, "A");
        let config = DetectorConfig::default();
        let findings = run_all(&ClusterContext::new(&g, &c, &config));

        let categories: Vec<_> = findings.iter().map(Finding::category).collect();
        assert_eq!(categories, vec![Category::ZeroRisk, Category::CommonExit]);
        match &findings[1] {
            Finding::CommonExit { receiver, .. } => assert_eq!(receiver, "B"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn context_subset_matches_graph_incidence() {
        let g = graph(&[tx("T", "F", "X", 1.0), tx("T", "X", "Y", 1.0), tx("T", "Y", "X", 1.0)]);
        let c = cluster_of(&g, "X");
        let config = DetectorConfig::default();
        let ctx = ClusterContext::new(&g, &c, &config);
        assert_eq!(ctx.transfers.len(), 3);
        assert_eq!(ctx.token_id(), "T");
    }
}
