// washgraph/src/state/graph.rs
//
// Per-asset transfer graphs + strongly connected component extraction.
//
// Design:
//   - One petgraph DiGraph per token id; nodes are account ids
//   - Every transaction adds exactly one edge sender → receiver, so parallel
//     transfers stay distinct (balance computation walks all of them)
//   - Edge indices follow transaction order within the asset
//   - SCCs via Kosaraju; its DFS is iterative, so component size is not
//     bounded by thread stack depth. Each component becomes a Cluster
//     with a stable id
//
// A cluster's transaction subset is read straight off the graph: the edges
// incident to its members. No table rescans.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction::{Incoming, Outgoing};
use tracing::debug;

use crate::config::RecurrenceScope;
use crate::error::LoadError;
use crate::events::{ClusterId, TransactionRecord, TransferEdge};

// ── Asset graph ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct AssetGraph {
    pub token_id: String,
    graph:        DiGraph<String, TransferEdge>,
    node_map:     HashMap<String, NodeIndex>,
}

/// One edge of an asset graph, resolved to its endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Transfer<'a> {
    pub from: NodeIndex,
    pub to:   NodeIndex,
    pub edge: &'a TransferEdge,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub accounts:            usize,
    pub transfers:           usize,
    pub clusters:            usize,
    pub nontrivial_clusters: usize, // size ≥ 2
}

impl AssetGraph {
    pub fn new(token_id: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            graph:    DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    fn get_or_add_node(&mut self, account: &str) -> NodeIndex {
        if let Some(&n) = self.node_map.get(account) {
            return n;
        }
        let n = self.graph.add_node(account.to_string());
        self.node_map.insert(account.to_string(), n);
        n
    }

    pub fn add_transfer(&mut self, tx: &TransactionRecord) {
        let from = self.get_or_add_node(&tx.from_account);
        let to   = self.get_or_add_node(&tx.to_account);
        self.graph.add_edge(from, to, TransferEdge { timestamp: tx.tx_timestamp, price: tx.price });
    }

    #[cfg(test)]
    pub fn node(&self, account: &str) -> Option<NodeIndex> {
        self.node_map.get(account).copied()
    }

    pub fn account(&self, n: NodeIndex) -> &str { &self.graph[n] }

    pub fn n_accounts(&self) -> usize  { self.graph.node_count() }
    pub fn n_transfers(&self) -> usize { self.graph.edge_count() }

    /// True if the account ever transferred the asset to itself.
    pub fn has_self_transfer(&self, n: NodeIndex) -> bool {
        self.graph.find_edge(n, n).is_some()
    }

    /// Strongly connected components as clusters. The result partitions the
    /// node set (singletons included). Clusters are ordered by the first
    /// account to appear in the asset's history; members are sorted by id.
    pub fn clusters(&self, scope: RecurrenceScope) -> Vec<Cluster> {
        let mut components = kosaraju_scc(&self.graph);
        components.sort_by_key(|nodes| nodes.iter().min().copied());

        components
            .into_iter()
            .map(|mut nodes| {
                nodes.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
                let accounts: Vec<String> = nodes.iter().map(|&n| self.graph[n].clone()).collect();
                let id = match scope {
                    RecurrenceScope::Asset    => ClusterId::compute(Some(self.token_id.as_str()), &accounts),
                    RecurrenceScope::Accounts => ClusterId::compute::<String>(None, &accounts),
                };
                Cluster { id, members: nodes.iter().copied().collect(), nodes, accounts }
            })
            .collect()
    }

    /// Every transfer whose sender or receiver is in `members`, in
    /// transaction order. Internal and self transfers appear once.
    pub fn transfers_touching(&self, members: &[NodeIndex]) -> Vec<Transfer<'_>> {
        let mut edges: BTreeSet<EdgeIndex> = BTreeSet::new();
        for &n in members {
            edges.extend(self.graph.edges_directed(n, Outgoing).map(|e| e.id()));
            edges.extend(self.graph.edges_directed(n, Incoming).map(|e| e.id()));
        }
        edges
            .into_iter()
            .filter_map(|e| {
                let (from, to) = self.graph.edge_endpoints(e)?;
                Some(Transfer { from, to, edge: &self.graph[e] })
            })
            .collect()
    }

    pub fn stats(&self, clusters: &[Cluster]) -> GraphStats {
        GraphStats {
            accounts:            self.n_accounts(),
            transfers:           self.n_transfers(),
            clusters:            clusters.len(),
            nontrivial_clusters: clusters.iter().filter(|c| c.len() >= 2).count(),
        }
    }
}

// ── Clusters ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Cluster {
    pub id:       ClusterId,
    pub nodes:    Vec<NodeIndex>, // sorted by account id
    pub accounts: Vec<String>,    // same order as `nodes`
    members:      HashSet<NodeIndex>,
}

impl Cluster {
    pub fn contains(&self, n: NodeIndex) -> bool { self.members.contains(&n) }
    pub fn len(&self) -> usize { self.nodes.len() }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Group transactions by token id and build one graph per asset, in order of
/// first appearance. Fails on the first record the builder cannot place.
pub fn build_asset_graphs(records: &[TransactionRecord]) -> Result<Vec<AssetGraph>, LoadError> {
    let mut graphs: Vec<AssetGraph> = Vec::new();
    let mut slot:   HashMap<&str, usize> = HashMap::new();

    for (i, tx) in records.iter().enumerate() {
        tx.validate(i + 1)?;
        let idx = *slot.entry(tx.token_id.as_str()).or_insert_with(|| {
            graphs.push(AssetGraph::new(tx.token_id.as_str()));
            graphs.len() - 1
        });
        graphs[idx].add_transfer(tx);
    }

    debug!("Built {} asset graphs from {} transactions", graphs.len(), records.len());
    Ok(graphs)
}
