// washgraph/src/engine/pipeline.rs
//
// Batch detection pipeline.
//
//   records ─► build_asset_graphs ─► per asset (spawn_blocking, parallel):
//                                      kosaraju SCC → clusters
//                                      self_trade / zero_risk /
//                                      common_funder / common_exit
//           ─► serial aggregation (asset order, cluster order):
//                                      repeated_cluster + SeenClusters
//           ─► Report
//
// Assets share nothing except SeenClusters, and that is touched only in the
// serial stage, so output is identical from run to run regardless of how
// the blocking pool schedules the per-asset tasks.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::DetectorConfig;
use crate::events::{ClusterId, Finding, TransactionRecord};
use crate::report::Report;
use crate::state::graph::{build_asset_graphs, AssetGraph, GraphStats};
use crate::state::seen::SeenClusters;
use crate::workers::{self, repeated_cluster, ClusterContext};

/// Stateless-worker output for one cluster, waiting on the recurrence check.
#[derive(Debug)]
pub struct ClusterOutcome {
    pub id:       ClusterId,
    pub accounts: Vec<String>,
    pub findings: Vec<Finding>,
}

#[derive(Debug)]
pub struct AssetAnalysis {
    pub token_id: String,
    pub stats:    GraphStats,
    pub clusters: Vec<ClusterOutcome>,
}

/// SCC extraction plus the four stateless workers for one asset.
pub fn analyze_asset(graph: &AssetGraph, config: &DetectorConfig) -> AssetAnalysis {
    let clusters = graph.clusters(config.recurrence_scope);
    let stats    = graph.stats(&clusters);

    let outcomes = clusters
        .iter()
        .map(|cluster| {
            let ctx      = ClusterContext::new(graph, cluster, config);
            let findings = workers::run_all(&ctx);
            if !findings.is_empty() {
                debug!(
                    "token={} cluster={} size={} findings={}",
                    graph.token_id, cluster.id, cluster.len(), findings.len()
                );
            }
            ClusterOutcome { id: cluster.id.clone(), accounts: cluster.accounts.clone(), findings }
        })
        .collect();

    AssetAnalysis { token_id: graph.token_id.clone(), stats, clusters: outcomes }
}

pub struct Pipeline {
    config: Arc<DetectorConfig>,
}

impl Pipeline {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config: Arc::new(config) }
    }

    pub fn config(&self) -> &DetectorConfig { &self.config }

    /// One full detection run. SeenClusters lives exactly as long as this call.
    pub async fn run(&self, records: &[TransactionRecord]) -> Result<Report> {
        let start  = Instant::now();
        let graphs = build_asset_graphs(records)?;
        info!("Analyzing {} assets ({} transactions)", graphs.len(), records.len());

        let handles: Vec<_> = graphs
            .into_iter()
            .map(|graph| {
                let config = Arc::clone(&self.config);
                tokio::task::spawn_blocking(move || analyze_asset(&graph, &config))
            })
            .collect();

        let seen       = SeenClusters::new();
        let mut report = Report::new();
        report.stats.transactions = records.len();

        // Awaiting in spawn order keeps aggregation in asset encounter order.
        for handle in handles {
            let analysis = handle.await?;
            report.stats.absorb(&analysis.stats);

            for outcome in analysis.clusters {
                for finding in outcome.findings {
                    report.push(finding);
                }
                if let Some(finding) =
                    repeated_cluster::analyze(&analysis.token_id, &outcome.id, &outcome.accounts, &seen)
                {
                    report.push(finding);
                }
            }
        }

        info!(
            "Detection finished in {:.1} ms: {} findings, {} distinct clusters",
            start.elapsed().as_secs_f64() * 1000.0,
            report.total(),
            seen.len()
        );
        Ok(report)
    }
}
