// washgraph/src/report.rs
//
// Findings grouped by category, in discovery order, plus run statistics.
// Renders the console summary and the summary.json payload.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::events::{Category, Finding};
use crate::state::graph::GraphStats;

// ── Run statistics ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct RunStats {
    pub transactions:        usize,
    pub assets:              usize,
    pub accounts:            usize, // summed per asset; one wallet in two assets counts twice
    pub transfers:           usize,
    pub clusters:            usize,
    pub nontrivial_clusters: usize,
}

impl RunStats {
    pub fn absorb(&mut self, g: &GraphStats) {
        self.assets              += 1;
        self.accounts            += g.accounts;
        self.transfers           += g.transfers;
        self.clusters            += g.clusters;
        self.nontrivial_clusters += g.nontrivial_clusters;
    }

    /// Mean total degree (in + out) per account node.
    pub fn avg_degree(&self) -> f64 {
        if self.accounts == 0 { 0.0 } else { 2.0 * self.transfers as f64 / self.accounts as f64 }
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    findings:  BTreeMap<Category, Vec<Finding>>,
    pub stats: RunStats,
}

impl Report {
    pub fn new() -> Self {
        Self {
            findings: Category::ALL.iter().map(|&c| (c, Vec::new())).collect(),
            stats:    RunStats::default(),
        }
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.entry(finding.category()).or_default().push(finding);
    }

    pub fn findings(&self, category: Category) -> &[Finding] {
        self.findings.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, category: Category) -> usize { self.findings(category).len() }

    pub fn total(&self) -> usize { self.findings.values().map(Vec::len).sum() }

    pub fn counts(&self) -> Vec<(Category, usize)> {
        Category::ALL.iter().map(|&c| (c, self.count(c))).collect()
    }

    pub fn print_summary(&self) {
        println!("\n\x1b[1mWash Trading Detection Summary:\x1b[0m");
        for (category, n) in self.counts() {
            let color = if n > 0 { "\x1b[93m" } else { "\x1b[90m" };
            println!("  {}{:<14}{} {:>6} detected", color, category, "\x1b[0m", n);
        }
        let s = &self.stats;
        println!(
            "\n\x1b[90m  transactions={}  assets={}  accounts={}  transfers={}  clusters={} (non-trivial {})  avg_degree={:.2}\x1b[0m\n",
            s.transactions, s.assets, s.accounts, s.transfers,
            s.clusters, s.nontrivial_clusters, s.avg_degree()
        );
    }

    pub fn to_json(&self) -> String {
        let counts: BTreeMap<String, usize> = self.counts()
            .into_iter()
            .map(|(c, n)| (c.to_string(), n))
            .collect();
        serde_json::json!({
            "counts":     counts,
            "total":      self.total(),
            "stats":      self.stats,
            "avg_degree": self.stats.avg_degree(),
        })
        .to_string()
    }
}

impl Default for Report { fn default() -> Self { Self::new() } }
