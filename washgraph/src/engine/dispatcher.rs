// washgraph/src/engine/dispatcher.rs
//
// Writes one artifact per detection category plus summary.json.
//   csv   — header row from Category::columns, list fields `;`-joined
//   jsonl — one tagged Finding object per line
// Files are rewritten on every run; empty categories still get a file so
// downstream readers always find all five.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tracing::info;

use crate::config::ArtifactFormat;
use crate::events::{Category, Finding};
use crate::report::Report;

pub const SUMMARY_FILE: &str = "summary.json";

pub struct Dispatcher {
    out:    PathBuf,
    format: ArtifactFormat,
}

impl Dispatcher {
    pub fn new(output_dir: impl Into<PathBuf>, format: ArtifactFormat) -> Result<Self> {
        let out: PathBuf = output_dir.into();
        std::fs::create_dir_all(&out)
            .map_err(|e| anyhow!("failed to create output directory {}: {}", out.display(), e))?;
        Ok(Self { out, format })
    }

    pub fn output_dir(&self) -> &Path { &self.out }

    /// Write every category artifact and the summary. Returns the paths written.
    pub async fn dispatch(&self, report: &Report) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(Category::ALL.len() + 1);

        for category in Category::ALL {
            let findings = report.findings(category);
            let body = match self.format {
                ArtifactFormat::Csv   => render_csv(category, findings)?,
                ArtifactFormat::Jsonl => render_jsonl(findings)?,
            };
            let file = format!("{}.{}", category.file_stem(), self.format.extension());
            written.push(self.write(&file, &body).await?);
            info!("{} → {} ({} rows)", category, file, findings.len());
        }

        written.push(self.write(SUMMARY_FILE, &(report.to_json() + "\n")).await?);
        Ok(written)
    }

    async fn write(&self, file: &str, content: &str) -> Result<PathBuf> {
        let path = self.out.join(file);
        tokio::fs::write(&path, content.as_bytes()).await?;
        Ok(path)
    }
}

pub fn render_csv(category: Category, findings: &[Finding]) -> Result<String> {
    let mut w = csv::WriterBuilder::new().from_writer(Vec::new());
    w.write_record(category.columns())?;
    for f in findings {
        w.write_record(f.to_row())?;
    }
    let bytes = w.into_inner().map_err(|e| anyhow!("csv flush failed: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn render_jsonl(findings: &[Finding]) -> Result<String> {
    let mut body = String::new();
    for f in findings {
        body.push_str(&f.to_jsonl()?);
        body.push('\n');
    }
    Ok(body)
}
