use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::sources::{SourceKind, Sources};

#[derive(Args)]
pub struct ReportCommand {
    /// Source to report on (all sources when omitted)
    #[arg(value_enum)]
    source: Option<SourceKind>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ReportEntry {
    source: SourceKind,
    label: &'static str,
    report: String,
}

impl ReportCommand {
    pub async fn execute(self) -> Result<()> {
        let sources = Sources::new();
        let kinds: Vec<SourceKind> = match self.source {
            Some(kind) => vec![kind],
            None => SourceKind::ALL.to_vec(),
        };

        let mut entries = Vec::new();
        for kind in kinds {
            entries.push(ReportEntry {
                source: kind,
                label: kind.label(),
                report: sources.fetch(kind).await,
            });
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            for entry in entries {
                println!("{}", entry.label.cyan().bold());
                println!("{}", entry.report);
                println!();
            }
        }

        Ok(())
    }
}
