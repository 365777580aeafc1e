//! Catalog Tree Inspector
//!
//! Loads a JSON record dump into an in-memory store, prints the tree the
//! console would render, and optionally runs a batch operation against it.
//!
//! # Usage
//!
//! ```bash
//! # Top-level rows only
//! cargo run --bin catalog-tree -- packages/dev-tools/fixtures/catalog.json
//!
//! # Everything expanded
//! cargo run --bin catalog-tree -- records.json --all
//!
//! # Disable two records, then print the refetched tree
//! cargo run --bin catalog-tree -- records.json --all --batch disable --select boots --select sneakers
//!
//! # Merge into another record
//! cargo run --bin catalog-tree -- records.json --batch merge:apparel --select boots
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_CONFIG`: Path to a console config JSON file (defaults used if unset or missing)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use catalog_core::config::ConsoleConfig;
use catalog_core::db::InMemoryStore;
use catalog_core::operations::{BatchOperation, BatchReport};
use catalog_core::services::CatalogConsole;
use clap::Parser;

#[derive(Parser)]
#[clap(author, version, about = "Inspect a catalog record dump as a tree")]
struct TreeArgs {
    /// JSON array of records
    records: PathBuf,

    /// Expand every record
    #[clap(long)]
    all: bool,

    /// Expand a record (repeatable)
    #[clap(long = "expand", value_name = "ID")]
    expand: Vec<String>,

    /// Batch operation: enable, disable, delete or merge:<target>
    #[clap(long, value_name = "OP")]
    batch: Option<BatchOperation>,

    /// Select a record for the batch (repeatable)
    #[clap(long = "select", value_name = "ID")]
    select: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = TreeArgs::parse();

    let config = match env::var("CATALOG_CONFIG") {
        Ok(path) => ConsoleConfig::from_json_file(&path)
            .await
            .map_err(|e| anyhow::anyhow!(e))?,
        Err(_) => ConsoleConfig::default(),
    };
    tracing::debug!("Console config: {:?}", config);

    let json = tokio::fs::read_to_string(&args.records)
        .await
        .with_context(|| format!("Failed to read {}", args.records.display()))?;
    let store = Arc::new(InMemoryStore::from_json_str(&json)?);

    let mut console = CatalogConsole::new(store, config)?;
    console.refresh().await?;

    let report = console.last_build_report();
    if !report.is_clean() {
        tracing::warn!(
            "Collection is not a clean forest: {} duplicate(s), {} cycle break(s)",
            report.duplicate_ids.len(),
            report.cycle_breaks.len()
        );
    }

    apply_expansion(&mut console, &args);
    print_tree(&console);

    if let Some(operation) = args.batch.clone() {
        for id in &args.select {
            console.toggle_selected(id);
        }

        let report = console.run_batch(operation).await?;
        print_report(&report);

        // Refresh kept surviving expansion; re-apply --all for new roots
        apply_expansion(&mut console, &args);
        println!();
        print_tree(&console);
    }

    console.shutdown();
    Ok(())
}

fn apply_expansion(console: &mut CatalogConsole<InMemoryStore>, args: &TreeArgs) {
    if args.all {
        let ids: Vec<String> = console.records().iter().map(|r| r.id.clone()).collect();
        console.expansion_mut().expand_all(ids);
    }
    for id in &args.expand {
        console.expansion_mut().expand(id);
    }
}

fn print_tree(console: &CatalogConsole<InMemoryStore>) {
    for row in console.visible_rows() {
        let marker = match (row.has_children, console.expansion().is_expanded(row.id)) {
            (false, _) => " ",
            (true, true) => "-",
            (true, false) => "+",
        };
        let state = if row.record.is_active { "" } else { " (disabled)" };
        println!(
            "{}{} {} [{}] {}{}",
            "  ".repeat(row.depth),
            marker,
            row.record.name,
            row.record.kind.name(),
            row.id,
            state
        );
    }
}

fn print_report(report: &BatchReport) {
    println!();
    println!(
        "Batch '{}': {} succeeded, {} failed, {} skipped",
        report.operation,
        report.succeeded.len(),
        report.failed.len(),
        report.skipped.len()
    );
    for failure in &report.failed {
        println!("  failed {}: {}", failure.id, failure.reason);
    }
    for id in &report.skipped {
        println!("  skipped {}", id);
    }
}
