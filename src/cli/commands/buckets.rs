//! Buckets command - list cache buckets

use crate::cli::args::{BucketsArgs, OutputFormat};
use crate::config::Config;
use crate::error::ProxyResult;
use crate::store::{create_store, CacheStore};
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

/// One row of the listing
#[derive(Debug, Serialize)]
pub struct BucketSummary {
    pub name: String,
    pub entries: usize,
    /// Owned by the configured version tag
    pub current: bool,
}

/// Summaries of every bucket, sorted by name
pub async fn summarize(store: &dyn CacheStore, version_tag: &str) -> ProxyResult<Vec<BucketSummary>> {
    let mut summaries = vec![];
    for name in store.list_buckets().await? {
        let entries = store.keys(&name).await?.len();
        summaries.push(BucketSummary {
            current: name == version_tag,
            name,
            entries,
        });
    }
    Ok(summaries)
}

/// Execute the buckets command
pub async fn execute(args: BucketsArgs, config: &Config) -> ProxyResult<()> {
    let store = create_store(&config.store)?;
    let summaries = summarize(store.as_ref(), &config.proxy.version_tag).await?;

    if summaries.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No cache buckets");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&summaries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Plain => {
            for summary in &summaries {
                println!("{}", summary.name);
            }
        }
    }

    Ok(())
}

fn print_table(summaries: &[BucketSummary]) {
    println!(
        "{:<32} {:>8}  {}",
        style("BUCKET").bold(),
        style("ENTRIES").bold(),
        style("STATUS").bold()
    );
    println!("{}", "-".repeat(52));

    for summary in summaries {
        let status = if summary.current {
            style("current").green()
        } else {
            style("stale").yellow()
        };
        println!("{:<32} {:>8}  {}", summary.name, summary.entries, status);
    }

    println!();
    println!("{} bucket(s)", summaries.len());
}
