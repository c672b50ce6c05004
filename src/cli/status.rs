use anyhow::Context;
use insure::{Backend, EntityStore, view};
use tracing::instrument;

use crate::cli::terminal::{self, Colorize};

/// Fetch every collection and summarise it.
#[derive(Debug, Default, clap::Parser)]
pub struct Status {
    /// List each unresolved reference instead of only counting them
    #[arg(long)]
    references: bool,
}

impl Status {
    #[instrument(skip(store))]
    pub fn run<B: Backend>(self, store: &mut EntityStore<B>) -> anyhow::Result<()> {
        terminal::with_spinner("Fetching records", || store.refresh_all())
            .context("failed to refresh records")?;

        for (collection, count) in view::summary(store.cache()) {
            println!("{:<10} {count}", collection.as_str().header());
        }

        let dangling = store.cache().unresolved_references();
        if dangling.is_empty() {
            println!("{}", "All references resolve".success());
            return Ok(());
        }

        println!(
            "{}",
            format!("⚠️  {} unresolved reference(s), shown as N/A", dangling.len()).warning()
        );
        if self.references {
            for (source, target) in dangling {
                println!("  {source} → missing {target}");
            }
        } else {
            println!("{}", "Use --references to list them".dim());
        }
        Ok(())
    }
}
