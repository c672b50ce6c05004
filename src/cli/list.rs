use anyhow::Context;
use clap::{Parser, ValueEnum};
use insure::{
    Accident, Backend, Collection, EntityStore, Owner, Policy, Vehicle,
    view::{self, Filter, View},
};
use regex::Regex;
use tracing::instrument;

use crate::cli::terminal::{self, Colorize};

/// Command arguments for `ins list`.
#[derive(Debug, Parser)]
pub struct List {
    /// The collection to list (owners, vehicles, policies or accidents)
    collection: Collection,

    /// Case-insensitive substring match against the searchable fields.
    #[arg(long, short)]
    search: Option<String>,

    /// Regular expression match against the searchable fields.
    #[arg(long)]
    regex: Option<String>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(skip(store))]
    pub fn run<B: Backend>(self, store: &mut EntityStore<B>) -> anyhow::Result<()> {
        let pattern = self
            .regex
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("invalid regex: {pattern}"))
            })
            .transpose()?;
        let filter = Filter::default()
            .search(self.search.as_deref())
            .pattern(pattern);

        terminal::with_spinner(&format!("Fetching {}", self.collection), || {
            view::required_collections(self.collection)
                .into_iter()
                .try_for_each(|collection| store.list_collection(collection).map(|_| ()))
        })?;

        match self.collection {
            Collection::Owners => print::<Owner, B>(store, &filter, self.output),
            Collection::Vehicles => print::<Vehicle, B>(store, &filter, self.output),
            Collection::Policies => print::<Policy, B>(store, &filter, self.output),
            Collection::Accidents => print::<Accident, B>(store, &filter, self.output),
        }
    }
}

fn print<F: View, B>(
    store: &EntityStore<B>,
    filter: &Filter,
    output: OutputFormat,
) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => {
            let records = view::filtered::<F>(store.cache(), filter);
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Table => {
            let table = view::table::<F>(store.cache(), filter);
            if table.is_empty() {
                println!("{}", format!("No {} found", F::COLLECTION).dim());
            } else {
                println!("{}", terminal::render_table(&table));
            }
        }
    }
    Ok(())
}
