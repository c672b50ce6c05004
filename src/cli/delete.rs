use anyhow::Context;
use insure::{Backend, Collection, Config, EntityStore, Id, Reference};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The collection the record belongs to
    collection: Collection,

    /// The ID of the record to delete
    id: Id,

    /// Also delete the owner's vehicles (owners only)
    #[arg(long)]
    cascade: bool,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument(skip(store, config))]
    pub fn run<B: Backend>(
        self,
        store: &mut EntityStore<B>,
        config: &Config,
    ) -> anyhow::Result<()> {
        let owners = self.collection == Collection::Owners;
        let cascade = self.cascade || (config.cascade_owner_delete && owners);
        if cascade && !owners {
            anyhow::bail!("--cascade only applies to owners");
        }

        store.list_collection(self.collection)?;
        let target = Reference {
            collection: self.collection,
            id: self.id,
        };
        let Some(label) = store.cache().label(target).map(str::to_string) else {
            anyhow::bail!("{target} not found");
        };

        if !self.yes {
            let prompt = if cascade {
                format!("Delete {target} ({label}) and all of their vehicles?")
            } else {
                format!("Delete {target} ({label})?")
            };
            let confirmed = dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .context("failed to read confirmation")?;
            if !confirmed {
                println!("{}", "Cancelled".dim());
                return Ok(());
            }
        }

        let message = if cascade {
            let vehicles = store.remove_owner_cascading(self.id)?;
            store.list_collection(Collection::Vehicles)?;
            format!("✅ Deleted {target} and {vehicles} vehicle(s)")
        } else {
            store.remove_from(self.collection, self.id)?;
            format!("✅ Deleted {target}")
        };
        store.list_collection(self.collection)?;

        println!("{}", message.success());
        Ok(())
    }
}
