use chrono::NaiveDate;
use insure::{
    Accident, Backend, EntityStore, Id, Owner, Policy, PolicyStatus, Vehicle, view::View,
};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Create {
    #[command(subcommand)]
    record: NewRecord,
}

#[derive(Debug, clap::Subcommand)]
enum NewRecord {
    /// Register a vehicle owner
    Owner {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        phone_number: String,
    },

    /// Register a vehicle
    Vehicle {
        /// Registration plate, e.g. KA-01-AB-1234
        #[arg(long)]
        vehicle_no: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        year: u16,
        #[arg(long)]
        vin: String,
        /// ID of the owning owner
        #[arg(long = "owner")]
        owner_id: Id,
    },

    /// Issue a policy for a vehicle
    Policy {
        #[arg(long)]
        policy_no: String,
        /// First day of cover (YYYY-MM-DD)
        #[arg(long)]
        start_date: NaiveDate,
        /// Last day of cover (YYYY-MM-DD)
        #[arg(long)]
        end_date: NaiveDate,
        #[arg(long)]
        amount: f64,
        /// active, expired or cancelled
        #[arg(long, default_value_t)]
        status: PolicyStatus,
        /// ID of the covered vehicle
        #[arg(long = "vehicle")]
        vehicle_id: Id,
    },

    /// Report an accident
    Accident {
        /// The day it happened (YYYY-MM-DD)
        #[arg(long = "date")]
        accident_date: NaiveDate,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: String,
        /// ID of the involved vehicle
        #[arg(long = "vehicle")]
        vehicle_id: Id,
    },
}

impl Create {
    #[instrument(skip(store))]
    pub fn run<B: Backend>(self, store: &mut EntityStore<B>) -> anyhow::Result<()> {
        let id = match self.record {
            NewRecord::Owner {
                full_name,
                address,
                phone_number,
            } => submit(
                store,
                &Owner {
                    full_name,
                    address,
                    phone_number,
                },
            ),
            NewRecord::Vehicle {
                vehicle_no,
                model,
                year,
                vin,
                owner_id,
            } => submit(
                store,
                &Vehicle {
                    vehicle_no,
                    model,
                    year,
                    vin,
                    owner_id,
                },
            ),
            NewRecord::Policy {
                policy_no,
                start_date,
                end_date,
                amount,
                status,
                vehicle_id,
            } => submit(
                store,
                &Policy {
                    policy_no,
                    start_date,
                    end_date,
                    amount,
                    status,
                    vehicle_id,
                },
            ),
            NewRecord::Accident {
                accident_date,
                location,
                description,
                vehicle_id,
            } => submit(
                store,
                &Accident {
                    accident_date,
                    location,
                    description,
                    vehicle_id,
                },
            ),
        }?;
        tracing::debug!(id, "created");
        Ok(())
    }
}

/// Creates the record, then re-lists its collection.
pub fn submit<F: View, B: Backend>(store: &mut EntityStore<B>, fields: &F) -> anyhow::Result<Id> {
    let record = store.create(fields)?;
    store.list::<F>()?;

    println!(
        "{}",
        format!(
            "✅ Created {} {} ({})",
            F::COLLECTION.singular(),
            record.id,
            record.fields.label()
        )
        .success()
    );
    Ok(record.id)
}
