use chrono::NaiveDate;
use insure::{
    Accident, Backend, EntityStore, Id, Owner, Policy, PolicyStatus, Vehicle, view::View,
};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Update {
    #[command(subcommand)]
    record: Edit,
}

/// Each edit starts from the record's current values; only the given
/// fields change, and the full record is sent back.
#[derive(Debug, clap::Subcommand)]
enum Edit {
    /// Edit an owner
    Owner {
        id: Id,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone_number: Option<String>,
    },

    /// Edit a vehicle
    Vehicle {
        id: Id,
        #[arg(long)]
        vehicle_no: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        year: Option<u16>,
        #[arg(long)]
        vin: Option<String>,
        #[arg(long = "owner")]
        owner_id: Option<Id>,
    },

    /// Edit a policy
    Policy {
        id: Id,
        #[arg(long)]
        policy_no: Option<String>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        status: Option<PolicyStatus>,
        #[arg(long = "vehicle")]
        vehicle_id: Option<Id>,
    },

    /// Edit an accident report
    Accident {
        id: Id,
        #[arg(long = "date")]
        accident_date: Option<NaiveDate>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "vehicle")]
        vehicle_id: Option<Id>,
    },
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

impl Update {
    #[instrument(skip(store))]
    pub fn run<B: Backend>(self, store: &mut EntityStore<B>) -> anyhow::Result<()> {
        match self.record {
            Edit::Owner {
                id,
                full_name,
                address,
                phone_number,
            } => edit(store, id, |owner: &mut Owner| {
                set(&mut owner.full_name, full_name);
                set(&mut owner.address, address);
                set(&mut owner.phone_number, phone_number);
            }),
            Edit::Vehicle {
                id,
                vehicle_no,
                model,
                year,
                vin,
                owner_id,
            } => edit(store, id, |vehicle: &mut Vehicle| {
                set(&mut vehicle.vehicle_no, vehicle_no);
                set(&mut vehicle.model, model);
                set(&mut vehicle.year, year);
                set(&mut vehicle.vin, vin);
                set(&mut vehicle.owner_id, owner_id);
            }),
            Edit::Policy {
                id,
                policy_no,
                start_date,
                end_date,
                amount,
                status,
                vehicle_id,
            } => edit(store, id, |policy: &mut Policy| {
                set(&mut policy.policy_no, policy_no);
                set(&mut policy.start_date, start_date);
                set(&mut policy.end_date, end_date);
                set(&mut policy.amount, amount);
                set(&mut policy.status, status);
                set(&mut policy.vehicle_id, vehicle_id);
            }),
            Edit::Accident {
                id,
                accident_date,
                location,
                description,
                vehicle_id,
            } => edit(store, id, |accident: &mut Accident| {
                set(&mut accident.accident_date, accident_date);
                set(&mut accident.location, location);
                set(&mut accident.description, description);
                set(&mut accident.vehicle_id, vehicle_id);
            }),
        }
    }
}

/// Fetches the record, applies `change` to a copy of its fields, sends the
/// full result and re-lists the collection.
fn edit<F: View, B: Backend>(
    store: &mut EntityStore<B>,
    id: Id,
    change: impl FnOnce(&mut F),
) -> anyhow::Result<()> {
    store.list::<F>()?;
    let Some(current) = store.resolve_reference::<F>(id) else {
        anyhow::bail!("{} {id} not found", F::COLLECTION.singular());
    };

    let mut fields = current.fields.clone();
    change(&mut fields);

    store.update(id, &fields)?;
    store.list::<F>()?;

    println!(
        "{}",
        format!("✅ Updated {} {id}", F::COLLECTION.singular()).success()
    );
    Ok(())
}
