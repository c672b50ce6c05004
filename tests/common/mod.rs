//! Fixture data shared by the integration tests.
//!
//! The records mirror the sample datasets the original front end shipped
//! with.

#![allow(dead_code)]

use chrono::NaiveDate;
use insure::{
    Accident, EntityStore, MemoryBackend, Owner, Policy, PolicyStatus, Record, Vehicle,
};

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("fixture dates are valid")
}

pub fn owner(full_name: &str, address: &str, phone_number: &str) -> Owner {
    Owner {
        full_name: full_name.to_string(),
        address: address.to_string(),
        phone_number: phone_number.to_string(),
    }
}

pub fn vehicle(vehicle_no: &str, model: &str, owner_id: u64) -> Vehicle {
    Vehicle {
        vehicle_no: vehicle_no.to_string(),
        model: model.to_string(),
        year: 2021,
        vin: format!("VIN-{vehicle_no}"),
        owner_id,
    }
}

pub fn policy(policy_no: &str, vehicle_id: u64, status: PolicyStatus) -> Policy {
    Policy {
        policy_no: policy_no.to_string(),
        start_date: date("2024-01-15"),
        end_date: date("2025-01-14"),
        amount: 15000.0,
        status,
        vehicle_id,
    }
}

pub fn accident(location: &str, vehicle_id: u64) -> Accident {
    Accident {
        accident_date: date("2024-06-03"),
        location: location.to_string(),
        description: "Minor collision at a junction".to_string(),
        vehicle_id,
    }
}

/// A backend holding a single owner, as in the owners scenario.
pub fn single_owner() -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    backend
        .seed([Record::new(
            1,
            owner("Anjali Sharma", "123 MG Road", "9876543210"),
        )])
        .expect("fixtures serialize");
    backend
}

/// A backend populated with every collection.
pub fn populated() -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    backend
        .seed([
            Record::new(1, owner("Anjali Sharma", "123 MG Road, Bangalore", "9876543210")),
            Record::new(2, owner("Rohan Mehta", "456 Park Street, Mumbai", "8765432109")),
            Record::new(
                3,
                owner("Priya Singh", "789 High-Tech City, Hyderabad", "7654321098"),
            ),
        ])
        .expect("fixtures serialize")
        .seed([
            Record::new(1, vehicle("KA-01-AB-1234", "Camry", 1)),
            Record::new(2, vehicle("MH-12-CD-5678", "Civic", 2)),
            Record::new(3, vehicle("TN-07-EF-9012", "Fortuner", 1)),
        ])
        .expect("fixtures serialize")
        .seed([
            Record::new(1, policy("POL-001", 1, PolicyStatus::Active)),
            Record::new(2, policy("POL-002", 2, PolicyStatus::Expired)),
        ])
        .expect("fixtures serialize")
        .seed([Record::new(1, accident("Silk Board Junction", 3))])
        .expect("fixtures serialize");
    backend
}

pub fn store(backend: MemoryBackend) -> EntityStore<MemoryBackend> {
    EntityStore::new(backend)
}
