//! Subcommands and their execution against the adoption service.

use adoption_domain::{
    Adoptant, AdoptantId, AdoptionId, Animal, AnimalId, CoreError, NewAdoption, Species,
};
use anyhow::Context;
use clap::Subcommand;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::store::Service;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register an adoptant
    AddAdoptant {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Upsert the adoptant with this id instead of creating a new one
        #[arg(long)]
        id: Option<i64>,
    },
    /// Register an adoptable animal
    AddAnimal {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
        /// dog, cat, bird, rabbit or other
        #[arg(long, value_parser = parse_species)]
        species: Species,
        #[arg(long)]
        sterilized: bool,
        #[arg(long)]
        id: Option<i64>,
    },
    /// Record an adoption of an existing animal by an existing adoptant
    AddAdoption {
        #[arg(long, value_parser = parse_fee)]
        fee: f64,
        #[arg(long)]
        adoptant_id: i64,
        #[arg(long)]
        animal_id: i64,
        #[arg(long)]
        id: Option<i64>,
    },
    /// List the adoptions made by adoptants with this name
    Adoptions {
        #[arg(long)]
        adoptant_name: String,
    },
    /// Sum of the fees paid by one adoptant
    TotalFees {
        #[arg(long)]
        adoptant_id: i64,
    },
    /// Print one adoptant, or null
    ShowAdoptant { id: i64 },
    /// Print one animal, or null
    ShowAnimal { id: i64 },
}

fn parse_species(s: &str) -> Result<Species, String> {
    Species::parse(s).ok_or_else(|| format!("unknown species '{s}'"))
}

fn parse_fee(s: &str) -> Result<f64, String> {
    let fee: f64 = s.parse().map_err(|e| format!("invalid fee '{s}': {e}"))?;
    if fee.is_finite() {
        Ok(fee)
    } else {
        Err(format!("fee must be a finite number, got '{s}'"))
    }
}

/// Run one command and return the JSON document to print.
pub fn execute(svc: &Service, cmd: Command) -> anyhow::Result<Value> {
    match cmd {
        Command::AddAdoptant {
            name,
            address,
            phone,
            id,
        } => {
            let mut adoptant = Adoptant::new(name, address, phone);
            adoptant.id = id.map(AdoptantId);
            let saved = svc.add_adoptant(adoptant).map_err(log_storage_error)?;
            info!(adoptant_id = ?saved.id, "adoptant saved");
            Ok(serde_json::to_value(saved)?)
        }
        Command::AddAnimal {
            name,
            age,
            species,
            sterilized,
            id,
        } => {
            let mut animal = Animal::new(name, age, sterilized, species);
            animal.id = id.map(AnimalId);
            let saved = svc.add_animal(animal).map_err(log_storage_error)?;
            info!(animal_id = ?saved.id, species = saved.species.as_str(), "animal saved");
            Ok(serde_json::to_value(saved)?)
        }
        Command::AddAdoption {
            fee,
            adoptant_id,
            animal_id,
            id,
        } => {
            let input = NewAdoption {
                id: id.map(AdoptionId),
                fee,
            };
            let (adoptant_id, animal_id) = (AdoptantId(adoptant_id), AnimalId(animal_id));
            match svc.add_adoption(input, adoptant_id, animal_id) {
                Ok(saved) => {
                    info!(adoption_id = ?saved.id, %adoptant_id, %animal_id, fee, "adoption saved");
                    Ok(serde_json::to_value(saved)?)
                }
                Err(e @ (CoreError::AdoptantNotFound(_) | CoreError::AnimalNotFound(_))) => {
                    warn!(%adoptant_id, %animal_id, "adoption rejected: {e}");
                    Err(e).context("cannot record adoption")
                }
                Err(e) => Err(log_storage_error(e)).context("cannot record adoption"),
            }
        }
        Command::Adoptions { adoptant_name } => {
            let adoptions = svc
                .get_adoptions_by_adoptant(&adoptant_name)
                .map_err(log_storage_error)?;
            info!(adoptant_name = %adoptant_name, count = adoptions.len(), "adoptions listed");
            Ok(serde_json::to_value(adoptions)?)
        }
        Command::TotalFees { adoptant_id } => {
            let adoptant_id = AdoptantId(adoptant_id);
            let total = svc
                .total_adoption_fees(adoptant_id)
                .map_err(log_storage_error)?;
            Ok(json!({ "adoptant_id": adoptant_id, "total_fees": total }))
        }
        Command::ShowAdoptant { id } => {
            let found = svc.get_adoptant(AdoptantId(id)).map_err(log_storage_error)?;
            Ok(serde_json::to_value(found)?)
        }
        Command::ShowAnimal { id } => {
            let found = svc.get_animal(AnimalId(id)).map_err(log_storage_error)?;
            Ok(serde_json::to_value(found)?)
        }
    }
}

fn log_storage_error(e: CoreError) -> CoreError {
    error!(err = ?e, "storage error");
    e
}
