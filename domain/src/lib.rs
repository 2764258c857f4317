//! Domain library for the animal adoption backend.
//!
//! Holds the entity types, the repository ports (traits), and the error
//! definitions. Storage adapters and IO concerns live in other crates; the
//! in-memory adapter under [`adapters`] is the only exception.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a stored adoptant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdoptantId(pub i64);

/// Identity of a stored animal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimalId(pub i64);

/// Identity of a stored adoption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdoptionId(pub i64);

impl Display for AdoptantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for AnimalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for AdoptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person registered as a potential or actual adopter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adoptant {
    /// `None` until the adoptant has been saved.
    pub id: Option<AdoptantId>,
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl Adoptant {
    /// Create a transient adoptant; the store assigns the id on save.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            address: address.into(),
            phone: phone.into(),
        }
    }

    pub fn with_id(mut self, id: AdoptantId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Species of an adoptable animal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Other,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Bird => "bird",
            Species::Rabbit => "rabbit",
            Species::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dog" | "chien" => Some(Species::Dog),
            "cat" | "chat" => Some(Species::Cat),
            "bird" | "oiseau" => Some(Species::Bird),
            "rabbit" | "lapin" => Some(Species::Rabbit),
            "other" | "autre" => Some(Species::Other),
            _ => None,
        }
    }
}

/// An adoptable animal record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
    /// `None` until the animal has been saved.
    pub id: Option<AnimalId>,
    pub name: String,
    pub age: u32,
    pub sterilized: bool,
    pub species: Species,
}

impl Animal {
    pub fn new(name: impl Into<String>, age: u32, sterilized: bool, species: Species) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
            sterilized,
            species,
        }
    }

    pub fn with_id(mut self, id: AnimalId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Caller-supplied data for a new adoption. The adoptant and animal are
/// attached by [`service::AdoptionService::add_adoption`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAdoption {
    pub id: Option<AdoptionId>,
    pub fee: f64,
}

impl NewAdoption {
    pub fn new(fee: f64) -> Self {
        Self { id: None, fee }
    }
}

/// An adoption linking one adoptant to one animal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Adoption {
    pub id: Option<AdoptionId>,
    /// Non-negative by convention; not enforced.
    pub fee: f64,
    pub adoptant: Adoptant,
    pub animal: Animal,
}

/// Repository port for adoptants.
#[cfg_attr(test, mockall::automock)]
pub trait AdoptantRepository: Send + Sync {
    /// Insert or update by id; returns the stored representation.
    fn save(&self, adoptant: Adoptant) -> Result<Adoptant, CoreError>;
    fn find_by_id(&self, id: AdoptantId) -> Result<Option<Adoptant>, CoreError>;
}

/// Repository port for animals.
#[cfg_attr(test, mockall::automock)]
pub trait AnimalRepository: Send + Sync {
    /// Insert or update by id; returns the stored representation.
    fn save(&self, animal: Animal) -> Result<Animal, CoreError>;
    fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, CoreError>;
}

/// Repository port for adoptions.
///
/// Lookups return adoptions ordered by adoption id, carrying the current
/// adoptant and animal records.
#[cfg_attr(test, mockall::automock)]
pub trait AdoptionRepository: Send + Sync {
    /// Insert or update by id. Both references must already have ids.
    fn save(&self, adoption: Adoption) -> Result<Adoption, CoreError>;
    fn find_by_id(&self, id: AdoptionId) -> Result<Option<Adoption>, CoreError>;
    /// All adoptions whose adoptant has exactly this name.
    fn find_by_adoptant_name(&self, name: &str) -> Result<Vec<Adoption>, CoreError>;
    fn find_by_adoptant_id(&self, id: AdoptantId) -> Result<Vec<Adoption>, CoreError>;
}

// A single shared backend can serve all three ports.

impl<R: AdoptantRepository + ?Sized> AdoptantRepository for Arc<R> {
    fn save(&self, adoptant: Adoptant) -> Result<Adoptant, CoreError> {
        AdoptantRepository::save(&**self, adoptant)
    }

    fn find_by_id(&self, id: AdoptantId) -> Result<Option<Adoptant>, CoreError> {
        AdoptantRepository::find_by_id(&**self, id)
    }
}

impl<R: AnimalRepository + ?Sized> AnimalRepository for Arc<R> {
    fn save(&self, animal: Animal) -> Result<Animal, CoreError> {
        AnimalRepository::save(&**self, animal)
    }

    fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, CoreError> {
        AnimalRepository::find_by_id(&**self, id)
    }
}

impl<R: AdoptionRepository + ?Sized> AdoptionRepository for Arc<R> {
    fn save(&self, adoption: Adoption) -> Result<Adoption, CoreError> {
        AdoptionRepository::save(&**self, adoption)
    }

    fn find_by_id(&self, id: AdoptionId) -> Result<Option<Adoption>, CoreError> {
        AdoptionRepository::find_by_id(&**self, id)
    }

    fn find_by_adoptant_name(&self, name: &str) -> Result<Vec<Adoption>, CoreError> {
        AdoptionRepository::find_by_adoptant_name(&**self, name)
    }

    fn find_by_adoptant_id(&self, id: AdoptantId) -> Result<Vec<Adoption>, CoreError> {
        AdoptionRepository::find_by_adoptant_id(&**self, id)
    }
}

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("adoptant {0} not found")]
    AdoptantNotFound(AdoptantId),
    #[error("animal {0} not found")]
    AnimalNotFound(AnimalId),
    #[error("invalid entity: {0}")]
    InvalidEntity(String),
    #[error("repository error: {0}")]
    Repository(String),
}

/// Return a short about/version line for binaries to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{}", pkg, ver)
}

pub mod adapters;
pub mod service;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_parse_accepts_english_and_french_names() {
        assert_eq!(Species::parse("dog"), Some(Species::Dog));
        assert_eq!(Species::parse("CHIEN"), Some(Species::Dog));
        assert_eq!(Species::parse("Chat"), Some(Species::Cat));
        assert_eq!(Species::parse("lizard"), None);
    }

    #[test]
    fn species_as_str_parses_back() {
        for s in [
            Species::Dog,
            Species::Cat,
            Species::Bird,
            Species::Rabbit,
            Species::Other,
        ] {
            assert_eq!(Species::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn not_found_errors_name_the_missing_id() {
        let err = CoreError::AdoptantNotFound(AdoptantId(7));
        assert_eq!(err.to_string(), "adoptant 7 not found");
        let err = CoreError::AnimalNotFound(AnimalId(3));
        assert_eq!(err.to_string(), "animal 3 not found");
    }

    #[test]
    fn new_entities_are_transient() {
        let a = Adoptant::new("Dupont", "123 Rue Test", "0123456789");
        assert!(a.id.is_none());
        let a = a.with_id(AdoptantId(1));
        assert_eq!(a.id, Some(AdoptantId(1)));

        let n = Animal::new("Médor", 3, true, Species::Dog);
        assert!(n.id.is_none());
    }

    #[test]
    fn species_serializes_lowercase() {
        let n = Animal::new("Médor", 3, true, Species::Dog).with_id(AnimalId(1));
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["species"], "dog");
        assert_eq!(json["id"], 1);
    }
}
