use crate::{
    Adoptant, AdoptantId, AdoptantRepository, Adoption, AdoptionRepository, Animal, AnimalId,
    AnimalRepository, CoreError, NewAdoption,
};

/// Application service orchestrating adoptants, animals and adoptions.
///
/// Generic over the three repository ports so it can run against the
/// in-memory adapter, SQLite, or test mocks. It holds no state of its own.
pub struct AdoptionService<A: AdoptantRepository, N: AnimalRepository, D: AdoptionRepository> {
    adoptants: A,
    animals: N,
    adoptions: D,
}

impl<A: AdoptantRepository, N: AnimalRepository, D: AdoptionRepository> AdoptionService<A, N, D> {
    pub fn new(adoptants: A, animals: N, adoptions: D) -> Self {
        Self {
            adoptants,
            animals,
            adoptions,
        }
    }

    /// Persist an adoptant and return what the store saved.
    pub fn add_adoptant(&self, adoptant: Adoptant) -> Result<Adoptant, CoreError> {
        self.adoptants.save(adoptant)
    }

    /// Persist an animal and return what the store saved.
    pub fn add_animal(&self, animal: Animal) -> Result<Animal, CoreError> {
        self.animals.save(animal)
    }

    /// Record an adoption of `animal_id` by `adoptant_id`.
    ///
    /// The adoptant is looked up first; a missing adoptant short-circuits
    /// before the animal lookup. Nothing is saved unless both exist.
    pub fn add_adoption(
        &self,
        input: NewAdoption,
        adoptant_id: AdoptantId,
        animal_id: AnimalId,
    ) -> Result<Adoption, CoreError> {
        let adoptant = self
            .adoptants
            .find_by_id(adoptant_id)?
            .ok_or(CoreError::AdoptantNotFound(adoptant_id))?;
        let animal = self
            .animals
            .find_by_id(animal_id)?
            .ok_or(CoreError::AnimalNotFound(animal_id))?;

        let adoption = Adoption {
            id: input.id,
            fee: input.fee,
            adoptant,
            animal,
        };
        self.adoptions.save(adoption)
    }

    /// Adoptions whose adoptant has the given name, in store order.
    pub fn get_adoptions_by_adoptant(&self, name: &str) -> Result<Vec<Adoption>, CoreError> {
        self.adoptions.find_by_adoptant_name(name)
    }

    /// Sum of the fees of every adoption made by the adoptant. Zero when
    /// there are none.
    pub fn total_adoption_fees(&self, adoptant_id: AdoptantId) -> Result<f64, CoreError> {
        let adoptions = self.adoptions.find_by_adoptant_id(adoptant_id)?;
        Ok(adoptions.iter().map(|a| a.fee).sum())
    }

    pub fn get_adoptant(&self, id: AdoptantId) -> Result<Option<Adoptant>, CoreError> {
        self.adoptants.find_by_id(id)
    }

    pub fn get_animal(&self, id: AnimalId) -> Result<Option<Animal>, CoreError> {
        self.animals.find_by_id(id)
    }
}
