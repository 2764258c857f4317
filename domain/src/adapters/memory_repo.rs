use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::{
    Adoptant, AdoptantId, AdoptantRepository, Adoption, AdoptionId, AdoptionRepository, Animal,
    AnimalId, AnimalRepository, CoreError,
};

/// In-memory store implementing all three repository ports. Every port goes
/// through one mutex, so share it behind an `Arc` to back a whole service.
pub struct InMemoryRepo {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    adoptants: BTreeMap<AdoptantId, Adoptant>,
    animals: BTreeMap<AnimalId, Animal>,
    adoptions: BTreeMap<AdoptionId, AdoptionRow>,
    last_adoptant_id: i64,
    last_animal_id: i64,
    last_adoption_id: i64,
}

/// Adoptions keep only the ids of their references and are rehydrated on
/// read, so updates to an adoptant or animal show up in later lookups.
struct AdoptionRow {
    fee: f64,
    adoptant_id: AdoptantId,
    animal_id: AnimalId,
}

/// Pick the id for a save: keep the caller's id (and move the counter past
/// it) or generate the next one.
fn assign_id(last: &mut i64, given: Option<i64>) -> Result<i64, CoreError> {
    match given {
        Some(id) => {
            *last = (*last).max(id);
            Ok(id)
        }
        None => {
            *last = last
                .checked_add(1)
                .ok_or_else(|| CoreError::Repository("id space exhausted".into()))?;
            Ok(*last)
        }
    }
}

impl State {
    fn hydrate(&self, id: AdoptionId, row: &AdoptionRow) -> Result<Adoption, CoreError> {
        let adoptant = self.adoptants.get(&row.adoptant_id).cloned().ok_or_else(|| {
            CoreError::Repository(format!("adoption {id} references missing adoptant"))
        })?;
        let animal = self.animals.get(&row.animal_id).cloned().ok_or_else(|| {
            CoreError::Repository(format!("adoption {id} references missing animal"))
        })?;
        Ok(Adoption {
            id: Some(id),
            fee: row.fee,
            adoptant,
            animal,
        })
    }

    fn adoptions_where<F>(&self, pred: F) -> Result<Vec<Adoption>, CoreError>
    where
        F: Fn(&AdoptionRow) -> bool,
    {
        self.adoptions
            .iter()
            .filter(|(_, row)| pred(row))
            .map(|(id, row)| self.hydrate(*id, row))
            .collect()
    }
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl AdoptantRepository for InMemoryRepo {
    fn save(&self, mut adoptant: Adoptant) -> Result<Adoptant, CoreError> {
        let mut state = self.state()?;
        let id = AdoptantId(assign_id(
            &mut state.last_adoptant_id,
            adoptant.id.map(|i| i.0),
        )?);
        adoptant.id = Some(id);
        state.adoptants.insert(id, adoptant.clone());
        Ok(adoptant)
    }

    fn find_by_id(&self, id: AdoptantId) -> Result<Option<Adoptant>, CoreError> {
        Ok(self.state()?.adoptants.get(&id).cloned())
    }
}

impl AnimalRepository for InMemoryRepo {
    fn save(&self, mut animal: Animal) -> Result<Animal, CoreError> {
        let mut state = self.state()?;
        let id = AnimalId(assign_id(&mut state.last_animal_id, animal.id.map(|i| i.0))?);
        animal.id = Some(id);
        state.animals.insert(id, animal.clone());
        Ok(animal)
    }

    fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, CoreError> {
        Ok(self.state()?.animals.get(&id).cloned())
    }
}

impl AdoptionRepository for InMemoryRepo {
    fn save(&self, adoption: Adoption) -> Result<Adoption, CoreError> {
        let adoptant_id = adoption
            .adoptant
            .id
            .ok_or_else(|| CoreError::InvalidEntity("adoption adoptant has no id".into()))?;
        let animal_id = adoption
            .animal
            .id
            .ok_or_else(|| CoreError::InvalidEntity("adoption animal has no id".into()))?;

        let mut state = self.state()?;
        // Same guarantee a foreign key gives the SQLite adapter.
        if !state.adoptants.contains_key(&adoptant_id) {
            return Err(CoreError::Repository(format!(
                "adoptant {adoptant_id} does not exist"
            )));
        }
        if !state.animals.contains_key(&animal_id) {
            return Err(CoreError::Repository(format!(
                "animal {animal_id} does not exist"
            )));
        }

        let id = AdoptionId(assign_id(
            &mut state.last_adoption_id,
            adoption.id.map(|i| i.0),
        )?);
        let row = AdoptionRow {
            fee: adoption.fee,
            adoptant_id,
            animal_id,
        };
        let saved = state.hydrate(id, &row)?;
        state.adoptions.insert(id, row);
        Ok(saved)
    }

    fn find_by_id(&self, id: AdoptionId) -> Result<Option<Adoption>, CoreError> {
        let state = self.state()?;
        match state.adoptions.get(&id) {
            Some(row) => Ok(Some(state.hydrate(id, row)?)),
            None => Ok(None),
        }
    }

    fn find_by_adoptant_name(&self, name: &str) -> Result<Vec<Adoption>, CoreError> {
        let state = self.state()?;
        state.adoptions_where(|row| {
            state
                .adoptants
                .get(&row.adoptant_id)
                .is_some_and(|a| a.name == name)
        })
    }

    fn find_by_adoptant_id(&self, id: AdoptantId) -> Result<Vec<Adoption>, CoreError> {
        let state = self.state()?;
        state.adoptions_where(|row| row.adoptant_id == id)
    }
}
