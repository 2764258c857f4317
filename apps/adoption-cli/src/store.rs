//! Storage backend selection.
//!
//! `Store` wraps whichever adapter the configuration picked and forwards
//! every port to it, so the service is built against one concrete type.

use std::sync::Arc;

use adoption_domain::adapters::memory_repo::InMemoryRepo;
use adoption_domain::service::AdoptionService;
use adoption_domain::{
    Adoptant, AdoptantId, AdoptantRepository, Adoption, AdoptionId, AdoptionRepository, Animal,
    AnimalId, AnimalRepository, CoreError,
};

use crate::config::{Config, StorageProvider};

pub enum Store {
    Memory(InMemoryRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(adoption_sqlite::SqliteRepo),
}

/// The service as the CLI runs it: one shared store behind all three ports.
pub type Service = AdoptionService<Arc<Store>, Arc<Store>, Arc<Store>>;

impl Store {
    pub fn memory() -> Self {
        Store::Memory(InMemoryRepo::new())
    }

    #[cfg(feature = "sqlite")]
    fn sqlite(cfg: &Config) -> Result<Self, CoreError> {
        let repo = match &cfg.db_path {
            Some(path) => {
                if let Some(dir) = path.parent() {
                    let _ = std::fs::create_dir_all(dir);
                }
                adoption_sqlite::SqliteRepo::new(path)?
            }
            None => adoption_sqlite::SqliteRepo::from_env()?,
        };
        Ok(Store::Sqlite(repo))
    }

    /// Open the backend named by the configuration.
    pub fn from_config(cfg: &Config) -> Result<Self, CoreError> {
        match cfg.storage_provider {
            #[cfg(feature = "sqlite")]
            StorageProvider::Sqlite => Self::sqlite(cfg),
            #[cfg(not(feature = "sqlite"))]
            StorageProvider::Sqlite => {
                tracing::warn!("built without the `sqlite` feature; falling back to memory");
                Ok(Self::memory())
            }
            StorageProvider::Memory => Ok(Self::memory()),
        }
    }

    pub fn into_service(self) -> Service {
        let store = Arc::new(self);
        AdoptionService::new(store.clone(), store.clone(), store)
    }
}

impl AdoptantRepository for Store {
    fn save(&self, adoptant: Adoptant) -> Result<Adoptant, CoreError> {
        match self {
            Store::Memory(r) => AdoptantRepository::save(r, adoptant),
            #[cfg(feature = "sqlite")]
            Store::Sqlite(r) => AdoptantRepository::save(r, adoptant),
        }
    }

    fn find_by_id(&self, id: AdoptantId) -> Result<Option<Adoptant>, CoreError> {
        match self {
            Store::Memory(r) => AdoptantRepository::find_by_id(r, id),
            #[cfg(feature = "sqlite")]
            Store::Sqlite(r) => AdoptantRepository::find_by_id(r, id),
        }
    }
}

impl AnimalRepository for Store {
    fn save(&self, animal: Animal) -> Result<Animal, CoreError> {
        match self {
            Store::Memory(r) => AnimalRepository::save(r, animal),
            #[cfg(feature = "sqlite")]
            Store::Sqlite(r) => AnimalRepository::save(r, animal),
        }
    }

    fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, CoreError> {
        match self {
            Store::Memory(r) => AnimalRepository::find_by_id(r, id),
            #[cfg(feature = "sqlite")]
            Store::Sqlite(r) => AnimalRepository::find_by_id(r, id),
        }
    }
}

impl AdoptionRepository for Store {
    fn save(&self, adoption: Adoption) -> Result<Adoption, CoreError> {
        match self {
            Store::Memory(r) => AdoptionRepository::save(r, adoption),
            #[cfg(feature = "sqlite")]
            Store::Sqlite(r) => AdoptionRepository::save(r, adoption),
        }
    }

    fn find_by_id(&self, id: AdoptionId) -> Result<Option<Adoption>, CoreError> {
        match self {
            Store::Memory(r) => AdoptionRepository::find_by_id(r, id),
            #[cfg(feature = "sqlite")]
            Store::Sqlite(r) => AdoptionRepository::find_by_id(r, id),
        }
    }

    fn find_by_adoptant_name(&self, name: &str) -> Result<Vec<Adoption>, CoreError> {
        match self {
            Store::Memory(r) => r.find_by_adoptant_name(name),
            #[cfg(feature = "sqlite")]
            Store::Sqlite(r) => r.find_by_adoptant_name(name),
        }
    }

    fn find_by_adoptant_id(&self, id: AdoptantId) -> Result<Vec<Adoption>, CoreError> {
        match self {
            Store::Memory(r) => r.find_by_adoptant_id(id),
            #[cfg(feature = "sqlite")]
            Store::Sqlite(r) => r.find_by_adoptant_id(id),
        }
    }
}
