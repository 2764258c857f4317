//! adoption-sqlite: SQLite implementation of the repository ports.
//!
//! Purpose
//! - Provide a lightweight, file-based store so the backend runs locally
//!   without any external database.
//! - Implements `AdoptantRepository`, `AnimalRepository` and
//!   `AdoptionRepository` from the domain crate on a single connection.
//!
//! Notes
//! - Uses `rusqlite` with the `bundled` feature for portability.
//! - Saves are upserts keyed by id; a missing id lets SQLite assign one.
//! - Foreign keys are enforced, so an adoption cannot point at a row that
//!   does not exist.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use adoption_domain::{
    Adoptant, AdoptantId, AdoptantRepository, Adoption, AdoptionId, AdoptionRepository, Animal,
    AnimalId, AnimalRepository, CoreError, Species,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// SQLite-backed repository for local development.
pub struct SqliteRepo {
    conn: Mutex<Connection>,
}

impl SqliteRepo {
    /// Open (or create) a SQLite database at the given path and ensure schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(map_sqerr)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Private in-memory database; contents vanish with the value.
    pub fn in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(map_sqerr)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Construct from env var `DB_PATH` (defaults to `./data/adoptions.db`).
    pub fn from_env() -> Result<Self, CoreError> {
        let path = std::env::var("DB_PATH").unwrap_or_else(|_| "./data/adoptions.db".to_string());
        // Ensure directory exists
        if let Some(dir) = Path::new(&path).parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        Self::new(path)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))
    }
}

fn init_schema(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS adoptants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            address TEXT NOT NULL,
            phone TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS animals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            sterilized INTEGER NOT NULL DEFAULT 0,
            species TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS adoptions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fee REAL NOT NULL,
            adoptant_id INTEGER NOT NULL REFERENCES adoptants(id),
            animal_id INTEGER NOT NULL REFERENCES animals(id)
        );
        CREATE INDEX IF NOT EXISTS idx_adoptions_adoptant ON adoptions(adoptant_id);
        CREATE INDEX IF NOT EXISTS idx_adoptants_name ON adoptants(name);
        "#,
    )
    .map_err(map_sqerr)
}

fn map_sqerr<E: std::fmt::Display>(e: E) -> CoreError {
    CoreError::Repository(format!("sqlite error: {e}"))
}

const ADOPTION_SELECT: &str = "SELECT d.id, d.fee, \
     a.id, a.name, a.address, a.phone, \
     n.id, n.name, n.age, n.sterilized, n.species \
     FROM adoptions d \
     JOIN adoptants a ON a.id = d.adoptant_id \
     JOIN animals n ON n.id = d.animal_id";

fn row_to_adoptant(row: &Row, offset: usize) -> Result<Adoptant, CoreError> {
    let id: i64 = row.get(offset).map_err(map_sqerr)?;
    let name: String = row.get(offset + 1).map_err(map_sqerr)?;
    let address: String = row.get(offset + 2).map_err(map_sqerr)?;
    let phone: String = row.get(offset + 3).map_err(map_sqerr)?;
    Ok(Adoptant {
        id: Some(AdoptantId(id)),
        name,
        address,
        phone,
    })
}

fn row_to_animal(row: &Row, offset: usize) -> Result<Animal, CoreError> {
    let id: i64 = row.get(offset).map_err(map_sqerr)?;
    let name: String = row.get(offset + 1).map_err(map_sqerr)?;
    let age: i64 = row.get(offset + 2).map_err(map_sqerr)?;
    let sterilized: i64 = row.get(offset + 3).map_err(map_sqerr)?;
    let species: String = row.get(offset + 4).map_err(map_sqerr)?;

    let species = Species::parse(&species)
        .ok_or_else(|| CoreError::Repository(format!("bad species in db: {species}")))?;
    let age = u32::try_from(age)
        .map_err(|_| CoreError::Repository(format!("bad age in db: {age}")))?;
    Ok(Animal {
        id: Some(AnimalId(id)),
        name,
        age,
        sterilized: sterilized != 0,
        species,
    })
}

fn row_to_adoption(row: &Row) -> Result<Adoption, CoreError> {
    let id: i64 = row.get(0).map_err(map_sqerr)?;
    let fee: f64 = row.get(1).map_err(map_sqerr)?;
    Ok(Adoption {
        id: Some(AdoptionId(id)),
        fee,
        adoptant: row_to_adoptant(row, 2)?,
        animal: row_to_animal(row, 6)?,
    })
}

/// Id of the row just written: the caller's id on upsert, the generated one
/// otherwise.
fn written_id(conn: &Connection, given: Option<i64>) -> i64 {
    given.unwrap_or_else(|| conn.last_insert_rowid())
}

fn query_adoptions(
    conn: &Connection,
    filter: &str,
    param: &dyn rusqlite::ToSql,
) -> Result<Vec<Adoption>, CoreError> {
    let sql = format!("{ADOPTION_SELECT} WHERE {filter} ORDER BY d.id");
    let mut stmt = conn.prepare(&sql).map_err(map_sqerr)?;
    let mut rows = stmt.query(params![param]).map_err(map_sqerr)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(map_sqerr)? {
        out.push(row_to_adoption(row)?);
    }
    Ok(out)
}

fn find_adoption(conn: &Connection, id: AdoptionId) -> Result<Option<Adoption>, CoreError> {
    let mut found = query_adoptions(conn, "d.id = ?1", &id.0)?;
    Ok(found.pop())
}

impl AdoptantRepository for SqliteRepo {
    fn save(&self, mut adoptant: Adoptant) -> Result<Adoptant, CoreError> {
        let conn = self.conn()?;
        let given = adoptant.id.map(|i| i.0);
        conn.execute(
            "INSERT INTO adoptants(id, name, address, phone) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, address = excluded.address, phone = excluded.phone",
            params![given, adoptant.name, adoptant.address, adoptant.phone],
        )
        .map_err(map_sqerr)?;
        adoptant.id = Some(AdoptantId(written_id(&conn, given)));
        Ok(adoptant)
    }

    fn find_by_id(&self, id: AdoptantId) -> Result<Option<Adoptant>, CoreError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, address, phone FROM adoptants WHERE id = ?1",
            params![id.0],
            |row| Ok(row_to_adoptant(row, 0)),
        )
        .optional()
        .map_err(map_sqerr)?
        .transpose()
    }
}

impl AnimalRepository for SqliteRepo {
    fn save(&self, mut animal: Animal) -> Result<Animal, CoreError> {
        let conn = self.conn()?;
        let given = animal.id.map(|i| i.0);
        conn.execute(
            "INSERT INTO animals(id, name, age, sterilized, species) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, age = excluded.age, sterilized = excluded.sterilized, species = excluded.species",
            params![
                given,
                animal.name,
                animal.age as i64,
                animal.sterilized as i64,
                animal.species.as_str(),
            ],
        )
        .map_err(map_sqerr)?;
        animal.id = Some(AnimalId(written_id(&conn, given)));
        Ok(animal)
    }

    fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, CoreError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, age, sterilized, species FROM animals WHERE id = ?1",
            params![id.0],
            |row| Ok(row_to_animal(row, 0)),
        )
        .optional()
        .map_err(map_sqerr)?
        .transpose()
    }
}

impl AdoptionRepository for SqliteRepo {
    fn save(&self, adoption: Adoption) -> Result<Adoption, CoreError> {
        let adoptant_id = adoption
            .adoptant
            .id
            .ok_or_else(|| CoreError::InvalidEntity("adoption adoptant has no id".into()))?;
        let animal_id = adoption
            .animal
            .id
            .ok_or_else(|| CoreError::InvalidEntity("adoption animal has no id".into()))?;

        let conn = self.conn()?;
        let given = adoption.id.map(|i| i.0);
        conn.execute(
            "INSERT INTO adoptions(id, fee, adoptant_id, animal_id) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET fee = excluded.fee, adoptant_id = excluded.adoptant_id, animal_id = excluded.animal_id",
            params![given, adoption.fee, adoptant_id.0, animal_id.0],
        )
        .map_err(map_sqerr)?;
        let id = AdoptionId(written_id(&conn, given));
        find_adoption(&conn, id)?
            .ok_or_else(|| CoreError::Repository(format!("adoption {id} vanished after save")))
    }

    fn find_by_id(&self, id: AdoptionId) -> Result<Option<Adoption>, CoreError> {
        let conn = self.conn()?;
        find_adoption(&conn, id)
    }

    fn find_by_adoptant_name(&self, name: &str) -> Result<Vec<Adoption>, CoreError> {
        let conn = self.conn()?;
        query_adoptions(&conn, "a.name = ?1", &name)
    }

    fn find_by_adoptant_id(&self, id: AdoptantId) -> Result<Vec<Adoption>, CoreError> {
        let conn = self.conn()?;
        query_adoptions(&conn, "d.adoptant_id = ?1", &id.0)
    }
}
