//! Declaration repositories.
//!
//! The domain only sees [`DeclarationRepository`]. `MemoryStore` keeps
//! snapshots in a map and assigns ids; `JsonFileStore` wraps it and rewrites
//! a single JSON document after every save.

use crate::domain::{DeclarationId, DeclarationSnapshot};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed store document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait DeclarationRepository {
    fn find_by_id(&self, id: DeclarationId) -> Result<Option<DeclarationSnapshot>, StoreError>;

    /// Persist a snapshot, assigning ids to the declaration and to any child
    /// entry that does not have one yet.
    fn save(&mut self, snapshot: DeclarationSnapshot) -> Result<DeclarationSnapshot, StoreError>;

    fn exists_by_taxpayer_and_year(&self, taxpayer_id: Uuid, year: i32)
        -> Result<bool, StoreError>;

    /// All declarations of a taxpayer ordered by year
    fn find_all_by_taxpayer(&self, taxpayer_id: Uuid)
        -> Result<Vec<DeclarationSnapshot>, StoreError>;
}

/// Whole-store document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MemoryStore {
    #[serde(default)]
    last_declaration_id: DeclarationId,
    /// Child ids are unique across incomes, expenses and dependents
    #[serde(default)]
    last_entry_id: i64,
    #[serde(default)]
    declarations: BTreeMap<DeclarationId, DeclarationSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    fn next_entry_id(&mut self) -> i64 {
        self.last_entry_id += 1;
        self.last_entry_id
    }

    fn assign_ids(&mut self, snapshot: &mut DeclarationSnapshot) -> DeclarationId {
        let id = match snapshot.id {
            Some(id) => {
                self.last_declaration_id = self.last_declaration_id.max(id);
                id
            }
            None => {
                self.last_declaration_id += 1;
                self.last_declaration_id
            }
        };
        snapshot.id = Some(id);

        // keep the counter ahead of ids supplied by callers
        let supplied = snapshot
            .incomes
            .iter()
            .map(|r| r.id)
            .chain(snapshot.deductible_expenses.iter().map(|r| r.id))
            .chain(snapshot.dependents.iter().map(|r| r.id))
            .flatten()
            .max();
        if let Some(max) = supplied {
            self.last_entry_id = self.last_entry_id.max(max);
        }

        for record in &mut snapshot.incomes {
            if record.id.is_none() {
                record.id = Some(self.next_entry_id());
            }
        }
        for record in &mut snapshot.deductible_expenses {
            if record.id.is_none() {
                record.id = Some(self.next_entry_id());
            }
        }
        for record in &mut snapshot.dependents {
            if record.id.is_none() {
                record.id = Some(self.next_entry_id());
            }
        }
        id
    }
}

impl DeclarationRepository for MemoryStore {
    fn find_by_id(&self, id: DeclarationId) -> Result<Option<DeclarationSnapshot>, StoreError> {
        Ok(self.declarations.get(&id).cloned())
    }

    fn save(
        &mut self,
        mut snapshot: DeclarationSnapshot,
    ) -> Result<DeclarationSnapshot, StoreError> {
        let id = self.assign_ids(&mut snapshot);
        log::debug!(
            "Saving declaration {} ({} incomes, {} expenses, {} dependents)",
            id,
            snapshot.incomes.len(),
            snapshot.deductible_expenses.len(),
            snapshot.dependents.len()
        );
        self.declarations.insert(id, snapshot.clone());
        Ok(snapshot)
    }

    fn exists_by_taxpayer_and_year(
        &self,
        taxpayer_id: Uuid,
        year: i32,
    ) -> Result<bool, StoreError> {
        Ok(self
            .declarations
            .values()
            .any(|d| d.taxpayer_id == taxpayer_id && d.year == year))
    }

    fn find_all_by_taxpayer(
        &self,
        taxpayer_id: Uuid,
    ) -> Result<Vec<DeclarationSnapshot>, StoreError> {
        let mut found: Vec<_> = self
            .declarations
            .values()
            .filter(|d| d.taxpayer_id == taxpayer_id)
            .cloned()
            .collect();
        found.sort_by_key(|d| (d.year, d.id));
        Ok(found)
    }
}

/// File-backed store holding the whole [`MemoryStore`] document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Load the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = if path.exists() {
            let file = File::open(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            log::info!("Store {} not found, starting empty", path.display());
            MemoryStore::new()
        };
        log::debug!(
            "Opened store {} with {} declarations",
            path.display(),
            inner.len()
        );
        Ok(JsonFileStore { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let tmp = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp).map_err(io_err)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.inner).map_err(|source| {
                StoreError::Json {
                    path: tmp.clone(),
                    source,
                }
            })?;
            writer.flush().map_err(io_err)?;
        }
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl DeclarationRepository for JsonFileStore {
    fn find_by_id(&self, id: DeclarationId) -> Result<Option<DeclarationSnapshot>, StoreError> {
        self.inner.find_by_id(id)
    }

    fn save(&mut self, snapshot: DeclarationSnapshot) -> Result<DeclarationSnapshot, StoreError> {
        let saved = self.inner.save(snapshot)?;
        self.flush()?;
        Ok(saved)
    }

    fn exists_by_taxpayer_and_year(
        &self,
        taxpayer_id: Uuid,
        year: i32,
    ) -> Result<bool, StoreError> {
        self.inner.exists_by_taxpayer_and_year(taxpayer_id, year)
    }

    fn find_all_by_taxpayer(
        &self,
        taxpayer_id: Uuid,
    ) -> Result<Vec<DeclarationSnapshot>, StoreError> {
        self.inner.find_all_by_taxpayer(taxpayer_id)
    }
}
