//! In-memory catalog store.
//!
//! Each system is stored together with its fields, equations and knowledge
//! as one DashMap entry, so a single `upsert` replaces a system atomically.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::{
    Catalog, CatalogError, CatalogResult, CatalogStore, Equation, FormField, Knowledge, System,
    SystemDefinition, SystemId,
};

#[derive(Debug, Clone)]
struct SystemEntry {
    system: System,
    fields: Vec<FormField>,
    equations: Vec<Equation>,
    knowledge: Vec<Knowledge>,
}

/// Thread-safe, process-local [`CatalogStore`].
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    storage: Arc<DashMap<SystemId, SystemEntry>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(catalog: Catalog) -> Self {
        let store = Self::new();
        for system in &catalog.systems {
            store.upsert(
                system.clone(),
                catalog.required_fields(system.id),
                catalog.equations(system.id),
                catalog.knowledge(system.id),
            );
        }
        store
    }

    /// Insert or replace a system and everything attached to it.
    pub fn upsert(
        &self,
        system: System,
        fields: Vec<FormField>,
        equations: Vec<Equation>,
        knowledge: Vec<Knowledge>,
    ) {
        tracing::debug!(system_id = system.id, name = %system.name, "upsert system");
        self.storage.insert(
            system.id,
            SystemEntry {
                system,
                fields,
                equations,
                knowledge,
            },
        );
    }

    pub fn remove(&self, id: SystemId) -> bool {
        self.storage.remove(&id).is_some()
    }

    fn entry(&self, id: SystemId) -> CatalogResult<SystemEntry> {
        self.storage
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(CatalogError::SystemNotFound(id))
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn list_systems(&self) -> CatalogResult<Vec<System>> {
        let mut systems: Vec<System> = self
            .storage
            .iter()
            .map(|entry| entry.value().system.clone())
            .collect();
        systems.sort_by_key(|s| s.id);
        Ok(systems)
    }

    async fn get_system(&self, id: SystemId) -> CatalogResult<System> {
        Ok(self.entry(id)?.system)
    }

    async fn get_required_fields(&self, system: &System) -> CatalogResult<Vec<FormField>> {
        Ok(self.entry(system.id)?.fields)
    }

    async fn get_equations(&self, system: &System) -> CatalogResult<Vec<Equation>> {
        Ok(self.entry(system.id)?.equations)
    }

    async fn get_knowledge(&self, system: &System) -> CatalogResult<Vec<Knowledge>> {
        Ok(self.entry(system.id)?.knowledge)
    }

    async fn get_definition(&self, id: SystemId) -> CatalogResult<SystemDefinition> {
        let entry = self.entry(id)?;
        Ok(SystemDefinition {
            system: entry.system,
            fields: entry.fields,
            equations: entry.equations,
            knowledge: entry.knowledge,
        })
    }
}
