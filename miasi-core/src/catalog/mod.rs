//! Catalog of expert systems.
//!
//! The catalog holds the administrator-authored definitions the submission
//! pipeline reads: [`System`]s, their required [`FormField`]s (attached through
//! [`SystemFormLink`]s), their [`Equation`]s and their [`Knowledge`] rules.
//!
//! The pipeline only ever reads the catalog, through the [`CatalogStore`]
//! trait. Two stores are provided:
//!
//! - [`in_memory::InMemoryCatalog`]: DashMap-backed, process local
//! - [`local_fs::LocalFsCatalog`]: a JSON [`Catalog`] file re-read on every call
//!
//! Nothing is cached between requests by the pipeline itself, so an edit to
//! the underlying store is visible to the very next submission.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::CatalogConfig;

pub mod in_memory;
pub mod local_fs;
pub mod sample;

pub type SystemId = i64;
pub type FieldId = i64;

/// A named expert-system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct System {
    pub id: SystemId,
    /// Code name
    pub name: String,
    /// Name shown to end users
    #[serde(alias = "name_human_readable")]
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `false` picks the single best matching advice, `true` returns every match
    #[serde(default)]
    pub multi_advice: bool,
}

/// Declared input kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Number,
    Sex,
    Select,
    /// Free text, also the fallback for kinds this crate does not know
    #[default]
    #[serde(other)]
    Text,
}

/// One entry of a `select` field: what the user sees and what gets submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormField {
    pub id: FieldId,
    /// Code name, also the variable name inside formulas and conditions
    pub name: String,
    #[serde(alias = "name_human_readable")]
    pub display_name: String,
    #[serde(default, alias = "input_type")]
    pub input_kind: InputKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
    /// Regular expression the submitted text must match
    #[serde(default)]
    pub validation_rule: Option<String>,
    /// Labels of a `select` field, parallel to `select_values`
    #[serde(default)]
    pub select_labels: Vec<String>,
    #[serde(default)]
    pub select_values: Vec<String>,
}

impl FormField {
    /// Label/value pairs of a `select` field, in declaration order.
    pub fn options(&self) -> Vec<SelectOption> {
        self.select_labels
            .iter()
            .zip(self.select_values.iter())
            .map(|(label, value)| SelectOption {
                label: label.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SystemFormLink {
    pub system_id: SystemId,
    pub field_id: FieldId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Equation {
    pub id: i64,
    pub system_id: SystemId,
    /// Code name, the variable the result is stored under
    pub name: String,
    #[serde(alias = "name_human_readable")]
    pub display_name: String,
    pub formula: String,
    /// Only applies when the submitted sex equals this value
    #[serde(default)]
    pub sex: Option<i64>,
    /// Internal results feed later formulas and conditions but are not reported
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Knowledge {
    pub id: i64,
    pub system_id: SystemId,
    pub condition: String,
    pub advice: String,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("System not found: {0}")]
    SystemNotFound(SystemId),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog file is not valid: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Catalog storage error: {0}")]
    Storage(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Read access to the catalog.
///
/// Every method reflects the current state of the store; callers must not
/// assume two calls observe the same snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_systems(&self) -> CatalogResult<Vec<System>>;

    async fn get_system(&self, id: SystemId) -> CatalogResult<System>;

    /// Fields linked to the system, in link order
    async fn get_required_fields(&self, system: &System) -> CatalogResult<Vec<FormField>>;

    /// Equations of the system, in definition order
    async fn get_equations(&self, system: &System) -> CatalogResult<Vec<Equation>>;

    /// Knowledge entries of the system, in definition order
    async fn get_knowledge(&self, system: &System) -> CatalogResult<Vec<Knowledge>>;

    /// The system with its fields, equations and knowledge, all read from
    /// one state of the store.
    async fn get_definition(&self, id: SystemId) -> CatalogResult<SystemDefinition>;
}

/// Everything the catalog knows about one system, read at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemDefinition {
    pub system: System,
    /// Required fields in link order
    pub fields: Vec<FormField>,
    pub equations: Vec<Equation>,
    pub knowledge: Vec<Knowledge>,
}

/// A whole catalog as plain data, the on-disk format of [`local_fs::LocalFsCatalog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, ToSchema)]
pub struct Catalog {
    #[serde(default)]
    pub systems: Vec<System>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub links: Vec<SystemFormLink>,
    #[serde(default)]
    pub equations: Vec<Equation>,
    #[serde(default)]
    pub knowledge: Vec<Knowledge>,
}

impl Catalog {
    pub fn system(&self, id: SystemId) -> CatalogResult<&System> {
        self.systems
            .iter()
            .find(|s| s.id == id)
            .ok_or(CatalogError::SystemNotFound(id))
    }

    pub fn required_fields(&self, system_id: SystemId) -> Vec<FormField> {
        self.links
            .iter()
            .filter(|link| link.system_id == system_id)
            .filter_map(|link| self.fields.iter().find(|f| f.id == link.field_id))
            .cloned()
            .collect()
    }

    pub fn equations(&self, system_id: SystemId) -> Vec<Equation> {
        self.equations
            .iter()
            .filter(|e| e.system_id == system_id)
            .cloned()
            .collect()
    }

    pub fn knowledge(&self, system_id: SystemId) -> Vec<Knowledge> {
        self.knowledge
            .iter()
            .filter(|k| k.system_id == system_id)
            .cloned()
            .collect()
    }

    pub fn definition(&self, id: SystemId) -> CatalogResult<SystemDefinition> {
        let system = self.system(id)?.clone();
        Ok(SystemDefinition {
            fields: self.required_fields(id),
            equations: self.equations(id),
            knowledge: self.knowledge(id),
            system,
        })
    }
}

/// Build the store described by `config`.
pub fn open(config: &CatalogConfig) -> Arc<dyn CatalogStore> {
    match config {
        CatalogConfig::InMemory => {
            Arc::new(in_memory::InMemoryCatalog::from_catalog(sample::sample_catalog()))
        }
        CatalogConfig::LocalFs { path } => Arc::new(local_fs::LocalFsCatalog::new(path.clone())),
    }
}
