//! JSON file catalog store.
//!
//! The whole [`Catalog`] lives in one JSON file. The file is read again on
//! every call, so edits made by an administrator take effect for the next
//! submission without a restart.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{
    Catalog, CatalogError, CatalogResult, CatalogStore, Equation, FormField, Knowledge, System,
    SystemDefinition, SystemId,
};

#[derive(Debug, Clone)]
pub struct LocalFsCatalog {
    path: PathBuf,
}

impl LocalFsCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the catalog file.
    pub async fn load(&self) -> CatalogResult<Catalog> {
        let contents = fs::read(&self.path).await?;
        let catalog = serde_json::from_slice(&contents)?;
        Ok(catalog)
    }

    /// Replace the catalog file with `catalog`.
    ///
    /// The data is written to a temporary file next to the target and then
    /// renamed over it, so readers never see a half-written catalog.
    pub async fn save(&self, catalog: &Catalog) -> CatalogResult<()> {
        let json = serde_json::to_vec_pretty(catalog)?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).await?;

        let temp_file = NamedTempFile::new_in(&dir)?;
        let temp_path = temp_file.path().to_path_buf();

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&json).await?;
        file.flush().await?;

        temp_file
            .persist(&self.path)
            .map_err(|e| CatalogError::Storage(format!("Failed to rename file: {}", e)))?;
        tracing::info!(path = %self.path.display(), "catalog written");
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for LocalFsCatalog {
    async fn list_systems(&self) -> CatalogResult<Vec<System>> {
        let mut systems = self.load().await?.systems;
        systems.sort_by_key(|s| s.id);
        Ok(systems)
    }

    async fn get_system(&self, id: SystemId) -> CatalogResult<System> {
        self.load().await?.system(id).cloned()
    }

    async fn get_required_fields(&self, system: &System) -> CatalogResult<Vec<FormField>> {
        Ok(self.load().await?.required_fields(system.id))
    }

    async fn get_equations(&self, system: &System) -> CatalogResult<Vec<Equation>> {
        Ok(self.load().await?.equations(system.id))
    }

    async fn get_knowledge(&self, system: &System) -> CatalogResult<Vec<Knowledge>> {
        Ok(self.load().await?.knowledge(system.id))
    }

    async fn get_definition(&self, id: SystemId) -> CatalogResult<SystemDefinition> {
        self.load().await?.definition(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample::sample_catalog;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    async fn create_test_store() -> (LocalFsCatalog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFsCatalog::new(temp_dir.path().join("catalog.json"));
        store.save(&sample_catalog()).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _temp_dir) = create_test_store().await;
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, sample_catalog());
    }

    #[tokio::test]
    async fn test_edits_are_visible_without_reopening() {
        let (store, _temp_dir) = create_test_store().await;
        let system = store.get_system(1).await.unwrap();
        assert_eq!(store.get_equations(&system).await.unwrap().len(), 1);

        let mut catalog = store.load().await.unwrap();
        catalog.equations.retain(|e| e.system_id != 1);
        store.save(&catalog).await.unwrap();

        assert!(store.get_equations(&system).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFsCatalog::new(temp_dir.path().join("absent.json"));
        assert!(matches!(
            store.list_systems().await,
            Err(CatalogError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = LocalFsCatalog::new(path);
        assert!(matches!(
            store.get_system(1).await,
            Err(CatalogError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_system() {
        let (store, _temp_dir) = create_test_store().await;
        assert!(matches!(
            store.get_system(404).await,
            Err(CatalogError::SystemNotFound(404))
        ));
        assert!(matches!(
            store.get_definition(404).await,
            Err(CatalogError::SystemNotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_definition_comes_from_one_file_version() {
        let (store, _temp_dir) = create_test_store().await;
        let definition = store.get_definition(2).await.unwrap();
        assert_eq!(definition, sample_catalog().definition(2).unwrap());
        assert_eq!(definition.system.name, "BMR_Calculator");
        assert_eq!(definition.equations.len(), 2);

        // The file is gone after the read; the definition already in hand is whole
        std::fs::remove_file(store.path()).unwrap();
        assert_eq!(definition.fields.len(), sample_catalog().required_fields(2).len());
        assert!(matches!(
            store.get_definition(2).await,
            Err(CatalogError::Io(_))
        ));
    }
}
