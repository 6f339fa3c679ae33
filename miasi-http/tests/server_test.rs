use miasi_core::{
    catalog::{CatalogStore, local_fs::LocalFsCatalog, sample::sample_catalog},
    config::CatalogConfig,
};
use miasi_http::server::{AppState, ServerConfig};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_default_config() {
    let config = ServerConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 3000);
    assert_eq!(config.catalog, CatalogConfig::InMemory);
    assert_eq!(config.engine.display_precision, 2);
}

#[test]
fn test_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"port": 8080, "catalog": {{"type": "local_fs", "path": "/var/lib/miasi/catalog.json"}}}}"#
    )
    .unwrap();

    let config: ServerConfig = miasi_core::config::from_file(file.path()).unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert!(matches!(config.catalog, CatalogConfig::LocalFs { .. }));
}

#[tokio::test]
async fn test_state_from_local_fs_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");
    LocalFsCatalog::new(path.clone())
        .save(&sample_catalog())
        .await
        .unwrap();

    let config = ServerConfig {
        catalog: CatalogConfig::LocalFs { path },
        ..ServerConfig::default()
    };
    let state = AppState::from_config(&config);
    let systems = state.service.catalog().list_systems().await.unwrap();
    assert_eq!(systems.len(), 5);
}
