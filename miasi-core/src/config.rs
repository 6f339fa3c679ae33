use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, path::PathBuf};
use utoipa::ToSchema;

use crate::{Error, InternalResult};

/// Tuning knobs of the submission pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EngineConfig {
    /// Decimal places of the equation results reported to the user
    #[serde(default = "default_display_precision")]
    pub display_precision: u32,

    /// Literal text separating the sub-conditions of a knowledge rule
    #[serde(default = "default_condition_delimiter")]
    pub condition_delimiter: String,

    /// Maximum nesting depth accepted for a formula or condition
    #[serde(default = "default_max_expression_depth")]
    pub max_expression_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            display_precision: default_display_precision(),
            condition_delimiter: default_condition_delimiter(),
            max_expression_depth: default_max_expression_depth(),
        }
    }
}

/// Where the catalog of systems is read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogConfig {
    /// Process-local store seeded with the sample catalog
    #[default]
    InMemory,
    /// JSON catalog file, re-read on every lookup
    LocalFs {
        #[schema(value_type = String)]
        path: PathBuf,
    },
}

/// Everything a running instance needs, loadable from one JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, ToSchema)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> InternalResult<T> {
    let file = File::open(path.as_ref()).map_err(|e| {
        Error::Internal(format!(
            "Failed to open config file {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| Error::Internal(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> InternalResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| Error::Internal(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

fn default_display_precision() -> u32 {
    2
}

fn default_condition_delimiter() -> String {
    " and ".to_string()
}

fn default_max_expression_depth() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: AppConfig = from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.engine.display_precision, 2);
        assert_eq!(config.engine.condition_delimiter, " and ");
    }

    #[test]
    fn test_local_fs_catalog_config() {
        let config: AppConfig = from_str(
            r#"{
                "engine": { "display_precision": 3 },
                "catalog": { "type": "local_fs", "path": "data/catalog.json" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.engine.display_precision, 3);
        assert_eq!(config.engine.max_expression_depth, 64);
        assert_eq!(
            config.catalog,
            CatalogConfig::LocalFs {
                path: PathBuf::from("data/catalog.json")
            }
        );
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let result: InternalResult<AppConfig> = from_file("/definitely/not/here.json");
        assert!(matches!(result, Err(Error::Internal(msg)) if msg.contains("Failed to open")));
    }
}
