use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::{evaluate_submission, SubmissionOutcome, SystemDefinition};
use crate::catalog::{CatalogStore, FormField, System, SystemId};
use crate::config::EngineConfig;
use crate::error::{Error, ErrorKind, InternalResult, ValidationError};

/// Answers form submissions from the current state of a catalog store.
///
/// Every call re-reads the definitions it needs; nothing is cached.
#[derive(Clone)]
pub struct SubmissionService {
    catalog: Arc<dyn CatalogStore>,
    config: EngineConfig,
}

impl SubmissionService {
    pub fn new(catalog: Arc<dyn CatalogStore>, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn list_systems(&self) -> InternalResult<Vec<System>> {
        Ok(self.catalog.list_systems().await?)
    }

    /// The system and its required fields, in link order.
    pub async fn required_fields(&self, id: SystemId) -> InternalResult<(System, Vec<FormField>)> {
        let system = self.catalog.get_system(id).await?;
        let fields = self.catalog.get_required_fields(&system).await?;
        Ok((system, fields))
    }

    /// One consistent read of everything a submission needs.
    pub async fn load_definition(&self, id: SystemId) -> InternalResult<SystemDefinition> {
        Ok(self.catalog.get_definition(id).await?)
    }

    /// Submits an already decoded payload.
    pub async fn submit(&self, id: SystemId, payload: &JsonValue) -> InternalResult<SubmissionOutcome> {
        tracing::info!(system_id = id, "form submission");
        let definition = self.load_definition(id).await.inspect_err(|e| log_rejection(id, e))?;
        self.run(&definition, payload)
    }

    /// Submits a raw request body. The system is looked up before the body
    /// is decoded, so an unknown system wins over a malformed body.
    pub async fn submit_body(&self, id: SystemId, body: &[u8]) -> InternalResult<SubmissionOutcome> {
        tracing::info!(system_id = id, bytes = body.len(), "form submission");
        let definition = self.load_definition(id).await.inspect_err(|e| log_rejection(id, e))?;
        let payload: JsonValue = if body.iter().all(u8::is_ascii_whitespace) {
            JsonValue::Null
        } else {
            serde_json::from_slice(body)
                .map_err(|e| Error::from(ValidationError::MalformedPayload(e.to_string())))
                .inspect_err(|e| log_rejection(id, e))?
        };
        self.run(&definition, &payload)
    }

    fn run(&self, definition: &SystemDefinition, payload: &JsonValue) -> InternalResult<SubmissionOutcome> {
        let id = definition.system.id;
        let outcome =
            evaluate_submission(definition, payload, &self.config).inspect_err(|e| log_rejection(id, e))?;
        tracing::info!(
            system_id = id,
            results = outcome.results.len(),
            advice = outcome.advice.is_some(),
            "submission computed"
        );
        Ok(outcome)
    }
}

fn log_rejection(id: SystemId, error: &Error) {
    match error.kind() {
        ErrorKind::NotFound | ErrorKind::Validation => {
            tracing::warn!(system_id = id, %error, "submission rejected")
        }
        ErrorKind::Evaluation | ErrorKind::Internal => {
            tracing::error!(system_id = id, %error, "submission failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{in_memory::InMemoryCatalog, sample::sample_catalog, CatalogError, MockCatalogStore};
    use crate::error::NotFoundError;
    use crate::pipeline::{Advice, SubmissionStatus};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_service() -> SubmissionService {
        SubmissionService::new(
            Arc::new(InMemoryCatalog::from_catalog(sample_catalog())),
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_submit_bmi() {
        let outcome = sample_service()
            .submit(1, &json!({"height": 1.75, "weight": 70}))
            .await
            .unwrap();
        assert_eq!(outcome.status, SubmissionStatus::ComputedWithAdvice);
        assert_eq!(outcome.results[0].result, 22.86);
    }

    #[tokio::test]
    async fn test_unknown_system_wins_over_malformed_body() {
        let err = sample_service().submit_body(99, b"{not json").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFoundError::System(99))));

        let err = sample_service().submit_body(1, b"{not json").await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MalformedPayload(_))));
        assert!(err.to_string().starts_with("Error parsing input data: "));
    }

    #[tokio::test]
    async fn test_empty_body_is_no_data() {
        let err = sample_service().submit_body(1, b"  ").await.unwrap_err();
        assert_eq!(err.to_string(), "No data provided");
    }

    #[tokio::test]
    async fn test_submission_reads_the_store_every_time() {
        let store = InMemoryCatalog::from_catalog(sample_catalog());
        let service = SubmissionService::new(Arc::new(store.clone()), EngineConfig::default());
        let payload = json!({"height": 1.75, "weight": 70});

        let before = service.submit(1, &payload).await.unwrap();
        assert!(matches!(before.advice, Some(Advice::Single(_))));

        let catalog = sample_catalog();
        store.upsert(
            catalog.system(1).unwrap().clone(),
            catalog.required_fields(1),
            catalog.equations(1),
            Vec::new(),
        );
        let after = service.submit(1, &payload).await.unwrap();
        assert_eq!(after.status, SubmissionStatus::ComputedWithoutAdvice);
        assert_eq!(after.advice, None);
    }

    #[tokio::test]
    async fn test_multi_advice_with_mock_store() {
        let catalog = sample_catalog();
        let mut system = catalog.system(1).unwrap().clone();
        system.multi_advice = true;
        let mut knowledge = catalog.knowledge(1);
        knowledge[0].condition = "BMI > 0".to_string();

        // Only the single-read method may be used; any other call panics
        let mut mock = MockCatalogStore::new();
        let definition = SystemDefinition {
            system,
            fields: catalog.required_fields(1),
            equations: catalog.equations(1),
            knowledge,
        };
        mock.expect_get_definition()
            .withf(|id| *id == 1)
            .times(1)
            .returning(move |_| Ok(definition.clone()));

        let service = SubmissionService::new(Arc::new(mock), EngineConfig::default());
        let outcome = service
            .submit(1, &json!({"height": 1.75, "weight": 70}))
            .await
            .unwrap();
        assert_eq!(
            outcome.advice,
            Some(Advice::Multiple(vec![
                "Your weight is too low. Consider consulting a dietitian.".to_string(),
                "Your weight is normal. Keep up a healthy lifestyle!".to_string(),
            ]))
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let mut mock = MockCatalogStore::new();
        mock.expect_get_definition()
            .returning(|_| Err(CatalogError::Storage("disk on fire".to_string())));
        let service = SubmissionService::new(Arc::new(mock), EngineConfig::default());

        let err = service.submit(1, &json!({"a": 1})).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_required_fields() {
        let (system, fields) = sample_service().required_fields(3).await.unwrap();
        assert_eq!(system.name, "AMR_Calculator");
        assert_eq!(fields.len(), 5);
        assert!(sample_service().required_fields(42).await.is_err());
        assert_eq!(sample_service().list_systems().await.unwrap().len(), 5);
    }
}
