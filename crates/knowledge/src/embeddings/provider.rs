//! Embedding provider trait and factory.

use medrag_core::config::EmbeddingSettings;
use medrag_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "gemini", "mock")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate an embedding for a single text.
    ///
    /// The returned vector matches `dimensions()`. Failures (network,
    /// quota, malformed response) surface as `AppError::Embedding`; the
    /// Retriever converts them into "retrieval unavailable".
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Create an embedding provider based on configuration.
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "gemini" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Gemini embedding provider requires an API key".to_string())
            })?;
            let provider = super::providers::gemini::GeminiEmbedder::new(
                api_key,
                &settings.model,
                settings.dimensions,
            );
            Ok(Arc::new(provider))
        }

        "mock" => {
            let provider = super::providers::mock::MockEmbedder::new(settings.dimensions);
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: gemini, mock",
            settings.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_settings() -> EmbeddingSettings {
        EmbeddingSettings {
            provider: "mock".to_string(),
            model: "word-hash-v1".to_string(),
            dimensions: 64,
        }
    }

    #[test]
    fn test_create_mock_provider() {
        let provider = create_provider(&mock_settings(), None).unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.dimensions(), 64);
    }

    #[test]
    fn test_create_gemini_requires_api_key() {
        let mut settings = mock_settings();
        settings.provider = "gemini".to_string();

        let result = create_provider(&settings, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_unknown_provider() {
        let mut settings = mock_settings();
        settings.provider = "unknown".to_string();

        let result = create_provider(&settings, None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&mock_settings(), None).unwrap();

        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 64);
    }
}
