//! Pinecone vector index client.
//!
//! Queries a serverless Pinecone index over its REST API. Only the query
//! path is implemented: the index is populated by an external ingestion
//! process, and this system never writes to it.

use crate::types::IndexMatch;
use crate::vector_index::VectorIndex;
use medrag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Query request payload.
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    namespace: &'a str,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
    #[serde(rename = "includeValues")]
    include_values: bool,
}

/// Query response payload.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

/// Pinecone index client.
pub struct PineconeIndex {
    /// Index host URL (e.g. "https://medrag-abc123.svc.aped-4627-b74a.pinecone.io")
    host: String,

    /// API key sent via the Api-Key header
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl PineconeIndex {
    /// Create a new client for an index host.
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            host: host.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if let Ok(client) = reqwest::Client::builder().timeout(timeout).build() {
            self.client = client;
        }
        self
    }
}

#[async_trait::async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
    ) -> AppResult<Vec<IndexMatch>> {
        let url = format!("{}/query", self.host);

        let request = QueryRequest {
            vector,
            top_k,
            namespace,
            include_metadata: true,
            include_values: false,
        };

        debug!(
            "Querying index for top {} in namespace '{}'",
            top_k, namespace
        );

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Failed to query Pinecone index: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Index(format!(
                "Pinecone query failed ({}): {}",
                status, error_text
            )));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Failed to parse Pinecone response: {}", e)))?;

        debug!("Index returned {} matches", query_response.matches.len());

        Ok(query_response
            .matches
            .into_iter()
            .map(|m| IndexMatch {
                score: m.score,
                metadata: m.metadata.unwrap_or(serde_json::Value::Null),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let index = PineconeIndex::new("https://example.pinecone.io/", "key");
        assert_eq!(index.host, "https://example.pinecone.io");
    }

    #[test]
    fn test_query_request_serialization() {
        let vector = vec![0.1, 0.2];
        let request = QueryRequest {
            vector: &vector,
            top_k: 5,
            namespace: "blood-donation",
            include_metadata: true,
            include_values: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["topK"], 5);
        assert_eq!(json["namespace"], "blood-donation");
        assert_eq!(json["includeMetadata"], true);
        assert_eq!(json["includeValues"], false);
    }

    #[test]
    fn test_query_response_missing_metadata() {
        let json = r#"{"matches": [{"id": "a", "score": 0.8}, {"id": "b", "score": 0.5, "metadata": {"text": "hi"}}]}"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.matches.len(), 2);
        assert!(response.matches[0].metadata.is_none());
        assert!(response.matches[1].metadata.is_some());
    }
}
