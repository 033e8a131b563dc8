//! Bounded answer service.
//!
//! Wraps the orchestrator with a worker bound: each inbound request
//! acquires a semaphore permit and runs its pipeline sequentially end to
//! end inside it. There is no ordering guarantee between concurrent
//! requests — two near-simultaneous questions from the same user may
//! complete out of order and interleave their history appends.

use crate::orchestrator::{AnswerRequest, Orchestrator};
use crate::types::AnswerResult;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Dispatches pipeline runs into a bounded worker pool.
#[derive(Clone)]
pub struct AnswerService {
    orchestrator: Arc<Orchestrator>,
    permits: Arc<Semaphore>,
    max_workers: usize,
}

impl AnswerService {
    /// Create a service bounded to `max_workers` concurrent runs.
    pub fn new(orchestrator: Arc<Orchestrator>, max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            orchestrator,
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    /// Answer one request within the worker bound.
    pub async fn submit(&self, request: &AnswerRequest) -> AnswerResult {
        // acquire only fails if the semaphore is closed, which never happens
        let _permit = match self.permits.acquire().await {
            Ok(permit) => Some(permit),
            Err(_) => None,
        };

        self.orchestrator.answer(request).await
    }

    /// Drive many requests through the pool concurrently.
    ///
    /// Results are returned paired with their requests, in completion
    /// order.
    pub async fn answer_all(
        &self,
        requests: Vec<AnswerRequest>,
    ) -> Vec<(AnswerRequest, AnswerResult)> {
        futures::stream::iter(requests)
            .map(|request| {
                let service = self.clone();
                async move {
                    let result = service.submit(&request).await;
                    (request, result)
                }
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await
    }
}
