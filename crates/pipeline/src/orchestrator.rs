//! Pipeline orchestration.
//!
//! Sequences Retriever -> RelevanceFilter -> ContextComposer ->
//! HistoryWindow -> RefinementPipeline and converts every component
//! failure into a fixed fallback answer. `answer` never raises.

use crate::compose::compose_context;
use crate::refine::{RefinementOutcome, RefinementPipeline};
use crate::types::AnswerResult;
use chrono::Utc;
use medrag_history::{compose_window, render_window, HistoryStore, WindowBudget};
use medrag_knowledge::{filter_by_score, Retriever};
use std::sync::Arc;

/// Conversation identity for history windowing and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationKey {
    pub user_key: String,
    pub channel_key: String,
}

impl ConversationKey {
    pub fn new(user_key: impl Into<String>, channel_key: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            channel_key: channel_key.into(),
        }
    }
}

/// One inbound question, scoped to a knowledge namespace and optionally to
/// a conversation.
#[derive(Debug, Clone)]
pub struct AnswerRequest {
    /// Raw user text, immutable once received
    pub question: String,

    /// Logical partition of the vector index to search
    pub namespace: String,

    /// Present when the channel is conversational; enables history
    /// windowing and best-effort logging
    pub conversation: Option<ConversationKey>,
}

impl AnswerRequest {
    /// A standalone question against a namespace.
    pub fn new(question: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            namespace: namespace.into(),
            conversation: None,
        }
    }

    /// Attach a conversation key.
    pub fn with_conversation(mut self, key: ConversationKey) -> Self {
        self.conversation = Some(key);
        self
    }
}

/// Sequences one pipeline run end to end.
pub struct Orchestrator {
    retriever: Retriever,
    refinery: RefinementPipeline,
    history: Option<Arc<HistoryStore>>,
    window_budget: WindowBudget,
    top_k: usize,
    threshold: f32,
}

impl Orchestrator {
    /// Create an orchestrator without history support.
    pub fn new(
        retriever: Retriever,
        refinery: RefinementPipeline,
        top_k: usize,
        threshold: f32,
    ) -> Self {
        Self {
            retriever,
            refinery,
            history: None,
            window_budget: WindowBudget::default(),
            top_k,
            threshold,
        }
    }

    /// Attach a history store and window budget.
    pub fn with_history(mut self, store: Arc<HistoryStore>, budget: WindowBudget) -> Self {
        self.history = Some(store);
        self.window_budget = budget;
        self
    }

    /// Answer one question. Always returns a result; every failure mode
    /// maps to a fixed fallback message with no supporting passages.
    pub async fn answer(&self, request: &AnswerRequest) -> AnswerResult {
        tracing::info!(
            namespace = %request.namespace,
            "Answering question: {}",
            request.question
        );

        // Retrieval embeds the raw inbound question; the index carries
        // multilingual embeddings. Embedding and index failures have
        // already collapsed to empty here.
        let candidates = self
            .retriever
            .retrieve(&request.question, self.top_k, &request.namespace)
            .await;

        if candidates.is_empty() {
            tracing::info!("Retrieval returned nothing; knowledge base unreachable");
            return AnswerResult::knowledge_base_unreachable();
        }

        let filtered = filter_by_score(candidates, self.threshold);
        if filtered.is_empty() {
            return AnswerResult::no_relevant_information();
        }

        let context = compose_context(&filtered);

        // Working-language question for the refinement stages; best-effort
        let working_question = match self.refinery.translate_question(&request.question).await {
            Ok(question) => question,
            Err(e) => {
                tracing::warn!("Question translation failed, using raw question: {}", e);
                request.question.clone()
            }
        };

        let composed_question = self.compose_with_history(request, working_question);

        let outcome = match self
            .refinery
            .refine(&composed_question, &request.question, &context)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Refinement failed, discarding partial draft: {}", e);
                return AnswerResult::generation_failed();
            }
        };

        let result = match outcome {
            RefinementOutcome::Answer(text) => AnswerResult::new(text, filtered),
            RefinementOutcome::Insufficient => AnswerResult::insufficient_information(),
        };

        self.log_exchange(request, &result);
        result
    }

    /// Prepend the bounded history window to the question when the channel
    /// is conversational and prior turns exist.
    fn compose_with_history(&self, request: &AnswerRequest, question: String) -> String {
        let (store, key) = match (&self.history, &request.conversation) {
            (Some(store), Some(key)) => (store, key),
            _ => return question,
        };

        let turns = match store.query_recent(&key.user_key, &key.channel_key, self.window_budget.limit)
        {
            Ok(turns) => turns,
            Err(e) => {
                // Best-effort: a failed read never blocks the answer
                tracing::warn!("History read failed, answering without history: {}", e);
                return question;
            }
        };

        let window = compose_window(&turns, &self.window_budget);
        if window.is_empty() {
            return question;
        }

        tracing::debug!("Composed history window of {} turns", window.len());

        format!(
            "Recent conversation:\n{}\n\nCurrent question: {}",
            render_window(&window),
            question
        )
    }

    /// Append the exchange to the history store, best-effort.
    fn log_exchange(&self, request: &AnswerRequest, result: &AnswerResult) {
        let (store, key) = match (&self.history, &request.conversation) {
            (Some(store), Some(key)) => (store, key),
            _ => return,
        };

        if let Err(e) = store.append(
            &key.user_key,
            &key.channel_key,
            &request.question,
            &result.text,
            Utc::now(),
        ) {
            tracing::warn!("Failed to log exchange: {}", e);
        }
    }
}
