//! The multi-stage refinement chain.
//!
//! Fixed stage sequence: Draft -> Verify -> Moderate -> Format ->
//! NormalizeLanguage, each one blocking LLM call over the pipeline state.
//! The sentinel predicate is checked between stages: once any stage
//! declares the context insufficient, the remaining stages are skipped and
//! the chain resolves to the fixed apology. Stage failures abort the chain;
//! the partial draft is never returned.

use crate::state::{PipelineState, SENTINEL};
use medrag_core::AppResult;
use medrag_llm::{LlmClient, LlmRequest};
use medrag_prompt::{PromptSet, StageTemplate};
use std::collections::HashMap;
use std::sync::Arc;

/// Stages that read and rewrite the draft, in order. Format and
/// NormalizeLanguage follow with their own handling.
const REFINE_CHAIN: [StageTemplate; 3] = [
    StageTemplate::Draft,
    StageTemplate::Verify,
    StageTemplate::Moderate,
];

/// Sampling temperature for every stage; answers must stay factual.
const STAGE_TEMPERATURE: f32 = 0.3;

/// Token ceiling for every stage.
const STAGE_MAX_TOKENS: u32 = 1000;

/// Outcome of a completed refinement run.
#[derive(Debug, Clone, PartialEq)]
pub enum RefinementOutcome {
    /// A grounded, formatted answer
    Answer(String),

    /// The chain declared the context insufficient
    Insufficient,
}

/// The refinement chain over one language model.
pub struct RefinementPipeline {
    llm: Arc<dyn LlmClient>,
    prompts: PromptSet,
    model: String,
    working_language: String,
    normalize_language: bool,
}

impl RefinementPipeline {
    /// Create a refinement pipeline.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: PromptSet,
        model: impl Into<String>,
        working_language: impl Into<String>,
        normalize_language: bool,
    ) -> Self {
        Self {
            llm,
            prompts,
            model: model.into(),
            working_language: working_language.into(),
            normalize_language,
        }
    }

    /// Translate the inbound question to the working language.
    ///
    /// Questions already in the working language are repeated verbatim by
    /// the model per the template contract.
    pub async fn translate_question(&self, question: &str) -> AppResult<String> {
        let mut variables = self.base_variables();
        variables.insert("question".to_string(), question.to_string());

        let translated = self
            .call_stage(StageTemplate::QuestionTranslate, &variables)
            .await?;

        tracing::debug!(stage = "question_translate", output = %translated);
        Ok(translated)
    }

    /// Run the refinement chain over a question and its composed context.
    ///
    /// `question` is the working-language (and, when conversational,
    /// history-composed) question driving the draft/verify/moderate/format
    /// stages; `original_question` is the inbound text the terminal
    /// language-normalization stage matches the answer language against.
    pub async fn refine(
        &self,
        question: &str,
        original_question: &str,
        context: &str,
    ) -> AppResult<RefinementOutcome> {
        let mut state = PipelineState::new(question, context);

        for stage in REFINE_CHAIN {
            let mut variables = self.base_variables();
            variables.insert("question".to_string(), state.question.clone());
            variables.insert("context".to_string(), state.context.clone());
            variables.insert("draft".to_string(), state.draft.clone());

            state.draft = self.call_stage(stage, &variables).await?;
            tracing::debug!(stage = stage.name(), output = %state.draft);

            // Short-circuit: downstream stages would only echo the sentinel
            // verbatim, and Format's apology is fixed, so resolve here.
            if state.is_sentinel() {
                tracing::info!("Stage '{}' declared insufficient context", stage.name());
                return Ok(RefinementOutcome::Insufficient);
            }
        }

        // Format: final reader-facing rewrite
        let mut variables = self.base_variables();
        variables.insert("question".to_string(), state.question.clone());
        variables.insert("draft".to_string(), state.draft.clone());

        state.draft = self.call_stage(StageTemplate::Format, &variables).await?;
        tracing::debug!(stage = "format", output = %state.draft);

        if state.is_sentinel() {
            return Ok(RefinementOutcome::Insufficient);
        }

        // NormalizeLanguage: match the original question's dominant language
        if self.normalize_language {
            let mut variables = self.base_variables();
            variables.insert("question".to_string(), original_question.to_string());
            variables.insert("draft".to_string(), state.draft.clone());

            state.draft = self
                .call_stage(StageTemplate::LanguageNormalize, &variables)
                .await?;
            tracing::debug!(stage = "language_normalize", output = %state.draft);
        }

        Ok(RefinementOutcome::Answer(state.draft))
    }

    fn base_variables(&self) -> HashMap<String, String> {
        let mut variables = HashMap::new();
        variables.insert("sentinel".to_string(), SENTINEL.to_string());
        variables.insert(
            "working_language".to_string(),
            self.working_language.clone(),
        );
        variables
    }

    async fn call_stage(
        &self,
        stage: StageTemplate,
        variables: &HashMap<String, String>,
    ) -> AppResult<String> {
        let prompt = self.prompts.render(stage, variables)?;

        let request = LlmRequest::new(prompt, &self.model)
            .with_temperature(STAGE_TEMPERATURE)
            .with_max_tokens(STAGE_MAX_TOKENS);

        let response = self.llm.complete(&request).await?;
        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use medrag_core::{AppError, AppResult};
    use medrag_llm::{LlmResponse, LlmUsage};
    use std::sync::Mutex;

    /// Scripted LLM: pops canned responses in order, records every prompt.
    pub(crate) struct ScriptedLlm {
        responses: Mutex<Vec<Result<String, String>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        pub fn new(responses: Vec<Result<&str, &str>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(String::from).map_err(String::from))
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.prompts.lock().unwrap().push(request.prompt.clone());

            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(AppError::Llm("script exhausted".to_string()));
            }
            match responses.remove(0) {
                Ok(content) => Ok(LlmResponse {
                    content,
                    model: request.model.clone(),
                    usage: LlmUsage::default(),
                }),
                Err(message) => Err(AppError::Llm(message)),
            }
        }
    }

    fn pipeline(llm: Arc<ScriptedLlm>, normalize: bool) -> RefinementPipeline {
        RefinementPipeline::new(
            llm,
            PromptSet::builtin().unwrap(),
            "test-model",
            "English",
            normalize,
        )
    }

    #[tokio::test]
    async fn test_full_chain_produces_answer() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("O negative can donate to anyone."),
            Ok("O negative can donate to anyone, per the context."),
            Ok("O negative can usually donate to anyone."),
            Ok("Hello! O negative (a blood type) can usually donate to anyone."),
            Ok("Hello! O negative (a blood type) can usually donate to anyone."),
        ]));

        let outcome = pipeline(llm.clone(), true)
            .refine(
                "What blood types can donate to anyone?",
                "What blood types can donate to anyone?",
                "O negative is the universal donor type.",
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RefinementOutcome::Answer(
                "Hello! O negative (a blood type) can usually donate to anyone.".to_string()
            )
        );
        // draft, verify, moderate, format, normalize
        assert_eq!(llm.calls(), 5);
    }

    #[tokio::test]
    async fn test_draft_sentinel_short_circuits() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok("Not enough information")]));

        let outcome = pipeline(llm.clone(), true)
            .refine("asdkfjk", "asdkfjk", "unrelated context")
            .await
            .unwrap();

        assert_eq!(outcome, RefinementOutcome::Insufficient);
        // Only the draft stage ran; verify/moderate/format were skipped
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_verify_sentinel_short_circuits() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("A speculative answer."),
            Ok("Not enough information."),
        ]));

        let outcome = pipeline(llm.clone(), true)
            .refine("question", "question", "context")
            .await
            .unwrap();

        assert_eq!(outcome, RefinementOutcome::Insufficient);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_stage_failure_aborts_chain() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("A fine draft."),
            Err("model timed out"),
        ]));

        let result = pipeline(llm.clone(), true)
            .refine("question", "question", "context")
            .await;

        assert!(result.is_err());
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_normalize_stage_sees_original_question() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("draft"),
            Ok("verified"),
            Ok("moderated"),
            Ok("formatted"),
            Ok("jibu la Kiswahili"),
        ]));

        let outcome = pipeline(llm.clone(), true)
            .refine(
                "Which blood types donate to anyone?",
                "Aina gani za damu zinaweza kutolewa kwa mtu yeyote?",
                "context",
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RefinementOutcome::Answer("jibu la Kiswahili".to_string())
        );

        let prompts = llm.prompts.lock().unwrap();
        // The terminal stage matches against the inbound question, not the
        // working-language one
        assert!(prompts[4].contains("Aina gani za damu"));
        assert!(!prompts[4].contains("Which blood types donate to anyone?"));
    }

    #[tokio::test]
    async fn test_normalize_disabled_returns_format_output() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("draft"),
            Ok("verified"),
            Ok("moderated"),
            Ok("formatted"),
        ]));

        let outcome = pipeline(llm.clone(), false)
            .refine("question", "question", "context")
            .await
            .unwrap();

        assert_eq!(outcome, RefinementOutcome::Answer("formatted".to_string()));
        assert_eq!(llm.calls(), 4);
    }

    #[tokio::test]
    async fn test_translate_question() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok("Can I donate blood?")]));

        let translated = pipeline(llm.clone(), true)
            .translate_question("Naweza kutoa damu?")
            .await
            .unwrap();

        assert_eq!(translated, "Can I donate blood?");
        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("Naweza kutoa damu?"));
        assert!(prompts[0].contains("English"));
    }
}
