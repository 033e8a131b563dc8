//! Prompt template identifiers.

/// The pipeline's prompt templates, one per language-model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageTemplate {
    /// Translate the inbound question to the working language
    QuestionTranslate,

    /// First-pass answer from context only
    Draft,

    /// Strict grounding re-check of the draft
    Verify,

    /// Soften absolutes, cautious tone
    Moderate,

    /// Final reader-facing rewrite
    Format,

    /// Match the answer language to the question language
    LanguageNormalize,
}

impl StageTemplate {
    /// All templates, in pipeline order.
    pub const ALL: [StageTemplate; 6] = [
        StageTemplate::QuestionTranslate,
        StageTemplate::Draft,
        StageTemplate::Verify,
        StageTemplate::Moderate,
        StageTemplate::Format,
        StageTemplate::LanguageNormalize,
    ];

    /// Template name; also the override file stem (`<name>.hbs`).
    pub fn name(&self) -> &'static str {
        match self {
            StageTemplate::QuestionTranslate => "question_translate",
            StageTemplate::Draft => "draft",
            StageTemplate::Verify => "verify",
            StageTemplate::Moderate => "moderate",
            StageTemplate::Format => "format",
            StageTemplate::LanguageNormalize => "language_normalize",
        }
    }

    /// Look up a template by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}
