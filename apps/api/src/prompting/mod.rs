//! Prompt Template Engine: maps a `PromptRequest` to the (system, user) prompt pair.
//!
//! Pure and deterministic: no I/O, no session access, no randomness. Every mode owns a
//! fixed template in its feature's `prompts.rs`; option enums pick sub-templates by
//! exhaustive match. Variation in results comes only from the gateway's temperature.

use serde::Serialize;

use crate::errors::AppError;
use crate::llm_client::SamplingProfile;
use crate::polish::options::{PolishStyle, TextType};
use crate::polish::prompts as polish_prompts;
use crate::reader::prompts as reader_prompts;
use crate::review::prompts as review_prompts;
use crate::review::tone::ToneLevel;
use crate::wizard::models::{Hypothesis, Route};
use crate::wizard::prompts as wizard_prompts;

/// Which proposal-wizard generation is being requested.
#[derive(Debug, Clone, PartialEq)]
pub enum ProposalStep {
    /// Step 1: three hypotheses from the idea in `draft_text`.
    Hypotheses,
    /// Step 2: two methodology routes for the selected hypothesis.
    Methodology { hypothesis: Hypothesis },
    /// Step 3: the full Markdown proposal.
    FinalDocument { hypothesis: Hypothesis, route: Route },
}

/// Prompt behaviour for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    StandardPolish {
        text_type: TextType,
        style: PolishStyle,
    },
    Humanize,
    /// Reference text travels in `PromptRequest::auxiliary_text`.
    StyleMimic,
    /// Reviewer comment in `draft_text`, raw thoughts in `auxiliary_text`.
    ReviewerResponse { tone: ToneLevel },
    /// Document text in `draft_text`.
    DocumentSummary,
    /// Document text in `draft_text`, question in `auxiliary_text`.
    DocumentQuestion,
    ProposalStep(ProposalStep),
}

impl Mode {
    /// Default sampling and the max_tokens ceiling for this mode.
    pub fn sampling_profile(&self) -> SamplingProfile {
        match self {
            Mode::StandardPolish { .. } => SamplingProfile::new(0.3, 3000, 4000),
            Mode::Humanize | Mode::StyleMimic => SamplingProfile::new(0.5, 3000, 4000),
            Mode::ReviewerResponse { .. } => SamplingProfile::new(0.4, 1500, 2000),
            Mode::DocumentSummary => SamplingProfile::new(0.3, 2000, 4000),
            Mode::DocumentQuestion => SamplingProfile::new(0.3, 1500, 4000),
            Mode::ProposalStep(ProposalStep::Hypotheses) => SamplingProfile::new(0.7, 2000, 4000),
            Mode::ProposalStep(ProposalStep::Methodology { .. }) => {
                SamplingProfile::new(0.5, 2500, 4000)
            }
            Mode::ProposalStep(ProposalStep::FinalDocument { .. }) => {
                SamplingProfile::new(0.4, 4000, 4000)
            }
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::StandardPolish { .. } => "standard_polish",
            Mode::Humanize => "humanize",
            Mode::StyleMimic => "style_mimic",
            Mode::ReviewerResponse { .. } => "reviewer_response",
            Mode::DocumentSummary => "document_summary",
            Mode::DocumentQuestion => "document_question",
            Mode::ProposalStep(ProposalStep::Hypotheses) => "proposal_hypotheses",
            Mode::ProposalStep(ProposalStep::Methodology { .. }) => "proposal_methodology",
            Mode::ProposalStep(ProposalStep::FinalDocument { .. }) => "proposal_document",
        }
    }
}

/// Everything the engine needs for one invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub mode: Mode,
    pub draft_text: String,
    pub auxiliary_text: Option<String>,
}

/// The exact prompts sent to the model. Returned to clients for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompts {
    pub system: String,
    pub user: String,
}

impl PromptRequest {
    pub fn new(mode: Mode, draft_text: impl Into<String>) -> Self {
        Self {
            mode,
            draft_text: draft_text.into(),
            auxiliary_text: None,
        }
    }

    pub fn with_auxiliary(mut self, auxiliary_text: impl Into<String>) -> Self {
        self.auxiliary_text = Some(auxiliary_text.into());
        self
    }

    fn auxiliary(&self) -> &str {
        self.auxiliary_text.as_deref().unwrap_or_default()
    }

    /// Checks the per-mode input requirements. Runs before credentials or network.
    pub fn validate(&self) -> Result<(), AppError> {
        let draft_blank = self.draft_text.trim().is_empty();
        let auxiliary_blank = self.auxiliary().trim().is_empty();

        let problem = match &self.mode {
            Mode::ReviewerResponse { .. } if draft_blank || auxiliary_blank => {
                Some("reviewer_comment and raw_thoughts are both required")
            }
            Mode::DocumentSummary | Mode::DocumentQuestion if draft_blank => {
                Some("document text is empty")
            }
            Mode::ProposalStep(_) if draft_blank => Some("idea cannot be empty"),
            _ if draft_blank => Some("draft_text cannot be empty"),
            Mode::StyleMimic if auxiliary_blank => {
                Some("style mimic requires a non-empty reference_text")
            }
            Mode::DocumentQuestion if auxiliary_blank => Some("question cannot be empty"),
            _ => None,
        };

        match problem {
            Some(msg) => Err(AppError::Validation(msg.to_string())),
            None => Ok(()),
        }
    }
}

/// Builds the (system, user) prompts for a request.
pub fn build_prompts(request: &PromptRequest) -> Prompts {
    let draft = request.draft_text.as_str();
    let auxiliary = request.auxiliary();

    let (system, user) = match &request.mode {
        Mode::StandardPolish { text_type, style } => (
            polish_prompts::standard_system(*text_type, *style),
            polish_prompts::standard_user(*text_type, *style, draft),
        ),
        Mode::Humanize => (
            polish_prompts::HUMANIZE_SYSTEM.to_string(),
            polish_prompts::humanize_user(draft),
        ),
        Mode::StyleMimic => (
            polish_prompts::STYLE_MIMIC_SYSTEM.to_string(),
            polish_prompts::style_mimic_user(auxiliary, draft),
        ),
        Mode::ReviewerResponse { tone } => (
            review_prompts::system_prompt(*tone),
            review_prompts::user_prompt(draft, auxiliary, *tone),
        ),
        Mode::DocumentSummary => (
            reader_prompts::SUMMARY_SYSTEM.to_string(),
            reader_prompts::summary_user(draft),
        ),
        Mode::DocumentQuestion => (
            reader_prompts::QUESTION_SYSTEM.to_string(),
            reader_prompts::question_user(draft, auxiliary),
        ),
        Mode::ProposalStep(ProposalStep::Hypotheses) => (
            wizard_prompts::structured_system(wizard_prompts::HYPOTHESES_SYSTEM),
            wizard_prompts::hypotheses_user(draft),
        ),
        Mode::ProposalStep(ProposalStep::Methodology { hypothesis }) => (
            wizard_prompts::structured_system(wizard_prompts::METHODOLOGY_SYSTEM),
            wizard_prompts::methodology_user(hypothesis),
        ),
        Mode::ProposalStep(ProposalStep::FinalDocument { hypothesis, route }) => (
            wizard_prompts::FINAL_DOCUMENT_SYSTEM.to_string(),
            wizard_prompts::final_document_user(hypothesis, route),
        ),
    };

    Prompts { system, user }
}
