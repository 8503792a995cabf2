//! Proposal Wizard state machine: Idea → Methodology → Export, strictly linear.
//!
//! # Transition rules
//! - Forward moves are gated: Idea needs a selected hypothesis, Methodology needs routes.
//! - Selecting a hypothesis jumps to Methodology immediately.
//! - Backward moves are always allowed and clear nothing.
//! - Restart is only offered at Export and clears every artifact; credentials live
//!   on the session, not here, and are untouched.
//!
//! Generation is split into `*_request` (builds the prompt request, no mutation) and
//! `apply_*` (parses and stores the reply). A failed completion therefore never
//! touches wizard state, and a reply that fails to parse changes nothing either.
//!
//! The Export step uses the route chosen at Export time, falling back to the first
//! route, and ignores the Methodology-step choice.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::errors::AppError;
use crate::prompting::{Mode, PromptRequest, ProposalStep};
use crate::wizard::models::{parse_hypotheses, parse_routes, Hypothesis, Route, StructuredReplyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Idea,
    Methodology,
    Export,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Idea => 1,
            WizardStep::Methodology => 2,
            WizardStep::Export => 3,
        }
    }

    fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Idea => Some(WizardStep::Methodology),
            WizardStep::Methodology => Some(WizardStep::Export),
            WizardStep::Export => None,
        }
    }

    fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Idea => None,
            WizardStep::Methodology => Some(WizardStep::Idea),
            WizardStep::Export => Some(WizardStep::Methodology),
        }
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("this action belongs to step {expected}, but the wizard is at step {actual}")]
    WrongStep { expected: u8, actual: u8 },

    #[error("select a hypothesis before continuing")]
    NoHypothesisSelected,

    #[error("generate the methodology routes before continuing")]
    NoMethodology,

    #[error("already at the first step")]
    AtFirstStep,

    #[error("already at the last step")]
    AtLastStep,

    #[error("restart is only available at the export step")]
    RestartNotAvailable,

    #[error("idea cannot be empty")]
    EmptyIdea,

    #[error("hypothesis {0} does not exist")]
    UnknownHypothesis(u32),

    #[error("route '{0}' does not exist")]
    UnknownRoute(String),

    #[error("{source}")]
    Parse {
        source: StructuredReplyError,
        raw: String,
    },
}

impl From<WizardError> for AppError {
    fn from(e: WizardError) -> Self {
        match e {
            WizardError::EmptyIdea => AppError::Validation(e.to_string()),
            WizardError::UnknownHypothesis(_) | WizardError::UnknownRoute(_) => {
                AppError::NotFound(e.to_string())
            }
            WizardError::Parse { source, raw } => AppError::Parse {
                message: format!("AI reply could not be parsed, please retry: {source}"),
                raw,
            },
            WizardError::WrongStep { .. }
            | WizardError::NoHypothesisSelected
            | WizardError::NoMethodology
            | WizardError::AtFirstStep
            | WizardError::AtLastStep
            | WizardError::RestartNotAvailable => AppError::Conflict(e.to_string()),
        }
    }
}

/// All wizard data for one session.
#[derive(Debug, Clone, Serialize)]
pub struct WizardState {
    step: WizardStep,
    idea: String,
    hypotheses: Vec<Hypothesis>,
    selected_hypothesis: Option<u32>,
    methodology_routes: Vec<Route>,
    selected_route_type: Option<String>,
    final_document: Option<String>,
    started_at: DateTime<Utc>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Idea,
            idea: String::new(),
            hypotheses: Vec::new(),
            selected_hypothesis: None,
            methodology_routes: Vec::new(),
            selected_route_type: None,
            final_document: None,
            started_at: Utc::now(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn hypotheses(&self) -> &[Hypothesis] {
        &self.hypotheses
    }

    pub fn routes(&self) -> &[Route] {
        &self.methodology_routes
    }

    pub fn selected_route_type(&self) -> Option<&str> {
        self.selected_route_type.as_deref()
    }

    pub fn final_document(&self) -> Option<&str> {
        self.final_document.as_deref()
    }

    pub fn selected_hypothesis(&self) -> Option<&Hypothesis> {
        let id = self.selected_hypothesis?;
        self.hypotheses.iter().find(|h| h.id == id)
    }

    fn require_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::WrongStep {
                expected: expected.number(),
                actual: self.step.number(),
            });
        }
        Ok(())
    }

    fn route(&self, route_type: &str) -> Result<&Route, WizardError> {
        self.methodology_routes
            .iter()
            .find(|r| r.route_type == route_type)
            .ok_or_else(|| WizardError::UnknownRoute(route_type.to_string()))
    }

    // ── Step 1: Idea ───────────────────────────────────────────────────────

    /// Builds the hypotheses request from the submitted idea. Nothing is recorded;
    /// the idea is only captured together with the hypotheses it produced.
    pub fn hypotheses_request(&self, idea: &str) -> Result<PromptRequest, WizardError> {
        self.require_step(WizardStep::Idea)?;
        let idea = non_blank_idea(idea)?;
        Ok(PromptRequest::new(
            Mode::ProposalStep(ProposalStep::Hypotheses),
            idea.to_string(),
        ))
    }

    /// Stores the idea and its fresh hypothesis set. Anything derived from the
    /// previous set is dropped. On any error the wizard is left untouched.
    pub fn apply_hypotheses_reply(
        &mut self,
        idea: &str,
        raw: &str,
    ) -> Result<&[Hypothesis], WizardError> {
        self.require_step(WizardStep::Idea)?;
        let idea = non_blank_idea(idea)?;
        let hypotheses = parse_hypotheses(raw).map_err(|source| WizardError::Parse {
            source,
            raw: raw.to_string(),
        })?;

        self.idea = idea.to_string();
        self.hypotheses = hypotheses;
        self.selected_hypothesis = None;
        self.clear_methodology();
        Ok(&self.hypotheses)
    }

    /// Selects a hypothesis and moves straight to Methodology.
    pub fn select_hypothesis(&mut self, id: u32) -> Result<(), WizardError> {
        self.require_step(WizardStep::Idea)?;
        if !self.hypotheses.iter().any(|h| h.id == id) {
            return Err(WizardError::UnknownHypothesis(id));
        }
        if self.selected_hypothesis != Some(id) {
            // Routes were designed for another hypothesis.
            self.clear_methodology();
        }
        self.selected_hypothesis = Some(id);
        self.step = WizardStep::Methodology;
        Ok(())
    }

    // ── Step 2: Methodology ────────────────────────────────────────────────

    pub fn methodology_request(&self) -> Result<PromptRequest, WizardError> {
        self.require_step(WizardStep::Methodology)?;
        let hypothesis = self
            .selected_hypothesis()
            .cloned()
            .ok_or(WizardError::NoHypothesisSelected)?;
        Ok(PromptRequest::new(
            Mode::ProposalStep(ProposalStep::Methodology { hypothesis }),
            self.idea.clone(),
        ))
    }

    pub fn apply_methodology_reply(&mut self, raw: &str) -> Result<&[Route], WizardError> {
        self.require_step(WizardStep::Methodology)?;
        let routes = parse_routes(raw).map_err(|source| WizardError::Parse {
            source,
            raw: raw.to_string(),
        })?;

        self.methodology_routes = routes;
        self.selected_route_type = None;
        self.final_document = None;
        Ok(&self.methodology_routes)
    }

    /// Records the Methodology-step route choice.
    pub fn select_route(&mut self, route_type: &str) -> Result<(), WizardError> {
        self.require_step(WizardStep::Methodology)?;
        self.route(route_type)?;
        self.selected_route_type = Some(route_type.to_string());
        Ok(())
    }

    /// Attaches (or with blank text, removes) the user's adjustment to a route.
    pub fn modify_route(&mut self, route_type: &str, modification: &str) -> Result<(), WizardError> {
        self.require_step(WizardStep::Methodology)?;
        let route = self
            .methodology_routes
            .iter_mut()
            .find(|r| r.route_type == route_type)
            .ok_or_else(|| WizardError::UnknownRoute(route_type.to_string()))?;
        let modification = modification.trim();
        route.user_modification = (!modification.is_empty()).then(|| modification.to_string());
        Ok(())
    }

    // ── Step 3: Export ─────────────────────────────────────────────────────

    /// Builds the final-document request for the route chosen now. Returns the
    /// route key alongside so `apply_final_document` can record it.
    pub fn final_document_request(
        &self,
        route_type: Option<&str>,
    ) -> Result<(PromptRequest, String), WizardError> {
        self.require_step(WizardStep::Export)?;
        let hypothesis = self
            .selected_hypothesis()
            .cloned()
            .ok_or(WizardError::NoHypothesisSelected)?;
        let route = match route_type {
            Some(route_type) => self.route(route_type)?,
            None => self
                .methodology_routes
                .first()
                .ok_or(WizardError::NoMethodology)?,
        }
        .clone();

        let key = route.route_type.clone();
        let request = PromptRequest::new(
            Mode::ProposalStep(ProposalStep::FinalDocument { hypothesis, route }),
            self.idea.clone(),
        );
        Ok((request, key))
    }

    pub fn apply_final_document(&mut self, route_type: &str, document: String) -> Result<(), WizardError> {
        self.require_step(WizardStep::Export)?;
        self.route(route_type)?;
        self.selected_route_type = Some(route_type.to_string());
        self.final_document = Some(document);
        Ok(())
    }

    // ── Navigation ─────────────────────────────────────────────────────────

    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let next = self.step.next().ok_or(WizardError::AtLastStep)?;
        match self.step {
            WizardStep::Idea if self.selected_hypothesis().is_none() => {
                return Err(WizardError::NoHypothesisSelected)
            }
            WizardStep::Methodology if self.methodology_routes.is_empty() => {
                return Err(WizardError::NoMethodology)
            }
            _ => {}
        }
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let previous = self.step.previous().ok_or(WizardError::AtFirstStep)?;
        self.step = previous;
        Ok(previous)
    }

    pub fn restart(&mut self) -> Result<(), WizardError> {
        if self.step != WizardStep::Export {
            return Err(WizardError::RestartNotAvailable);
        }
        self.reset();
        Ok(())
    }

    /// Unconditional reset, used when the whole session is reset.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn clear_methodology(&mut self) {
        self.methodology_routes.clear();
        self.selected_route_type = None;
        self.final_document = None;
    }
}

fn non_blank_idea(idea: &str) -> Result<&str, WizardError> {
    let idea = idea.trim();
    if idea.is_empty() {
        return Err(WizardError::EmptyIdea);
    }
    Ok(idea)
}
