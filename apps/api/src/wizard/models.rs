//! Structured reply schemas for the proposal wizard.
//!
//! Hypotheses and routes arrive as JSON from the completion gateway. Parsing is strict
//! about shape and count: a reply that does not match is a `StructuredReplyError`,
//! and the wizard keeps the raw text for diagnosis.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::parse_json_reply;

pub const HYPOTHESIS_COUNT: usize = 3;
pub const ROUTE_COUNT: usize = 2;

/// A candidate research hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: u32,
    #[serde(rename = "hypothesis")]
    pub statement: String,
    pub innovation: String,
    pub feasibility: String,
}

/// A methodology route. `route_type` is the key used to select it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "type")]
    pub route_type: String,
    pub description: String,
    pub advantages: String,
    pub limitations: String,
    #[serde(rename = "estimated_cost")]
    pub cost: String,
    pub timeline: String,
    /// User's adjustments, attached during the methodology step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_modification: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HypothesisReply {
    hypotheses: Vec<Hypothesis>,
}

#[derive(Debug, Deserialize)]
struct RouteReply {
    routes: Vec<Route>,
}

#[derive(Debug, Error)]
pub enum StructuredReplyError {
    #[error("reply is not valid JSON for the expected schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected} {what}, got {actual}")]
    WrongCount {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate {what} key '{key}'")]
    DuplicateKey { what: &'static str, key: String },

    #[error("{what} '{key}' has an empty field")]
    EmptyField { what: &'static str, key: String },
}

/// Parses exactly `HYPOTHESIS_COUNT` hypotheses with unique ids.
pub fn parse_hypotheses(raw: &str) -> Result<Vec<Hypothesis>, StructuredReplyError> {
    let reply: HypothesisReply = parse_json_reply(raw)?;
    let hypotheses = reply.hypotheses;
    check_count("hypotheses", HYPOTHESIS_COUNT, hypotheses.len())?;

    let mut seen = HashSet::new();
    for h in &hypotheses {
        let key = h.id.to_string();
        if !seen.insert(h.id) {
            return Err(StructuredReplyError::DuplicateKey {
                what: "hypothesis",
                key,
            });
        }
        if h.statement.trim().is_empty() {
            return Err(StructuredReplyError::EmptyField {
                what: "hypothesis",
                key,
            });
        }
    }
    Ok(hypotheses)
}

/// Parses exactly `ROUTE_COUNT` routes with unique, non-empty types.
pub fn parse_routes(raw: &str) -> Result<Vec<Route>, StructuredReplyError> {
    let reply: RouteReply = parse_json_reply(raw)?;
    let mut routes = reply.routes;
    check_count("routes", ROUTE_COUNT, routes.len())?;

    let mut seen = HashSet::new();
    for route in &mut routes {
        route.route_type = route.route_type.trim().to_string();
        // A model-supplied modification is not the user's; drop it.
        route.user_modification = None;
        if route.route_type.is_empty() || route.description.trim().is_empty() {
            return Err(StructuredReplyError::EmptyField {
                what: "route",
                key: route.route_type.clone(),
            });
        }
        if !seen.insert(route.route_type.clone()) {
            return Err(StructuredReplyError::DuplicateKey {
                what: "route",
                key: route.route_type.clone(),
            });
        }
    }
    Ok(routes)
}

fn check_count(what: &'static str, expected: usize, actual: usize) -> Result<(), StructuredReplyError> {
    if actual != expected {
        return Err(StructuredReplyError::WrongCount {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
