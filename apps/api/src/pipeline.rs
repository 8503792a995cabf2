//! The shared generation path used by every feature:
//! validate input → resolve sampling → resolve credentials → build prompts → one
//! completion call.
//!
//! Validation and credential errors are raised before any network call. A gateway
//! failure surfaces as `AppError::Llm`; callers record nothing in that case.

use serde::Serialize;
use tracing::info;

use crate::credentials::{CredentialDefaults, CredentialInputs};
use crate::errors::AppError;
use crate::llm_client::{CompletionGateway, Sampling, SamplingOverride};
use crate::prompting::{build_prompts, PromptRequest, Prompts};

/// A successful generation, with the exact prompts and sampling that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub text: String,
    pub prompts: Prompts,
    pub sampling: Sampling,
}

pub async fn generate(
    gateway: &dyn CompletionGateway,
    defaults: &CredentialDefaults,
    credentials: &CredentialInputs,
    request: &PromptRequest,
    overrides: Option<&SamplingOverride>,
) -> Result<Generation, AppError> {
    request.validate()?;
    let sampling = request.mode.sampling_profile().resolve(overrides)?;
    let resolved = credentials.resolve(defaults)?;
    let prompts = build_prompts(request);

    info!(
        "Generating {} with {} (system {} chars, user {} chars, max_tokens {})",
        request.mode.name(),
        resolved.model.as_str(),
        prompts.system.chars().count(),
        prompts.user.chars().count(),
        sampling.max_tokens
    );

    let text = gateway
        .complete(&resolved, &prompts.system, &prompts.user, sampling)
        .await
        .into_text()?;

    Ok(Generation {
        text,
        prompts,
        sampling,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::CompletionResult;
    use crate::prompting::Mode;
    use crate::test_support::ScriptedGateway;

    fn defaults(key: Option<&str>) -> CredentialDefaults {
        CredentialDefaults {
            api_key: key.map(String::from),
            base_url: "https://api.deepseek.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_returns_text_and_prompts() {
        let gateway = ScriptedGateway::replying(["Polished text."]);
        let request = PromptRequest::new(Mode::Humanize, "We delve into the realm.");

        let generation = generate(
            &gateway,
            &defaults(Some("sk-system")),
            &CredentialInputs::default(),
            &request,
            None,
        )
        .await
        .unwrap();

        assert_eq!(generation.text, "Polished text.");
        assert!(generation.prompts.user.contains("We delve into the realm."));
        assert_eq!(generation.sampling.temperature, 0.5);

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].api_key, "sk-system");
        assert_eq!(calls[0].system, generation.prompts.system);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let gateway = ScriptedGateway::replying(["unused"]);
        let request = PromptRequest::new(Mode::Humanize, "draft");

        let err = generate(
            &gateway,
            &defaults(None),
            &CredentialInputs::default(),
            &request,
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Configuration(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_draft_fails_before_network() {
        let gateway = ScriptedGateway::replying(["unused"]);
        let request = PromptRequest::new(Mode::Humanize, " \n ");
        let err = generate(
            &gateway,
            &defaults(Some("sk-system")),
            &CredentialInputs::default(),
            &request,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_override_rejected() {
        let gateway = ScriptedGateway::replying(["unused"]);
        let request = PromptRequest::new(Mode::Humanize, "draft");
        let overrides = SamplingOverride {
            temperature: Some(1.5),
            max_tokens: None,
        };
        let err = generate(
            &gateway,
            &defaults(Some("sk-system")),
            &CredentialInputs::default(),
            &request,
            Some(&overrides),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_gateway_failure_becomes_llm_error() {
        let gateway = ScriptedGateway::new([CompletionResult::Failure {
            reason: "API error (status 401): invalid key".to_string(),
        }]);
        let request = PromptRequest::new(Mode::Humanize, "draft");
        let err = generate(
            &gateway,
            &defaults(Some("sk-system")),
            &CredentialInputs::default(),
            &request,
            None,
        )
        .await
        .unwrap_err();
        match err {
            AppError::Llm(reason) => assert!(reason.contains("invalid key")),
            other => panic!("expected LLM error, got {other:?}"),
        }
    }
}
