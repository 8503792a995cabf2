//! Credential resolution: picks the effective API key and base URL for a call.
//!
//! Priority for the key: session-supplied value, then the system default, then nothing.
//! A missing key is a configuration error raised before any network call.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Returns the user key trimmed if non-empty, else the system key if present, else `None`.
pub fn resolve(user_key: Option<&str>, system_key: Option<&str>) -> Option<String> {
    non_blank(user_key).or_else(|| non_blank(system_key))
}

/// Returns the user base URL trimmed if non-empty, else the configured default.
pub fn resolve_base_url(user_url: Option<&str>, default_url: &str) -> String {
    non_blank(user_url).unwrap_or_else(|| default_url.to_string())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// The fixed set of models offered to sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "deepseek-chat")]
    DeepseekChat,
    #[serde(rename = "deepseek-coder")]
    DeepseekCoder,
}

impl ModelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::DeepseekChat => "deepseek-chat",
            ModelId::DeepseekCoder => "deepseek-coder",
        }
    }
}

/// Server-wide fallbacks, taken from `Config`.
#[derive(Clone)]
pub struct CredentialDefaults {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// What a session has entered. Lives outside the wizard and survives its restart.
#[derive(Clone, Default, Deserialize)]
pub struct CredentialInputs {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: ModelId,
}

impl std::fmt::Debug for CredentialInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialInputs")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Credentials ready to hand to the completion gateway.
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub api_key: String,
    pub base_url: String,
    pub model: ModelId,
}

impl std::fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    User,
    System,
    None,
}

/// Safe-to-display view of a session's credential configuration.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialStatus {
    pub configured: bool,
    pub source: KeySource,
    pub masked_key: Option<String>,
    pub base_url: String,
    pub model: ModelId,
}

impl CredentialInputs {
    pub fn resolve(&self, defaults: &CredentialDefaults) -> Result<ResolvedCredentials, AppError> {
        let api_key = resolve(self.api_key.as_deref(), defaults.api_key.as_deref()).ok_or_else(
            || {
                AppError::Configuration(
                    "No API key configured: enter an API key or configure a system default key"
                        .to_string(),
                )
            },
        )?;

        Ok(ResolvedCredentials {
            api_key,
            base_url: resolve_base_url(self.base_url.as_deref(), &defaults.base_url),
            model: self.model,
        })
    }

    pub fn status(&self, defaults: &CredentialDefaults) -> CredentialStatus {
        let user_key = non_blank(self.api_key.as_deref());
        let (source, masked_key) = match (&user_key, non_blank(defaults.api_key.as_deref())) {
            (Some(key), _) => (KeySource::User, Some(mask_key(key))),
            (None, Some(_)) => (KeySource::System, None),
            (None, None) => (KeySource::None, None),
        };

        CredentialStatus {
            configured: source != KeySource::None,
            source,
            masked_key,
            base_url: resolve_base_url(self.base_url.as_deref(), &defaults.base_url),
            model: self.model,
        }
    }
}

/// First 10 and last 4 characters of a key. Keys too short to hide anything are fully masked.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 14 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults(system_key: Option<&str>) -> CredentialDefaults {
        CredentialDefaults {
            api_key: system_key.map(String::from),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[test]
    fn test_user_key_wins_and_is_trimmed() {
        assert_eq!(
            resolve(Some("  sk-user  "), Some("sk-system")),
            Some("sk-user".to_string())
        );
    }

    #[test]
    fn test_blank_user_key_falls_back_to_system() {
        assert_eq!(resolve(Some("   "), Some("sk-system")), Some("sk-system".to_string()));
        assert_eq!(resolve(None, Some("sk-system")), Some("sk-system".to_string()));
    }

    #[test]
    fn test_no_key_anywhere_is_none() {
        assert_eq!(resolve(None, None), None);
        assert_eq!(resolve(Some(""), None), None);
        assert_eq!(resolve(Some(" "), Some(" ")), None);
    }

    #[test]
    fn test_base_url_defaults_when_blank() {
        assert_eq!(resolve_base_url(Some(" "), DEFAULT_BASE_URL), DEFAULT_BASE_URL);
        assert_eq!(
            resolve_base_url(Some(" https://llm.example.org/v1 "), DEFAULT_BASE_URL),
            "https://llm.example.org/v1"
        );
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let inputs = CredentialInputs::default();
        let err = inputs.resolve(&defaults(None)).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_status_masks_user_key() {
        let inputs = CredentialInputs {
            api_key: Some("sk-1234567890abcdefWXYZ".to_string()),
            ..Default::default()
        };
        let status = inputs.status(&defaults(Some("sk-system")));
        assert_eq!(status.source, KeySource::User);
        assert_eq!(status.masked_key.as_deref(), Some("sk-1234567...WXYZ"));
        assert!(status.configured);
    }

    #[test]
    fn test_status_reports_system_and_none() {
        let inputs = CredentialInputs::default();
        assert_eq!(inputs.status(&defaults(Some("sk-system"))).source, KeySource::System);
        let none = inputs.status(&defaults(None));
        assert_eq!(none.source, KeySource::None);
        assert!(!none.configured);
    }

    #[test]
    fn test_short_key_fully_masked() {
        assert_eq!(mask_key("sk-short"), "********");
    }

    #[test]
    fn test_model_ids_round_trip_wire_names() {
        let model: ModelId = serde_json::from_str("\"deepseek-coder\"").unwrap();
        assert_eq!(model, ModelId::DeepseekCoder);
        assert_eq!(model.as_str(), "deepseek-coder");
        assert!(serde_json::from_str::<ModelId>("\"gpt-4o\"").is_err());
    }
}
