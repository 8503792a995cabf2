pub mod handlers;

use chrono::{DateTime, TimeZone};
use serde::de::value::{Error as DeError, StrDeserializer};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};

use crate::pipeline::Generation;

/// Timestamp format used in exported filenames.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Every downloadable artifact a session can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Polished,
    Humanized,
    StyleMimic,
    ReviewerResponse,
    DocumentSummary,
    ProposalMarkdown,
    ProposalText,
}

impl ArtifactKind {
    /// Parses the snake_case key used in export URLs.
    pub fn from_key(key: &str) -> Option<Self> {
        let key: StrDeserializer<'_, DeError> = key.into_deserializer();
        Self::deserialize(key).ok()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::ProposalMarkdown => "text/markdown; charset=utf-8",
            _ => "text/plain; charset=utf-8",
        }
    }

    /// (stem, extension) before any timestamp is applied.
    fn stem_and_extension(&self, document_filename: Option<&str>) -> (String, &'static str) {
        match self {
            Self::Polished => ("academic_text_polished".to_string(), "txt"),
            Self::Humanized => ("academic_text_humanized".to_string(), "txt"),
            Self::StyleMimic => ("academic_text_style_mimic".to_string(), "txt"),
            Self::ReviewerResponse => ("reviewer_response".to_string(), "txt"),
            Self::DocumentSummary => {
                let source = document_filename.unwrap_or("document");
                (format!("{source}_总结"), "txt")
            }
            Self::ProposalMarkdown | Self::ProposalText => {
                ("research_proposal".to_string(), self.extension())
            }
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::ProposalMarkdown => "md",
            _ => "txt",
        }
    }

    /// The plain-text proposal is always stamped.
    fn always_timestamped(&self) -> bool {
        matches!(self, Self::ProposalText)
    }

    /// Download filename. `document_filename` is only used by the summary.
    pub fn filename<Tz: TimeZone>(
        &self,
        document_filename: Option<&str>,
        timestamped: bool,
        now: &DateTime<Tz>,
    ) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let (stem, extension) = self.stem_and_extension(document_filename);
        if timestamped || self.always_timestamped() {
            format!("{stem}_{}.{extension}", now.format(TIMESTAMP_FORMAT))
        } else {
            format!("{stem}.{extension}")
        }
    }
}

/// Response body for operations that produce a downloadable artifact.
#[derive(Debug, Serialize)]
pub struct GeneratedArtifact {
    #[serde(flatten)]
    pub generation: Generation,
    pub artifact: ArtifactKind,
}

/// A ready-to-send download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub content_type: &'static str,
    pub content: String,
}

impl Export {
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            ascii_fallback(&self.filename),
            percent_encode(&self.filename)
        )
    }
}

/// Non-ASCII and quote characters replaced, for clients that ignore `filename*`.
fn ascii_fallback(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii() && c != '"' && c != '\\' { c } else { '_' })
        .collect()
}

/// RFC 5987 value encoding.
fn percent_encode(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for b in name.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
