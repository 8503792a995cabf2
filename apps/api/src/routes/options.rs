use axum::Json;
use serde::Serialize;

use crate::credentials::ModelId;
use crate::polish::options::{PolishStyle, TextType};
use crate::review::tone::ToneLevel;

#[derive(Serialize)]
pub struct OptionEntry {
    pub key: &'static str,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct ToneEntry {
    pub level: u8,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct OptionsResponse {
    pub text_types: Vec<OptionEntry>,
    pub styles: Vec<OptionEntry>,
    pub tones: Vec<ToneEntry>,
    pub models: Vec<&'static str>,
}

/// GET /api/v1/options
/// The closed option sets clients may send.
pub async fn options_handler() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        text_types: TextType::ALL
            .iter()
            .map(|t| OptionEntry {
                key: t.key(),
                label: t.label(),
            })
            .collect(),
        styles: PolishStyle::ALL
            .iter()
            .map(|s| OptionEntry {
                key: s.key(),
                label: s.label(),
            })
            .collect(),
        tones: ToneLevel::ALL
            .iter()
            .map(|t| ToneEntry {
                level: t.level(),
                title: t.title(),
                description: t.description(),
            })
            .collect(),
        models: [ModelId::DeepseekChat, ModelId::DeepseekCoder]
            .iter()
            .map(ModelId::as_str)
            .collect(),
    })
}
