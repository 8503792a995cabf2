// All LLM prompt constants for the Text Polisher.
// Templates use `{name}` placeholders filled by `llm_client::prompts::render`.

use crate::llm_client::prompts::render;
use crate::polish::options::{PolishStyle, TextType};

/// Persona shared by every standard-polish system prompt.
pub const STANDARD_BASE: &str = "You are an expert academic editor and writing consultant.";

/// Replace: {base}, {task}, {style}
const STANDARD_SYSTEM_TEMPLATE: &str =
    "{base} Please {task}. {style}. Return only the polished text without explanations.";

/// Replace: {text_type}, {style}, {draft_text}
const STANDARD_USER_TEMPLATE: &str = "Text Type: {text_type}
Target Style: {style}

Text to polish:
{draft_text}";

pub const HUMANIZE_SYSTEM: &str = "You are an expert at humanizing AI-generated text. \
Your task is to make text sound more naturally written by humans.

Increase burstiness and perplexity. Avoid clichéd AI words like 'delve', 'realm', 'underscore', 'paramount'.
Use a mix of short, punchy sentences and complex clauses to mimic human writing rhythm.
Vary sentence length and structure. Include natural-sounding transitions and occasional rhetorical devices.
Remove overly formal or stilted language that sounds artificial. \
Rewrite the given text to sound naturally human-written, maintaining the original meaning and academic content. \
Return only the rewritten text.";

/// Replace: {draft_text}
const HUMANIZE_USER_TEMPLATE: &str =
    "Please humanize this academic text to remove any AI-like patterns:\n{draft_text}";

pub const STYLE_MIMIC_SYSTEM: &str =
    "You are a linguistic expert skilled at analyzing and mimicking writing styles.

Your task is to carefully analyze the writing style, tone, vocabulary choices, sentence structure, \
and rhetorical devices in a reference text, then rewrite a draft text to match that style exactly. \
Analyze the writing style of the reference text and rewrite the draft text to match that style precisely, \
without changing the core meaning. Return only the rewritten text.";

/// Replace: {reference_text}, {draft_text}
const STYLE_MIMIC_USER_TEMPLATE: &str = "REFERENCE TEXT (analyze this style):
{reference_text}

DRAFT TEXT (rewrite in reference style):
{draft_text}";

pub fn standard_system(text_type: TextType, style: PolishStyle) -> String {
    render(
        STANDARD_SYSTEM_TEMPLATE,
        &[
            ("base", STANDARD_BASE),
            ("task", text_type.task_instruction()),
            ("style", style.style_instruction()),
        ],
    )
}

pub fn standard_user(text_type: TextType, style: PolishStyle, draft_text: &str) -> String {
    render(
        STANDARD_USER_TEMPLATE,
        &[
            ("text_type", text_type.label()),
            ("style", style.label()),
            ("draft_text", draft_text),
        ],
    )
}

pub fn humanize_user(draft_text: &str) -> String {
    render(HUMANIZE_USER_TEMPLATE, &[("draft_text", draft_text)])
}

pub fn style_mimic_user(reference_text: &str, draft_text: &str) -> String {
    render(
        STYLE_MIMIC_USER_TEMPLATE,
        &[("reference_text", reference_text), ("draft_text", draft_text)],
    )
}
