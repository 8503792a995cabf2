// All LLM prompt constants for the Reviewer Response assistant.

use crate::llm_client::prompts::render;
use crate::review::tone::ToneLevel;

const REVIEW_BASE: &str = "You are an expert academic communications coach. \
Your goal is to help researchers write polite, professional, and convincing responses to reviewers.";

const STRUCTURE_GUIDE: &str = "Response Structure:
1. Acknowledgment: Start by thanking the reviewer
2. The Response: Address the specific point with academic reasoning
3. Action Taken: Describe what changes (if any) will be made

Input Format:
- Reviewer's comment
- Your raw thoughts/true feelings

Output Format:
A complete, professional response in formal academic English.";

/// Replace: {base}, {tone_instructions}, {structure}
const REVIEW_SYSTEM_TEMPLATE: &str = "{base}

{tone_instructions}

{structure}

Generate a complete, professional response based on the reviewer's comment and your raw thoughts.";

/// Replace: {reviewer_comment}, {raw_thoughts}, {tone_title}
const REVIEW_USER_TEMPLATE: &str = "REVIEWER'S COMMENT:
{reviewer_comment}

MY RAW THOUGHTS:
{raw_thoughts}

TONE STRATEGY: {tone_title}

Please generate a professional response following the structure above.";

pub fn system_prompt(tone: ToneLevel) -> String {
    render(
        REVIEW_SYSTEM_TEMPLATE,
        &[
            ("base", REVIEW_BASE),
            ("tone_instructions", tone.instructions()),
            ("structure", STRUCTURE_GUIDE),
        ],
    )
}

pub fn user_prompt(reviewer_comment: &str, raw_thoughts: &str, tone: ToneLevel) -> String {
    render(
        REVIEW_USER_TEMPLATE,
        &[
            ("reviewer_comment", reviewer_comment),
            ("raw_thoughts", raw_thoughts),
            ("tone_title", tone.title()),
        ],
    )
}
