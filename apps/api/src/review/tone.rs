//! Tone strategy: the three reply attitudes offered for reviewer responses.
//!
//! Levels are ordered from most to least accommodating. Each level owns a fixed
//! instruction block; there is no fallback for an unknown level.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ToneLevel {
    AcceptAndThank,
    #[default]
    ClarifyAndExplain,
    RespectfullyDisagree,
}

impl ToneLevel {
    pub const ALL: [ToneLevel; 3] = [
        ToneLevel::AcceptAndThank,
        ToneLevel::ClarifyAndExplain,
        ToneLevel::RespectfullyDisagree,
    ];

    pub fn level(&self) -> u8 {
        match self {
            ToneLevel::AcceptAndThank => 1,
            ToneLevel::ClarifyAndExplain => 2,
            ToneLevel::RespectfullyDisagree => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ToneLevel::AcceptAndThank => "全盘接受 (Accept & Thank)",
            ToneLevel::ClarifyAndExplain => "解释说明 (Clarify & Explain)",
            ToneLevel::RespectfullyDisagree => "礼貌回怼 (Respectfully Disagree)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToneLevel::AcceptAndThank => "完全接受审稿人意见，表示感谢并愿意修改",
            ToneLevel::ClarifyAndExplain => "礼貌地解释可能存在的误会，提供更多上下文信息",
            ToneLevel::RespectfullyDisagree => "尊重地表达不同意见，提供充分的理由和证据",
        }
    }

    /// Strategy block inserted into the reviewer-response system prompt.
    pub fn instructions(&self) -> &'static str {
        match self {
            ToneLevel::AcceptAndThank => {
                "Tone Strategy: Accept & Thank (完全接受)
- Express gratitude for the reviewer's valuable suggestion
- Accept the feedback positively and constructively
- Show willingness to make improvements
- Use phrases like: \"We thank the reviewer for this insightful suggestion...\", \"We agree that...\", \"We have revised...\""
            }
            ToneLevel::ClarifyAndExplain => {
                "Tone Strategy: Clarify & Explain (解释说明)
- Acknowledge the reviewer's concern respectfully
- Provide additional context or clarification if needed
- Explain the reasoning behind current approach
- Use balanced phrases like: \"We appreciate the reviewer's concern...\", \"We would like to clarify that...\", \"The rationale is...\""
            }
            ToneLevel::RespectfullyDisagree => {
                "Tone Strategy: Respectfully Disagree (礼貌回怼)
- Respect the reviewer's perspective while maintaining your position
- Provide strong evidence and logical reasoning
- Cite literature or established methodology when appropriate
- Use confident but respectful language: \"While we understand the reviewer's concern...\", \"However, based on our findings...\", \"Current literature supports...\""
            }
        }
    }
}

impl TryFrom<u8> for ToneLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ToneLevel::AcceptAndThank),
            2 => Ok(ToneLevel::ClarifyAndExplain),
            3 => Ok(ToneLevel::RespectfullyDisagree),
            other => Err(format!("tone level must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<ToneLevel> for u8 {
    fn from(tone: ToneLevel) -> Self {
        tone.level()
    }
}
