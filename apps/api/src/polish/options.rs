//! Polish options: the enumerated text types and styles offered by the polisher.
//!
//! Each option is accepted on the wire either by its snake_case key or by the
//! Chinese label shown in the UI. Anything else fails deserialization, so an
//! unmatched label never reaches the prompt engine.

use serde::{Deserialize, Serialize};

/// Which part of a paper the draft comes from. Selects the task instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TextType {
    Abstract,
    BodyParagraph,
    Methods,
    ResultsDiscussion,
    Conclusion,
    #[default]
    Other,
}

impl TextType {
    pub const ALL: [TextType; 6] = [
        TextType::Abstract,
        TextType::BodyParagraph,
        TextType::Methods,
        TextType::ResultsDiscussion,
        TextType::Conclusion,
        TextType::Other,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TextType::Abstract => "abstract",
            TextType::BodyParagraph => "body_paragraph",
            TextType::Methods => "methods",
            TextType::ResultsDiscussion => "results_discussion",
            TextType::Conclusion => "conclusion",
            TextType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TextType::Abstract => "论文摘要",
            TextType::BodyParagraph => "正文段落",
            TextType::Methods => "方法描述",
            TextType::ResultsDiscussion => "结果讨论",
            TextType::Conclusion => "结论",
            TextType::Other => "其他",
        }
    }

    /// The "Please ..." clause of the standard polish system prompt.
    pub fn task_instruction(&self) -> &'static str {
        match self {
            TextType::Abstract => "polish this abstract for clarity, impact, and academic rigor",
            TextType::BodyParagraph => {
                "improve this main body paragraph for better flow and academic expression"
            }
            TextType::Methods => "enhance this methods section for clarity and precision",
            TextType::ResultsDiscussion => {
                "refine this results/discussion section for better analytical depth"
            }
            TextType::Conclusion => {
                "strengthen this conclusion section for impact and completeness"
            }
            TextType::Other => "improve this academic text for overall quality",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.key() == label || t.label() == label)
    }
}

impl TryFrom<String> for TextType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value).ok_or_else(|| format!("unknown text type '{value}'"))
    }
}

/// Target register for the polished text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PolishStyle {
    FormalAcademic,
    Concise,
    Elaborate,
    #[default]
    PreserveOriginal,
}

impl PolishStyle {
    pub const ALL: [PolishStyle; 4] = [
        PolishStyle::FormalAcademic,
        PolishStyle::Concise,
        PolishStyle::Elaborate,
        PolishStyle::PreserveOriginal,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PolishStyle::FormalAcademic => "formal_academic",
            PolishStyle::Concise => "concise",
            PolishStyle::Elaborate => "elaborate",
            PolishStyle::PreserveOriginal => "preserve_original",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PolishStyle::FormalAcademic => "正式学术",
            PolishStyle::Concise => "简洁明了",
            PolishStyle::Elaborate => "详细阐述",
            PolishStyle::PreserveOriginal => "保持原风格",
        }
    }

    pub fn style_instruction(&self) -> &'static str {
        match self {
            PolishStyle::FormalAcademic => {
                "Use formal academic language suitable for scientific publication"
            }
            PolishStyle::Concise => {
                "Make the text more concise while maintaining academic rigor"
            }
            PolishStyle::Elaborate => "Add depth and detailed explanations where appropriate",
            PolishStyle::PreserveOriginal => {
                "Preserve the original writing style while improving expression"
            }
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.key() == label || s.label() == label)
    }
}

impl TryFrom<String> for PolishStyle {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value).ok_or_else(|| format!("unknown polish style '{value}'"))
    }
}
