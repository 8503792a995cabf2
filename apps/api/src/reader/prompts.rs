// All LLM prompt constants for the PDF Reader.
// Both prompts carry the full extracted document text; answers are in Chinese.

use crate::llm_client::prompts::render;

pub const SUMMARY_SYSTEM: &str =
    "你是一个专业的学术文献分析师，擅长从学术论文中提取关键信息并进行结构化总结。";

const SUMMARY_INSTRUCTIONS: &str = "请阅读这篇学术论文，并严格按照以下结构进行总结，用中文回答：

1. **研究空白 (Research Gap)**
   - 现有研究的不足之处
   - 作者试图解决的具体问题
   - 研究的重要性和必要性

2. **方法论 (Methodology)**
   - 主要研究方法和技术路线
   - 实验设计和数据收集方式
   - 分析方法和验证手段

3. **核心结论 (Key Results)**
   - 主要发现和创新点
   - 数据支持的重要结论
   - 研究的理论和实践意义

请确保回答准确、简洁、专业。";

/// Replace: {instructions}, {document_text}
const SUMMARY_USER_TEMPLATE: &str = "{instructions}

论文内容：
{document_text}";

pub const QUESTION_SYSTEM: &str = "你是一个专业的学术顾问，擅长解读学术论文并回答相关问题。";

/// Replace: {document_text}, {question}
const QUESTION_USER_TEMPLATE: &str = "你是一个专业的学术顾问，正在帮助用户理解一篇学术论文。

Context: 以下是论文的完整内容：
{document_text}

User Question: {question}

请基于论文内容回答用户的问题。如果论文中没有相关信息，请诚实说明。回答要准确、专业、有帮助。";

pub fn summary_user(document_text: &str) -> String {
    render(
        SUMMARY_USER_TEMPLATE,
        &[
            ("instructions", SUMMARY_INSTRUCTIONS),
            ("document_text", document_text),
        ],
    )
}

pub fn question_user(document_text: &str, question: &str) -> String {
    render(
        QUESTION_USER_TEMPLATE,
        &[("document_text", document_text), ("question", question)],
    )
}
