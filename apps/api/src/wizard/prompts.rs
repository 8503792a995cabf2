// All LLM prompt constants for the Proposal Wizard.
// Steps 1 and 2 ask for structured JSON; step 3 asks for a Markdown document.

use crate::llm_client::prompts::{render, JSON_ONLY_INSTRUCTION};
use crate::wizard::models::{Hypothesis, Route};

pub const HYPOTHESES_SYSTEM: &str = "你是一个专业的科研顾问，擅长将模糊的想法转化为具体的科学假设。";

/// Replace: {idea}
const HYPOTHESES_PROMPT_TEMPLATE: &str = r#"基于以下研究想法，请生成3个具体的、可验证的科学假设，每个假设都包含：
1. 明确的研究问题
2. 具体的创新点
3. 研究的可行性分析

研究想法：{idea}

请以JSON格式返回，格式如下：
{
    "hypotheses": [
        {
            "id": 1,
            "hypothesis": "具体的假设描述",
            "innovation": "创新点说明",
            "feasibility": "可行性分析"
        },
        {
            "id": 2,
            "hypothesis": "具体的假设描述",
            "innovation": "创新点说明",
            "feasibility": "可行性分析"
        },
        {
            "id": 3,
            "hypothesis": "具体的假设描述",
            "innovation": "创新点说明",
            "feasibility": "可行性分析"
        }
    ]
}"#;

pub const METHODOLOGY_SYSTEM: &str = "你是一个专业的研究方法学家，擅长设计可行的研究方案和技术路线。";

/// Replace: {hypothesis}, {innovation}
const METHODOLOGY_PROMPT_TEMPLATE: &str = r#"基于以下研究假设，请生成2种不同的技术路线方案：

研究假设：{hypothesis}
创新点：{innovation}

请生成：
1. **低成本方案**: 适合有限预算和资源的情况
2. **高精度方案**: 追求最高精度和最可靠的结果

请以JSON格式返回，格式如下：
{
    "routes": [
        {
            "type": "低成本方案",
            "description": "详细的技术路线描述",
            "advantages": "优势分析",
            "limitations": "局限性",
            "estimated_cost": "预估成本",
            "timeline": "预期时间"
        },
        {
            "type": "高精度方案",
            "description": "详细的技术路线描述",
            "advantages": "优势分析",
            "limitations": "局限性",
            "estimated_cost": "预估成本",
            "timeline": "预期时间"
        }
    ]
}"#;

pub const FINAL_DOCUMENT_SYSTEM: &str =
    "你是一个专业的学术写作专家，擅长撰写高质量的开题报告和研究计划。";

/// Replace: {hypothesis}, {innovation}, {feasibility}, {description}, {advantages},
///          {limitations}, {cost}, {timeline}, {modification_section}
const FINAL_DOCUMENT_PROMPT_TEMPLATE: &str = "请基于以下信息，生成一份完整的学术开题报告，使用Markdown格式：

## 研究假设
{hypothesis}

## 创新点
{innovation}

## 可行性分析
{feasibility}

## 技术路线
{description}

## 方案优势
{advantages}

## 方案局限性
{limitations}

## 预估成本与时间
成本：{cost}
时间：{timeline}

{modification_section}

请生成包含以下部分的开题报告：
1. 标题
2. 摘要
3. 研究背景与意义
4. 研究假设
5. 研究目标
6. 研究方法
7. 技术路线
8. 预期成果
9. 创新点
10. 研究计划与时间安排
11. 参考文献（示例）

请确保内容专业、逻辑清晰、格式规范。";

/// Steps 1 and 2 append the JSON-only fragment so replies parse without prose.
pub fn structured_system(base: &str) -> String {
    format!("{base}\n\n{JSON_ONLY_INSTRUCTION}")
}

pub fn hypotheses_user(idea: &str) -> String {
    render(HYPOTHESES_PROMPT_TEMPLATE, &[("idea", idea)])
}

pub fn methodology_user(hypothesis: &Hypothesis) -> String {
    render(
        METHODOLOGY_PROMPT_TEMPLATE,
        &[
            ("hypothesis", hypothesis.statement.as_str()),
            ("innovation", hypothesis.innovation.as_str()),
        ],
    )
}

pub fn final_document_user(hypothesis: &Hypothesis, route: &Route) -> String {
    let modification_section = route
        .user_modification
        .as_deref()
        .map(|m| format!("## 用户微调\n{m}"))
        .unwrap_or_default();

    render(
        FINAL_DOCUMENT_PROMPT_TEMPLATE,
        &[
            ("hypothesis", hypothesis.statement.as_str()),
            ("innovation", hypothesis.innovation.as_str()),
            ("feasibility", hypothesis.feasibility.as_str()),
            ("description", route.description.as_str()),
            ("advantages", route.advantages.as_str()),
            ("limitations", route.limitations.as_str()),
            ("cost", route.cost.as_str()),
            ("timeline", route.timeline.as_str()),
            ("modification_section", modification_section.as_str()),
        ],
    )
}
