// Prompt text sent to the upstream model, plus the visible reply strings
// shared by both reply paths.

const PERSONA: &str = "你是AI职场管家，专业的职场顾问助手。请根据用户的问题提供专业、实用的建议。";

const FORMAT_BLOCK: &str = "\n\n【回复格式要求】请使用markdown格式组织回复内容：\n\
- 使用标题（# ## ###）来组织内容结构\n\
- 使用**粗体**来强调重要信息\n\
- 使用列表（- 或 1.）来组织要点\n\
- 使用表格来对比数据\n\
- 使用> 引用重要提示\n\
- 使用`代码`来标记专业术语\n\
- 使用==高亮==来标记关键信息";

const DEEP_THINKING_BLOCK: &str = "\n\n【深度思考模式】请进行深度分析：\n\
1. 多角度分析问题，考虑不同维度和可能性\n\
2. 提供详细的推理过程和逻辑链条\n\
3. 分析潜在风险和机会\n\
4. 给出具体的行动建议和步骤\n\
5. 提供相关的案例或经验分享\n\
6. 使用表格对比不同方案\n\
7. 提供任务清单格式的行动计划";

const NETWORK_SEARCH_BLOCK: &str = "\n\n【网络搜索模式】请结合最新信息：\n\
1. 提供最新的行业动态和趋势\n\
2. 引用权威数据和报告\n\
3. 分析当前市场状况\n\
4. 给出时效性强的建议\n\
5. 使用表格展示数据对比\n\
6. 提供数据来源链接";

/// Checked in order; the first substring hit wins.
const MODEL_HINTS: &[(&str, &str)] = &[
    (
        "azure/gpt",
        " 你基于Azure OpenAI GPT-5模型，拥有最新的AI技术，擅长多语言对话、逻辑推理和创意生成。",
    ),
    ("qwen", " 你基于通义千问模型，擅长中文理解和生成。"),
    ("deepseek", " 你基于DeepSeek模型，擅长逻辑推理和代码分析。"),
    ("gpt", " 你基于GPT模型，擅长多语言对话和创意生成。"),
];

const CLOSING: &str = " 请用中文回复，保持专业、友好的语调，并确保使用markdown格式使内容更易读。";

/// Topics that get the extra case-study guidance, in priority order.
pub const CASE_KEYWORDS: &[&str] = &[
    "职业转型", "技能提升", "行业分析", "个人品牌",
    "薪资谈判", "offer对比", "福利分析", "市场行情",
    "合同条款", "风险点", "权益保护", "合同修改",
    "财务状况", "行业地位", "管理层变动", "风险预警",
];

pub fn build_system_prompt(model_id: &str, deep_thinking: bool, network_search: bool) -> String {
    let mut prompt = String::from(PERSONA);
    prompt.push_str(FORMAT_BLOCK);
    if deep_thinking {
        prompt.push_str(DEEP_THINKING_BLOCK);
    }
    if network_search {
        prompt.push_str(NETWORK_SEARCH_BLOCK);
    }
    if let Some((_, hint)) = MODEL_HINTS.iter().find(|(needle, _)| model_id.contains(needle)) {
        prompt.push_str(hint);
    }
    prompt.push_str(CLOSING);
    prompt
}

/// Appends the case-study block for the first case keyword found in `user_text`.
pub fn with_case_guidance(mut system_prompt: String, user_text: &str) -> String {
    if let Some(keyword) = CASE_KEYWORDS.iter().find(|k| user_text.contains(*k)) {
        system_prompt.push_str(&format!(
            "\n\n【案例专项指导】用户询问的是关于'{keyword}'的专业问题，请提供：\n\
             1. 详细的分析框架和评估维度\n\
             2. 具体的操作步骤和实用建议\n\
             3. 相关的案例分享和经验总结\n\
             4. 潜在风险和注意事项\n\
             5. 后续跟进和持续优化的建议"
        ));
    }
    system_prompt
}

/// The full single-turn input for an upstream model.
pub fn build_model_input(
    model_id: &str,
    deep_thinking: bool,
    network_search: bool,
    user_text: &str,
    enriched_content: &str,
) -> String {
    let system = with_case_guidance(
        build_system_prompt(model_id, deep_thinking, network_search),
        user_text,
    );
    format!("{system}\n\n用户问题: {enriched_content}")
}

pub fn model_suffix(model_id: &str) -> String {
    format!("\n\n[使用模型: {model_id}]")
}

pub fn model_error_reply(error: &dyn std::fmt::Display, model_id: &str) -> String {
    format!("抱歉，调用AI模型时出现错误: {error}{}", model_suffix(model_id))
}

pub fn empty_reply(model_id: &str) -> String {
    format!("抱歉，AI模型没有返回有效回复。{}", model_suffix(model_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_blocks_follow_flags() {
        let plain = build_system_prompt("bailian/qwen-flash", false, false);
        assert!(plain.starts_with(PERSONA));
        assert!(plain.contains("【回复格式要求】"));
        assert!(!plain.contains("【深度思考模式】"));
        assert!(!plain.contains("【网络搜索模式】"));
        assert!(plain.contains("通义千问"));
        assert!(plain.ends_with(CLOSING));

        let full = build_system_prompt("azure/gpt-5", true, true);
        assert!(full.contains("7. 提供任务清单格式的行动计划"));
        assert!(full.contains("6. 提供数据来源链接"));
        assert!(full.contains("Azure OpenAI GPT-5"));
        assert!(!full.contains("你基于GPT模型"));
    }

    #[test]
    fn test_model_hint_order() {
        assert!(build_system_prompt("bailian/deepseek-r1", false, false).contains("DeepSeek"));
        assert!(build_system_prompt("bailian/gpt-oss", false, false).contains("你基于GPT模型"));
        let none = build_system_prompt("nbg-v3-33b", false, false);
        assert!(!none.contains("你基于"));
    }

    #[test]
    fn test_case_guidance_uses_first_keyword() {
        let prompt = with_case_guidance(String::from("base"), "风险预警和职业转型怎么看");
        assert!(prompt.contains("关于'职业转型'的专业问题"));
        assert!(prompt.ends_with("5. 后续跟进和持续优化的建议"));
        assert_eq!(with_case_guidance(String::from("base"), "你好"), "base");
    }

    #[test]
    fn test_model_input_layout() {
        let enriched = "hi\n\n[PDF文档内容]:\nx";
        let input = build_model_input("bailian/qwen-flash", false, false, "hi", enriched);
        assert!(input.ends_with("\n\n用户问题: hi\n\n[PDF文档内容]:\nx"));
    }

    #[test]
    fn test_visible_error_replies_carry_suffix() {
        assert_eq!(
            model_error_reply(&"timeout", "azure/gpt-5"),
            "抱歉，调用AI模型时出现错误: timeout\n\n[使用模型: azure/gpt-5]"
        );
        assert_eq!(empty_reply(""), "抱歉，AI模型没有返回有效回复。\n\n[使用模型: ]");
    }
}
