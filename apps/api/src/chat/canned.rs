//! Locally generated replies for models that are not routed upstream.
//!
//! Replies are assembled from a small table keyed by thread category and the
//! deep-thinking flag, an optional network-search addendum, and an optional
//! elaboration paragraph picked by keyword.

use super::category::ThreadCategory;
use super::prompts::model_suffix;

struct Template {
    category: ThreadCategory,
    deep: &'static str,
    standard: &'static str,
    search_addendum: Option<&'static str>,
}

const TEMPLATES: &[Template] = &[
    Template {
        category: ThreadCategory::Career,
        deep: "## 🧠 深度分析\n\n\
**多维度评估**：\n\
- **个人能力**：技能、经验、性格匹配\n\
- **市场机会**：行业趋势、岗位需求\n\
- **时间规划**：短期(1-2年)、中期(3-5年)、长期(5+年)\n\n\
**风险评估**：\n\
- 技术风险：技能过时 vs 新兴机会\n\
- 市场风险：竞争加剧 vs 需求增长\n\
- 个人风险：能力瓶颈 vs 成长空间\n\n\
**行动计划**：\n\
- [ ] 制定SMART目标\n\
- [ ] 技能提升计划\n\
- [ ] 人脉网络建设\n\
- [ ] 定期复盘调整",
        standard: "## 职业规划建议\n\n\
**核心要点**：\n\
- **现状评估**：技能水平、职业状态\n\
- **目标设定**：短期和长期目标\n\
- **技能提升**：针对性学习计划\n\
- **网络建设**：专业人脉建立\n\n\
**发展路径**：\n\
1. 短期(1-2年)：技能提升、经验积累\n\
2. 中期(3-5年)：职位晋升、专业深化\n\
3. 长期(5+年)：行业专家、创业机会\n\n\
您希望重点分析哪个方面？",
        search_addendum: Some(
            "\n\n🌐 **最新信息**：\n\
- LinkedIn职场趋势报告\n\
- 招聘平台人才需求分析\n\
- 行业权威机构报告",
        ),
    },
    Template {
        category: ThreadCategory::Offer,
        deep: "## 🧠 深度分析\n\n\
**多维度评估**：\n\
- **财务维度**：薪资结构、股权激励、隐性收益\n\
- **发展维度**：技能匹配、成长空间、晋升路径\n\
- **风险维度**：公司稳定性、市场风险、机会成本\n\n\
**薪资对比**：\n\
| 项目 | 当前Offer | 市场平均 | 评估 |\n\
|------|-----------|----------|------|\n\
| 基本薪资 | - | - | ⭐⭐⭐⭐⭐ |\n\
| 绩效奖金 | - | - | ⭐⭐⭐⭐⭐ |\n\
| 股权激励 | - | - | ⭐⭐⭐⭐⭐ |\n\n\
**谈判策略**：\n\
- [ ] 市场薪资调研\n\
- [ ] 突出独特价值\n\
- [ ] 多轮谈判推进\n\
- [ ] 备选方案准备",
        standard: "## Offer分析建议\n\n\
**核心评估**：\n\
- **薪资分析**：市场对比、增长空间\n\
- **福利待遇**：五险一金、假期政策、培训机会\n\
- **发展前景**：公司地位、晋升通道、技能提升\n\n\
**决策要点**：\n\
1. 综合收益评估（不只是薪资）\n\
2. 长期发展机会\n\
3. 风险承受能力\n\
4. 生活平衡考虑\n\n\
您最关心哪个方面？",
        search_addendum: Some(
            "\n\n🌐 **最新数据**：\n\
- 智联招聘、前程无忧薪资报告\n\
- Glassdoor、看准网公司评价\n\
- 行业薪资调研报告",
        ),
    },
    Template {
        category: ThreadCategory::Contract,
        deep: "## 🧠 深度分析\n\n\
**关键条款检查**：\n\
- **工作内容**：岗位职责、工作地点\n\
- **薪资待遇**：基本工资、绩效奖金、福利\n\
- **工作时间**：标准工时、加班费、假期\n\
- **试用期**：长度、薪资、转正条件\n\n\
**风险点识别**：\n\
- 竞业限制是否合理\n\
- 保密协议范围\n\
- 违约金设置\n\
- 解除合同条件\n\n\
**修改建议**：\n\
- [ ] 明确薪资结构\n\
- [ ] 规范工作时间\n\
- [ ] 合理试用期\n\
- [ ] 确保社保缴纳",
        standard: "## 合同审查建议\n\n\
**核心检查**：\n\
- **薪资结构**：基本工资、绩效、福利\n\
- **工作时间**：标准工时、加班费\n\
- **试用期**：长度、薪资标准\n\
- **权益保护**：社保、假期、培训\n\n\
**常见陷阱**：\n\
1. 试用期过长（>6个月）\n\
2. 薪资条款模糊\n\
3. 加班费不明确\n\
4. 违约金过高\n\n\
您对哪个条款有疑问？",
        search_addendum: None,
    },
    Template {
        category: ThreadCategory::Monitor,
        deep: "## 🧠 深度分析\n\n\
**监控维度**：\n\
- **财务状况**：营收、利润、现金流、负债率\n\
- **业务发展**：市场份额、产品发布、重大合作\n\
- **管理层变动**：高管变动、战略调整\n\
- **行业地位**：竞争对手、政策变化\n\n\
**信息渠道**：\n\
- 官方渠道：年报、公告、官网\n\
- 媒体渠道：新闻、行业报告\n\
- 专业平台：天眼查、企查查\n\n\
**预警机制**：\n\
- [ ] 设置关键指标阈值\n\
- [ ] 建立定期报告制度\n\
- [ ] 制定应急响应预案\n\
- [ ] 建立信息验证机制",
        standard: "## 企业监控建议\n\n\
**核心监控**：\n\
- **财务指标**：营收、利润、现金流\n\
- **业务指标**：市场份额、客户数量\n\
- **人员指标**：员工数量、离职率\n\
- **风险指标**：法律诉讼、负面新闻\n\n\
**风险预警**：\n\
1. 财务风险：现金流紧张、债务违约\n\
2. 经营风险：市场份额下降、客户流失\n\
3. 法律风险：监管变化、诉讼增加\n\n\
您最关心哪个方面？",
        search_addendum: None,
    },
];

const GENERAL_TEMPLATE: &str = "## AI职场管家服务\n\n\
**专业服务**：\n\
- 🎯 **职业规划**：路径规划、技能提升\n\
- 💰 **Offer分析**：薪资分析、谈判策略\n\
- 📋 **合同检查**：条款解读、风险识别\n\
- 🏢 **企业监控**：财务监控、风险预警\n\n\
请选择服务类型，我将提供专业帮助！";

/// Keyword → elaboration paragraph, per category, checked in order.
const ELABORATIONS: &[(ThreadCategory, &str, &str)] = &[
    (ThreadCategory::Career, "职业转型", "这是一个关于职业转型的重要问题。让我为您提供详细的转型路径分析，包括技能转换、行业适应、时间规划等方面的专业建议。"),
    (ThreadCategory::Career, "技能提升", "技能提升是职业发展的核心。我将从当前市场需求、个人能力评估、学习路径设计等多个维度为您分析。"),
    (ThreadCategory::Career, "行业分析", "行业分析需要综合考虑市场趋势、政策环境、技术发展等因素。让我为您提供全面的行业前景分析。"),
    (ThreadCategory::Career, "个人品牌", "个人品牌建设是现代职场的重要竞争力。我将从定位策略、内容输出、网络建设等方面为您提供指导。"),
    (ThreadCategory::Offer, "薪资谈判", "薪资谈判需要策略和技巧。让我为您分析谈判要点、市场行情、谈判话术等关键要素。"),
    (ThreadCategory::Offer, "offer对比", "多Offer选择需要综合考虑多个因素。我将从薪资、发展、文化、风险等维度为您提供决策框架。"),
    (ThreadCategory::Offer, "福利分析", "福利待遇的评估需要全面考虑。让我为您分析各种福利的实际价值和潜在风险。"),
    (ThreadCategory::Offer, "市场行情", "了解市场行情是做出明智决策的基础。我将为您提供最新的薪资数据和市场趋势分析。"),
    (ThreadCategory::Contract, "合同条款", "合同条款的解读需要专业知识和经验。让我为您详细分析各项条款的含义和影响。"),
    (ThreadCategory::Contract, "风险点", "识别合同风险点至关重要。我将为您指出常见的风险条款和应对策略。"),
    (ThreadCategory::Contract, "权益保护", "保护自身权益是每个职场人的必修课。让我为您提供权益保护的具体方法和建议。"),
    (ThreadCategory::Contract, "合同修改", "合同修改需要技巧和策略。我将为您提供修改建议和沟通技巧。"),
    (ThreadCategory::Monitor, "财务状况", "企业财务状况分析需要专业视角。让我为您提供财务健康度评估和风险预警。"),
    (ThreadCategory::Monitor, "行业地位", "行业地位评估需要多维度分析。我将为您提供竞争力分析和市场定位建议。"),
    (ThreadCategory::Monitor, "管理层变动", "管理层变动对企业影响深远。让我为您分析变动原因、影响范围和应对策略。"),
    (ThreadCategory::Monitor, "风险预警", "风险预警需要前瞻性思维。我将为您提供风险识别和预防措施建议。"),
];

fn template_body(category: ThreadCategory, deep_thinking: bool, network_search: bool) -> String {
    let Some(template) = TEMPLATES.iter().find(|t| t.category == category) else {
        return GENERAL_TEMPLATE.to_string();
    };
    let mut body = String::from(if deep_thinking {
        template.deep
    } else {
        template.standard
    });
    if network_search {
        if let Some(addendum) = template.search_addendum {
            body.push_str(addendum);
        }
    }
    body
}

fn elaboration(category: ThreadCategory, user_text: &str) -> Option<&'static str> {
    ELABORATIONS
        .iter()
        .find(|(c, keyword, _)| *c == category && user_text.contains(keyword))
        .map(|(_, _, text)| *text)
}

/// The complete simulated reply, model suffix included (also for an empty id).
pub fn simulated_reply(
    thread_id: &str,
    user_text: &str,
    model_id: &str,
    deep_thinking: bool,
    network_search: bool,
) -> String {
    let category = ThreadCategory::from_thread_id(thread_id);
    let body = template_body(category, deep_thinking, network_search);
    let mut reply = match elaboration(category, user_text) {
        Some(lead) => format!("{lead}\n\n{body}"),
        None => body,
    };
    reply.push_str(&model_suffix(model_id));
    reply
}
