use serde_json::Value;

/// Which backend produces the reply for a model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRoute {
    /// Forwarded to the chat-completion gateway.
    Upstream,
    /// Answered locally from the canned templates.
    Simulated,
}

const UPSTREAM_PREFIXES: &[&str] = &["bailian/", "azure/"];
const UPSTREAM_EXACT: &[&str] = &["nbg-v3-33b"];

impl ModelRoute {
    pub fn classify(model_id: &str) -> Self {
        let upstream = UPSTREAM_PREFIXES.iter().any(|p| model_id.starts_with(p))
            || UPSTREAM_EXACT.contains(&model_id);
        if upstream {
            ModelRoute::Upstream
        } else {
            ModelRoute::Simulated
        }
    }
}

/// Conversation topic, derived from the thread id prefix (`career-123`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadCategory {
    Career,
    Offer,
    Contract,
    Monitor,
    Unknown,
}

/// Enterprise, financial and regulatory terms. Matched against lower-cased text.
const MONITOR_KEYWORDS: &[&str] = &[
    "通风处", "监控", "企业", "公司", "风险", "预警", "财务", "管理层", "市场", "股票", "股价",
    "财报", "业绩", "投资", "融资", "并购", "高管", "ceo", "cfo", "董事会", "股东", "股权",
    "上市", "退市", "监管", "合规", "审计", "内控", "风控", "法务", "诉讼", "仲裁",
];

const TAG_KEYWORDS: &[(&str, &str)] = &[
    ("职业转型", "转型"),
    ("技能提升", "技能"),
    ("行业分析", "行业"),
    ("薪资谈判", "薪资"),
    ("福利分析", "福利"),
    ("市场行情", "市场"),
    ("合同条款", "条款"),
    ("风险点", "风险"),
    ("权益保护", "权益"),
    ("财务状况", "财务"),
    ("管理层", "管理"),
    ("风险预警", "预警"),
];

const TITLE_MAX_CHARS: usize = 50;

impl ThreadCategory {
    pub fn from_thread_id(thread_id: &str) -> Self {
        let prefix = thread_id.split('-').next().unwrap_or_default();
        match prefix {
            "career" => ThreadCategory::Career,
            "offer" => ThreadCategory::Offer,
            "contract" => ThreadCategory::Contract,
            "monitor" => ThreadCategory::Monitor,
            _ => ThreadCategory::Unknown,
        }
    }

    /// Category recorded in the history log. Monitor-style content wins over
    /// the thread prefix.
    pub fn for_history(thread_id: &str, raw_text: &str) -> Self {
        if is_monitor_content(raw_text) {
            ThreadCategory::Monitor
        } else {
            Self::from_thread_id(thread_id)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadCategory::Career => "career",
            ThreadCategory::Offer => "offer",
            ThreadCategory::Contract => "contract",
            ThreadCategory::Monitor => "monitor",
            ThreadCategory::Unknown => "unknown",
        }
    }

    fn default_tag(&self) -> Option<&'static str> {
        match self {
            ThreadCategory::Career => Some("职业规划"),
            ThreadCategory::Offer => Some("Offer分析"),
            ThreadCategory::Contract => Some("合同审查"),
            ThreadCategory::Monitor => Some("企业监控"),
            ThreadCategory::Unknown => None,
        }
    }
}

pub fn is_monitor_content(text: &str) -> bool {
    let lowered = text.to_lowercase();
    MONITOR_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// First 50 code points plus `...` when the text is longer.
pub fn truncate_title(text: &str) -> String {
    if text.chars().count() <= TITLE_MAX_CHARS {
        return text.to_string();
    }
    let mut title: String = text.chars().take(TITLE_MAX_CHARS).collect();
    title.push_str("...");
    title
}

/// JSON array of tags: the category tag first, then keyword tags in table order.
pub fn extract_tags(text: &str, category: ThreadCategory) -> String {
    let tags: Vec<Value> = category
        .default_tag()
        .into_iter()
        .chain(
            TAG_KEYWORDS
                .iter()
                .filter(|(keyword, _)| text.contains(keyword))
                .map(|(_, tag)| *tag),
        )
        .map(|tag| Value::String(tag.to_string()))
        .collect();
    Value::Array(tags).to_string()
}
