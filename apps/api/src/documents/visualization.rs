//! Presentation data derived from extracted fields. Pure; no model calls.

use serde_json::{json, Map, Value};

use crate::documents::info::DocumentExtractedInfo;
use crate::models::document::DocumentType;

pub fn generate_visualization_data(
    info: &DocumentExtractedInfo,
    document_type: DocumentType,
) -> Map<String, Value> {
    let value = match document_type {
        DocumentType::Resume => resume_visualization(info),
        DocumentType::Contract => contract_visualization(info),
        DocumentType::Offer => offer_visualization(info),
        DocumentType::Employment => employment_visualization(info),
        DocumentType::Other => general_visualization(info),
    };
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn resume_visualization(info: &DocumentExtractedInfo) -> Value {
    let skills = &info.skills;
    let person = &info.personal_info;

    let timeline: Vec<Value> = info
        .work_experience
        .iter()
        .map(|exp| {
            json!({
                "title": exp.position,
                "company": exp.company,
                "duration": exp.duration,
                "description": exp.description,
                "skills": exp.skills,
            })
        })
        .collect();

    let leaf = |names: &[String]| -> Vec<Value> {
        names.iter().map(|n| json!({ "name": n })).collect()
    };

    json!({
        "skillTree": {
            "technical": skills.technical,
            "soft": skills.soft,
            "languages": skills.languages,
            "certifications": skills.certifications,
        },
        "timeline": timeline,
        "mindMap": {
            "name": person.name,
            "children": [
                {
                    "name": "个人信息",
                    "children": [
                        { "name": format!("邮箱: {}", person.email) },
                        { "name": format!("电话: {}", person.phone) },
                        { "name": format!("地址: {}", person.location) },
                    ],
                },
                { "name": "工作经历", "children": timeline },
                {
                    "name": "技能",
                    "children": [
                        { "name": "技术技能", "children": leaf(&skills.technical) },
                        { "name": "软技能", "children": leaf(&skills.soft) },
                    ],
                },
            ],
        },
    })
}

fn contract_visualization(info: &DocumentExtractedInfo) -> Value {
    let contract = &info.contract_info;

    let risks: Vec<Value> = [
        ("竞业限制", &contract.non_compete, "medium"),
        ("保密条款", &contract.confidentiality, "high"),
    ]
    .into_iter()
    .filter(|(_, content, _)| !content.trim().is_empty())
    .map(|(kind, content, level)| json!({ "type": kind, "content": content, "level": level }))
    .collect();

    json!({
        "riskAnalysis": {
            "companyName": contract.company_name,
            "position": contract.position,
            "salary": contract.salary,
            "benefits": contract.benefits,
            "risks": risks,
        },
        "flowChart": steps(&[
            ("合同签署", "签署劳动合同"),
            ("入职准备", "准备入职材料"),
            ("正式入职", "开始工作"),
            ("试用期", "试用期考核"),
            ("转正", "成为正式员工"),
        ]),
    })
}

fn offer_visualization(info: &DocumentExtractedInfo) -> Value {
    let offer = &info.offer_info;
    json!({
        "offerComparison": {
            "companyName": offer.company_name,
            "position": offer.position,
            "salary": offer.salary,
            "bonus": offer.bonus,
            "equity": offer.equity,
            "benefits": offer.benefits,
            "workLocation": offer.work_location,
            "teamSize": offer.team_size,
        },
        "decisionFlow": steps(&[
            ("收到Offer", "收到工作邀请"),
            ("分析条件", "梳理薪资与福利"),
            ("对比选择", "与其他机会比较"),
            ("谈判协商", "协商薪资条件"),
            ("做出决定", "接受或婉拒Offer"),
        ]),
    })
}

fn employment_visualization(info: &DocumentExtractedInfo) -> Value {
    let job = &info.employment_info;
    json!({
        "careerPath": [
            { "stage": "当前职位", "position": job.position, "company": job.company_name },
            {
                "stage": "下一阶段",
                "position": format!("高级{}", job.position),
                "company": job.company_name,
            },
            { "stage": "未来目标", "position": "技术专家/管理岗位", "company": "目标公司" },
        ],
        "skillDevelopment": {
            "currentSkills": job.skills_used,
            "targetSkills": ["领导力", "战略思维", "团队管理"],
            "skillGaps": ["项目管理", "商业分析"],
        },
    })
}

fn general_visualization(info: &DocumentExtractedInfo) -> Value {
    let general = &info.general_info;
    let document_type = if general.document_type.is_empty() {
        "通用文档"
    } else {
        general.document_type.as_str()
    };
    json!({
        "documentType": document_type,
        "summary": general.main_content,
        "keyPoints": general.key_info,
    })
}

fn steps(items: &[(&str, &str)]) -> Vec<Value> {
    items
        .iter()
        .enumerate()
        .map(|(i, (title, description))| {
            json!({ "step": i + 1, "title": title, "description": description })
        })
        .collect()
}
