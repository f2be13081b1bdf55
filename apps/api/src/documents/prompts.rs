// Extraction prompts, one per document type. `{content}` is replaced with the
// document text. Each prompt pins the exact JSON shape `DocumentExtractedInfo`
// decodes.

const FORMAT_HINT: &str = "如果文档格式不够清晰，请在能提取的范围内尽量完整作答，并建议用户改用 .md 格式重新上传。";

pub const RESUME_EXTRACTION_PROMPT: &str = r#"你是一位资深招聘顾问。请阅读下面的简历，提取结构化信息，只输出一个 JSON 对象。

简历内容：
{content}

提取要点：
1. 个人信息：姓名、邮箱、电话、所在地、LinkedIn、GitHub、个人网站
2. 工作经历：公司、职位、起止时间（尽量精确到月）、职责描述、技术栈、团队规模、业绩成果
3. 教育背景：学校、学位、专业、时间、GPA、学术成就
4. 技能：技术技能、软技能、语言能力、证书
5. 项目经验：项目名称、描述、使用技术、担任角色、时间、成果
6. 职业分析：发展方向、优势、待改进之处、建议

输出格式（缺失的信息填写"未提供"或空数组）：
{
  "personalInfo": {"name": "", "email": "", "phone": "", "location": "", "linkedin": "", "github": "", "website": ""},
  "workExperience": [{"company": "", "position": "", "duration": "", "description": "", "skills": [], "teamSize": "", "achievements": []}],
  "education": [{"school": "", "degree": "", "major": "", "duration": "", "gpa": "", "achievements": []}],
  "skills": {"technical": [], "soft": [], "languages": [], "certifications": []},
  "projects": [{"name": "", "description": "", "technologies": [], "role": "", "duration": "", "achievements": []}],
  "careerAnalysis": {"direction": "", "strengths": [], "weaknesses": [], "recommendations": []}
}

注意：时间信息保留原文格式；技能尽量具体；职业分析须基于简历内容。"#;

pub const CONTRACT_EXTRACTION_PROMPT: &str = r#"你是一位熟悉劳动法的 HR 顾问。请阅读下面的劳动合同，提取关键信息，只输出一个 JSON 对象。

合同内容：
{content}

提取要点：
1. 基本信息：公司、职位、工作地点、合同类型（正式/实习/外包/劳务派遣等）、入职日期、合同期限
2. 薪资：基本工资、绩效、奖金、试用期薪资、发放方式
3. 工作条件：工作时间、休息安排、加班与出差
4. 福利：社保公积金、各类假期、培训机会
5. 风险条款：离职通知期、违约金、竞业限制、保密与知识产权条款

输出格式：
{
  "contractInfo": {
    "companyName": "", "position": "", "salary": "", "startDate": "", "contractType": "",
    "workLocation": "", "workingHours": "", "benefits": [], "noticePeriod": "",
    "nonCompete": "", "confidentiality": ""
  }
}

注意：重点标出对劳动者不利的条款；不明确的信息写"未明确"或"待确认"。"#;

pub const OFFER_EXTRACTION_PROMPT: &str = r#"你是一位招聘与薪酬顾问。请阅读下面的 Offer，提取关键信息，只输出一个 JSON 对象。

Offer 内容：
{content}

提取要点：
1. 基本信息：公司、职位、部门、汇报对象、团队规模、入职日期、试用期
2. 薪酬：基本工资、绩效、奖金、股权或期权、调薪机制
3. 福利：社保公积金、假期、培训与发展、其他特殊福利
4. 工作条件：地点、工作时间、弹性或远程安排、出差要求

输出格式：
{
  "offerInfo": {
    "companyName": "", "position": "", "salary": "", "bonus": "", "equity": "", "startDate": "",
    "benefits": [], "workLocation": "", "workingHours": "", "reportingTo": "", "teamSize": ""
  }
}

注意：薪酬尽量拆分到各组成部分；不明确的信息写"未明确"或"待确认"。"#;

pub const EMPLOYMENT_EXTRACTION_PROMPT: &str = r#"你是一位职业发展顾问。请阅读下面的在职情况描述，提取关键信息，只输出一个 JSON 对象。

在职情况：
{content}

提取要点：
1. 基本信息：公司、职位、部门、直属领导、团队规模、入职时间
2. 工作职责：主要工作、负责的项目与任务、管理职责
3. 成就：业绩成果、成功案例、获得的认可
4. 技能：技术与工具、软技能、行业知识
5. 参与的项目

输出格式：
{
  "employmentInfo": {
    "companyName": "", "position": "", "department": "", "manager": "", "teamSize": "",
    "responsibilities": [], "achievements": [], "skillsUsed": [], "projects": []
  }
}

注意：成就与项目尽量具体；不明确的信息写"未明确"或"待确认"。"#;

pub const GENERAL_EXTRACTION_PROMPT: &str = r#"你是一位文档分析师。请阅读下面的文档，提取关键信息，只输出一个 JSON 对象。

文档内容：
{content}

提取要点：
1. 文档类型（简历、合同、Offer、报告等）及用途
2. 核心主题与主要结论
3. 关键信息：重要人物、时间、地点、数据与条款
4. 涉及的技能与专业能力
5. 时间节点与计划安排
6. 相关人员与角色

输出格式：
{
  "generalInfo": {
    "documentType": "", "mainContent": "", "keyInfo": [], "skills": [], "timeInfo": [], "peopleInfo": []
  }
}

注意：关键信息尽量具体；不明确的信息写"未明确"或"待确认"。"#;

/// Fills a template with document text and appends the shared format hint.
pub fn render(template: &str, content: &str) -> String {
    format!("{}\n\n{FORMAT_HINT}", template.replace("{content}", content))
}
