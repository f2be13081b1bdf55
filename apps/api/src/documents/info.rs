//! Structured output of document extraction.
//!
//! Models answer loosely typed JSON: numbers where strings are asked for,
//! `null` for missing sections. Every field therefore defaults and scalar
//! fields accept any JSON scalar.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentExtractedInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub personal_info: PersonalInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Skills,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub career_analysis: CareerAnalysis,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contract_info: ContractInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub offer_info: OfferInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employment_info: EmploymentInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub general_info: GeneralInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub github: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub position: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub team_size: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default, deserialize_with = "lenient_string")]
    pub school: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub major: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gpa: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skills {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub technical: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub soft: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerAnalysis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub direction: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub position: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub salary: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub contract_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub work_location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub working_hours: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub benefits: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notice_period: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub non_compete: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub confidentiality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub position: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub salary: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bonus: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub equity: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub benefits: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub work_location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub working_hours: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reporting_to: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub team_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub position: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub department: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub manager: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub team_size: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub achievements: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub skills_used: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub document_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub main_content: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub key_info: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub time_info: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub people_info: Vec<String>,
}
