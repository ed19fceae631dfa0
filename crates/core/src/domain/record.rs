use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorRecord {
    pub post_id: i64,
    pub post_date: String,
    #[serde(default)]
    pub analysis_date: Option<String>,
    // Language the upstream producer claims to have written in. Informational only.
    #[serde(default)]
    pub language_flag: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
    pub text: String,
}
