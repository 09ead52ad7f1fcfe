//! Repository summary request/response types.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/github-summarizer`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    #[serde(default)]
    pub github_url: Option<String>,
}

/// README file fetched from GitHub, with its content already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readme {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub content: String,
}

/// README metadata echoed back to the caller (content omitted).
#[derive(Debug, Clone, Serialize)]
pub struct ReadmeInfo {
    pub name: String,
    pub path: String,
    pub size: u64,
}

impl From<&Readme> for ReadmeInfo {
    fn from(readme: &Readme) -> Self {
        Self {
            name: readme.name.clone(),
            path: readme.path.clone(),
            size: readme.size,
        }
    }
}

/// Structured output of the summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub summary: String,
    #[serde(default)]
    pub cool_facts: Vec<String>,
}
