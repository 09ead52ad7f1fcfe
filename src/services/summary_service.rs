//! GitHub repository summarizer.
//!
//! Fetches a repository README through the GitHub REST API and hands its
//! content to a summarization backend. Both collaborators sit behind traits
//! so the HTTP layer can be exercised without network access.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::error::AppError;
use crate::models::summary::{Readme, RepositorySummary};

const USER_AGENT: &str = "api-key-manager";

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

/// Parse `https://github.com/{owner}/{repo}[.git][/...]`.
pub fn parse_github_url(raw: &str) -> Result<RepositoryRef, AppError> {
    let invalid = || AppError::Validation("Invalid GitHub URL format".to_string());

    let parsed = Url::parse(raw.trim()).map_err(|_| invalid())?;

    match parsed.host_str() {
        Some("github.com") | Some("www.github.com") => {}
        _ => return Err(invalid()),
    }

    let mut segments = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|s| !s.is_empty());

    let owner = segments.next().ok_or_else(invalid)?.to_string();
    let repo = segments.next().ok_or_else(invalid)?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo).to_string();

    if repo.is_empty() {
        return Err(invalid());
    }

    Ok(RepositoryRef { owner, repo })
}

/// Source of repository README files.
#[async_trait]
pub trait ReadmeSource: Send + Sync + Debug {
    async fn fetch_readme(&self, repository: &RepositoryRef) -> Result<Readme, AppError>;
}

/// Opaque text summarization backend.
#[async_trait]
pub trait Summarizer: Send + Sync + Debug {
    async fn summarize(&self, content: &str) -> Result<RepositorySummary, AppError>;
}

#[derive(Debug, Deserialize)]
struct GitHubReadme {
    name: String,
    path: String,
    size: u64,
    content: String,
}

/// Decode GitHub's base64 payload, which is wrapped at 60 columns.
fn decode_readme(payload: GitHubReadme) -> Result<Readme, AppError> {
    let compact: String = payload
        .content
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| AppError::Upstream(format!("Failed to decode README: {}", e)))?;

    Ok(Readme {
        name: payload.name,
        path: payload.path,
        size: payload.size,
        content: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// README source backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubReadmeClient {
    client: reqwest::Client,
    api_url: String,
}

impl GitHubReadmeClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Upstream(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReadmeSource for GitHubReadmeClient {
    async fn fetch_readme(&self, repository: &RepositoryRef) -> Result<Readme, AppError> {
        let url = format!(
            "{}/repos/{}/{}/readme",
            self.api_url, repository.owner, repository.repo
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to fetch README: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::Upstream(
                "Repository not found or README.md does not exist".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "GitHub API error: {}",
                status.as_u16()
            )));
        }

        let payload: GitHubReadme = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid README response: {}", e)))?;

        decode_readme(payload)
    }
}

/// Summarizer backed by an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiSummarizer {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Upstream(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn request_body(&self, content: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {
                    "role": "system",
                    "content": "You summarize GitHub repositories from their README."
                },
                {
                    "role": "user",
                    "content": format!(
                        "Summarize this GitHub repository from this README file content:\n\n{}",
                        content
                    )
                }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "repository_summary",
                    "strict": true,
                    "schema": {
                        "type": "object",
                        "properties": {
                            "summary": { "type": "string" },
                            "cool_facts": { "type": "array", "items": { "type": "string" } }
                        },
                        "required": ["summary", "cool_facts"],
                        "additionalProperties": false
                    }
                }
            }
        })
    }
}

/// Extract the structured summary from a chat completion.
fn parse_completion(completion: ChatCompletion) -> Result<RepositorySummary, AppError> {
    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AppError::Upstream("Summarizer returned no content".to_string()))?;

    serde_json::from_str(&content)
        .map_err(|e| AppError::Upstream(format!("Failed to parse summary: {}", e)))
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, content: &str) -> Result<RepositorySummary, AppError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(content))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to generate summary: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::error!(status, "Summarizer request failed");
            return Err(AppError::Upstream(format!(
                "Failed to generate summary: status {}",
                status
            )));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid summarizer response: {}", e)))?;

        parse_completion(completion)
    }
}

/// Fetches READMEs and summarizes them.
#[derive(Debug, Clone)]
pub struct SummaryService {
    readmes: Arc<dyn ReadmeSource>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl SummaryService {
    pub fn new(readmes: Arc<dyn ReadmeSource>, summarizer: Option<Arc<dyn Summarizer>>) -> Self {
        Self {
            readmes,
            summarizer,
        }
    }

    /// Summarize the repository at `github_url`.
    ///
    /// # Errors
    ///
    /// - `SummarizerDisabled`: No summarizer configured
    /// - `Validation`: URL is not a GitHub repository URL
    /// - `Upstream`: GitHub or the summarizer failed
    pub async fn summarize(&self, github_url: &str) -> Result<(Readme, RepositorySummary), AppError> {
        let summarizer = self
            .summarizer
            .as_ref()
            .ok_or(AppError::SummarizerDisabled)?;

        let repository = parse_github_url(github_url)?;
        let readme = self.readmes.fetch_readme(&repository).await?;
        tracing::info!(
            owner = %repository.owner,
            repo = %repository.repo,
            size = readme.size,
            "Summarizing repository"
        );

        let summary = summarizer.summarize(&readme.content).await?;
        Ok((readme, summary))
    }
}
