//! Key-gated GitHub repository summarizer.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Serialize;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        auth::KeyUser,
        summary::{ReadmeInfo, RepositorySummary, SummarizeRequest},
    },
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    pub valid: bool,
    pub message: String,
    pub user: KeyUser,
    pub github_url: String,
    pub readme: ReadmeInfo,
    pub summary: RepositorySummary,
}

/// Summarize a GitHub repository from its README.
///
/// # Endpoint
///
/// `POST /api/github-summarizer` with header `x-api-key: pk_...`
///
/// # Request Body
///
/// ```json
/// { "githubUrl": "https://github.com/tokio-rs/axum" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: README metadata and the structured summary
/// - **Error (400)**: Missing key or URL, or URL is not a GitHub repository
/// - **Error (401)**: Invalid API key
/// - **Error (502)**: GitHub or the summarizer failed
/// - **Error (503)**: Summarizer not configured
pub async fn summarize_repository(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, AppError> {
    let Json(request) = body?;
    let github_url = request
        .github_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("GitHub URL is required for summarization".to_string()))?;

    let (readme, summary) = state.summaries.summarize(&github_url).await?;

    let user = KeyUser {
        id: auth.api_key_id,
        name: auth.api_key_name.clone(),
        api_key_name: auth.api_key_name,
        description: auth.description,
        validated_at: auth.validated_at,
        last_used: Some(auth.validated_at),
    };

    Ok(Json(SummarizeResponse {
        valid: true,
        message: "GitHub repository summarized successfully".to_string(),
        user,
        github_url,
        readme: ReadmeInfo::from(&readme),
        summary,
    }))
}
