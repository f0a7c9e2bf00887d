use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

pub struct GitHubRestResult {
    pub body: String,
    pub status: StatusCode,
}

/// One record of the `GET /repos/{owner}/{name}/commits` payload. Only the
/// fields read by this workspace; GitHub sends many more.
#[derive(Debug, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: Option<String>,
    pub date: DateTime<Utc>,
}

pub type CommitPage = Vec<CommitRecord>;

/// Fetches one page of a repository's commit listing. Transport failures are
/// errors; a non-2xx status is returned to the caller untouched.
pub async fn fetch_repo_commits_page(
    api_base: &str,
    token: &str,
    owner: &str,
    name: &str,
    page: u32,
    per_page: u32,
) -> Result<GitHubRestResult, FetchRepoCommitsPageError> {
    let url = format!("{api_base}/repos/{owner}/{name}/commits");

    let client = Client::new();

    let response = client
        .get(&url)
        .query(&[("per_page", per_page), ("page", page)])
        .header("Authorization", format!("Bearer {token}"))
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", "rust-client")
        .send()
        .await
        .map_err(|source| FetchRepoCommitsPageError::RequestSend { source })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| FetchRepoCommitsPageError::ResponseRead { source })?;

    Ok(GitHubRestResult { body, status })
}

#[derive(Debug, Error)]
pub enum FetchRepoCommitsPageError {
    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}
