use axum::{
	extract::{Extension, Json},
	http::StatusCode,
	response::IntoResponse,
};
use interfaces_github_commits::index::{
	fetch_repo_commits_page, CommitPage, FetchRepoCommitsPageError, GitHubRestResult};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

use crate::config::Config;

/// GitHub caps `per_page` at 100.
const PER_PAGE: u32 = 100;

/// JSON payload returned on success.
#[derive(Serialize)]
pub struct CommitCountReport {
	pub organization: String,
	#[serde(rename = "commitCounts")]
	pub commit_counts: BTreeMap<String, u64>,
}

/// Axum handler: POST /commit-count
pub async fn handler(
	Extension(config): Extension<Config>,
	Json(input): Json<Value>,
) -> impl IntoResponse {
	let repos = match parse_repos(&input) {
		Some(repos) => repos,
		None => {
			return (
				StatusCode::BAD_REQUEST,
				Json(json!({ "error": "repos must be a non-empty array" })),
			)
				.into_response()
		}
	};

	match count_commits_for_repos(&config, &repos).await {
		Ok(commit_counts) => (
			StatusCode::OK,
			Json(CommitCountReport {
				organization: config.github_org.clone(),
				commit_counts,
			}),
		)
			.into_response(),
		Err(source) => {
			error!("counting commits for {} repos failed: {source}", repos.len());
			(
				source.status(),
				Json(json!({ "error": "Failed to fetch commits from GitHub" })),
			)
				.into_response()
		}
	}
}

/// `repos` must be a non-empty array of strings; anything else is a caller
/// error answered with a 400 before any upstream request is made.
fn parse_repos(input: &Value) -> Option<Vec<String>> {
	let items = input.get("repos")?.as_array()?;
	if items.is_empty() {
		return None;
	}

	items
		.iter()
		.map(|item| item.as_str().map(str::to_owned))
		.collect()
}

#[derive(Debug, Error)]
pub enum CountCommitsForReposError {
	#[error("FetchRepoCommitsPage: {source}")]
	FetchRepoCommitsPage {
		#[from]
		source: FetchRepoCommitsPageError,
	},

	#[error("DeserializeResponseBody: {source}")]
	DeserializeResponseBody {
		#[from]
		source: serde_json::Error,
	},

	#[error("UpstreamStatus: {status}")]
	UpstreamStatus {
		status: StatusCode,
	},
}

impl CountCommitsForReposError {
	/// Status for the aborted batch: the upstream's own status when it
	/// produced one, 500 otherwise.
	pub fn status(&self) -> StatusCode {
		match self {
			CountCommitsForReposError::UpstreamStatus { status } => *status,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// Walks each repository's commit listing page by page until an empty page,
/// summing page sizes. Any failure aborts the whole batch; no partial counts
/// are returned.
pub async fn count_commits_for_repos(
	config: &Config,
	repos: &[String],
) -> Result<BTreeMap<String, u64>, CountCommitsForReposError> {
	let mut commit_counts = BTreeMap::new();

	for repo in repos {
		let mut page = 1u32;
		let mut total = 0u64;

		loop {
			let GitHubRestResult { body, status } = fetch_repo_commits_page(
				&config.github_api_base,
				&config.github_token,
				&config.github_org,
				repo,
				page,
				PER_PAGE,
			)
			.await?;

			if !status.is_success() {
				return Err(CountCommitsForReposError::UpstreamStatus { status });
			}

			let commits: CommitPage = serde_json::from_str(&body)?;
			if commits.is_empty() {
				break;
			}

			total += commits.len() as u64;
			page += 1;
		}

		commit_counts.insert(repo.clone(), total);
	}

	Ok(commit_counts)
}

#[cfg(test)]
mod tests {
	use super::*;
	use mockito::{Matcher, Mock, ServerGuard};

	fn test_config(api_base: &str) -> Config {
		Config {
			github_token: "test-token".to_string(),
			github_org: "acme".to_string(),
			github_api_base: api_base.to_string(),
			port: 0,
		}
	}

	fn commit_json(i: usize) -> Value {
		json!({
			"sha": format!("sha-{i}"),
			"commit": {
				"message": format!("commit {i}"),
				"author": {
					"name": "Dev",
					"email": "dev@acme.test",
					"date": "2024-05-01T12:00:00Z",
				},
			},
		})
	}

	fn page_body(len: usize) -> String {
		let records: Vec<Value> = (0..len).map(commit_json).collect();
		serde_json::to_string(&records).unwrap()
	}

	async fn mock_page(server: &mut ServerGuard, repo: &str, page: u32, len: usize) -> Mock {
		server
			.mock("GET", format!("/repos/acme/{repo}/commits").as_str())
			.match_query(Matcher::AllOf(vec![
				Matcher::UrlEncoded("per_page".into(), "100".into()),
				Matcher::UrlEncoded("page".into(), page.to_string()),
			]))
			.with_status(200)
			.with_header("content-type", "application/json")
			.with_body(page_body(len))
			.create_async()
			.await
	}

	#[test]
	fn parse_repos_accepts_a_list_of_names() {
		let input = json!({ "repos": ["widget", "gadget"] });
		assert_eq!(
			parse_repos(&input),
			Some(vec!["widget".to_string(), "gadget".to_string()])
		);
	}

	#[test]
	fn parse_repos_rejects_malformed_payloads() {
		for input in [
			json!({}),
			json!({ "repos": [] }),
			json!({ "repos": "widget" }),
			json!({ "repos": 3 }),
			json!({ "repos": ["widget", 2] }),
		] {
			assert_eq!(parse_repos(&input), None, "accepted {input}");
		}
	}

	#[tokio::test]
	async fn sums_every_page_until_the_empty_one() -> anyhow::Result<()> {
		let mut server = mockito::Server::new_async().await;
		mock_page(&mut server, "widget", 1, 100).await;
		mock_page(&mut server, "widget", 2, 100).await;
		mock_page(&mut server, "widget", 3, 37).await;
		mock_page(&mut server, "widget", 4, 0).await;

		let config = test_config(&server.url());
		let counts = count_commits_for_repos(&config, &["widget".to_string()]).await?;

		assert_eq!(counts.get("widget"), Some(&237));
		Ok(())
	}

	#[tokio::test]
	async fn a_repo_with_no_commits_counts_zero_after_one_request() -> anyhow::Result<()> {
		let mut server = mockito::Server::new_async().await;
		let only_page = server
			.mock("GET", "/repos/acme/empty/commits")
			.match_query(Matcher::AllOf(vec![
				Matcher::UrlEncoded("per_page".into(), "100".into()),
				Matcher::UrlEncoded("page".into(), "1".into()),
			]))
			.with_status(200)
			.with_header("content-type", "application/json")
			.with_body("[]")
			.expect(1)
			.create_async()
			.await;

		let config = test_config(&server.url());
		let counts = count_commits_for_repos(&config, &["empty".to_string()]).await?;

		only_page.assert_async().await;
		assert_eq!(counts.get("empty"), Some(&0));
		Ok(())
	}

	#[tokio::test]
	async fn result_keys_match_the_requested_repos() -> anyhow::Result<()> {
		let mut server = mockito::Server::new_async().await;
		mock_page(&mut server, "widget", 1, 2).await;
		mock_page(&mut server, "widget", 2, 0).await;
		mock_page(&mut server, "gadget", 1, 5).await;
		mock_page(&mut server, "gadget", 2, 0).await;

		let config = test_config(&server.url());
		let repos = vec!["widget".to_string(), "gadget".to_string()];
		let counts = count_commits_for_repos(&config, &repos).await?;

		let mut keys: Vec<&String> = counts.keys().collect();
		keys.sort();
		let mut expected: Vec<&String> = repos.iter().collect();
		expected.sort();
		assert_eq!(keys, expected);
		assert_eq!(counts.get("widget"), Some(&2));
		assert_eq!(counts.get("gadget"), Some(&5));
		Ok(())
	}

	#[tokio::test]
	async fn an_upstream_failure_aborts_the_whole_batch() -> anyhow::Result<()> {
		let mut server = mockito::Server::new_async().await;
		mock_page(&mut server, "widget", 1, 1).await;
		mock_page(&mut server, "widget", 2, 0).await;
		server
			.mock("GET", "/repos/acme/gadget/commits")
			.match_query(Matcher::Any)
			.with_status(403)
			.with_body(r#"{"message": "rate limit exceeded"}"#)
			.create_async()
			.await;

		let config = test_config(&server.url());
		let repos = vec!["widget".to_string(), "gadget".to_string()];
		let err = count_commits_for_repos(&config, &repos).await.unwrap_err();

		assert!(matches!(
			&err,
			CountCommitsForReposError::UpstreamStatus { status } if *status == StatusCode::FORBIDDEN
		));
		assert_eq!(err.status(), StatusCode::FORBIDDEN);
		Ok(())
	}
}
