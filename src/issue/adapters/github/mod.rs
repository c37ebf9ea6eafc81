//! GitHub REST adapter for the issue tracker port.
//!
//! List and timeline endpoints are paged until a short page is returned.
//! The adapter never retries; failures go straight back to the reconciler.

mod wire;


use crate::{
    config::GitHubClientConfig,
    issue::{
        domain::{IssueEdit, IssueNumber, NewIssue, RemoteIssue, RepositoryRef, TimelineEvent},
        ports::{IssueTracker, IssueTrackerError, IssueTrackerResult},
    },
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use wire::{IssuePayload, TimelineEventPayload};

const PAGE_SIZE: usize = 100;
const MAX_ERROR_DETAIL_CHARS: usize = 512;

/// Issue tracker backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubIssueTracker {
    http: reqwest::Client,
    api_base: String,
}

impl GitHubIssueTracker {
    /// Builds a client from `config`.
    ///
    /// A missing token is allowed: requests are then sent unauthenticated
    /// and the API rejects them.
    ///
    /// # Errors
    ///
    /// Returns [`IssueTrackerError::Transport`] when the headers are invalid
    /// or the HTTP client cannot be built.
    pub fn new(config: &GitHubClientConfig) -> IssueTrackerResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(IssueTrackerError::transport)?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        match config.token.as_deref() {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                    .map_err(IssueTrackerError::transport)?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                tracing::warn!("no GitHub token configured, requests will be unauthenticated");
            }
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(IssueTrackerError::transport)?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
        })
    }

    fn repo_url(&self, repository: &RepositoryRef, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{suffix}",
            self.api_base,
            repository.owner(),
            repository.name()
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> IssueTrackerResult<T> {
        let response = request.send().await.map_err(IssueTrackerError::transport)?;
        let status = response.status();
        if !status.is_success() {
            let detail: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_DETAIL_CHARS)
                .collect();
            return Err(IssueTrackerError::rejected(
                operation,
                status.as_u16(),
                detail,
            ));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| IssueTrackerError::decode(operation, err))
    }

    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> IssueTrackerResult<Vec<T>> {
        let per_page = PAGE_SIZE.to_string();
        let mut page = 1_u32;
        let mut rows = Vec::new();
        loop {
            let page_value = page.to_string();
            let request = self.http.get(url).query(query).query(&[
                ("per_page", per_page.as_str()),
                ("page", page_value.as_str()),
            ]);
            let chunk: Vec<T> = self.send(operation, request).await?;
            let chunk_len = chunk.len();
            rows.extend(chunk);
            if chunk_len < PAGE_SIZE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(rows)
    }
}

#[async_trait]
impl IssueTracker for GitHubIssueTracker {
    /// Lists open and closed issues in the order GitHub returns them, newest
    /// first.
    ///
    /// The endpoint also returns pull requests and they are kept. A pull
    /// request created after an issue with the same title is listed first,
    /// so title matching picks the pull request: deletion then closes the
    /// pull request and leaves the issue open, and body edits rewrite the
    /// pull request description.
    async fn list_issues(
        &self,
        repository: &RepositoryRef,
    ) -> IssueTrackerResult<Vec<RemoteIssue>> {
        const OPERATION: &str = "list issues";
        let url = self.repo_url(repository, "/issues");
        let payloads: Vec<IssuePayload> = self
            .get_all_pages(OPERATION, &url, &[("state", "all")])
            .await?;
        payloads
            .into_iter()
            .map(|payload| payload.into_remote(OPERATION))
            .collect()
    }

    async fn create_issue(
        &self,
        repository: &RepositoryRef,
        issue: &NewIssue,
    ) -> IssueTrackerResult<RemoteIssue> {
        const OPERATION: &str = "create issue";
        let url = self.repo_url(repository, "/issues");
        let payload: IssuePayload = self
            .send(OPERATION, self.http.post(url).json(issue))
            .await?;
        payload.into_remote(OPERATION)
    }

    async fn edit_issue(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
        edit: &IssueEdit,
    ) -> IssueTrackerResult<RemoteIssue> {
        const OPERATION: &str = "edit issue";
        let url = self.repo_url(repository, &format!("/issues/{number}"));
        let payload: IssuePayload = self
            .send(OPERATION, self.http.patch(url).json(edit))
            .await?;
        payload.into_remote(OPERATION)
    }

    async fn list_timeline(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
    ) -> IssueTrackerResult<Vec<TimelineEvent>> {
        let url = self.repo_url(repository, &format!("/issues/{number}/timeline"));
        let payloads: Vec<TimelineEventPayload> =
            self.get_all_pages("list timeline", &url, &[]).await?;
        Ok(payloads
            .into_iter()
            .filter_map(TimelineEventPayload::into_event)
            .collect())
    }
}
