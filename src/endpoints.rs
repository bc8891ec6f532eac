//! Request builders for commonly used GitHub REST endpoints.
//!
//! These only shape the [`Request`]; responses are returned as generic
//! [`crate::ApiResponse`] values.

use crate::Request;

/// Parameters for `GET /search/repositories`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchRepositories {
    pub q: String,
    /// `stars`, `forks`, `help-wanted-issues` or `updated`.
    pub sort: Option<String>,
    /// `asc` or `desc`.
    pub order: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SearchRepositories {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Self::default()
        }
    }
}

/// Filters for `GET /repos/{owner}/{repo}/commits`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitFilter {
    pub sha: Option<String>,
    pub path: Option<String>,
    pub author: Option<String>,
    pub per_page: Option<u32>,
}

pub fn search_repositories(params: &SearchRepositories) -> Request {
    Request::get("/search/repositories")
        .query("q", params.q.as_str())
        .query_opt("sort", params.sort.clone())
        .query_opt("order", params.order.clone())
        .query_opt("page", params.page)
        .query_opt("per_page", params.per_page)
        .build()
}

pub fn list_commits(owner: &str, repo: &str, filter: &CommitFilter) -> Request {
    Request::get(format!("/repos/{owner}/{repo}/commits"))
        .query_opt("sha", filter.sha.clone())
        .query_opt("path", filter.path.clone())
        .query_opt("author", filter.author.clone())
        .query_opt("per_page", filter.per_page)
        .build()
}

/// File or directory contents. An empty `path` lists the repository root.
pub fn get_contents(owner: &str, repo: &str, path: &str, git_ref: Option<&str>) -> Request {
    let path = path.trim_matches('/');
    Request::get(format!("/repos/{owner}/{repo}/contents/{path}"))
        .query_opt("ref", git_ref)
        .build()
}

pub fn rate_limit() -> Request {
    Request::get("/rate_limit").build()
}
