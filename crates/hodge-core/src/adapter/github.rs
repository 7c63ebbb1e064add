use super::{CreateIssueRequest, PmAdapter, PmIssue, StateKind, WorkflowState};
use crate::config::Credentials;
use crate::error::{HodgeError, Result};
use crate::types::PmTool;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.github.com";

static GITHUB_ISSUE_RE: OnceLock<Regex> = OnceLock::new();

fn github_issue_re() -> &'static Regex {
    GITHUB_ISSUE_RE.get_or_init(|| Regex::new(r"^#?\d+$").unwrap())
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    number: u64,
    title: String,
    state: String,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    items: Vec<IssuePayload>,
}

// ---------------------------------------------------------------------------
// GithubAdapter
// ---------------------------------------------------------------------------

/// GitHub Issues REST adapter, scoped to one `owner/repo`. GitHub has no
/// workflow-state scheme, so the binary open/closed vocabulary is exposed as
/// two synthetic states.
pub struct GithubAdapter {
    client: reqwest::blocking::Client,
    token: String,
    repo: Option<String>,
    base_url: String,
}

impl GithubAdapter {
    pub fn new(creds: Credentials) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            token: creds.api_key,
            repo: creds.scope,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn repo(&self) -> Result<&str> {
        self.repo
            .as_deref()
            .ok_or_else(|| HodgeError::MissingCredentials {
                tool: "github".to_string(),
                var: "GITHUB_REPO".to_string(),
            })
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::blocking::Response> {
        let mut req = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "hodge");
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send()?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HodgeError::IssueNotFound {
                tool: "github".to_string(),
                id: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(HodgeError::PmApi {
                tool: "github".to_string(),
                message: format!("HTTP {status} for {path}"),
            });
        }
        Ok(response)
    }
}

fn issue_number(id: &str) -> Result<u64> {
    id.trim()
        .trim_start_matches('#')
        .parse()
        .map_err(|_| HodgeError::Validation(format!("not a GitHub issue number: {id}")))
}

fn to_issue(payload: IssuePayload) -> PmIssue {
    PmIssue {
        id: format!("#{}", payload.number),
        title: payload.title,
        state: Some(payload.state),
        url: payload.html_url,
    }
}

impl PmAdapter for GithubAdapter {
    fn tool(&self) -> PmTool {
        PmTool::Github
    }

    fn fetch_states(&self) -> Result<Vec<WorkflowState>> {
        Ok(vec![
            WorkflowState {
                id: "open".to_string(),
                name: "Open".to_string(),
                kind: StateKind::Started,
            },
            WorkflowState {
                id: "closed".to_string(),
                name: "Closed".to_string(),
                kind: StateKind::Completed,
            },
        ])
    }

    fn get_issue(&self, id: &str) -> Result<PmIssue> {
        let repo = self.repo()?;
        let number = issue_number(id)?;
        let response = self.request(
            reqwest::Method::GET,
            &format!("/repos/{repo}/issues/{number}"),
            &[],
            None,
        )?;
        Ok(to_issue(response.json()?))
    }

    fn update_issue_state(&self, id: &str, state_id: &str) -> Result<()> {
        let repo = self.repo()?;
        let number = issue_number(id)?;
        // Anything that isn't the closed state keeps the issue open.
        let state = if state_id.eq_ignore_ascii_case("closed") {
            "closed"
        } else {
            "open"
        };
        self.request(
            reqwest::Method::PATCH,
            &format!("/repos/{repo}/issues/{number}"),
            &[],
            Some(json!({ "state": state })),
        )?;
        Ok(())
    }

    fn search_issues(&self, query: &str) -> Result<Vec<PmIssue>> {
        let repo = self.repo()?;
        let q = format!("{query} repo:{repo} is:issue");
        let response = self.request(
            reqwest::Method::GET,
            "/search/issues",
            &[("q", q.as_str())],
            None,
        )?;
        let payload: SearchPayload = response.json()?;
        Ok(payload.items.into_iter().map(to_issue).collect())
    }

    fn create_issue(&self, req: &CreateIssueRequest) -> Result<PmIssue> {
        let repo = self.repo()?;
        // GitHub issues have no native parent link; epic children reference
        // their parent in the body instead.
        let body = match &req.parent_id {
            Some(parent) => format!("{}\n\nParent: {parent}", req.description),
            None => req.description.clone(),
        };
        let response = self.request(
            reqwest::Method::POST,
            &format!("/repos/{repo}/issues"),
            &[],
            Some(json!({ "title": req.title, "body": body })),
        )?;
        Ok(to_issue(response.json()?))
    }

    fn is_valid_issue_id(&self, id: &str) -> bool {
        github_issue_re().is_match(id.trim())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
