//! Uniform capability surface over heterogeneous PM tools.
//!
//! Each adapter hides one tool's state vocabulary (Linear's typed workflow
//! states, GitHub's open/closed binary, the local markdown mirror) and its
//! issue-ID grammar behind the same six operations.

pub mod github;
pub mod linear;
pub mod local;

pub use github::GithubAdapter;
pub use linear::LinearAdapter;
pub use local::LocalPmAdapter;

use crate::config::Credentials;
use crate::error::{HodgeError, Result};
use crate::types::PmTool;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Coarse state bucket shared by all tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Unstarted,
    Started,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    pub kind: StateKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmIssue {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateIssueRequest {
    pub title: String,
    pub description: String,
    /// Local canonical ID, when known. Required by the local adapter;
    /// external adapters use it only for correlation.
    pub local_id: Option<String>,
    /// External parent issue ID for epic children, on tools that support it.
    pub parent_id: Option<String>,
}

// ---------------------------------------------------------------------------
// PmAdapter
// ---------------------------------------------------------------------------

pub trait PmAdapter {
    fn tool(&self) -> PmTool;

    /// Workflow states available in the tool, in the tool's own order.
    fn fetch_states(&self) -> Result<Vec<WorkflowState>>;

    fn get_issue(&self, id: &str) -> Result<PmIssue>;

    fn update_issue_state(&self, id: &str, state_id: &str) -> Result<()>;

    fn search_issues(&self, query: &str) -> Result<Vec<PmIssue>>;

    fn create_issue(&self, req: &CreateIssueRequest) -> Result<PmIssue>;

    /// Whether `id` matches this tool's issue-ID grammar.
    fn is_valid_issue_id(&self, id: &str) -> bool;
}

/// Build the adapter for a configured external tool.
/// `api_base` overrides the tool's default API endpoint (tests, self-hosted).
pub fn resolve_adapter(
    tool: PmTool,
    creds: &Credentials,
    api_base: Option<&str>,
) -> Result<Box<dyn PmAdapter>> {
    match tool {
        PmTool::Linear => {
            let mut adapter = LinearAdapter::new(creds.clone());
            if let Some(base) = api_base {
                adapter = adapter.with_base_url(base);
            }
            Ok(Box::new(adapter))
        }
        PmTool::Github => {
            let mut adapter = GithubAdapter::new(creds.clone());
            if let Some(base) = api_base {
                adapter = adapter.with_base_url(base);
            }
            Ok(Box::new(adapter))
        }
        other => Err(HodgeError::UnsupportedTool(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Status reconciliation
// ---------------------------------------------------------------------------

/// Map a project status word to a coarse bucket, when recognizable.
pub fn status_bucket(status: &str) -> Option<StateKind> {
    match status.trim().to_lowercase().as_str() {
        "backlog" | "to do" | "todo" | "triage" | "exploring" => Some(StateKind::Unstarted),
        "in progress" | "in review" | "started" | "building" | "hardening" => {
            Some(StateKind::Started)
        }
        "done" | "completed" | "closed" | "shipped" => Some(StateKind::Completed),
        _ => None,
    }
}

/// Reconcile a desired status against the remote tool's actual states.
///
/// Exact case-insensitive name match first; else the first remote state in
/// the status's coarse bucket; else the tool's first defined state. Returns
/// None only when the tool reports no states at all — an unmapped status is
/// never an error.
pub fn map_to_linear_state<'a>(
    states: &'a [WorkflowState],
    status: &str,
) -> Option<&'a WorkflowState> {
    if let Some(exact) = states.iter().find(|s| s.name.eq_ignore_ascii_case(status)) {
        return Some(exact);
    }
    if let Some(kind) = status_bucket(status) {
        if let Some(bucketed) = states.iter().find(|s| s.kind == kind) {
            return Some(bucketed);
        }
    }
    states.first()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn states() -> Vec<WorkflowState> {
        vec![
            WorkflowState {
                id: "s1".into(),
                name: "Backlog".into(),
                kind: StateKind::Unstarted,
            },
            WorkflowState {
                id: "s2".into(),
                name: "In Progress".into(),
                kind: StateKind::Started,
            },
            WorkflowState {
                id: "s3".into(),
                name: "Done".into(),
                kind: StateKind::Completed,
            },
        ]
    }

    #[test]
    fn exact_name_match_wins() {
        let states = states();
        let s = map_to_linear_state(&states, "in progress").unwrap();
        assert_eq!(s.id, "s2");
    }

    #[test]
    fn bucket_match_when_name_unknown() {
        let states = states();
        // "In Review" is not a remote state; its bucket is Started.
        let s = map_to_linear_state(&states, "In Review").unwrap();
        assert_eq!(s.id, "s2");
    }

    #[test]
    fn falls_back_to_first_state() {
        let states = states();
        let s = map_to_linear_state(&states, "Totally Custom").unwrap();
        assert_eq!(s.id, "s1");
    }

    #[test]
    fn no_states_is_none_not_error() {
        assert!(map_to_linear_state(&[], "Done").is_none());
    }

    #[test]
    fn resolve_adapter_unsupported_tool() {
        let creds = Credentials {
            api_key: "k".into(),
            scope: None,
        };
        assert!(matches!(
            resolve_adapter(PmTool::Jira, &creds, None),
            Err(HodgeError::UnsupportedTool(_))
        ));
    }
}
