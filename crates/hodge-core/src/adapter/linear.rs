use super::{CreateIssueRequest, PmAdapter, PmIssue, StateKind, WorkflowState};
use crate::config::Credentials;
use crate::error::{HodgeError, Result};
use crate::types::PmTool;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.linear.app";

static LINEAR_ID_RE: OnceLock<Regex> = OnceLock::new();

fn linear_id_re() -> &'static Regex {
    LINEAR_ID_RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9]+-\d+$").unwrap())
}

// ---------------------------------------------------------------------------
// GraphQL envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TeamData {
    team: TeamNode,
}

#[derive(Debug, Deserialize)]
struct TeamNode {
    states: Nodes<StateNode>,
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StateNode {
    id: String,
    name: String,
    #[serde(rename = "type")]
    state_type: String,
}

#[derive(Debug, Deserialize)]
struct IssueData {
    issue: IssueNode,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "issueSearch")]
    issue_search: Nodes<IssueNode>,
}

#[derive(Debug, Deserialize)]
struct IssueNode {
    identifier: String,
    title: String,
    #[serde(default)]
    state: Option<StateName>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StateName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IssueUpdateData {
    #[serde(rename = "issueUpdate")]
    issue_update: MutationPayload,
}

#[derive(Debug, Deserialize)]
struct IssueCreateData {
    #[serde(rename = "issueCreate")]
    issue_create: CreatePayload,
}

#[derive(Debug, Deserialize)]
struct MutationPayload {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct CreatePayload {
    success: bool,
    issue: Option<IssueNode>,
}

// ---------------------------------------------------------------------------
// LinearAdapter
// ---------------------------------------------------------------------------

/// Linear GraphQL adapter. Team-scoped: workflow states and issue creation
/// require `LINEAR_TEAM_ID`.
pub struct LinearAdapter {
    client: reqwest::blocking::Client,
    api_key: String,
    team_id: Option<String>,
    base_url: String,
}

impl LinearAdapter {
    pub fn new(creds: Credentials) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: creds.api_key,
            team_id: creds.scope,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn team_id(&self) -> Result<&str> {
        self.team_id
            .as_deref()
            .ok_or_else(|| HodgeError::MissingCredentials {
                tool: "linear".to_string(),
                var: "LINEAR_TEAM_ID".to_string(),
            })
    }

    fn graphql<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(format!("{}/graphql", self.base_url))
            .header("Authorization", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(HodgeError::PmApi {
                tool: "linear".to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let envelope: GraphQlResponse<T> = response.json()?;
        if let Some(err) = envelope.errors.first() {
            return Err(HodgeError::PmApi {
                tool: "linear".to_string(),
                message: err.message.clone(),
            });
        }
        envelope.data.ok_or_else(|| HodgeError::PmApi {
            tool: "linear".to_string(),
            message: "empty response data".to_string(),
        })
    }
}

fn state_kind(state_type: &str) -> StateKind {
    match state_type {
        "started" => StateKind::Started,
        "completed" | "canceled" => StateKind::Completed,
        _ => StateKind::Unstarted,
    }
}

fn to_issue(node: IssueNode) -> PmIssue {
    PmIssue {
        id: node.identifier,
        title: node.title,
        state: node.state.map(|s| s.name),
        url: node.url,
    }
}

impl PmAdapter for LinearAdapter {
    fn tool(&self) -> PmTool {
        PmTool::Linear
    }

    fn fetch_states(&self) -> Result<Vec<WorkflowState>> {
        let team_id = self.team_id()?;
        let data: TeamData = self.graphql(
            "query($teamId: String!) { team(id: $teamId) { states { nodes { id name type } } } }",
            json!({ "teamId": team_id }),
        )?;
        Ok(data
            .team
            .states
            .nodes
            .into_iter()
            .map(|s| WorkflowState {
                kind: state_kind(&s.state_type),
                id: s.id,
                name: s.name,
            })
            .collect())
    }

    fn get_issue(&self, id: &str) -> Result<PmIssue> {
        let data: IssueData = self.graphql(
            "query($id: String!) { issue(id: $id) { identifier title state { name } url } }",
            json!({ "id": id }),
        )?;
        Ok(to_issue(data.issue))
    }

    fn update_issue_state(&self, id: &str, state_id: &str) -> Result<()> {
        let data: IssueUpdateData = self.graphql(
            "mutation($id: String!, $stateId: String!) { \
             issueUpdate(id: $id, input: { stateId: $stateId }) { success } }",
            json!({ "id": id, "stateId": state_id }),
        )?;
        if !data.issue_update.success {
            return Err(HodgeError::PmApi {
                tool: "linear".to_string(),
                message: format!("issueUpdate rejected for {id}"),
            });
        }
        Ok(())
    }

    fn search_issues(&self, query: &str) -> Result<Vec<PmIssue>> {
        let data: SearchData = self.graphql(
            "query($query: String!) { issueSearch(query: $query) \
             { nodes { identifier title state { name } url } } }",
            json!({ "query": query }),
        )?;
        Ok(data.issue_search.nodes.into_iter().map(to_issue).collect())
    }

    fn create_issue(&self, req: &CreateIssueRequest) -> Result<PmIssue> {
        let team_id = self.team_id()?;
        let mut input = json!({
            "teamId": team_id,
            "title": req.title,
            "description": req.description,
        });
        if let Some(parent) = &req.parent_id {
            input["parentId"] = json!(parent);
        }
        let data: IssueCreateData = self.graphql(
            "mutation($input: IssueCreateInput!) { issueCreate(input: $input) \
             { success issue { identifier title state { name } url } } }",
            json!({ "input": input }),
        )?;
        if !data.issue_create.success {
            return Err(HodgeError::PmApi {
                tool: "linear".to_string(),
                message: "issueCreate rejected".to_string(),
            });
        }
        let issue = data.issue_create.issue.ok_or_else(|| HodgeError::PmApi {
            tool: "linear".to_string(),
            message: "issueCreate returned no issue".to_string(),
        })?;
        Ok(to_issue(issue))
    }

    fn is_valid_issue_id(&self, id: &str) -> bool {
        linear_id_re().is_match(id.trim())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
