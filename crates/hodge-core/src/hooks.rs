use crate::adapter::{
    map_to_linear_state, resolve_adapter, CreateIssueRequest, LocalPmAdapter,
};
use crate::config::{env_vars_for, Config, Credentials};
use crate::error::{HodgeError, Result};
use crate::id::IdManager;
use crate::queue::{RetryEntry, RetryQueue};
use crate::types::{Phase, PmTool, Verbosity};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// What a command knows about a feature at ship time. Everything is optional;
/// the comment generator uses whatever is present.
#[derive(Debug, Clone, Default)]
pub struct ShipContext {
    pub decisions: Vec<String>,
    pub patterns: Vec<String>,
    pub tests_passed: Option<u32>,
    pub coverage: Option<u8>,
    pub commit: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PhaseProgress {
    pub total: usize,
    pub shipped: usize,
}

impl PhaseProgress {
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            (self.shipped * 100 / self.total) as u32
        }
    }
}

/// Advisory result of an external issue-creation attempt. Never an error:
/// failures are queued for retry and reported here.
#[derive(Debug, Clone, Serialize)]
pub struct IssueCreation {
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct QueueOutcome {
    pub attempted: usize,
    pub succeeded: usize,
}

fn debug_enabled(var: &str) -> bool {
    std::env::var(var).map(|v| !v.is_empty() && v != "0").unwrap_or(false)
}

// ---------------------------------------------------------------------------
// PmHooks
// ---------------------------------------------------------------------------

/// Orchestration facade called by workflow commands at fixed lifecycle
/// points. Each hook updates the local mirror synchronously and durably,
/// then fires a detached external-sync attempt whose failure never reaches
/// the caller.
pub struct PmHooks {
    root: PathBuf,
    config: Config,
    local: LocalPmAdapter,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl PmHooks {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let root = root.into();
        let local = LocalPmAdapter::new(&root)?;
        Ok(Self {
            root,
            config,
            local,
            background: Mutex::new(Vec::new()),
        })
    }

    pub fn local(&self) -> &LocalPmAdapter {
        &self.local
    }

    // -----------------------------------------------------------------------
    // Lifecycle hooks
    // -----------------------------------------------------------------------

    pub fn on_explore(&self, feature: &str) -> Result<()> {
        self.on_phase(feature, Phase::Explore)
    }

    pub fn on_build(&self, feature: &str) -> Result<()> {
        self.on_phase(feature, Phase::Build)
    }

    pub fn on_harden(&self, feature: &str) -> Result<()> {
        self.on_phase(feature, Phase::Harden)
    }

    /// Ship hook: local update like the other phases, plus project-wide
    /// progress recomputation and, given a ship context, a verbosity-tiered
    /// comment body for the external tool.
    pub fn on_ship(&self, feature: &str, ctx: Option<&ShipContext>) -> Result<Option<String>> {
        self.on_phase(feature, Phase::Ship)?;
        let Some(ctx) = ctx else {
            return Ok(None);
        };
        let progress = self.phase_progress()?;
        Ok(Some(generate_ship_comment(
            feature,
            ctx,
            progress,
            self.config.pm.verbosity,
        )))
    }

    fn on_phase(&self, feature: &str, phase: Phase) -> Result<()> {
        let ids = IdManager::new(&self.root)?;
        let name = ids
            .resolve_id(feature)?
            .map(|f| f.name)
            .unwrap_or_else(|| feature.to_string());

        // Local mirror first: synchronous and durable.
        self.local.add_feature(feature, &name, Some(phase))?;
        self.local
            .update_feature_status(feature, phase.local_status())?;

        // External sync runs detached; its failure never reaches the caller.
        self.spawn_external_sync(feature, phase);
        Ok(())
    }

    /// Shipped-vs-total across every feature block in the mirror.
    pub fn phase_progress(&self) -> Result<PhaseProgress> {
        let statuses = self.local.feature_statuses()?;
        let total = statuses.len();
        let shipped = statuses.iter().filter(|(_, s)| s == "shipped").count();
        Ok(PhaseProgress { total, shipped })
    }

    // -----------------------------------------------------------------------
    // External sync
    // -----------------------------------------------------------------------

    fn spawn_external_sync(&self, feature: &str, phase: Phase) {
        // Local-only projects never pay for a background thread.
        if self.config.pm.tool.is_none() {
            return;
        }
        let root = self.root.clone();
        let config = self.config.clone();
        let feature = feature.to_string();
        let handle = std::thread::spawn(move || {
            update_external_silently(&root, &config, &feature, phase);
        });
        self.background
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(handle);
    }

    /// Best-effort-await outstanding background syncs for up to `grace`.
    /// Syncs still running afterwards stay detached: a process that exits
    /// without draining can race an in-flight sync (accepted limitation).
    pub fn drain(&self, grace: Duration) {
        let deadline = Instant::now() + grace;
        loop {
            let mut handles = self.background.lock().unwrap_or_else(|e| e.into_inner());
            let mut pending = Vec::new();
            for handle in handles.drain(..) {
                if handle.is_finished() {
                    let _ = handle.join();
                } else {
                    pending.push(handle);
                }
            }
            let done = pending.is_empty();
            *handles = pending;
            drop(handles);
            if done || Instant::now() >= deadline {
                return;
            }
            std::thread::sleep(Duration::from_millis(25));
        }
    }

    // -----------------------------------------------------------------------
    // Issue creation and retry
    // -----------------------------------------------------------------------

    /// Attempt external issue creation (and child issues for epics). Any
    /// failure appends a retry-queue record and comes back as advisory data
    /// — this method never fails.
    pub fn create_pm_issue(
        &self,
        feature: &str,
        decisions: &[String],
        is_epic: bool,
    ) -> IssueCreation {
        match self.try_create_issue(feature, decisions, is_epic) {
            Ok(issue_id) => IssueCreation {
                created: true,
                issue_id: Some(issue_id),
                error: None,
            },
            Err(e) => {
                match RetryQueue::new(&self.root) {
                    Ok(queue) => {
                        if let Err(qe) = queue.push(RetryEntry::create_issue(
                            feature, decisions, is_epic,
                        )) {
                            tracing::warn!("could not queue PM retry: {qe}");
                        }
                    }
                    Err(qe) => tracing::warn!("could not open PM retry queue: {qe}"),
                }
                IssueCreation {
                    created: false,
                    issue_id: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn try_create_issue(
        &self,
        feature: &str,
        decisions: &[String],
        is_epic: bool,
    ) -> Result<String> {
        let tool = self
            .config
            .pm
            .tool
            .ok_or_else(|| HodgeError::UnsupportedTool("no PM tool configured".to_string()))?;
        let (key_var, _) = env_vars_for(tool)
            .ok_or_else(|| HodgeError::UnsupportedTool(tool.to_string()))?;
        let creds =
            Credentials::from_env(tool).ok_or_else(|| HodgeError::MissingCredentials {
                tool: tool.to_string(),
                var: key_var.to_string(),
            })?;
        let adapter = resolve_adapter(tool, &creds, self.config.pm.api_base.as_deref())?;

        let ids = IdManager::new(&self.root)?;
        let mapped = ids
            .resolve_id(feature)?
            .ok_or_else(|| HodgeError::FeatureNotFound(feature.to_string()))?;

        let description = render_decisions(decisions);
        let parent = adapter.create_issue(&CreateIssueRequest {
            title: format!("{}: {}", mapped.local_id, mapped.name),
            description,
            local_id: Some(mapped.local_id.clone()),
            parent_id: None,
        })?;
        ids.map_feature(&mapped.local_id, &parent.id, tool)?;

        if is_epic {
            for sub in ids.get_sub_issues(&mapped.local_id)? {
                let child = adapter.create_issue(&CreateIssueRequest {
                    title: format!("{}: {}", sub.local_id, sub.name),
                    description: String::new(),
                    local_id: Some(sub.local_id.clone()),
                    parent_id: Some(parent.id.clone()),
                })?;
                ids.map_feature(&sub.local_id, &child.id, tool)?;
            }
        }
        Ok(parent.id)
    }

    /// Replay the retry queue: each entry gets exactly one attempt per call.
    /// Successes are removed, failures stay for the next invocation. An
    /// absent queue file is a no-op.
    pub fn process_queue(&self) -> Result<QueueOutcome> {
        let queue = RetryQueue::new(&self.root)?;
        if !queue.exists() {
            return Ok(QueueOutcome::default());
        }

        let entries = queue.load()?;
        let attempted = entries.len();
        let mut succeeded = 0;
        let mut remaining = Vec::new();
        for entry in entries {
            match entry.entry_type.as_str() {
                "create_issue" => {
                    match self.try_create_issue(&entry.feature, &entry.decisions, entry.is_epic)
                    {
                        Ok(_) => succeeded += 1,
                        Err(e) => {
                            tracing::debug!(feature = %entry.feature, "retry failed: {e}");
                            remaining.push(entry);
                        }
                    }
                }
                other => {
                    tracing::warn!("unknown retry entry type '{other}', keeping");
                    remaining.push(entry);
                }
            }
        }
        queue.replace(&remaining)?;
        Ok(QueueOutcome {
            attempted,
            succeeded,
        })
    }
}

// ---------------------------------------------------------------------------
// External sync (detached side)
// ---------------------------------------------------------------------------

/// Push a phase transition to the configured external tool, swallowing every
/// failure. This is the single boundary third-party errors cannot cross;
/// visibility is opt-in via `HODGE_DEBUG` and `HODGE_DEBUG_PM`.
pub fn update_external_silently(root: &Path, config: &Config, feature: &str, phase: Phase) {
    let Some(tool) = config.pm.tool else {
        return;
    };
    let Some(creds) = Credentials::from_env(tool) else {
        if debug_enabled("HODGE_DEBUG") {
            tracing::debug!(tool = %tool, "external sync skipped: credentials not set");
        }
        return;
    };

    let status = config.pm.status_for(phase);
    if let Err(e) = call_pm_adapter(
        root,
        tool,
        &creds,
        config.pm.api_base.as_deref(),
        feature,
        &status,
    ) {
        if debug_enabled("HODGE_DEBUG") {
            tracing::debug!("external PM sync failed: {e}");
        }
        if debug_enabled("HODGE_DEBUG_PM") {
            tracing::debug!(
                tool = %tool,
                feature,
                status = %status,
                "external PM sync failure detail: {e:?}"
            );
        }
    }
}

/// Resolve the feature's external ID and move it to the reconciled remote
/// state. Features with no external link are a quiet no-op.
pub fn call_pm_adapter(
    root: &Path,
    tool: PmTool,
    creds: &Credentials,
    api_base: Option<&str>,
    feature: &str,
    status: &str,
) -> Result<()> {
    let adapter = resolve_adapter(tool, creds, api_base)?;
    let ids = IdManager::new(root)?;
    let Some(mapped) = ids.resolve_id(feature)? else {
        return Ok(());
    };
    let Some(external) = mapped.external_id.clone() else {
        return Ok(());
    };

    let states = adapter.fetch_states()?;
    let state = match tool {
        PmTool::Linear => map_to_linear_state(&states, status),
        _ => states
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(status))
            .or_else(|| map_to_linear_state(&states, status)),
    };
    let Some(state) = state else {
        return Ok(());
    };
    adapter.update_issue_state(&external, &state.id)?;
    ids.map_feature(&mapped.local_id, &external, tool)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Ship comment
// ---------------------------------------------------------------------------

fn render_decisions(decisions: &[String]) -> String {
    if decisions.is_empty() {
        return String::new();
    }
    let mut out = String::from("## Decisions\n");
    for d in decisions {
        out.push_str(&format!("- {d}\n"));
    }
    out
}

/// Build the ship comment body at the configured verbosity tier.
pub fn generate_ship_comment(
    feature: &str,
    ctx: &ShipContext,
    progress: PhaseProgress,
    verbosity: Verbosity,
) -> String {
    let mut out = format!("Shipped {feature}");
    if verbosity == Verbosity::Minimal {
        return out;
    }

    out.push_str(&format!(
        "\n\nProject progress: {}/{} features shipped ({}%)",
        progress.shipped,
        progress.total,
        progress.percent()
    ));
    if let Some(tests) = ctx.tests_passed {
        out.push_str(&format!("\nTests passed: {tests}"));
    }
    if let Some(coverage) = ctx.coverage {
        out.push_str(&format!("\nCoverage: {coverage}%"));
    }
    if verbosity == Verbosity::Essential {
        return out;
    }

    if !ctx.decisions.is_empty() {
        out.push_str("\n\n## Decisions\n");
        for d in &ctx.decisions {
            out.push_str(&format!("- {d}\n"));
        }
    }
    if !ctx.patterns.is_empty() {
        out.push_str("\n## Patterns\n");
        for p in &ctx.patterns {
            out.push_str(&format!("- {p}\n"));
        }
    }
    if let Some(commit) = &ctx.commit {
        out.push_str(&format!("\nCommit: {commit}"));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
