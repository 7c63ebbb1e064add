use super::{CreateIssueRequest, PmAdapter, PmIssue, StateKind, WorkflowState};
use crate::error::{HodgeError, Result};
use crate::io;
use crate::paths;
use crate::types::{Phase, PmTool};
use chrono::Utc;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

static LOCAL_ISSUE_RE: OnceLock<Regex> = OnceLock::new();

fn local_issue_re() -> &'static Regex {
    LOCAL_ISSUE_RE.get_or_init(|| Regex::new(r"^HOD(GE)?-\d+$").unwrap())
}

const MIRROR_TEMPLATE: &str = r#"# Project Management

This file mirrors feature state for the hodge workflow. It is maintained
automatically; configured external PM tools sync from the same state.

## Implementation Phases

1. **Explore** - capture context, compare approaches, record decisions
2. **Build** - implement the chosen approach with smoke tests
3. **Harden** - integration tests, edge cases, production readiness
4. **Ship** - final quality checks, change log, release

## Dependencies Graph

```mermaid
graph TD
    hodge[hodge]
```

## Active Features

## Completed Features

## Backlog
"#;

// ---------------------------------------------------------------------------
// Section document model
// ---------------------------------------------------------------------------

/// Ordered `{heading, body}` view of the mirror file. Raw lines are kept
/// verbatim so untouched sections re-serialize byte-identically.
struct Document {
    preamble: String,
    sections: Vec<Section>,
}

struct Section {
    /// Full heading line including its newline, e.g. "## Active Features\n".
    heading: String,
    body: String,
}

impl Section {
    fn key(&self) -> &str {
        self.heading.trim_start_matches('#').trim()
    }
}

impl Document {
    fn parse(content: &str) -> Self {
        let mut preamble = String::new();
        let mut sections: Vec<Section> = Vec::new();
        for line in content.split_inclusive('\n') {
            if line.starts_with("## ") {
                sections.push(Section {
                    heading: line.to_string(),
                    body: String::new(),
                });
            } else if let Some(current) = sections.last_mut() {
                current.body.push_str(line);
            } else {
                preamble.push_str(line);
            }
        }
        Self { preamble, sections }
    }

    fn render(&self) -> String {
        let mut out = self.preamble.clone();
        for section in &self.sections {
            out.push_str(&section.heading);
            out.push_str(&section.body);
        }
        out
    }

    fn section_mut(&mut self, key: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.key() == key)
    }

    fn find_block(&self, id: &str) -> Option<(usize, usize, usize)> {
        for (i, section) in self.sections.iter().enumerate() {
            if let Some((start, end)) = block_range(&section.body, id) {
                return Some((i, start, end));
            }
        }
        None
    }
}

/// Byte range of the `### {id}:` block within a section body, from its header
/// line to the next `###` header or end of body.
fn block_range(body: &str, id: &str) -> Option<(usize, usize)> {
    let header = format!("### {id}:");
    let mut search_from = 0;
    loop {
        let rel = body[search_from..].find(&header)?;
        let start = search_from + rel;
        if start == 0 || body.as_bytes()[start - 1] == b'\n' {
            let end = body[start + header.len()..]
                .find("\n### ")
                .map(|p| start + header.len() + p + 1)
                .unwrap_or(body.len());
            return Some((start, end));
        }
        search_from = start + header.len();
    }
}

// ---------------------------------------------------------------------------
// LocalPmAdapter
// ---------------------------------------------------------------------------

/// The always-on adapter: a human-readable markdown mirror of feature state,
/// maintained regardless of external PM configuration.
///
/// Mutations on one instance are serialized through an internal lock, so
/// interleaved calls against the same file never race each other; a failed
/// operation does not stall later ones.
pub struct LocalPmAdapter {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalPmAdapter {
    pub fn new(root: &Path) -> Result<Self> {
        paths::validate_base_path(root)?;
        Ok(Self {
            path: paths::pm_mirror_path(root),
            write_lock: Mutex::new(()),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // A panic mid-write must not wedge every later mutation.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_document(&self) -> Result<Document> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            HodgeError::ReadState {
                path: self.path.to_string_lossy().into_owned(),
                source,
            }
        })?;
        Ok(Document::parse(&content))
    }

    fn write_document(&self, doc: &Document) -> Result<()> {
        io::atomic_write(&self.path, doc.render().as_bytes())
    }

    /// Create the mirror from the template only if it is absent.
    /// Never overwrites an existing file.
    pub fn init(&self) -> Result<()> {
        let _guard = self.lock();
        if let Some(parent) = self.path.parent() {
            io::ensure_dir(parent)?;
        }
        io::write_if_missing(&self.path, MIRROR_TEMPLATE.as_bytes())?;
        Ok(())
    }

    /// Append a feature block under "## Active Features". Idempotent: when
    /// the feature's header already exists anywhere, this is a no-op with a
    /// warning.
    pub fn add_feature(&self, id: &str, description: &str, phase: Option<Phase>) -> Result<()> {
        if id.trim().is_empty() {
            return Err(HodgeError::Validation(
                "feature ID must be a non-empty string".to_string(),
            ));
        }
        self.init()?;

        let _guard = self.lock();
        let mut doc = self.read_document()?;
        if doc.find_block(id).is_some() {
            tracing::warn!(feature = id, "feature already present in mirror, skipping");
            return Ok(());
        }

        let status = phase.unwrap_or(Phase::Explore).local_status();
        let date = Utc::now().format("%Y-%m-%d");
        let block = format!(
            "### {id}: {description}\n\n- **Status**: {status}\n- **Created**: {date}\n\n"
        );

        let section = doc
            .section_mut("Active Features")
            .ok_or_else(|| HodgeError::Validation(
                "mirror is missing the '## Active Features' section".to_string(),
            ))?;
        if !section.body.is_empty() && !section.body.ends_with('\n') {
            section.body.push('\n');
        }
        section.body.push_str(&block);
        self.write_document(&doc)
    }

    /// Apply a status change as three independent rewrites: phase-checklist
    /// markers, the block's `**Status**:` line, and (for "shipped") moving
    /// the whole block under "## Completed Features".
    pub fn update_feature_status(&self, id: &str, status: &str) -> Result<()> {
        if id.trim().is_empty() || status.trim().is_empty() {
            return Err(HodgeError::Validation(
                "feature ID and status must be non-empty strings".to_string(),
            ));
        }
        self.init()?;

        let _guard = self.lock();
        let mut doc = self.read_document()?;

        // (a) checklist markers in the phases section
        let marker = match status {
            "building" | "hardening" => Some("[~]"),
            "shipped" => Some("[x]"),
            "exploring" => Some("[ ]"),
            _ => None,
        };
        if let (Some(marker), Some(section)) = (marker, doc.section_mut("Implementation Phases")) {
            section.body = section
                .body
                .split_inclusive('\n')
                .map(|line| {
                    if line.contains(id) && line.trim_start().starts_with("- [") {
                        toggle_marker(line, marker)
                    } else {
                        line.to_string()
                    }
                })
                .collect();
        }

        // (b) the block's Status line
        if let Some((section_idx, start, end)) = doc.find_block(id) {
            let section = &mut doc.sections[section_idx];
            let block = section.body[start..end].to_string();
            let rewritten = rewrite_status_line(&block, status);
            section.body.replace_range(start..end, &rewritten);

            // (c) shipped blocks relocate to Completed Features
            if status == "shipped" && section.key() != "Completed Features" {
                let (_, start, end) = doc.find_block(id).unwrap_or((section_idx, start, end));
                let section = &mut doc.sections[section_idx];
                let mut block = section.body[start..end].to_string();
                section.body.replace_range(start..end, "");

                let date = Utc::now().format("%Y-%m-%d");
                if !block.ends_with('\n') {
                    block.push('\n');
                }
                let trimmed_len = block.trim_end_matches('\n').len();
                let completed_line = format!("- **Completed**: {date}\n");
                block = format!("{}\n{completed_line}\n", &block[..trimmed_len]);

                if let Some(done) = doc.section_mut("Completed Features") {
                    if !done.body.is_empty() && !done.body.ends_with('\n') {
                        done.body.push('\n');
                    }
                    done.body.push_str(&block);
                }
            }
        }

        self.write_document(&doc)
    }

    /// `(id, status)` for every feature block in the mirror.
    pub fn feature_statuses(&self) -> Result<Vec<(String, String)>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let doc = self.read_document()?;
        let mut out = Vec::new();
        for section in &doc.sections {
            for line in section.body.lines() {
                if let Some(rest) = line.strip_prefix("### ") {
                    if let Some((id, _)) = rest.split_once(':') {
                        let status = block_range(&section.body, id.trim())
                            .and_then(|(s, e)| parse_status_line(&section.body[s..e]))
                            .unwrap_or_default();
                        out.push((id.trim().to_string(), status));
                    }
                }
            }
        }
        Ok(out)
    }

    fn find_issue(&self, id: &str) -> Result<Option<PmIssue>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let doc = self.read_document()?;
        let Some((section_idx, start, end)) = doc.find_block(id) else {
            return Ok(None);
        };
        let block = &doc.sections[section_idx].body[start..end];
        Ok(Some(block_to_issue(id, block)))
    }
}

fn toggle_marker(line: &str, marker: &str) -> String {
    for existing in ["[ ]", "[~]", "[x]"] {
        if let Some(pos) = line.find(existing) {
            let mut out = line.to_string();
            out.replace_range(pos..pos + existing.len(), marker);
            return out;
        }
    }
    line.to_string()
}

fn rewrite_status_line(block: &str, status: &str) -> String {
    block
        .split_inclusive('\n')
        .map(|line| {
            if line.trim_start().starts_with("- **Status**:") {
                let newline = if line.ends_with('\n') { "\n" } else { "" };
                format!("- **Status**: {status}{newline}")
            } else {
                line.to_string()
            }
        })
        .collect()
}

fn parse_status_line(block: &str) -> Option<String> {
    block
        .lines()
        .find_map(|l| l.trim().strip_prefix("- **Status**:"))
        .map(|s| s.trim().to_string())
}

fn block_to_issue(id: &str, block: &str) -> PmIssue {
    let title = block
        .lines()
        .next()
        .and_then(|l| l.split_once(':'))
        .map(|(_, t)| t.trim().to_string())
        .unwrap_or_default();
    PmIssue {
        id: id.to_string(),
        title,
        state: parse_status_line(block),
        url: None,
    }
}

// ---------------------------------------------------------------------------
// PmAdapter impl
// ---------------------------------------------------------------------------

impl PmAdapter for LocalPmAdapter {
    fn tool(&self) -> PmTool {
        PmTool::Local
    }

    fn fetch_states(&self) -> Result<Vec<WorkflowState>> {
        Ok(vec![
            WorkflowState {
                id: "exploring".to_string(),
                name: "exploring".to_string(),
                kind: StateKind::Unstarted,
            },
            WorkflowState {
                id: "building".to_string(),
                name: "building".to_string(),
                kind: StateKind::Started,
            },
            WorkflowState {
                id: "hardening".to_string(),
                name: "hardening".to_string(),
                kind: StateKind::Started,
            },
            WorkflowState {
                id: "shipped".to_string(),
                name: "shipped".to_string(),
                kind: StateKind::Completed,
            },
        ])
    }

    fn get_issue(&self, id: &str) -> Result<PmIssue> {
        self.find_issue(id)?.ok_or_else(|| HodgeError::IssueNotFound {
            tool: "local".to_string(),
            id: id.to_string(),
        })
    }

    fn update_issue_state(&self, id: &str, state_id: &str) -> Result<()> {
        self.update_feature_status(id, state_id)
    }

    /// Substring match over the mirror's feature blocks, case-insensitive.
    fn search_issues(&self, query: &str) -> Result<Vec<PmIssue>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let doc = self.read_document()?;
        let needle = query.to_lowercase();
        let mut matches = Vec::new();
        for section in &doc.sections {
            for line in section.body.lines() {
                if let Some(rest) = line.strip_prefix("### ") {
                    if let Some((id, _)) = rest.split_once(':') {
                        let id = id.trim();
                        if let Some((start, end)) = block_range(&section.body, id) {
                            let block = &section.body[start..end];
                            if block.to_lowercase().contains(&needle) {
                                matches.push(block_to_issue(id, block));
                            }
                        }
                    }
                }
            }
        }
        Ok(matches)
    }

    fn create_issue(&self, req: &CreateIssueRequest) -> Result<PmIssue> {
        let id = req.local_id.as_deref().ok_or_else(|| {
            HodgeError::Validation("local adapter requires a local ID".to_string())
        })?;
        self.add_feature(id, &req.title, None)?;
        self.get_issue(id)
    }

    fn is_valid_issue_id(&self, id: &str) -> bool {
        local_issue_re().is_match(id.trim())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
