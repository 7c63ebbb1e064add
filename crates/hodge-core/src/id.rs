use crate::error::{HodgeError, Result};
use crate::io;
use crate::paths;
use crate::types::PmTool;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Prefix for locally issued canonical IDs.
pub const ID_PREFIX: &str = "HODGE";

/// Team prefixes treated as Linear identifiers by `detect_pm_tool`.
/// Correlation aid only — never used to validate or reject an ID.
const LINEAR_PREFIXES: &[&str] = &["HOD", "HODGE", "LIN", "ENG", "TEAM"];

// ---------------------------------------------------------------------------
// FeatureId
// ---------------------------------------------------------------------------

/// One entry in the dual-identifier graph: a canonical local ID plus an
/// optional opaque external-tool ID, with a one-level epic/sub-issue link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureId {
    pub local_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm_tool: Option<PmTool>,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<String>,
    #[serde(default)]
    pub is_epic: bool,
}

impl FeatureId {
    fn new(local_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            local_id: local_id.into(),
            name: name.into(),
            external_id: None,
            pm_tool: None,
            created: Utc::now(),
            last_synced: None,
            parent_id: None,
            child_ids: Vec::new(),
            is_epic: false,
        }
    }

    pub fn is_sub_issue(&self) -> bool {
        self.parent_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// IdCounter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdCounter {
    current: u64,
    last_updated: DateTime<Utc>,
}

impl Default for IdCounter {
    fn default() -> Self {
        Self {
            current: 0,
            last_updated: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// PM tool inference
// ---------------------------------------------------------------------------

static TEAM_ID_RE: OnceLock<Regex> = OnceLock::new();
static JIRA_ID_RE: OnceLock<Regex> = OnceLock::new();
static GITHUB_ID_RE: OnceLock<Regex> = OnceLock::new();
static GITLAB_ID_RE: OnceLock<Regex> = OnceLock::new();
static AZURE_ID_RE: OnceLock<Regex> = OnceLock::new();
static LOCAL_ID_RE: OnceLock<Regex> = OnceLock::new();

fn local_id_re() -> &'static Regex {
    LOCAL_ID_RE.get_or_init(|| Regex::new(&format!(r"^{ID_PREFIX}-\d+(\.\d+)?$")).unwrap())
}

/// Returns true if `id` has the shape of a locally issued ID
/// (`HODGE-NNN` or `HODGE-NNN.M`).
pub fn is_local_id(id: &str) -> bool {
    local_id_re().is_match(id)
}

/// Infer which PM tool an external ID belongs to from its shape.
///
/// Heuristic and intentionally lossy: `AB-12` could be Linear or Jira, and
/// GitLab issue references (`#123`) are indistinguishable from GitHub's, so
/// GitLab only wins the `!123` merge-request form. An explicitly recorded
/// `pm_tool` always takes precedence over re-inference.
pub fn detect_pm_tool(external_id: &str) -> PmTool {
    let id = external_id.trim();

    let team_re =
        TEAM_ID_RE.get_or_init(|| Regex::new(r"^([A-Za-z]{2,})-\d+$").unwrap());
    if let Some(caps) = team_re.captures(id) {
        let prefix = caps[1].to_uppercase();
        if LINEAR_PREFIXES.contains(&prefix.as_str()) {
            return PmTool::Linear;
        }
    }

    let jira_re =
        JIRA_ID_RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*-\d+$").unwrap());
    if jira_re.is_match(id) {
        return PmTool::Jira;
    }

    let github_re = GITHUB_ID_RE.get_or_init(|| Regex::new(r"^#\d+$").unwrap());
    if github_re.is_match(id) {
        return PmTool::Github;
    }

    let gitlab_re = GITLAB_ID_RE.get_or_init(|| Regex::new(r"^!\d+$").unwrap());
    if gitlab_re.is_match(id) {
        return PmTool::Gitlab;
    }

    let azure_re = AZURE_ID_RE.get_or_init(|| Regex::new(r"^\d+$").unwrap());
    if azure_re.is_match(id) {
        return PmTool::Azure;
    }

    PmTool::Unknown
}

// ---------------------------------------------------------------------------
// IdManager
// ---------------------------------------------------------------------------

type Mappings = BTreeMap<String, FeatureId>;

/// Allocates, links, and resolves feature IDs against two JSON files under
/// `.hodge/`. Every call re-reads from disk — no cross-call cache, so
/// independent short-lived invocations always see the latest state. Not safe
/// against true concurrent writers (last write wins).
pub struct IdManager {
    root: PathBuf,
}

impl IdManager {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        paths::validate_base_path(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // -----------------------------------------------------------------------
    // Storage
    // -----------------------------------------------------------------------

    fn load_mappings(&self) -> Result<Mappings> {
        let path = paths::id_mappings_path(&self.root);
        if !path.exists() {
            return Ok(Mappings::new());
        }
        let data = std::fs::read_to_string(&path).map_err(|source| HodgeError::ReadState {
            path: path.to_string_lossy().into_owned(),
            source,
        })?;
        let mappings: Mappings = serde_json::from_str(&data)?;
        Ok(mappings)
    }

    fn save_mappings(&self, mappings: &Mappings) -> Result<()> {
        let path = paths::id_mappings_path(&self.root);
        let data = serde_json::to_string_pretty(mappings)?;
        io::atomic_write(&path, data.as_bytes())
    }

    fn load_counter(&self) -> Result<IdCounter> {
        let path = paths::id_counter_path(&self.root);
        if !path.exists() {
            return Ok(IdCounter::default());
        }
        let data = std::fs::read_to_string(&path).map_err(|source| HodgeError::ReadState {
            path: path.to_string_lossy().into_owned(),
            source,
        })?;
        let counter: IdCounter = serde_json::from_str(&data)?;
        Ok(counter)
    }

    fn save_counter(&self, counter: &IdCounter) -> Result<()> {
        let path = paths::id_counter_path(&self.root);
        let data = serde_json::to_string_pretty(counter)?;
        io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Creation and linking
    // -----------------------------------------------------------------------

    /// Allocate the next sequential local ID for a new feature. The counter
    /// is persisted before the ID is handed out, so no ID is ever issued
    /// twice, even across restarts.
    pub fn create_feature(&self, name: &str, external_id: Option<&str>) -> Result<FeatureId> {
        if name.trim().is_empty() {
            return Err(HodgeError::Validation(
                "feature name must be a non-empty string".to_string(),
            ));
        }
        if let Some(ext) = external_id {
            if ext.trim().is_empty() {
                return Err(HodgeError::Validation(
                    "external ID must be a non-empty string".to_string(),
                ));
            }
        }

        let mut counter = self.load_counter()?;
        counter.current += 1;
        counter.last_updated = Utc::now();
        self.save_counter(&counter)?;

        let local_id = format!("{}-{:03}", ID_PREFIX, counter.current);
        let mut feature = FeatureId::new(&local_id, name);
        if let Some(ext) = external_id {
            let ext = ext.trim().to_string();
            feature.pm_tool = Some(detect_pm_tool(&ext));
            feature.external_id = Some(ext);
        }

        let mut mappings = self.load_mappings()?;
        mappings.insert(local_id, feature.clone());
        self.save_mappings(&mappings)?;
        Ok(feature)
    }

    /// Attach an external tool ID to an existing feature, overwriting any
    /// previous link and re-inferring the tool from the new ID's shape.
    pub fn link_external_id(&self, local_id: &str, external_id: &str) -> Result<FeatureId> {
        if local_id.trim().is_empty() || external_id.trim().is_empty() {
            return Err(HodgeError::Validation(
                "local and external IDs must be non-empty strings".to_string(),
            ));
        }

        let mut mappings = self.load_mappings()?;
        let feature = mappings
            .get_mut(local_id)
            .ok_or_else(|| HodgeError::FeatureNotFound(local_id.to_string()))?;

        let ext = external_id.trim().to_string();
        feature.pm_tool = Some(detect_pm_tool(&ext));
        feature.external_id = Some(ext);
        feature.last_synced = Some(Utc::now());
        let updated = feature.clone();
        self.save_mappings(&mappings)?;
        Ok(updated)
    }

    /// Upsert a local→external mapping. Creates the entry if absent, else
    /// updates the link and stamps `last_synced`.
    pub fn map_feature(&self, local_id: &str, external_id: &str, tool: PmTool) -> Result<FeatureId> {
        if local_id.trim().is_empty() || external_id.trim().is_empty() {
            return Err(HodgeError::Validation(
                "local and external IDs must be non-empty strings".to_string(),
            ));
        }

        let mut mappings = self.load_mappings()?;
        let feature = mappings
            .entry(local_id.to_string())
            .or_insert_with(|| FeatureId::new(local_id, local_id));
        feature.external_id = Some(external_id.trim().to_string());
        feature.pm_tool = Some(tool);
        feature.last_synced = Some(Utc::now());
        let updated = feature.clone();
        self.save_mappings(&mappings)?;
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Resolve a local or external ID to its FeatureId. Local-shaped IDs get
    /// a direct lookup; anything else falls back to a linear scan over
    /// recorded external IDs.
    pub fn resolve_id(&self, id: &str) -> Result<Option<FeatureId>> {
        if id.trim().is_empty() {
            return Err(HodgeError::Validation(
                "ID must be a non-empty string".to_string(),
            ));
        }

        let mappings = self.load_mappings()?;
        if is_local_id(id) {
            return Ok(mappings.get(id).cloned());
        }
        Ok(mappings
            .values()
            .find(|f| f.external_id.as_deref() == Some(id))
            .cloned())
    }

    pub fn list_features(&self) -> Result<Vec<FeatureId>> {
        let mappings = self.load_mappings()?;
        let mut features: Vec<FeatureId> = mappings.into_values().collect();
        features.sort_by(|a, b| a.created.cmp(&b.created));
        Ok(features)
    }

    // -----------------------------------------------------------------------
    // Epic hierarchy
    // -----------------------------------------------------------------------

    /// Allocate the next sub-issue ID under `parent_id` (`HODGE-NNN.M`, dense
    /// from 1). Marks the parent as an epic. Sub-issues are leaf-only: a
    /// sub-issue cannot become a parent itself.
    pub fn create_sub_issue_id(&self, parent_id: &str) -> Result<FeatureId> {
        let parent = self
            .resolve_id(parent_id)?
            .ok_or_else(|| HodgeError::ParentNotFound(parent_id.to_string()))?;
        if parent.is_sub_issue() {
            return Err(HodgeError::NestedSubIssue(parent.local_id));
        }

        let mut mappings = self.load_mappings()?;
        let parent_entry = mappings
            .get_mut(&parent.local_id)
            .ok_or_else(|| HodgeError::ParentNotFound(parent_id.to_string()))?;

        let index = parent_entry.child_ids.len() + 1;
        let child_local = format!("{}.{}", parent_entry.local_id, index);
        parent_entry.child_ids.push(child_local.clone());
        parent_entry.is_epic = true;
        let parent_local = parent_entry.local_id.clone();
        let name = format!("{} sub-issue {}", parent_entry.name, index);

        let mut child = FeatureId::new(&child_local, name);
        child.parent_id = Some(parent_local);
        mappings.insert(child_local, child.clone());
        self.save_mappings(&mappings)?;
        Ok(child)
    }

    /// Sub-issues of an epic, in creation order.
    pub fn get_sub_issues(&self, id: &str) -> Result<Vec<FeatureId>> {
        let feature = self
            .resolve_id(id)?
            .ok_or_else(|| HodgeError::FeatureNotFound(id.to_string()))?;
        let mappings = self.load_mappings()?;
        Ok(feature
            .child_ids
            .iter()
            .filter_map(|c| mappings.get(c).cloned())
            .collect())
    }

    /// The epic a sub-issue belongs to, if any.
    pub fn get_parent_epic(&self, id: &str) -> Result<Option<FeatureId>> {
        let feature = self
            .resolve_id(id)?
            .ok_or_else(|| HodgeError::FeatureNotFound(id.to_string()))?;
        let Some(parent_id) = feature.parent_id else {
            return Ok(None);
        };
        let mappings = self.load_mappings()?;
        Ok(mappings.get(&parent_id).cloned())
    }

    /// True only when the epic flag is set and children actually exist.
    /// Defends against a stale flag with no matching children.
    pub fn is_epic(&self, id: &str) -> Result<bool> {
        Ok(self
            .resolve_id(id)?
            .map(|f| f.is_epic && !f.child_ids.is_empty())
            .unwrap_or(false))
    }

    // -----------------------------------------------------------------------
    // Migration
    // -----------------------------------------------------------------------

    /// Bulk-reassign external IDs when a project moves between PM tools.
    /// Every feature whose current (tool, external ID) pair matches an
    /// `id_map` entry gets the new ID and tool. Returns the number updated.
    pub fn migrate_ids(
        &self,
        from_tool: PmTool,
        to_tool: PmTool,
        id_map: &BTreeMap<String, String>,
    ) -> Result<usize> {
        let mut mappings = self.load_mappings()?;
        let mut migrated = 0;
        for feature in mappings.values_mut() {
            if feature.pm_tool != Some(from_tool) {
                continue;
            }
            let Some(current) = feature.external_id.as_deref() else {
                continue;
            };
            if let Some(new_id) = id_map.get(current) {
                feature.external_id = Some(new_id.clone());
                feature.pm_tool = Some(to_tool);
                feature.last_synced = Some(Utc::now());
                migrated += 1;
            }
        }
        if migrated > 0 {
            self.save_mappings(&mappings)?;
        }
        Ok(migrated)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> IdManager {
        IdManager::new(dir.path()).unwrap()
    }

    #[test]
    fn create_feature_sequential_ids() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);

        let a = ids.create_feature("auth", None).unwrap();
        let b = ids.create_feature("billing", None).unwrap();
        assert_eq!(a.local_id, "HODGE-001");
        assert_eq!(b.local_id, "HODGE-002");
    }

    #[test]
    fn counter_survives_reload() {
        let dir = TempDir::new().unwrap();
        {
            let ids = manager(&dir);
            ids.create_feature("one", None).unwrap();
            ids.create_feature("two", None).unwrap();
        }
        // Fresh manager, same files: the counter must not hand out a dup.
        let ids = manager(&dir);
        let c = ids.create_feature("three", None).unwrap();
        assert_eq!(c.local_id, "HODGE-003");
    }

    #[test]
    fn ids_grow_past_three_digits() {
        assert_eq!(format!("{}-{:03}", ID_PREFIX, 7u64), "HODGE-007");
        assert_eq!(format!("{}-{:03}", ID_PREFIX, 1234u64), "HODGE-1234");
    }

    #[test]
    fn create_feature_rejects_empty_name() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        assert!(matches!(
            ids.create_feature("  ", None),
            Err(HodgeError::Validation(_))
        ));
    }

    #[test]
    fn create_feature_rejects_empty_external_id() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        assert!(matches!(
            ids.create_feature("auth", Some("")),
            Err(HodgeError::Validation(_))
        ));
    }

    #[test]
    fn create_feature_infers_tool_from_external_id() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        let f = ids.create_feature("auth", Some("ABC-9")).unwrap();
        assert_eq!(f.external_id.as_deref(), Some("ABC-9"));
        assert_eq!(f.pm_tool, Some(PmTool::Jira));
    }

    #[test]
    fn resolve_roundtrip_via_external_id() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        let f = ids.create_feature("auth", None).unwrap();
        ids.link_external_id(&f.local_id, "EXT-1").unwrap();

        let resolved = ids.resolve_id("EXT-1").unwrap().unwrap();
        assert_eq!(resolved.local_id, f.local_id);
    }

    #[test]
    fn resolve_rejects_empty_input() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        assert!(matches!(
            ids.resolve_id(""),
            Err(HodgeError::Validation(_))
        ));
    }

    #[test]
    fn resolve_unknown_is_none() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        assert!(ids.resolve_id("HODGE-999").unwrap().is_none());
        assert!(ids.resolve_id("nope").unwrap().is_none());
    }

    #[test]
    fn link_external_id_requires_existing_feature() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        assert!(matches!(
            ids.link_external_id("HODGE-001", "EXT-1"),
            Err(HodgeError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn link_external_id_overwrites_and_stamps() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        let f = ids.create_feature("auth", Some("ABC-1")).unwrap();
        let updated = ids.link_external_id(&f.local_id, "HOD-42").unwrap();
        assert_eq!(updated.external_id.as_deref(), Some("HOD-42"));
        assert_eq!(updated.pm_tool, Some(PmTool::Linear));
        assert!(updated.last_synced.is_some());
    }

    #[test]
    fn sub_issues_dense_and_ordered() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        let epic = ids.create_feature("auth", None).unwrap();

        assert!(!ids.is_epic(&epic.local_id).unwrap());
        let s1 = ids.create_sub_issue_id(&epic.local_id).unwrap();
        assert!(ids.is_epic(&epic.local_id).unwrap());
        let s2 = ids.create_sub_issue_id(&epic.local_id).unwrap();
        let s3 = ids.create_sub_issue_id(&epic.local_id).unwrap();

        assert_eq!(s1.local_id, "HODGE-001.1");
        assert_eq!(s2.local_id, "HODGE-001.2");
        assert_eq!(s3.local_id, "HODGE-001.3");

        let subs = ids.get_sub_issues(&epic.local_id).unwrap();
        let sub_ids: Vec<&str> = subs.iter().map(|s| s.local_id.as_str()).collect();
        assert_eq!(sub_ids, ["HODGE-001.1", "HODGE-001.2", "HODGE-001.3"]);
    }

    #[test]
    fn sub_issue_parent_traversal() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        let epic = ids.create_feature("auth", None).unwrap();
        let sub = ids.create_sub_issue_id(&epic.local_id).unwrap();

        let parent = ids.get_parent_epic(&sub.local_id).unwrap().unwrap();
        assert_eq!(parent.local_id, epic.local_id);
        assert!(ids.get_parent_epic(&epic.local_id).unwrap().is_none());
    }

    #[test]
    fn sub_issues_are_leaf_only() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        let epic = ids.create_feature("auth", None).unwrap();
        let sub = ids.create_sub_issue_id(&epic.local_id).unwrap();
        assert!(matches!(
            ids.create_sub_issue_id(&sub.local_id),
            Err(HodgeError::NestedSubIssue(_))
        ));
    }

    #[test]
    fn create_sub_issue_requires_parent() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        assert!(matches!(
            ids.create_sub_issue_id("HODGE-042"),
            Err(HodgeError::ParentNotFound(_))
        ));
    }

    #[test]
    fn map_feature_upserts() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);

        // Absent: creates
        let f = ids
            .map_feature("HODGE-001", "HOD-9", PmTool::Linear)
            .unwrap();
        assert_eq!(f.external_id.as_deref(), Some("HOD-9"));

        // Present: updates in place, no duplicate entry
        let f2 = ids
            .map_feature("HODGE-001", "HOD-10", PmTool::Linear)
            .unwrap();
        assert_eq!(f2.external_id.as_deref(), Some("HOD-10"));
        assert_eq!(ids.list_features().unwrap().len(), 1);
    }

    #[test]
    fn migrate_ids_reassigns_matching_pairs() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        let a = ids.create_feature("auth", Some("ABC-1")).unwrap();
        let b = ids.create_feature("billing", Some("ABC-2")).unwrap();
        ids.create_feature("cache", Some("HOD-3")).unwrap();

        let mut id_map = BTreeMap::new();
        id_map.insert("ABC-1".to_string(), "HOD-101".to_string());
        id_map.insert("ABC-2".to_string(), "HOD-102".to_string());

        let migrated = ids
            .migrate_ids(PmTool::Jira, PmTool::Linear, &id_map)
            .unwrap();
        assert_eq!(migrated, 2);

        let a2 = ids.resolve_id(&a.local_id).unwrap().unwrap();
        assert_eq!(a2.external_id.as_deref(), Some("HOD-101"));
        assert_eq!(a2.pm_tool, Some(PmTool::Linear));
        let b2 = ids.resolve_id(&b.local_id).unwrap().unwrap();
        assert_eq!(b2.external_id.as_deref(), Some("HOD-102"));
    }

    #[test]
    fn detect_pm_tool_precedence() {
        assert_eq!(detect_pm_tool("HOD-42"), PmTool::Linear);
        assert_eq!(detect_pm_tool("ENG-1"), PmTool::Linear);
        assert_eq!(detect_pm_tool("ABC-9"), PmTool::Jira);
        assert_eq!(detect_pm_tool("#7"), PmTool::Github);
        assert_eq!(detect_pm_tool("!3"), PmTool::Gitlab);
        assert_eq!(detect_pm_tool("12345"), PmTool::Azure);
        assert_eq!(detect_pm_tool("not-an-id"), PmTool::Unknown);
    }

    #[test]
    fn detect_pm_tool_github_claims_hash_form() {
        // GitLab issue references share the #N form; GitHub wins by
        // precedence, so only !N classifies as GitLab.
        assert_eq!(detect_pm_tool("#123"), PmTool::Github);
        assert_eq!(detect_pm_tool("!123"), PmTool::Gitlab);
    }

    #[test]
    fn local_id_shapes() {
        assert!(is_local_id("HODGE-001"));
        assert!(is_local_id("HODGE-1234"));
        assert!(is_local_id("HODGE-001.3"));
        assert!(!is_local_id("HOD-42"));
        assert!(!is_local_id("ABC-9"));
    }

    #[test]
    fn constructor_rejects_traversal_paths() {
        assert!(matches!(
            IdManager::new("../elsewhere"),
            Err(HodgeError::UnsafeBasePath(_))
        ));
    }

    #[test]
    fn missing_files_are_empty_state() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);
        assert!(ids.list_features().unwrap().is_empty());
        assert!(ids.resolve_id("HODGE-001").unwrap().is_none());
    }

    #[test]
    fn end_to_end_epic_flow() {
        let dir = TempDir::new().unwrap();
        let ids = manager(&dir);

        let f = ids.create_feature("auth", None).unwrap();
        assert_eq!(f.local_id, "HODGE-001");
        let sub = ids.create_sub_issue_id("HODGE-001").unwrap();
        assert_eq!(sub.local_id, "HODGE-001.1");
        assert!(ids.is_epic("HODGE-001").unwrap());
        assert_eq!(
            ids.get_parent_epic("HODGE-001.1").unwrap().unwrap().local_id,
            "HODGE-001"
        );
    }
}
