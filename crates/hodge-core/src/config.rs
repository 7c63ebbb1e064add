use crate::error::Result;
use crate::paths;
use crate::types::{Phase, PmTool, Verbosity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// PmConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PmConfig {
    /// Active external PM tool. None means local-mirror-only operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<PmTool>,

    /// Per-phase status overrides, keyed by phase name. Phases absent here
    /// fall back to the fixed defaults on `Phase`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub statuses: HashMap<String, String>,

    #[serde(default)]
    pub verbosity: Verbosity,

    /// Override the tool's API endpoint (self-hosted instances, tests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl PmConfig {
    /// Target status for a phase: project override first, fixed default after.
    pub fn status_for(&self, phase: Phase) -> String {
        self.statuses
            .get(phase.as_str())
            .cloned()
            .unwrap_or_else(|| phase.default_external_status().to_string())
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Per-tool API credentials pulled from fixed environment variable names.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    /// Tool-specific scope: Linear team id, GitHub `owner/repo`.
    pub scope: Option<String>,
}

/// Fixed env var names (key, scope) for each supported external tool.
pub fn env_vars_for(tool: PmTool) -> Option<(&'static str, &'static str)> {
    match tool {
        PmTool::Linear => Some(("LINEAR_API_KEY", "LINEAR_TEAM_ID")),
        PmTool::Github => Some(("GITHUB_TOKEN", "GITHUB_REPO")),
        _ => None,
    }
}

impl Credentials {
    /// Read credentials for `tool` from the environment. Returns None when the
    /// API key is unset, which callers treat as "external sync not configured".
    pub fn from_env(tool: PmTool) -> Option<Self> {
        let (key_var, scope_var) = env_vars_for(tool)?;
        let api_key = std::env::var(key_var).ok().filter(|v| !v.is_empty())?;
        let scope = std::env::var(scope_var).ok().filter(|v| !v.is_empty());
        Some(Self { api_key, scope })
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub pm: PmConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            pm: PmConfig::default(),
        }
    }
}

impl Config {
    /// Load project config. A missing file is the default config (no external
    /// tool configured), not an error.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
