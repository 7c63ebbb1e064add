use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The four workflow phases a feature moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Explore,
    Build,
    Harden,
    Ship,
}

impl Phase {
    pub fn all() -> &'static [Phase] {
        &[Phase::Explore, Phase::Build, Phase::Harden, Phase::Ship]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Explore => "explore",
            Phase::Build => "build",
            Phase::Harden => "harden",
            Phase::Ship => "ship",
        }
    }

    /// Status word used in the local markdown mirror for this phase.
    pub fn local_status(self) -> &'static str {
        match self {
            Phase::Explore => "exploring",
            Phase::Build => "building",
            Phase::Harden => "hardening",
            Phase::Ship => "shipped",
        }
    }

    /// Default external PM status when the project config does not override it.
    pub fn default_external_status(self) -> &'static str {
        match self {
            Phase::Explore => "To Do",
            Phase::Build => "In Progress",
            Phase::Harden => "In Review",
            Phase::Ship => "Done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = crate::error::HodgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explore" => Ok(Phase::Explore),
            "build" => Ok(Phase::Build),
            "harden" => Ok(Phase::Harden),
            "ship" => Ok(Phase::Ship),
            _ => Err(crate::error::HodgeError::InvalidPhase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// PmTool
// ---------------------------------------------------------------------------

/// External PM tools this system can correlate IDs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PmTool {
    Linear,
    Jira,
    Github,
    Gitlab,
    Azure,
    Local,
    Unknown,
}

impl PmTool {
    pub fn as_str(self) -> &'static str {
        match self {
            PmTool::Linear => "linear",
            PmTool::Jira => "jira",
            PmTool::Github => "github",
            PmTool::Gitlab => "gitlab",
            PmTool::Azure => "azure",
            PmTool::Local => "local",
            PmTool::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PmTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PmTool {
    type Err = crate::error::HodgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(PmTool::Linear),
            "jira" => Ok(PmTool::Jira),
            "github" => Ok(PmTool::Github),
            "gitlab" => Ok(PmTool::Gitlab),
            "azure" => Ok(PmTool::Azure),
            "local" => Ok(PmTool::Local),
            "unknown" => Ok(PmTool::Unknown),
            _ => Err(crate::error::HodgeError::UnsupportedTool(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Verbosity
// ---------------------------------------------------------------------------

/// Detail level for ship comments pushed to the external PM tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Minimal,
    #[default]
    Essential,
    Rich,
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verbosity::Minimal => "minimal",
            Verbosity::Essential => "essential",
            Verbosity::Rich => "rich",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
