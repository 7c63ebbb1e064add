use crate::error::{HodgeError, Result};
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const HODGE_DIR: &str = ".hodge";

pub const ID_MAPPINGS_FILE: &str = ".hodge/id-mappings.json";
pub const ID_COUNTER_FILE: &str = ".hodge/id-counter.json";
pub const PM_QUEUE_FILE: &str = ".hodge/.pm-queue.json";
pub const PM_MIRROR_FILE: &str = ".hodge/project_management.md";
pub const CONFIG_FILE: &str = ".hodge/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn hodge_dir(root: &Path) -> PathBuf {
    root.join(HODGE_DIR)
}

pub fn id_mappings_path(root: &Path) -> PathBuf {
    root.join(ID_MAPPINGS_FILE)
}

pub fn id_counter_path(root: &Path) -> PathBuf {
    root.join(ID_COUNTER_FILE)
}

pub fn pm_queue_path(root: &Path) -> PathBuf {
    root.join(PM_QUEUE_FILE)
}

pub fn pm_mirror_path(root: &Path) -> PathBuf {
    root.join(PM_MIRROR_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Base-path safety
// ---------------------------------------------------------------------------

/// Reject base paths containing parent-directory components before any I/O.
/// State files must stay inside the project the caller named.
pub fn validate_base_path(root: &Path) -> Result<()> {
    if root.as_os_str().is_empty() {
        return Err(HodgeError::UnsafeBasePath(String::new()));
    }
    for component in root.components() {
        if matches!(component, Component::ParentDir) {
            return Err(HodgeError::UnsafeBasePath(
                root.to_string_lossy().into_owned(),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            id_mappings_path(root),
            PathBuf::from("/tmp/proj/.hodge/id-mappings.json")
        );
        assert_eq!(
            id_counter_path(root),
            PathBuf::from("/tmp/proj/.hodge/id-counter.json")
        );
        assert_eq!(
            pm_queue_path(root),
            PathBuf::from("/tmp/proj/.hodge/.pm-queue.json")
        );
        assert_eq!(
            pm_mirror_path(root),
            PathBuf::from("/tmp/proj/.hodge/project_management.md")
        );
    }

    #[test]
    fn safe_base_paths() {
        for p in ["/tmp/proj", "proj", "./proj", "a/b/c"] {
            validate_base_path(Path::new(p)).unwrap_or_else(|_| panic!("expected safe: {p}"));
        }
    }

    #[test]
    fn unsafe_base_paths() {
        for p in ["../proj", "/tmp/../etc", "a/../../b", ""] {
            assert!(
                validate_base_path(Path::new(p)).is_err(),
                "expected unsafe: {p}"
            );
        }
    }
}
