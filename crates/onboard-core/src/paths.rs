use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const ONBOARD_DIR: &str = ".onboard";
pub const SESSIONS_DIR: &str = ".onboard/sessions";

pub const CONFIG_FILE: &str = ".onboard/config.yaml";
pub const CATALOG_FILE: &str = ".onboard/catalog.yaml";

pub const DEFAULT_SESSION: &str = "default";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn onboard_dir(root: &Path) -> PathBuf {
    root.join(ONBOARD_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn catalog_path(root: &Path) -> PathBuf {
    root.join(CATALOG_FILE)
}

pub fn session_dir(root: &Path, session: &str) -> PathBuf {
    root.join(SESSIONS_DIR).join(session)
}

/// Session names become directory names; keep them to a safe alphabet.
pub fn is_valid_session_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_dir_nests_under_sessions() {
        let root = Path::new("/tmp/project");
        assert_eq!(
            session_dir(root, "alice"),
            PathBuf::from("/tmp/project/.onboard/sessions/alice")
        );
    }

    #[test]
    fn session_names() {
        assert!(is_valid_session_name("default"));
        assert!(is_valid_session_name("user_42-b"));
        assert!(!is_valid_session_name(""));
        assert!(!is_valid_session_name("../escape"));
        assert!(!is_valid_session_name("has space"));
    }
}
