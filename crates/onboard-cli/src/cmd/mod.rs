pub mod catalog;
pub mod code;
pub mod init;
pub mod progress;
pub mod session;

use anyhow::{bail, Context};
use onboard_core::{
    catalog::Catalog,
    config::Config,
    form::FormField,
    paths,
    session::{Session, FORM_KEY},
    store::{FileStore, SnapshotStore},
};
use std::path::Path;

/// Config and catalog for the project at `root`.
pub struct Project {
    pub config: Config,
    pub catalog: Catalog,
}

impl Project {
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let config = Config::load(root).context("failed to load config.yaml")?;
        let catalog = config.load_catalog(root).with_context(|| {
            format!(
                "failed to load catalog from {}",
                config.catalog_path(root).display()
            )
        })?;
        Ok(Self { config, catalog })
    }

    /// Restore the named session from disk. Nothing is written here.
    pub fn open_session(&self, root: &Path, name: &str) -> anyhow::Result<Session<'_, FileStore>> {
        if !paths::is_valid_session_name(name) {
            bail!("invalid session name '{name}': use letters, digits, '-' or '_'");
        }
        let store = FileStore::new(paths::session_dir(root, name));
        Ok(Session::restore(&self.catalog, store, self.config.mode))
    }

    /// Seed a session that has never been saved with the configured
    /// defaults. Callers run this right before a mutating command.
    pub fn apply_defaults(&self, session: &mut Session<'_, FileStore>) {
        let unsaved = matches!(session.store().load_snapshot(FORM_KEY), Ok(None));
        if !unsaved {
            return;
        }
        if let Some(currency) = &self.config.default_currency {
            session.set_field(FormField::Currency, currency);
        }
    }
}

/// Parse a dotted or comma separated path such as `2.1` or `2,1`. An empty
/// string is the empty path.
pub fn parse_path(raw: &str) -> anyhow::Result<Vec<usize>> {
    raw.split(['.', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .with_context(|| format!("invalid path entry '{s}': expected a 0-based number"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_path_accepts_dots_and_commas() {
        assert_eq!(parse_path("1.0").unwrap(), vec![1, 0]);
        assert_eq!(parse_path("1, 2").unwrap(), vec![1, 2]);
        assert!(parse_path("").unwrap().is_empty());
        assert!(parse_path("a.1").is_err());
    }

    #[test]
    fn new_session_gets_default_currency() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            default_currency: Some("INR".to_string()),
            ..Config::default()
        };
        config.save(dir.path()).unwrap();

        let project = Project::load(dir.path()).unwrap();
        let mut session = project.open_session(dir.path(), "acme").unwrap();
        assert_eq!(session.form().currency, None);
        project.apply_defaults(&mut session);
        assert_eq!(session.form().currency.as_deref(), Some("INR"));
    }

    #[test]
    fn opening_a_session_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            default_currency: Some("INR".to_string()),
            ..Config::default()
        };
        config.save(dir.path()).unwrap();

        let project = Project::load(dir.path()).unwrap();
        let session = project.open_session(dir.path(), "acme").unwrap();
        drop(session);
        assert!(!paths::session_dir(dir.path(), "acme").exists());
    }

    #[test]
    fn default_currency_does_not_override_saved_choice() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            default_currency: Some("INR".to_string()),
            ..Config::default()
        };
        config.save(dir.path()).unwrap();
        let project = Project::load(dir.path()).unwrap();

        let mut session = project.open_session(dir.path(), "acme").unwrap();
        project.apply_defaults(&mut session);
        session.set_field(FormField::Currency, "USD");
        drop(session);

        let mut session = project.open_session(dir.path(), "acme").unwrap();
        project.apply_defaults(&mut session);
        assert_eq!(session.form().currency.as_deref(), Some("USD"));
    }

    #[test]
    fn rejects_unsafe_session_names() {
        let dir = TempDir::new().unwrap();
        let project = Project::load(dir.path()).unwrap();
        assert!(project.open_session(dir.path(), "../escape").is_err());
    }
}
