//! Persisted session: authenticated identity and UI theme.
//!
//! Two independent entries stored as small files under the data directory
//! (e.g. `~/.calpal/identity`, `~/.calpal/theme`). Logout removes only the
//! identity; the theme entry survives it.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// UI theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Parse a stored value. Anything but "light" falls back to the default.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Current session: who is signed in (None = unauthenticated) and the theme.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub identity: Option<String>,
    pub theme: Theme,
}

/// File-backed store for the session entries.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the default data directory (~/.calpal).
    pub fn open_default() -> Self {
        Self::new(default_data_dir())
    }

    fn identity_path(&self) -> PathBuf {
        self.dir.join("identity")
    }

    fn theme_path(&self) -> PathBuf {
        self.dir.join("theme")
    }

    /// Load the persisted session. A missing or empty entry means "absent";
    /// an absent theme is the default (dark).
    pub fn load(&self) -> Session {
        let identity = read_entry(&self.identity_path());
        let theme = read_entry(&self.theme_path())
            .map(|s| Theme::parse(&s))
            .unwrap_or_default();
        Session { identity, theme }
    }

    pub fn persist_identity(&self, email: &str) -> Result<()> {
        write_entry(&self.identity_path(), email)
    }

    /// Remove the persisted identity. The theme entry is untouched.
    pub fn clear_identity(&self) -> Result<()> {
        let path = self.identity_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub fn persist_theme(&self, theme: Theme) -> Result<()> {
        write_entry(&self.theme_path(), theme.as_str())
    }
}

/// Default data directory (~/.calpal).
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".calpal"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn read_entry(path: &Path) -> Option<String> {
    let s = std::fs::read_to_string(path).ok()?;
    let t = s.trim().to_string();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

fn write_entry(path: &Path, value: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, value)?;
    Ok(())
}

/// Identity carried by the OAuth-callback query parameters. Requires exactly
/// `login=success` plus a non-empty `email`; any other shape is no login.
pub fn identity_from_callback(params: &HashMap<String, String>) -> Option<String> {
    if params.get("login").map(String::as_str) != Some("success") {
        return None;
    }
    params
        .get("email")
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn callback_requires_success_marker_and_email() {
        assert_eq!(
            identity_from_callback(&params(&[("login", "success"), ("email", "a@b.com")])),
            Some("a@b.com".to_string())
        );
        assert_eq!(
            identity_from_callback(&params(&[("login", "failed"), ("email", "a@b.com")])),
            None
        );
        assert_eq!(identity_from_callback(&params(&[("login", "success")])), None);
        assert_eq!(
            identity_from_callback(&params(&[("login", "success"), ("email", "  ")])),
            None
        );
        assert_eq!(identity_from_callback(&params(&[])), None);
    }

    #[test]
    fn theme_round_trip_and_default() {
        assert_eq!(Theme::parse("light"), Theme::Light);
        assert_eq!(Theme::parse("dark"), Theme::Dark);
        assert_eq!(Theme::parse("solarized"), Theme::Dark);
        assert_eq!(Theme::Light.as_str(), "light");
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn store_round_trips_and_logout_keeps_theme() {
        let dir = std::env::temp_dir().join(format!("calpal-store-{}", uuid::Uuid::new_v4()));
        let store = SessionStore::new(&dir);

        let fresh = store.load();
        assert!(fresh.identity.is_none());
        assert_eq!(fresh.theme, Theme::Dark);

        store.persist_identity("a@b.com").expect("persist identity");
        store.persist_theme(Theme::Light).expect("persist theme");
        let session = store.load();
        assert_eq!(session.identity.as_deref(), Some("a@b.com"));
        assert_eq!(session.theme, Theme::Light);

        store.clear_identity().expect("clear identity");
        let session = store.load();
        assert!(session.identity.is_none());
        assert_eq!(session.theme, Theme::Light);
    }
}
