//! User preferences: theme and fallback user identity.

use crate::kv::KvStore;
use std::sync::Arc;
use voteth_types::unix_now_ms;

pub const THEME_KEY: &str = "theme";
pub const USER_ID_KEY: &str = "voteth_user_id";

/// Display theme. Dark is the default; only an explicit "light" value is
/// persisted as such (absence means dark).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Clone)]
pub struct Preferences {
    kv: Arc<dyn KvStore>,
}

impl Preferences {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub fn theme(&self) -> Theme {
        match self.kv.get(THEME_KEY).as_deref() {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        match theme {
            Theme::Light => self.kv.put(THEME_KEY, "light"),
            Theme::Dark => self.kv.put(THEME_KEY, "dark"),
        }
    }

    /// Toggle between light and dark, returning the new theme.
    pub fn toggle_theme(&self) -> Theme {
        let next = match self.theme() {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
        self.set_theme(next);
        next
    }

    /// Identity used against the verification service when no wallet
    /// address is available: a stored fallback id, created on first use.
    pub fn user_id(&self) -> String {
        if let Some(id) = self.kv.get(USER_ID_KEY) {
            return id;
        }
        let id = format!("user_{}", unix_now_ms());
        self.kv.put(USER_ID_KEY, &id);
        id
    }
}
