use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::PersistError;
use crate::persist::{StoreHandle, THEME_KEY};

/// What the user picked in the theme menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
    Auto,
}

/// The theme actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::Auto => "auto",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "auto" => Ok(ThemePreference::Auto),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// AppearanceProbe
///
/// Answers "does the system prefer a dark appearance?" for the `auto` preference.
pub trait AppearanceProbe: Send + Sync {
    fn prefers_dark(&self) -> bool;
}

/// A probe with a fixed answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAppearance(pub bool);

impl AppearanceProbe for FixedAppearance {
    fn prefers_dark(&self) -> bool {
        self.0
    }
}

/// ThemeStore
///
/// Display preference persisted under the `theme` key. Only `change` writes it.
pub struct ThemeStore {
    storage: StoreHandle,
    preference: RwLock<ThemePreference>,
    probe: Arc<dyn AppearanceProbe>,
}

impl ThemeStore {
    /// Restores the stored preference; missing or unknown values fall back to light.
    pub fn restore(storage: StoreHandle, probe: Arc<dyn AppearanceProbe>) -> Self {
        let preference = match storage.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!("Ignoring stored theme: {}", e);
                ThemePreference::default()
            }),
            Ok(None) => ThemePreference::default(),
            Err(e) => {
                tracing::warn!("Failed to read stored theme: {}", e);
                ThemePreference::default()
            }
        };

        Self {
            storage,
            preference: RwLock::new(preference),
            probe,
        }
    }

    pub fn preference(&self) -> ThemePreference {
        *self.preference.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn resolved(&self) -> Theme {
        match self.preference() {
            ThemePreference::Light => Theme::Light,
            ThemePreference::Dark => Theme::Dark,
            ThemePreference::Auto if self.probe.prefers_dark() => Theme::Dark,
            ThemePreference::Auto => Theme::Light,
        }
    }

    /// Persists the new preference and returns the theme to apply.
    pub fn change(&self, preference: ThemePreference) -> Result<Theme, PersistError> {
        self.storage.set(THEME_KEY, preference.as_str())?;
        *self.preference.write().unwrap_or_else(PoisonError::into_inner) = preference;
        Ok(self.resolved())
    }

    /// Called when the system appearance flips. Returns the theme to apply, or
    /// `None` when an explicit preference pins the theme.
    pub fn system_changed(&self, prefers_dark: bool) -> Option<Theme> {
        if self.preference() != ThemePreference::Auto {
            return None;
        }
        Some(if prefers_dark { Theme::Dark } else { Theme::Light })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{KeyValueStore, MemoryStore};

    fn store(storage: &MemoryStore, prefers_dark: bool) -> ThemeStore {
        ThemeStore::restore(
            Arc::new(storage.clone()),
            Arc::new(FixedAppearance(prefers_dark)),
        )
    }

    #[test]
    fn defaults_to_light() {
        let theme = store(&MemoryStore::new(), true);
        assert_eq!(theme.preference(), ThemePreference::Light);
        assert_eq!(theme.resolved(), Theme::Light);
    }

    #[test]
    fn auto_follows_system_and_is_persisted_as_auto() {
        let storage = MemoryStore::new();
        let theme = store(&storage, true);
        assert_eq!(theme.change(ThemePreference::Auto).unwrap(), Theme::Dark);
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("auto"));

        assert_eq!(theme.system_changed(false), Some(Theme::Light));
    }

    #[test]
    fn explicit_preference_ignores_system_changes() {
        let storage = MemoryStore::new();
        let theme = store(&storage, false);
        theme.change(ThemePreference::Dark).unwrap();
        assert_eq!(theme.system_changed(false), None);

        let reloaded = store(&storage, false);
        assert_eq!(reloaded.resolved(), Theme::Dark);
    }

    #[test]
    fn unknown_stored_value_falls_back() {
        let storage = MemoryStore::new();
        storage.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(store(&storage, false).preference(), ThemePreference::Light);
    }
}
