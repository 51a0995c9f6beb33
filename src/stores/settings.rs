use serde::{Deserialize, Serialize};
use tracing::info;

use crate::gateway::BackendApi;
use crate::models::AppSettings;
use crate::observable::{Observable, ReadOnly};

use super::ActionStatus;

const DEFAULT_LANGUAGE: &str = "de";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// UI preferences plus the backend-persisted application settings.
#[derive(Clone)]
pub struct SettingsStore {
    api: BackendApi,
    theme: Observable<Theme>,
    language: Observable<String>,
    settings: Observable<Option<AppSettings>>,
    status: ActionStatus,
}

impl SettingsStore {
    pub fn new(api: BackendApi) -> Self {
        Self {
            api,
            theme: Observable::new(Theme::default()),
            language: Observable::new(DEFAULT_LANGUAGE.to_string()),
            settings: Observable::new(None),
            status: ActionStatus::new(),
        }
    }

    pub fn theme(&self) -> ReadOnly<Theme> {
        self.theme.read_only()
    }

    pub fn language(&self) -> ReadOnly<String> {
        self.language.read_only()
    }

    /// Last settings received from or saved to the backend.
    pub fn settings(&self) -> ReadOnly<Option<AppSettings>> {
        self.settings.read_only()
    }

    pub fn loading(&self) -> ReadOnly<bool> {
        self.status.loading()
    }

    pub fn error(&self) -> ReadOnly<Option<String>> {
        self.status.error()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.theme.set(theme);
    }

    pub fn set_language(&self, language: impl Into<String>) {
        self.language.set(language.into());
    }

    /// Restore the local preferences. Backend settings are left alone.
    pub fn reset(&self) {
        self.theme.set(Theme::default());
        self.language.set(DEFAULT_LANGUAGE.to_string());
    }

    pub async fn load(&self) {
        self.status.begin();
        match self.api.get_settings().await {
            Ok(settings) => self.apply(settings),
            Err(err) => self
                .status
                .fail("get_settings", &err, "Failed to load settings"),
        }
        self.status.finish();
    }

    pub async fn save(&self, settings: AppSettings) -> bool {
        self.status.begin();
        let saved = match self.api.save_settings(&settings).await {
            Ok(()) => {
                self.apply(settings);
                true
            }
            Err(err) => {
                self.status
                    .fail("save_settings", &err, "Failed to save settings");
                false
            }
        };
        self.status.finish();
        saved
    }

    /// Ask the backend to restore its defaults and adopt them.
    pub async fn reset_remote(&self) {
        self.status.begin();
        match self.api.reset_settings().await {
            Ok(settings) => {
                info!("Settings reset to defaults");
                self.apply(settings);
            }
            Err(err) => self
                .status
                .fail("reset_settings", &err, "Failed to reset settings"),
        }
        self.status.finish();
    }

    /// Persist a theme choice and apply it locally once the backend accepts it.
    pub async fn update_theme(&self, theme: Theme) -> bool {
        match self.api.update_theme(theme.as_str()).await {
            Ok(()) => {
                self.theme.set(theme);
                true
            }
            Err(err) => {
                self.status.fail("update_theme", &err, "Failed to update theme");
                false
            }
        }
    }

    fn apply(&self, settings: AppSettings) {
        match settings.theme.as_str() {
            "dark" => self.theme.set(Theme::Dark),
            "light" => self.theme.set(Theme::Light),
            _ => {}
        }
        self.language.set(settings.language.clone());
        self.settings.set(Some(settings));
    }
}
