//! Application settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::viewport::controls::ControlSettings;

/// Environment variable that overrides the stored API key
pub const API_KEY_ENV: &str = "ANATOMAR_API_KEY";

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Es => "Español",
            Language::En => "English",
        }
    }

    pub fn all() -> &'static [Language] {
        &[Language::Es, Language::En]
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
    #[serde(default)]
    pub language: Language,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            font_size: 15.0,
            language: Language::Es,
        }
    }
}

/// 3D viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Directory model paths are resolved against
    pub assets_dir: PathBuf,
    /// Background color RGB
    pub background: [u8; 3],
    /// Uniform scale applied to loaded models
    pub model_scale: f32,
    pub damping_factor: f32,
    pub auto_rotate_speed: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            background: [248, 249, 250],
            model_scale: 1.5,
            damping_factor: 0.05,
            auto_rotate_speed: 0.8,
        }
    }
}

impl ViewerSettings {
    pub fn background_rgb(&self) -> [f32; 3] {
        self.background.map(|c| c as f32 / 255.0)
    }

    pub fn control_settings(&self) -> ControlSettings {
        ControlSettings {
            damping_factor: self.damping_factor,
            auto_rotate_speed: self.auto_rotate_speed,
            ..ControlSettings::default()
        }
    }
}

/// Text-generation endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub endpoint: String,
    pub model: String,
    /// Empty means "not configured"
    #[serde(default)]
    pub api_key: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: String::new(),
        }
    }
}

impl ChatSettings {
    /// Stored key, overridden by the environment when set
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| Some(self.api_key.clone()).filter(|k| !k.trim().is_empty()))
    }

    /// `{endpoint}/models/{model}:generateContent`
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub ui: UiSettings,
    #[serde(default)]
    pub viewer: ViewerSettings,
    #[serde(default)]
    pub chat: ChatSettings,
}

impl AppSettings {
    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "anatomar", "anatomar")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to file
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(dir) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("Cannot create config dir {}: {e}", dir.display());
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!("Failed to save settings: {e}");
                }
            }
            Err(e) => tracing::warn!("Failed to serialize settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let s: AppSettings = serde_json::from_str(r#"{"ui":{"font_size":18.0}}"#).unwrap();
        assert_eq!(s.ui.font_size, 18.0);
        assert_eq!(s.ui.language, Language::Es);
        assert_eq!(s.viewer.model_scale, 1.5);
        assert_eq!(s.chat.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_generate_url() {
        let chat = ChatSettings {
            endpoint: "https://example.org/v1beta/".into(),
            ..ChatSettings::default()
        };
        assert_eq!(
            chat.generate_url(),
            "https://example.org/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_viewer_background_matches_page() {
        let rgb = ViewerSettings::default().background_rgb();
        assert!((rgb[0] - 248.0 / 255.0).abs() < 1e-6);
        assert!((rgb[2] - 250.0 / 255.0).abs() < 1e-6);
    }
}
