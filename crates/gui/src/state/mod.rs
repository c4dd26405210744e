pub mod chat;
pub mod explorer;
pub mod settings;

pub use chat::ChatSession;
pub use explorer::{ExplorerState, Section};
pub use settings::{AppSettings, Language};

/// Combined application state
pub struct AppState {
    pub explorer: ExplorerState,
    pub chat: ChatSession,
    pub settings: AppSettings,
    /// Show settings window
    pub show_settings_window: bool,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            explorer: ExplorerState::default(),
            chat: ChatSession::new(),
            settings,
            show_settings_window: false,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::load())
    }
}
