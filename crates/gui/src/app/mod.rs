//! Main application module

mod menus;
pub mod styles;

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;

use anatomar_gui_lib::ai::GeminiClient;
use anatomar_gui_lib::asset::{ModelSource, TokioAssetFetcher};
use anatomar_gui_lib::viewport::host::HostSignals;
use shared::HERO_MODEL_PATH;

use crate::i18n::{lang, set_lang};
use crate::state::{AppState, Section};
use crate::ui::explorer::ExplorerViewers;
use crate::ui::{chat_panel, explorer, hero};
use crate::viewport::{ViewerServices, ViewportPanel};
use crate::CliArgs;

/// Main application
pub struct AnatomApp {
    state: AppState,
    runtime: tokio::runtime::Handle,
    services: ViewerServices,
    chat_client: GeminiClient,
    hero_source: ModelSource,
    hero_viewer: ViewportPanel,
    skull_viewer: ViewportPanel,
    bone_viewer: ViewportPanel,
    /// Stored assets directory as last seen; a CLI override holds until it changes
    settings_assets_dir: PathBuf,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
}

impl AnatomApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: tokio::runtime::Handle,
        args: CliArgs,
    ) -> Self {
        let state = AppState::default();
        set_lang(state.settings.ui.language);
        styles::configure_styles(&cc.egui_ctx, state.settings.ui.font_size);

        if cc.gl.is_none() {
            tracing::warn!("No OpenGL context; 3D viewers are disabled");
        }

        // CLI overrides take priority over stored settings
        let assets_dir = args
            .assets_dir
            .unwrap_or_else(|| state.settings.viewer.assets_dir.clone());
        let hero_source = ModelSource::parse(args.model.as_deref().unwrap_or(HERO_MODEL_PATH));
        tracing::info!("Serving models from {}", assets_dir.display());

        let services = ViewerServices {
            gl: cc.gl.clone(),
            fetcher: TokioAssetFetcher::new(runtime.clone(), assets_dir.clone()),
            host: HostSignals::new(),
        };
        let chat_client = GeminiClient::new(runtime.clone(), state.settings.chat.clone());
        let settings_assets_dir = state.settings.viewer.assets_dir.clone();
        let last_font_size = state.settings.ui.font_size;

        Self {
            state,
            runtime,
            services,
            chat_client,
            hero_source,
            hero_viewer: ViewportPanel::new("hero"),
            skull_viewer: ViewportPanel::new("skull"),
            bone_viewer: ViewportPanel::new("bone"),
            settings_assets_dir,
            last_font_size,
        }
    }

    /// Pick up settings edited in the settings window
    fn apply_settings(&mut self, ctx: &egui::Context) {
        let settings = &self.state.settings;

        if settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, settings.ui.font_size);
            self.last_font_size = settings.ui.font_size;
        }
        if settings.ui.language != lang() {
            set_lang(settings.ui.language);
        }

        if *self.chat_client.settings() != settings.chat {
            tracing::info!("Chat settings changed; using model {}", settings.chat.model);
            self.chat_client = GeminiClient::new(self.runtime.clone(), settings.chat.clone());
        }

        if settings.viewer.assets_dir != self.settings_assets_dir {
            self.settings_assets_dir = settings.viewer.assets_dir.clone();
            tracing::info!("Serving models from {}", self.settings_assets_dir.display());
            self.services.fetcher =
                TokioAssetFetcher::new(self.runtime.clone(), self.settings_assets_dir.clone());
        }
    }
}

impl eframe::App for AnatomApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_settings(ctx);

        if self.state.chat.poll_responses() {
            ctx.request_repaint();
        }
        if self.state.chat.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ── Navigation bar ───────────────────────────────────
        egui::TopBottomPanel::top("nav_bar")
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .fill(egui::Color32::WHITE)
                    .inner_margin(egui::Margin::symmetric(16, 8)),
            )
            .show(ctx, |ui| {
                menus::nav_bar(ui, &mut self.state);
            });

        // ── Settings window ──────────────────────────────────
        menus::settings_window(ctx, &mut self.state);

        // ── Page: hero + explorer ────────────────────────────
        let scroll_target = self.state.explorer.take_scroll();
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).inner_margin(egui::Margin::same(0)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("page_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        egui::Frame::NONE
                            .inner_margin(egui::Margin::symmetric(24, 16))
                            .show(ui, |ui| {
                                if scroll_target == Some(Section::Hero) {
                                    ui.scroll_to_cursor(Some(egui::Align::TOP));
                                }
                                hero::show(
                                    ui,
                                    &mut self.state,
                                    &self.services,
                                    &mut self.hero_viewer,
                                    &self.hero_source,
                                );

                                ui.add_space(32.0);
                                if scroll_target == Some(Section::Explorer) {
                                    ui.scroll_to_cursor(Some(egui::Align::TOP));
                                }
                                explorer::show(
                                    ui,
                                    &mut self.state,
                                    &self.services,
                                    ExplorerViewers {
                                        skull: &mut self.skull_viewer,
                                        bone: &mut self.bone_viewer,
                                    },
                                );
                                ui.add_space(80.0);
                            });
                    });
            });

        // ── Chat ─────────────────────────────────────────────
        chat_panel::show(ctx, &mut self.state, &self.chat_client);

        self.services.request_repaint_if_needed(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // GL objects must go while the context is still current
        self.hero_viewer.unmount();
        self.skull_viewer.unmount();
        self.bone_viewer.unmount();
        self.state.settings.save();
    }
}
