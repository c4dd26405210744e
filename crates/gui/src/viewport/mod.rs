//! Embedded 3D model viewer panel with OpenGL rendering

mod gl_surface;

use std::sync::Arc;

use egui::Ui;

use anatomar_gui_lib::asset::{ModelSource, TokioAssetFetcher};
use anatomar_gui_lib::viewport::controls::ControlInput;
use anatomar_gui_lib::viewport::host::HostSignals;
use anatomar_gui_lib::viewport::session::{MountError, ViewportConfig, ViewportSession};
use anatomar_gui_lib::viewport::surface::MountRegion;

use crate::i18n::t;
use crate::state::settings::ViewerSettings;
use gl_surface::GlSurface;

/// Orbiting viewer config with the user's viewer settings applied
pub fn orbit_config(settings: &ViewerSettings, source: ModelSource, auto_rotate: bool) -> ViewportConfig {
    ViewportConfig {
        model_scale: settings.model_scale,
        background: Some(settings.background_rgb()),
        ..ViewportConfig::new(source, auto_rotate)
    }
    .with_controls(settings.control_settings())
}

/// Services shared by every viewer panel
pub struct ViewerServices {
    pub gl: Option<Arc<glow::Context>>,
    pub fetcher: TokioAssetFetcher,
    pub host: HostSignals,
}

impl ViewerServices {
    /// Keep the eframe loop running while any session wants another tick
    pub fn request_repaint_if_needed(&self, ctx: &egui::Context) {
        if self.host.has_frame_requests() {
            ctx.request_repaint();
        }
    }
}

/// One mounted model viewer. Remounts whenever its config key changes.
pub struct ViewportPanel {
    id: &'static str,
    session: Option<ViewportSession<GlSurface>>,
    /// Config whose mount failed for a reason other than layout
    failed: Option<ViewportConfig>,
}

impl ViewportPanel {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            session: None,
            failed: None,
        }
    }

    /// Tear down the current session, if any
    pub fn unmount(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.dispose();
        }
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        services: &ViewerServices,
        config: ViewportConfig,
        size: egui::Vec2,
    ) {
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
        let ppp = ui.ctx().pixels_per_point();
        let region = MountRegion::new(
            (rect.width() * ppp).round() as u32,
            (rect.height() * ppp).round() as u32,
        );

        // ── Remount on key change ───────────────────────────────
        if self
            .session
            .as_ref()
            .is_some_and(|s| !s.config().same_session(&config))
        {
            tracing::debug!("Viewer {} remounting for {}", self.id, config.source);
            self.unmount();
        }
        if self.failed.as_ref().is_some_and(|f| !f.same_session(&config)) {
            self.failed = None;
        }

        if self.session.is_none() && self.failed.is_none() {
            self.mount(ui, services, config, region);
        }

        let Some(session) = self.session.as_mut() else {
            let text = if self.failed.is_some() {
                t("viewer.unavailable")
            } else {
                t("viewer.loading")
            };
            paint_placeholder(ui, rect, text);
            return;
        };

        // ── Resize ──────────────────────────────────────────────
        let subscribed = session
            .resize_subscription()
            .is_some_and(|id| services.host.is_resize_subscribed(id));
        if subscribed && region.is_laid_out() && session.region() != region {
            session.handle_resize(region);
        }

        // ── Input ───────────────────────────────────────────────
        let drag = response.drag_delta() * ppp;
        if response.dragged_by(egui::PointerButton::Primary) {
            session.handle_input(ControlInput::Rotate { dx: drag.x, dy: drag.y });
        } else if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            session.handle_input(ControlInput::Pan { dx: drag.x, dy: drag.y });
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                session.handle_input(ControlInput::Zoom { delta: scroll });
            }
        }

        // ── Tick ────────────────────────────────────────────────
        if services.host.take_frame_request(session.loop_id()) {
            session.tick_now();
        }

        if !ui.is_rect_visible(rect) {
            return;
        }
        if let Some(callback) = session.surface().paint_callback(rect) {
            ui.painter().add(callback);
        }

        if session.is_loading() {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                t("viewer.loading"),
                egui::FontId::proportional(13.0),
                egui::Color32::from_rgb(108, 117, 125),
            );
        }
        if response.hovered() {
            ui.painter().text(
                egui::pos2(rect.center().x, rect.bottom() - 8.0),
                egui::Align2::CENTER_BOTTOM,
                t("viewer.hint"),
                egui::FontId::proportional(11.0),
                egui::Color32::from_rgb(134, 142, 150),
            );
        }
    }

    fn mount(
        &mut self,
        ui: &Ui,
        services: &ViewerServices,
        config: ViewportConfig,
        region: MountRegion,
    ) {
        let Some(gl) = services.gl.as_ref() else {
            self.failed = Some(config);
            return;
        };

        let surface = GlSurface::new(gl.clone());
        match ViewportSession::mount(config.clone(), region, surface, &services.fetcher, &services.host) {
            Ok(session) => {
                tracing::info!("Viewer {} mounted {}", self.id, config.source);
                self.session = Some(session);
            }
            Err(MountError::NotLaidOut { .. }) => {
                // Layout has not happened yet; try again next frame
                ui.ctx().request_repaint();
            }
            Err(e) => {
                tracing::error!("Viewer {} failed to mount: {e}", self.id);
                self.failed = Some(config);
            }
        }
    }
}

fn paint_placeholder(ui: &Ui, rect: egui::Rect, text: &str) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 8.0, egui::Color32::from_rgb(233, 236, 239));
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(12.0),
        egui::Color32::from_rgb(108, 117, 125),
    );
}
