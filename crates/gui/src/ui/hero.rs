//! Landing section: title, call to action and the decorative model

use egui::Ui;

use anatomar_gui_lib::asset::ModelSource;
use anatomar_gui_lib::viewport::session::ViewportConfig;

use crate::app::styles;
use crate::i18n::t;
use crate::state::{AppState, Section};
use crate::viewport::{ViewerServices, ViewportPanel};

const VIEWER_HEIGHT: f32 = 340.0;

pub fn show(
    ui: &mut Ui,
    state: &mut AppState,
    services: &ViewerServices,
    panel: &mut ViewportPanel,
    source: &ModelSource,
) {
    let config = ViewportConfig::hero(source.clone());
    let wide = ui.available_width() >= 760.0;

    if wide {
        ui.columns(2, |cols| {
            intro(&mut cols[0], state);
            let size = egui::vec2(cols[1].available_width(), VIEWER_HEIGHT);
            panel.show(&mut cols[1], services, config, size);
        });
    } else {
        intro(ui, state);
        ui.add_space(12.0);
        let size = egui::vec2(ui.available_width(), VIEWER_HEIGHT * 0.75);
        panel.show(ui, services, config, size);
    }
}

fn intro(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(48.0);
    ui.label(
        egui::RichText::new(t("hero.title"))
            .size(34.0)
            .strong()
            .color(egui::Color32::from_rgb(33, 37, 41)),
    );
    ui.add_space(8.0);
    ui.label(egui::RichText::new(t("hero.subtitle")).size(17.0).color(styles::MUTED));
    ui.add_space(20.0);

    let button = egui::Button::new(
        egui::RichText::new(t("hero.explore"))
            .size(16.0)
            .color(egui::Color32::WHITE),
    )
    .fill(styles::ACCENT)
    .corner_radius(egui::CornerRadius::same(20))
    .min_size(egui::vec2(180.0, 40.0));
    if ui.add(button).clicked() {
        state.explorer.request_scroll(Section::Explorer);
    }
}
