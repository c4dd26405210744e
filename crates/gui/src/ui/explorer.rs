//! Anatomy explorer: bone catalog, description card, model viewers and
//! hosted embeds.

use egui::Ui;

use anatomar_gui_lib::asset::ModelSource;
use shared::{BoneId, SKULL_EMBED_URL, SKULL_MODEL_PATH};

use crate::app::styles;
use crate::i18n::t;
use crate::state::AppState;
use crate::ui::embed_panel;
use crate::viewport::{self, ViewerServices, ViewportPanel};

const VIEWER_HEIGHT: f32 = 320.0;

/// Both explorer viewers
pub struct ExplorerViewers<'a> {
    pub skull: &'a mut ViewportPanel,
    pub bone: &'a mut ViewportPanel,
}

pub fn show(
    ui: &mut Ui,
    state: &mut AppState,
    services: &ViewerServices,
    viewers: ExplorerViewers<'_>,
) {
    ui.heading(t("explorer.title"));
    ui.add_space(8.0);

    catalog(ui, state);
    ui.add_space(10.0);
    description(ui, state.explorer.selected_bone);
    ui.add_space(14.0);

    let bone = state.explorer.selected_bone;
    let viewer_settings = &state.settings.viewer;
    let skull_config = viewport::orbit_config(
        viewer_settings,
        ModelSource::parse(SKULL_MODEL_PATH),
        true,
    );
    let bone_config =
        viewport::orbit_config(viewer_settings, ModelSource::parse(&bone.model_path()), true);

    let wide = ui.available_width() >= 760.0;
    if wide {
        ui.columns(2, |cols| {
            viewer_card(&mut cols[0], t("explorer.skull"), |ui, size| {
                viewers.skull.show(ui, services, skull_config, size);
            });
            viewer_card(&mut cols[1], bone.info().name, |ui, size| {
                viewers.bone.show(ui, services, bone_config, size);
            });
        });
    } else {
        viewer_card(ui, t("explorer.skull"), |ui, size| {
            viewers.skull.show(ui, services, skull_config, size);
        });
        ui.add_space(10.0);
        viewer_card(ui, bone.info().name, |ui, size| {
            viewers.bone.show(ui, services, bone_config, size);
        });
    }

    ui.add_space(18.0);
    ui.label(egui::RichText::new(t("explorer.embeds")).strong().size(18.0));
    ui.add_space(6.0);
    ui.columns(2, |cols| {
        embed_panel::show(&mut cols[0], t("explorer.skull"), SKULL_EMBED_URL);
        let info = bone.info();
        embed_panel::show(&mut cols[1], info.name, info.embed_url);
    });
}

fn catalog(ui: &mut Ui, state: &mut AppState) {
    ui.label(egui::RichText::new(t("explorer.catalog")).color(styles::MUTED));
    ui.horizontal_wrapped(|ui| {
        for bone in BoneId::ALL {
            let info = bone.info();
            let color = styles::bone_color(info.color);
            let selected = state.explorer.selected_bone == bone;

            let text = if selected {
                egui::RichText::new(info.name).strong().color(egui::Color32::WHITE)
            } else {
                egui::RichText::new(info.name)
            };
            let button = egui::Button::new(text)
                .fill(if selected { color } else { egui::Color32::WHITE })
                .stroke(egui::Stroke::new(1.5, color))
                .corner_radius(egui::CornerRadius::same(16));
            if ui.add(button).clicked() {
                state.explorer.select_bone(bone);
            }
        }
    });
}

fn description(ui: &mut Ui, bone: BoneId) {
    let info = bone.info();
    let color = styles::bone_color(info.color);
    styles::card()
        .stroke(egui::Stroke::new(2.0, color))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(t("explorer.selected")).small().color(styles::MUTED));
            ui.label(egui::RichText::new(info.name).size(22.0).strong().color(color));
            ui.add_space(4.0);
            ui.label(info.description);
        });
}

fn viewer_card(ui: &mut Ui, title: &str, add_viewer: impl FnOnce(&mut Ui, egui::Vec2)) {
    styles::card().show(ui, |ui| {
        ui.label(egui::RichText::new(title).strong());
        ui.add_space(6.0);
        let size = egui::vec2(ui.available_width(), VIEWER_HEIGHT);
        add_viewer(ui, size);
    });
}
