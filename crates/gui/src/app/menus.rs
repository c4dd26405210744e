//! Navigation bar and settings window

use eframe::egui;

use crate::i18n::t;
use crate::state::{AppState, Language, Section};

use super::styles;

/// Top navigation: brand, section links, language and settings.
/// Narrow windows collapse the links behind a menu toggle.
pub fn nav_bar(ui: &mut egui::Ui, state: &mut AppState) {
    let narrow = ui.available_width() < 640.0;

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(t("app.title"))
                .strong()
                .size(20.0)
                .color(styles::ACCENT),
        );
        ui.add_space(12.0);

        if narrow {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let icon = if state.explorer.menu_open { "✕" } else { "☰" };
                if ui.button(icon).on_hover_text(t("nav.menu")).clicked() {
                    state.explorer.toggle_menu();
                }
            });
        } else {
            nav_links(ui, state);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                settings_button(ui, state);
                language_menu(ui, state);
            });
        }
    });

    if narrow && state.explorer.menu_open {
        ui.separator();
        ui.vertical(|ui| {
            nav_links(ui, state);
            ui.horizontal(|ui| {
                language_menu(ui, state);
                settings_button(ui, state);
            });
        });
    }
}

fn nav_links(ui: &mut egui::Ui, state: &mut AppState) {
    if ui.button(t("nav.home")).clicked() {
        state.explorer.request_scroll(Section::Hero);
    }
    if ui.button(t("nav.explorer")).clicked() {
        state.explorer.request_scroll(Section::Explorer);
    }
    if ui.button(t("nav.chat")).clicked() {
        state.explorer.open_chat();
        state.explorer.close_menu();
    }
}

fn settings_button(ui: &mut egui::Ui, state: &mut AppState) {
    if ui.button(t("nav.settings")).clicked() {
        state.show_settings_window = true;
        state.explorer.close_menu();
    }
}

/// Show the language menu. The app applies the choice on the next frame.
fn language_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button(t("nav.language"), |ui| {
        for &language in Language::all() {
            if ui
                .selectable_label(state.settings.ui.language == language, language.display_name())
                .clicked()
            {
                state.settings.ui.language = language;
                state.explorer.close_menu();
                ui.close_menu();
            }
        }
    });
}

/// Show the settings window
pub fn settings_window(ctx: &egui::Context, state: &mut AppState) {
    let mut open = state.show_settings_window;
    egui::Window::new(t("settings.title"))
        .open(&mut open)
        .resizable(true)
        .default_width(420.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_ui_settings(ui, state);
                show_viewer_settings(ui, state);
                show_chat_settings(ui, state);
                show_settings_buttons(ui, state);
            });
        });
    state.show_settings_window = open;
}

fn show_ui_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading(t("settings.ui"));
    ui.horizontal(|ui| {
        ui.label(t("settings.font_size"));
        ui.add(
            egui::DragValue::new(&mut state.settings.ui.font_size)
                .speed(0.5)
                .range(10.0..=24.0)
                .suffix(" pt"),
        );
    });
    ui.horizontal(|ui| {
        ui.label(t("nav.language"));
        egui::ComboBox::from_id_salt("language_combo")
            .selected_text(state.settings.ui.language.display_name())
            .show_ui(ui, |ui| {
                for &language in Language::all() {
                    ui.selectable_value(
                        &mut state.settings.ui.language,
                        language,
                        language.display_name(),
                    );
                }
            });
    });
    ui.add_space(10.0);
}

fn show_viewer_settings(ui: &mut egui::Ui, state: &mut AppState) {
    let viewer = &mut state.settings.viewer;
    ui.heading(t("settings.viewer"));

    ui.horizontal(|ui| {
        ui.label(t("settings.assets_dir"));
        ui.monospace(viewer.assets_dir.display().to_string());
        if ui.small_button(t("settings.browse")).clicked() {
            if let Some(dir) = rfd::FileDialog::new()
                .set_directory(&viewer.assets_dir)
                .pick_folder()
            {
                tracing::info!("Assets directory set to {}", dir.display());
                viewer.assets_dir = dir;
            }
        }
    });

    ui.horizontal(|ui| {
        ui.label(t("settings.bg_color"));
        let [r, g, b] = viewer.background;
        let mut color = egui::Color32::from_rgb(r, g, b);
        if ui.color_edit_button_srgba(&mut color).changed() {
            viewer.background = [color.r(), color.g(), color.b()];
        }
    });

    ui.horizontal(|ui| {
        ui.label(t("settings.scale"));
        ui.add(
            egui::DragValue::new(&mut viewer.model_scale)
                .speed(0.05)
                .range(0.1..=10.0),
        );
    });

    ui.horizontal(|ui| {
        ui.label(t("settings.damping"));
        ui.add(egui::Slider::new(&mut viewer.damping_factor, 0.01..=1.0));
    });

    ui.horizontal(|ui| {
        ui.label(t("settings.rotate_speed"));
        ui.add(egui::Slider::new(&mut viewer.auto_rotate_speed, 0.0..=5.0));
    });

    ui.weak(t("settings.restart_hint"));
    ui.add_space(10.0);
}

fn show_chat_settings(ui: &mut egui::Ui, state: &mut AppState) {
    let chat = &mut state.settings.chat;
    ui.heading(t("settings.chat"));

    egui::Grid::new("chat_settings_grid")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label(t("settings.endpoint"));
            ui.text_edit_singleline(&mut chat.endpoint);
            ui.end_row();

            ui.label(t("settings.model"));
            ui.text_edit_singleline(&mut chat.model);
            ui.end_row();

            ui.label(t("settings.api_key"));
            ui.add(egui::TextEdit::singleline(&mut chat.api_key).password(true));
            ui.end_row();
        });
    ui.weak(t("settings.api_key_env"));
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, state: &mut AppState) {
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button(t("settings.apply")).clicked() {
            state.settings.save();
        }
        if ui.button(t("settings.reset")).clicked() {
            state.settings = crate::state::settings::AppSettings::default();
        }
        if ui.button(t("settings.close")).clicked() {
            state.show_settings_window = false;
        }
    });
}
