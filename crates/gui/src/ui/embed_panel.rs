//! Card linking to a hosted 3D viewer

use egui::Ui;

use anatomar_gui_lib::embed::EmbedPanel;

use crate::app::styles;
use crate::i18n::t;

/// Show a card for the hosted viewer at `url`. The viewer opens in the
/// system browser.
pub fn show(ui: &mut Ui, title: &str, url: &str) {
    styles::card().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(egui::RichText::new(title).strong());
        ui.add_space(4.0);
        match EmbedPanel::new(title, url) {
            Ok(panel) => {
                ui.hyperlink_to(format!("🔗 {}", t("embed.open")), panel.url())
                    .on_hover_text(panel.url());
            }
            Err(e) => {
                ui.colored_label(egui::Color32::from_rgb(220, 53, 69), t("embed.invalid"))
                    .on_hover_text(e.to_string());
            }
        }
    });
}
