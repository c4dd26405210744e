use egui::Ui;

use anatomar_gui_lib::ai::TextGenerator;

use crate::app::styles;
use crate::i18n::t;
use crate::state::chat::{ChatMessage, ChatRole};
use crate::state::AppState;

const WINDOW_SIZE: egui::Vec2 = egui::vec2(360.0, 480.0);

/// Floating chat window, or the launcher button while it is closed
pub fn show(ctx: &egui::Context, state: &mut AppState, generator: &dyn TextGenerator) {
    if !state.explorer.chat_visible {
        launcher(ctx, state);
        return;
    }

    egui::Window::new("chat_window")
        .title_bar(false)
        .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -16.0])
        .fixed_size(WINDOW_SIZE)
        .frame(styles::card().inner_margin(egui::Margin::same(10)))
        .show(ctx, |ui| body(ui, state, generator));
}

fn launcher(ctx: &egui::Context, state: &mut AppState) {
    egui::Area::new(egui::Id::new("chat_launcher"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-20.0, -20.0])
        .show(ctx, |ui| {
            let button = egui::Button::new(
                egui::RichText::new(format!("💬 {}", t("chat.open"))).color(egui::Color32::WHITE),
            )
            .fill(styles::ACCENT)
            .corner_radius(egui::CornerRadius::same(22))
            .min_size(egui::vec2(0.0, 44.0));
            if ui.add(button).clicked() {
                state.explorer.open_chat();
            }
        });
}

fn body(ui: &mut Ui, state: &mut AppState, generator: &dyn TextGenerator) {
    // Header with clear and close buttons
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(t("chat.title")).strong().size(17.0));
            ui.label(egui::RichText::new(t("chat.subtitle")).small().color(styles::MUTED));
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("✕").on_hover_text(t("chat.close")).clicked() {
                state.explorer.close_chat();
            }
            if ui
                .small_button(t("chat.clear"))
                .on_hover_text(t("chat.clear_tip"))
                .clicked()
            {
                state.chat.clear();
            }
        });
    });
    ui.separator();

    // Message history (scrollable)
    let scroll_height = (ui.available_height() - 40.0).max(80.0);
    egui::ScrollArea::vertical()
        .id_salt("chat_scroll")
        .max_height(scroll_height)
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for msg in &state.chat.messages {
                show_message(ui, msg);
            }

            if state.chat.is_loading() {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.weak(t("chat.thinking"));
                });
            }
        });

    // Input area
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        let available_w = ui.available_width() - 44.0;
        let input_resp = ui.add_sized(
            [available_w.max(40.0), 26.0],
            egui::TextEdit::singleline(&mut state.chat.input)
                .hint_text(t("chat.ask"))
                .desired_width(available_w.max(40.0)),
        );

        let enter_pressed =
            input_resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let can_send = state.chat.can_send();

        let send_clicked = ui
            .add_enabled(can_send, egui::Button::new("➤").fill(styles::ACCENT))
            .on_hover_text(t("chat.send_tip"))
            .clicked();

        if (send_clicked || enter_pressed) && can_send {
            state.chat.send_message(generator);
            input_resp.request_focus();
        }
    });
}

/// Render a single chat bubble; user turns on the right
fn show_message(ui: &mut Ui, msg: &ChatMessage) {
    let (layout, bg, fg) = match msg.role {
        ChatRole::User => (
            egui::Layout::right_to_left(egui::Align::TOP),
            styles::ACCENT,
            egui::Color32::WHITE,
        ),
        ChatRole::Assistant if msg.is_error => (
            egui::Layout::left_to_right(egui::Align::TOP),
            egui::Color32::from_rgb(248, 215, 218),
            egui::Color32::from_rgb(114, 28, 36),
        ),
        ChatRole::Assistant => (
            egui::Layout::left_to_right(egui::Align::TOP),
            egui::Color32::from_rgb(241, 243, 245),
            egui::Color32::from_rgb(33, 37, 41),
        ),
    };

    let max_width = ui.available_width() * 0.82;
    ui.with_layout(layout, |ui| {
        egui::Frame::NONE
            .fill(bg)
            .corner_radius(egui::CornerRadius::same(10))
            .inner_margin(egui::Margin::symmetric(10, 6))
            .outer_margin(egui::Margin::symmetric(0, 2))
            .show(ui, |ui| {
                ui.set_max_width(max_width);
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(&msg.text).color(fg));
                    ui.label(
                        egui::RichText::new(msg.time_label())
                            .small()
                            .color(fg.gamma_multiply(0.7)),
                    );
                });
            });
    });
}
