pub mod chat_panel;
pub mod embed_panel;
pub mod explorer;
pub mod hero;
