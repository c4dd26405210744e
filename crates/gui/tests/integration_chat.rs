//! Integration tests for the chat transcript against scripted generators.

use anatomar_gui_lib::ai::{build_prompt, ChatError, PROCESSING_FALLBACK, TRANSPORT_FALLBACK};
use anatomar_gui_lib::harness::ScriptedGenerator;
use anatomar_gui_lib::state::chat::{ChatRole, ChatSession, WELCOME_TEXT};

#[test]
fn test_network_failure_appends_fallback() {
    let gen = ScriptedGenerator::new([Err(ChatError::Transport("connection refused".into()))]);
    let mut chat = ChatSession::new();
    let before = chat.messages.len();

    chat.input = "¿Qué es el hueso frontal?".into();
    assert!(chat.send_message(&gen));
    assert!(chat.poll_responses());

    assert_eq!(chat.messages.len(), before + 2);
    let user = &chat.messages[before];
    assert_eq!(user.role, ChatRole::User);
    assert_eq!(user.text, "¿Qué es el hueso frontal?");
    let last = chat.messages.last().unwrap();
    assert_eq!(last.role, ChatRole::Assistant);
    assert_eq!(last.text, TRANSPORT_FALLBACK);
    assert!(last.is_error);
    assert!(!chat.is_loading());
}

#[test]
fn test_http_error_status_uses_transport_fallback() {
    let gen = ScriptedGenerator::new([Err(ChatError::Status(503))]);
    let mut chat = ChatSession::new();
    chat.send("hola", &gen);
    chat.poll_responses();
    assert_eq!(chat.messages.last().unwrap().text, TRANSPORT_FALLBACK);
}

#[test]
fn test_malformed_body_uses_processing_fallback() {
    let gen = ScriptedGenerator::new([Err(ChatError::Malformed("no candidates".into()))]);
    let mut chat = ChatSession::new();
    chat.send("hola", &gen);
    chat.poll_responses();
    assert_eq!(chat.messages.last().unwrap().text, PROCESSING_FALLBACK);
}

#[test]
fn test_success_appends_exact_reply() {
    let reply = "El hueso frontal protege el cerebro.";
    let gen = ScriptedGenerator::new([Ok(reply.to_string())]);
    let mut chat = ChatSession::new();
    let before = chat.messages.len();

    chat.send("¿Para qué sirve?", &gen);
    chat.poll_responses();

    assert_eq!(chat.messages.len(), before + 2);
    let assistant_turns: Vec<_> = chat.messages[before..]
        .iter()
        .filter(|m| m.role == ChatRole::Assistant)
        .collect();
    assert_eq!(assistant_turns.len(), 1);
    assert_eq!(assistant_turns[0].text, reply);
    assert!(!assistant_turns[0].is_error);
}

#[test]
fn test_prompt_carries_system_instructions() {
    let gen = ScriptedGenerator::new([Ok("ok".into())]);
    let mut chat = ChatSession::new();
    chat.send("  ¿Cuántos huesos tiene el cráneo?  ", &gen);

    let prompts = gen.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0], build_prompt("¿Cuántos huesos tiene el cráneo?"));
}

#[test]
fn test_one_request_per_turn_while_pending() {
    let gen = ScriptedGenerator::holding();
    let mut chat = ChatSession::new();

    assert!(chat.send("primera", &gen));
    assert!(chat.is_loading());
    assert!(!chat.send("segunda", &gen));
    assert!(!chat.poll_responses());
    assert_eq!(gen.request_count(), 1);

    assert!(gen.release(Ok("respuesta".into())));
    assert!(chat.poll_responses());
    assert!(!chat.is_loading());
    assert_eq!(chat.messages.len(), 3);
    assert_eq!(chat.messages[2].text, "respuesta");
}

#[test]
fn test_clear_drops_pending_reply() {
    let gen = ScriptedGenerator::holding();
    let mut chat = ChatSession::new();
    chat.send("hola", &gen);
    chat.clear();

    assert!(!chat.is_loading());
    assert!(!gen.release(Ok("tarde".into())));
    assert!(!chat.poll_responses());
    assert_eq!(chat.messages.len(), 1);
    assert_eq!(chat.messages[0].text, WELCOME_TEXT);
}
