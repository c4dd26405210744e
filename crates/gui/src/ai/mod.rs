//! Text generation client for the anatomy chat.
//!
//! One request per user turn: the fixed system prompt plus the user's text is
//! posted to Gemini `generateContent`, and the first candidate's text is the
//! reply. Requests run on the tokio runtime and hand their result back to the
//! UI thread through a oneshot channel.

use shared::{GenerateContentRequest, GenerateContentResponse};
use tokio::sync::oneshot;

use crate::state::settings::ChatSettings;

pub const SYSTEM_PROMPT: &str = "Eres Anatom, un chatbot educativo especializado en anatomía humana. \
Tu tarea es enseñar de forma clara, respetuosa y amigable, usando un lenguaje simple y apropiado \
para niños de educación primaria. Responde solo preguntas relacionadas con el cuerpo humano y la \
anatomía. Si alguien hace preguntas que no tienen que ver con la anatomía humana o que no son \
apropiadas para niños, responde amablemente que no puedes hablar de ese tema porque estás diseñado \
solo para enseñar sobre el cuerpo humano. No des consejos médicos.";

pub const TRANSPORT_FALLBACK: &str =
    "Lo siento, no pude procesar tu mensaje. Intenta de nuevo más tarde.";

pub const PROCESSING_FALLBACK: &str = "Lo siento, hubo un error al procesar tu solicitud. \
Por favor, verifica que la API Key esté configurada correctamente e intenta de nuevo.";

/// Full prompt sent for one user turn
pub fn build_prompt(user_text: &str) -> String {
    format!("{SYSTEM_PROMPT}\n\nUsuario: {user_text}")
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("API returned HTTP {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Malformed(String),
    #[error("no API key configured")]
    MissingApiKey,
}

impl ChatError {
    /// The request never produced a usable HTTP exchange
    pub fn is_transport(&self) -> bool {
        matches!(self, ChatError::Transport(_) | ChatError::Status(_))
    }

    /// Assistant text shown in place of a reply
    pub fn fallback_text(&self) -> &'static str {
        if self.is_transport() {
            TRANSPORT_FALLBACK
        } else {
            PROCESSING_FALLBACK
        }
    }
}

pub type ReplyResult = Result<String, ChatError>;

/// Sending half held by whoever produces the reply
pub struct ReplySender(oneshot::Sender<ReplyResult>);

impl ReplySender {
    pub fn send(self, result: ReplyResult) -> bool {
        self.0.send(result).is_ok()
    }
}

/// Reply still being generated
pub struct PendingReply(oneshot::Receiver<ReplyResult>);

impl PendingReply {
    pub fn channel() -> (ReplySender, PendingReply) {
        let (tx, rx) = oneshot::channel();
        (ReplySender(tx), PendingReply(rx))
    }

    /// Already-resolved reply
    pub fn ready(result: ReplyResult) -> Self {
        let (tx, pending) = Self::channel();
        tx.send(result);
        pending
    }

    /// Non-blocking poll; `None` while the request is in flight
    pub fn try_take(&mut self) -> Option<ReplyResult> {
        match self.0.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                Some(Err(ChatError::Transport("request dropped".into())))
            }
        }
    }
}

/// Anything that can turn a prompt into a reply
pub trait TextGenerator {
    fn generate(&self, prompt: String) -> PendingReply;
}

/// Gemini `generateContent` over reqwest
#[derive(Clone)]
pub struct GeminiClient {
    runtime: tokio::runtime::Handle,
    client: reqwest::Client,
    settings: ChatSettings,
}

impl GeminiClient {
    pub fn new(runtime: tokio::runtime::Handle, settings: ChatSettings) -> Self {
        Self {
            runtime,
            client: reqwest::Client::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: String) -> PendingReply {
        let Some(api_key) = self.settings.resolved_api_key() else {
            tracing::warn!("Chat request skipped: no API key configured");
            return PendingReply::ready(Err(ChatError::MissingApiKey));
        };

        let (tx, pending) = PendingReply::channel();
        let client = self.client.clone();
        let url = self.settings.generate_url();

        self.runtime.spawn(async move {
            let result = request_reply(&client, &url, &api_key, prompt).await;
            if let Err(e) = &result {
                tracing::error!("Chat request failed: {e}");
            }
            tx.send(result);
        });

        pending
    }
}

async fn request_reply(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    prompt: String,
) -> ReplyResult {
    let body = GenerateContentRequest::single_prompt(prompt);

    let response = client
        .post(url)
        .query(&[("key", api_key)])
        .json(&body)
        .send()
        .await
        .map_err(|e| ChatError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ChatError::Status(status.as_u16()));
    }

    let text = response
        .text()
        .await
        .map_err(|e| ChatError::Transport(e.to_string()))?;
    parse_reply(&text)
}

/// Extract `candidates[0].content.parts[0].text` from a response body
pub fn parse_reply(body: &str) -> ReplyResult {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ChatError::Malformed(e.to_string()))?;
    parsed
        .first_text()
        .map(str::to_string)
        .ok_or_else(|| ChatError::Malformed("response has no candidate text".into()))
}
