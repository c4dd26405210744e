use serde::{Deserialize, Serialize};

pub mod anatomy;

pub use anatomy::{BoneId, BoneInfo, HERO_MODEL_PATH, SKULL_EMBED_URL, SKULL_MODEL_PATH};

/// Configuración de generación enviada con cada petición
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

/// Fragmento de texto dentro de un contenido
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Contenido: una lista ordenada de fragmentos con un rol opcional
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Cuerpo de la petición `generateContent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Petición con un único prompt de texto y los parámetros fijos
    pub fn single_prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part {
                    text: Some(text.into()),
                }],
            }],
            generation_config: GenerationConfig::default(),
        }
    }
}

/// Una respuesta candidata del modelo
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Respuesta de `generateContent`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Texto del primer fragmento del primer candidato, si existe
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let req = GenerateContentRequest::single_prompt("hola");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hola");
        assert!(json["contents"][0].get("role").is_none());
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        let temp = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_response_first_text() {
        let json = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Hola"}, {"text": "extra"}]}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "otra"}]}}
            ]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.first_text(), Some("Hola"));
    }

    #[test]
    fn test_response_without_candidates() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.first_text(), None);

        let resp: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(resp.first_text(), None);
    }
}
