use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use reqwest::Client;
use tracing::debug;

use crate::exchange::{EvaluationBackend, EvaluationRequest, ExchangeError, LikingEvaluation};

/// Thin client over the character-chat REST API. One method per endpoint,
/// one request per call, no retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub character_id: String,
    pub user_message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// One record of the stored conversation, as returned by the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub speaker: String, // "user" or "assistant"
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterInfo {
    pub id: String,
    pub name: String,
    pub personality: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ExchangeError> {
        self.post_json("/chat", request).await
    }

    pub async fn get_history(
        &self,
        user_id: &str,
        character_id: &str,
    ) -> Result<Vec<ChatEntry>, ExchangeError> {
        self.get_json(&format!("/history/{}/{}", user_id, character_id))
            .await
    }

    pub async fn list_characters(&self) -> Result<Vec<CharacterInfo>, ExchangeError> {
        self.get_json("/characters/").await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ExchangeError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ExchangeError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    // Body text is read before decoding so a non-success status can carry
    // the server's error payload.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ExchangeError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExchangeError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl EvaluationBackend for ApiClient {
    async fn evaluate_liking(
        &self,
        request: &EvaluationRequest,
    ) -> Result<LikingEvaluation, ExchangeError> {
        self.post_json("/evaluate-liking", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_serializes_with_wire_field_names() {
        let request = ChatRequest {
            user_id: "user-1".to_string(),
            character_id: "char-1".to_string(),
            user_message: "おはよう".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["character_id"], "char-1");
        assert_eq!(json["user_message"], "おはよう");
    }

    #[test]
    fn chat_response_parses_reply() {
        let response: ChatResponse = serde_json::from_str(r#"{"reply": "こんにちは"}"#).unwrap();
        assert_eq!(response.reply, "こんにちは");
    }

    #[test]
    fn history_parses_flat_record_array() {
        let body = r#"[
            {"speaker": "user", "message": "hi", "timestamp": "2026-08-01T12:00:00+00:00"},
            {"speaker": "assistant", "message": "hello", "timestamp": "2026-08-01T12:00:05+00:00"}
        ]"#;
        let entries: Vec<ChatEntry> = serde_json::from_str(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].speaker, "user");
        assert_eq!(entries[1].message, "hello");
    }

    #[test]
    fn character_list_parses_extra_fields_ignored() {
        let body = r#"[{
            "id": "854d5e61-9d5c-45c6-b3b6-019acfba777e",
            "name": "Mira",
            "personality": "gentle",
            "system_prompt": "You are Mira."
        }]"#;
        let characters: Vec<CharacterInfo> = serde_json::from_str(body).unwrap();
        assert_eq!(characters[0].name, "Mira");
        assert_eq!(characters[0].personality, "gentle");
    }
}
