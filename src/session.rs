use std::sync::Arc;
use tracing::{debug, error};

use crate::api::{ApiClient, ChatEntry, ChatRequest};
use crate::exchange::{ExchangeError, TrustEvaluator};

/// One chat session between a user and a character. Sends each message to
/// the chat endpoint, then runs the liking evaluation for the same message.
/// Strictly sequential, one request in flight at a time.
pub struct ChatSession {
    api: Arc<ApiClient>,
    evaluator: TrustEvaluator,
    user_id: String,
    character_id: String,
    character_name: String,
}

impl ChatSession {
    pub fn new(
        api: Arc<ApiClient>,
        evaluator: TrustEvaluator,
        user_id: String,
        character_id: String,
        character_name: String,
    ) -> Self {
        Self {
            api,
            evaluator,
            user_id,
            character_id,
            character_name,
        }
    }

    /// Send one user message. Empty input is skipped locally; a failed chat
    /// call is logged and shown, never propagated. The liking evaluation
    /// only runs when the chat call itself succeeded, matching the order
    /// the reply and the score update appear to the user.
    pub async fn send(&self, message: &str) {
        if message.trim().is_empty() {
            debug!("Empty input, nothing to send");
            return;
        }

        let request = ChatRequest {
            user_id: self.user_id.clone(),
            character_id: self.character_id.clone(),
            user_message: message.to_string(),
        };

        match self.api.chat(&request).await {
            Ok(response) => {
                println!("{}> {}", self.character_name, response.reply);
                self.evaluator.evaluate(message).await;
            }
            Err(ExchangeError::Status { status, body }) => {
                error!("Chat request rejected: {} - {}", status, body);
                println!("error: HTTP/{}", status);
            }
            Err(e) => {
                error!("Chat request failed: {}", e);
                println!("error: {}", e);
            }
        }
    }

    /// Fetch and print the stored conversation for this user/character pair.
    pub async fn show_history(&self) {
        match self.api.get_history(&self.user_id, &self.character_id).await {
            Ok(entries) => {
                for entry in &entries {
                    println!("{}", format_entry(entry, &self.character_name));
                }
            }
            Err(e) => {
                error!("Failed to load chat history: {}", e);
            }
        }
    }
}

/// Render one history record as a console line. Timestamps arrive as RFC
/// 3339 strings; anything unparseable is shown as-is.
pub fn format_entry(entry: &ChatEntry, character_name: &str) -> String {
    let when = chrono::DateTime::parse_from_rfc3339(&entry.timestamp)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| entry.timestamp.clone());
    let speaker = if entry.speaker.eq_ignore_ascii_case("user") {
        "you"
    } else {
        character_name
    };
    format!("[{}] {}> {}", when, speaker, entry.message)
}
