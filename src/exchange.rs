use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Outbound liking-evaluation payload. Built fresh for every call and
/// discarded after the request is sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub user_id: String,
    pub character_id: String,
    pub player_message: String,
}

/// Result of a liking evaluation as returned by the server.
/// `new_liking` is the updated total, `score` the delta for this message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikingEvaluation {
    pub new_liking: i64,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

/// Everything that can go wrong in a single request/response exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Seam between the evaluator and the remote API, so the exchange logic can
/// be exercised without a live server.
#[async_trait]
pub trait EvaluationBackend: Send + Sync {
    async fn evaluate_liking(
        &self,
        request: &EvaluationRequest,
    ) -> Result<LikingEvaluation, ExchangeError>;
}

/// Display sink for the liking total. Injected at construction; whichever
/// evaluation resolves last overwrites the displayed value.
pub trait ScoreSink: Send + Sync {
    fn set_score(&self, score: i64);
}

/// Drives the evaluate-liking round trip: one POST per non-empty message,
/// forward the updated total to the sink on success, log and drop on failure.
pub struct TrustEvaluator {
    backend: Arc<dyn EvaluationBackend>,
    sink: Arc<dyn ScoreSink>,
    user_id: String,
    character_id: String,
}

impl TrustEvaluator {
    pub fn new(
        backend: Arc<dyn EvaluationBackend>,
        sink: Arc<dyn ScoreSink>,
        user_id: String,
        character_id: String,
    ) -> Self {
        Self {
            backend,
            sink,
            user_id,
            character_id,
        }
    }

    /// Evaluate a player message. Empty or whitespace-only input is skipped
    /// locally without touching the network; errors never surface to the
    /// caller, the worst case is a sink that keeps its previous value.
    pub async fn evaluate(&self, message: &str) {
        if message.trim().is_empty() {
            debug!("Empty message, skipping liking evaluation");
            return;
        }

        let request = EvaluationRequest {
            user_id: self.user_id.clone(),
            character_id: self.character_id.clone(),
            player_message: message.to_string(),
        };

        match self.backend.evaluate_liking(&request).await {
            Ok(evaluation) => {
                info!(
                    "Liking evaluated: score={} new_liking={} reason={:?}",
                    evaluation.score, evaluation.new_liking, evaluation.reason
                );
                self.sink.set_score(evaluation.new_liking);
            }
            Err(e) => {
                error!("Liking evaluation failed: {}", e);
            }
        }
    }
}
