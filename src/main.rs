mod api;
mod config;
mod display;
mod exchange;
mod session;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use api::ApiClient;
use config::{Prefs, Settings};
use display::ConsoleScoreDisplay;
use exchange::TrustEvaluator;
use session::ChatSession;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cocoro_client=info")),
        )
        .init();

    let prefs_path = config::prefs_path();
    let prefs = Prefs::load(&prefs_path)?;
    let settings = Settings::from_prefs(&prefs);
    info!("Using API base URL: {}", settings.base_url);

    // Persist a freshly generated user id so the identity survives restarts.
    if prefs.user_id.is_none() {
        let updated = Prefs {
            user_id: Some(settings.user_id.clone()),
            ..prefs.clone()
        };
        if let Err(e) = updated.save(&prefs_path) {
            warn!("Could not persist user_id to {}: {}", prefs_path, e);
        }
    }

    let api = Arc::new(ApiClient::new(settings.base_url.clone()));

    // Character: configured id wins, otherwise the first one the server knows.
    let characters = match api.list_characters().await {
        Ok(list) => list,
        Err(e) => {
            warn!("Could not fetch character list: {}", e);
            Vec::new()
        }
    };
    let (character_id, character_name) = match &settings.character_id {
        Some(id) => {
            let name = characters
                .iter()
                .find(|c| &c.id == id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "character".to_string());
            (id.clone(), name)
        }
        None => {
            let first = characters
                .first()
                .ok_or_else(|| anyhow::anyhow!("No character configured and none available from server"))?;
            info!("No character configured, talking to '{}'", first.name);
            (first.id.clone(), first.name.clone())
        }
    };

    let sink = Arc::new(ConsoleScoreDisplay::new(0));
    let evaluator = TrustEvaluator::new(
        api.clone(),
        sink,
        settings.user_id.clone(),
        character_id.clone(),
    );
    let session = ChatSession::new(
        api,
        evaluator,
        settings.user_id,
        character_id,
        character_name,
    );

    session.show_history().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "quit" {
            break;
        }
        session.send(&line).await;
    }

    info!("Session ended");
    Ok(())
}
