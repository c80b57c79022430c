use std::sync::Arc;

use futures::StreamExt;

use history_assist::channels::{Channel, CliChannel, OutgoingResponse};
use history_assist::config::DispatcherConfig;
use history_assist::dispatch::TurnDispatcher;
use history_assist::kb::{KnowledgeSource, QnaConfig, QnaMakerClient};
use history_assist::nlu::{IntentRecognizer, LuisClient, LuisConfig};
use history_assist::store::{LibSqlStore, UserHistoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = DispatcherConfig::from_env();

    // Intent recognizer — required collaborator
    let luis_config = LuisConfig::from_env().unwrap_or_else(|| {
        eprintln!("Error: LUIS endpoint not configured");
        eprintln!("  export LUIS_ENDPOINT=https://<region>.api.cognitive.microsoft.com");
        eprintln!("  export LUIS_APP_ID=<app id>");
        eprintln!("  export LUIS_SUBSCRIPTION_KEY=<key>");
        std::process::exit(1);
    });
    let nlu: Arc<dyn IntentRecognizer> = Arc::new(LuisClient::new(luis_config));

    // Knowledge base — required collaborator
    let qna_config = QnaConfig::from_env().unwrap_or_else(|| {
        eprintln!("Error: QnA endpoint not configured");
        eprintln!("  export QNA_ENDPOINT=https://<service>.azurewebsites.net");
        eprintln!("  export QNA_KB_ID=<knowledge base id>");
        eprintln!("  export QNA_ENDPOINT_KEY=<key>");
        std::process::exit(1);
    });
    let kb: Arc<dyn KnowledgeSource> = Arc::new(QnaMakerClient::new(qna_config));

    // ── User memory store ────────────────────────────────────────────────
    let db_path = std::env::var("HISTORY_ASSIST_DB_PATH")
        .unwrap_or_else(|_| "./data/history-assist.db".to_string());

    let store: Arc<dyn UserHistoryStore> = Arc::new(
        LibSqlStore::new_local(std::path::Path::new(&db_path))
            .await
            .unwrap_or_else(|e| {
                eprintln!("Error: Failed to open database at {}: {}", db_path, e);
                std::process::exit(1);
            }),
    );

    eprintln!("🩺 History Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", db_path);
    eprintln!(
        "   Confidence threshold: {}",
        config.confidence_threshold
    );
    eprintln!("   Type a message and press Enter. Ctrl-D to exit.\n");

    let dispatcher = TurnDispatcher::new(nlu, kb, store, config);

    // ── Turn loop ────────────────────────────────────────────────────────
    // The stream is driven strictly sequentially, which serializes turns
    // per conversation — the dispatcher relies on that guarantee.
    let channel = CliChannel::new();
    let mut messages = channel.start().await?;

    while let Some(msg) = messages.next().await {
        match dispatcher.handle_turn(&msg).await {
            Ok(Some(response)) => {
                let wire = response.to_wire()?;
                channel.respond(&msg, OutgoingResponse::new(wire)).await?;
            }
            Ok(None) => {}
            Err(e) => {
                // Failed turn: log and move on. The dispatcher itself
                // never retries a collaborator.
                tracing::error!(id = %msg.id, error = %e, "Turn failed");
            }
        }
    }

    channel.shutdown().await?;
    Ok(())
}
