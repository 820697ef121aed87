use std::sync::Arc;

use invite_bridge::channels::TwilioSender;
use invite_bridge::config::AppConfig;
use invite_bridge::error::Result;
use invite_bridge::pipeline::EventProcessor;
use invite_bridge::registry::{InMemoryRegistry, SenderRegistry};
use invite_bridge::webhook::webhook_routes;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  Required: ACTIVATION_CODE, ADMIN_NUMBER, WHATSAPP_GROUP_LINK,");
        eprintln!("            TWILIO_SID, TWILIO_TOKEN, TWILIO_NUMBER");
        std::process::exit(1);
    });

    eprintln!("🤖 Invite bridge v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: http://0.0.0.0:{}/webhook", config.port);
    eprintln!("   Admin: {}", config.bridge.admin_recipient);
    eprintln!("   Send timeout: {}s\n", config.send_timeout.as_secs());

    // ── Core ────────────────────────────────────────────────────────────
    let registry: Arc<dyn SenderRegistry> = Arc::new(InMemoryRegistry::new());
    let sender = Arc::new(TwilioSender::new(config.twilio.clone()));
    let processor = Arc::new(
        EventProcessor::new(config.bridge.clone(), registry, sender)
            .with_send_timeout(config.send_timeout),
    );

    // ── HTTP ────────────────────────────────────────────────────────────
    let app = webhook_routes(processor);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "🚀 Webhook server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
