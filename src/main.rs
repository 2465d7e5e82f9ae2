use anyhow::Result;
use praska_locale::{Config, LandingClient, LanguageSession, PreferenceStore};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("praska_locale=info".parse()?),
        )
        .init();

    info!("Starting Praska locale check");

    // Load configuration from environment
    let config = Config::from_env()?;

    let store = PreferenceStore::open(&config.prefs_path)?;
    let client = LandingClient::from_config(&config)?;
    let session = LanguageSession::new(client, store, &config.default_language);

    info!("Active language: {}", session.language());

    // Fetch the full bundle once and report what resolved
    session.initialize().await;

    let state = session.snapshot();
    if let Some(error) = &state.error {
        warn!("Bundle fetch failed: {}", error);
        return Ok(());
    }

    if let Some(bundle) = &state.bundle {
        let codes: Vec<_> = bundle.codes().collect();
        info!("Available languages: {}", codes.join(", "));
    }

    match state.current_document() {
        Some(doc) => info!(
            "Current document resolved for '{}' ({} section(s))",
            doc.lang,
            doc.sections.len()
        ),
        None => warn!(
            "No locale document for active language '{}'",
            state.language
        ),
    }

    Ok(())
}
