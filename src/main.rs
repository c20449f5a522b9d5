use std::sync::Arc;

use tokio::sync::Mutex;

use offer_wizard::clients::{
    AssistantClient, HttpOfferSubmitter, OfferSubmitter, PropertyClient, ScraperClient,
};
use offer_wizard::config::AppConfig;
use offer_wizard::email::{EmailConfig, OfferMailer};
use offer_wizard::routes::{AppState, app_routes};
use offer_wizard::storage::{DraftStore, FileDraftStore};
use offer_wizard::wizard::WizardController;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

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
        eprintln!("  export OFFER_API_BASE_URL=https://...");
        eprintln!("  export PROPERTY_API_URL=https://...");
        std::process::exit(1);
    });

    std::fs::create_dir_all(&config.data_dir)?;

    eprintln!("🏠 Offer Wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/wizard", config.port);
    eprintln!("   Drafts: {}", config.data_dir.display());

    let http = reqwest::Client::new();

    let store: Arc<dyn DraftStore> = Arc::new(FileDraftStore::new(&config.data_dir));
    let scraper = config
        .scraper_api_url
        .as_ref()
        .map(|url| Arc::new(ScraperClient::new(http.clone(), url.as_str())));

    let wizard = WizardController::restore(Arc::clone(&store), scraper).await;
    tracing::info!(step = %wizard.step(), "Wizard session restored");

    let submitter: Arc<dyn OfferSubmitter> = Arc::new(HttpOfferSubmitter::new(
        http.clone(),
        config.offer_api_base.as_str(),
    ));
    let property = Arc::new(PropertyClient::new(
        http.clone(),
        config.property_api_url.as_str(),
    ));
    let assistant = Arc::new(AssistantClient::new(
        http.clone(),
        config.assistant.api_url.as_str(),
        config.assistant.model.as_str(),
        config.assistant.api_key.clone(),
    ));

    let mailer = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "Submission emails enabled");
            Some(Arc::new(OfferMailer::new(email_config)))
        }
        None => {
            tracing::info!("OFFER_SMTP_HOST not set, submission emails disabled");
            None
        }
    };

    let state = AppState {
        wizard: Arc::new(Mutex::new(wizard)),
        submitter,
        property,
        assistant,
        mailer,
    };

    let app = app_routes(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Offer wizard server started");
    axum::serve(listener, app).await?;

    Ok(())
}
