//! ENIST dashboard - Entry point.

use anyhow::Context;
use enist_dashboard::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    bootstrap::{ensure_password, TerminalPrompt},
    config::Config,
    lookup::LookupSettings,
    session::load_or_create_key,
    ConfigStore,
};
use logo_generator::LogoGenerator;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ENIST dashboard");

    if let Err(e) = run(config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let store = ConfigStore::load(config.config_path())
        .await
        .context("Failed to load config store")?;
    info!(path = %store.path().display(), "Config store ready");

    let outcome = ensure_password(&store, config.admin_password.as_deref(), &mut TerminalPrompt)
        .await
        .context("Failed to bootstrap admin password")?;
    info!(?outcome, "Credential bootstrap finished");

    let session_key = load_or_create_key(config.secret_key.as_deref(), &config.session_key_path())
        .await
        .context("Failed to prepare session key")?;

    let mut logo = LogoGenerator::new();
    if let Some(font) = &config.branding.font_path {
        logo = logo.with_preferred_font(font);
    }

    let logo_path = config.logo_path();
    if !tokio::fs::try_exists(&logo_path).await.unwrap_or(false) {
        let generator = logo.clone();
        let path = logo_path.clone();
        let text = config.branding.default_text.clone();
        tokio::task::spawn_blocking(move || generator.generate(&text, &path))
            .await?
            .context("Failed to generate initial logo")?;
    }

    let state = AppState {
        store: Arc::new(store),
        logo: Arc::new(logo),
        logo_path,
        static_dir: config.static_dir(),
        default_logo_text: config.branding.default_text.clone(),
        lookup: Arc::new(LookupSettings::from_config(&config)),
        session_key,
        session_max_age: config.session.max_age,
    };

    // Create rate limiter from config
    let rate_limit = RateLimitState::new(config.rate_limit.login_per_minute);

    let app = create_router_with_rate_limit(state, rate_limit);

    // Bind to address
    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Server error")?;
    Ok(())
}
