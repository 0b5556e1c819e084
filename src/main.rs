use actix_cors::Cors;
use actix_web::{http::header, App, HttpServer};
use anyhow::Context;
use donation_checkout::config::{Config, DatabaseConfig, LogFormat};
use donation_checkout::donations::{DonationRepository, MySqlDonationRepository};
use donation_checkout::gateways::{MidtransClient, PaymentGateway};
use donation_checkout::middleware::RequestId;
use donation_checkout::AppState;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "donation_checkout=debug,actix_web=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.app.log_format);
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!("Starting donation checkout service");
    tracing::info!(environment = %config.app.env, "Environment");
    tracing::info!(
        require_signature = config.webhook.require_signature,
        sandbox_actions = cfg!(feature = "sandbox"),
        "Webhook verification"
    );

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;
    DatabaseConfig::run_migrations(&db_pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!(
        max_connections = config.database.max_connections,
        "Database pool initialized"
    );

    let repository: Arc<dyn DonationRepository> =
        Arc::new(MySqlDonationRepository::new(db_pool.clone()));
    let gateway: Arc<dyn PaymentGateway> =
        Arc::new(MidtransClient::new(&config.midtrans).context("Failed to build Midtrans client")?);

    let state = AppState::new(
        repository,
        gateway,
        &config.midtrans.server_key,
        config.webhook.require_signature,
        &config.app.public_url,
    );

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let allowed_origin = config.app.public_url.clone();
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .max_age(3600);

        let state = state.clone();
        App::new()
            .wrap(cors)
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await.context("Server error")?;

    db_pool.close().await;
    tracing::info!("Database pool closed");

    Ok(())
}
