use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use billing_cell::BillingLedger;
use dentist_cell::DentistRoster;
use notification_cell::{spawn_sweeper, NotificationOutbox};
use patient_cell::PatientDirectory;
use scheduling_cell::SchedulingEngine;
use shared_config::AppConfig;
use shared_store::JsonFileStore;
use voice_cell::VoiceProcessor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Dental Practice API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the per-cell services on their flat-file stores
    let engine = SchedulingEngine::with_office_hours(
        Box::new(JsonFileStore::in_dir(&config.data_dir, "appointments")),
        config.office_open_hour,
        config.office_close_hour,
    );
    let directory = PatientDirectory::new(Box::new(JsonFileStore::in_dir(
        &config.data_dir,
        "patients",
    )));
    let roster = DentistRoster::new(Box::new(JsonFileStore::in_dir(
        &config.data_dir,
        "dentists",
    )));
    let ledger = BillingLedger::new(
        Box::new(JsonFileStore::in_dir(&config.data_dir, "billing")),
        Box::new(JsonFileStore::in_dir(&config.data_dir, "insurance_claims")),
    );
    let outbox = Arc::new(RwLock::new(NotificationOutbox::new(Box::new(
        JsonFileStore::in_dir(&config.data_dir, "notifications"),
    ))));

    spawn_sweeper(outbox.clone(), config.notification_sweep_secs);

    let state = router::AppState {
        engine: Arc::new(RwLock::new(engine)),
        directory: Arc::new(RwLock::new(directory)),
        roster: Arc::new(RwLock::new(roster)),
        ledger: Arc::new(RwLock::new(ledger)),
        outbox,
        voice: Arc::new(VoiceProcessor::new()),
    };

    // Build the application router
    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
