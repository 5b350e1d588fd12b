//! Expense tracker
//!
//! `serve` runs the expense service (HTTP + SQLite, with currency
//! conversion at write time). `agent` and `console` run the conversation
//! agent that walks chat users through the expense forms.

mod api;
mod client;
mod config;
mod db;
mod document;
mod expense;
mod rates;
mod runtime;
mod service;
mod state_machine;
mod transport;

use api::{create_router, AppState};
use client::HttpExpenseClient;
use config::{AgentConfig, ServiceConfig};
use db::Database;
use rates::ScrapingOracle;
use runtime::AgentRuntime;
use service::ExpenseService;
use state_machine::SessionContext;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: expense-tracker <serve|agent|console>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expense_tracker=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    match std::env::args().nth(1).as_deref() {
        Some("serve") => serve(ServiceConfig::from_env()).await,
        Some("agent") => agent(AgentConfig::from_env()).await,
        Some("console") => console(AgentConfig::from_env()).await,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

async fn serve(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;
    tracing::info!(expenses = db.count_expenses()?, "Database ready");

    let oracle = ScrapingOracle::new(&config.rates)?;
    let state = AppState::new(ExpenseService::new(db, Arc::new(oracle)));

    let app = with_layers(create_router(state));
    listen(config.port, app, "Expense service").await
}

async fn agent(config: AgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Arc::new(build_runtime(&config)?);
    let app = with_layers(transport::http::create_router(runtime));
    listen(config.port, app, "Chat gateway").await
}

async fn console(config: AgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.document_dir)?;
    let runtime = build_runtime(&config)?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    transport::console::run(&runtime, &config.document_dir, stdin, tokio::io::stdout()).await?;
    Ok(())
}

fn build_runtime(config: &AgentConfig) -> Result<AgentRuntime, reqwest::Error> {
    tracing::info!(api_url = %config.api_url, currency = %config.local_currency, "Starting agent");
    let client = HttpExpenseClient::new(&config.api_url, config.api_timeout)?;
    Ok(AgentRuntime::new(
        Arc::new(client),
        SessionContext::new(&config.local_currency),
    ))
}

fn with_layers(router: axum::Router) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true);

    router
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http())
}

async fn listen(port: u16, app: axum::Router, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("{name} listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
