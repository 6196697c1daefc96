// apps/storefront/src/main.rs

mod config;
mod db;
mod errors;
mod models;
mod pipelines;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::db::PgOrderStore;
use crate::services::{session_service, EmailNotifier, PgSessionVerifier};
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use fst_workflow::{OrderWorkflow, WorkflowConfig, WorkflowError, WorkflowServices, Workflows};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
  tracing::error!(error = %err, "{}", context);
  io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = Arc::new(AppConfig::from_env().map_err(|e| startup_error("Configuration error", e))?);

  let db_pool = db::connect(&app_config)
    .await
    .map_err(|e| startup_error("Database connection error", e))?;
  if app_config.run_migrations {
    db::run_migrations(&db_pool)
      .await
      .map_err(|e| startup_error("Migration error", e))?;
  }
  if let Some((email, password)) = &app_config.seed_operator {
    session_service::seed_operator(&db_pool, email, password)
      .await
      .map_err(|e| startup_error("Operator seeding error", e))?;
  }

  // Notification failures never fail a request; they surface here.
  let (failure_tx, mut failure_rx) = mpsc::unbounded_channel::<WorkflowError>();
  tokio::spawn(async move {
    while let Some(failure) = failure_rx.recv().await {
      tracing::warn!(error = %failure, "Order notification was not delivered.");
    }
  });

  let services = WorkflowServices::new(
    Arc::new(PgOrderStore::new(db_pool.clone())),
    Arc::new(PgSessionVerifier::new(db_pool.clone())),
    Arc::new(EmailNotifier::new(
      app_config.email_sender.clone(),
      app_config.staff_notification_email.clone(),
    )),
  )
  .with_config(WorkflowConfig {
    store_timeout: app_config.store_timeout,
  })
  .with_notification_failures(failure_tx);

  let app_workflows = Arc::new(Workflows::new());
  pipelines::register_all_pipelines(&app_workflows);

  let app_state = AppState {
    db_pool: db_pool.clone(),
    workflow: Arc::new(OrderWorkflow::new(services)),
    app_workflows,
    config: app_config.clone(),
  };

  let server_address = app_config.server_address();
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await?;

  db_pool.close().await;
  tracing::info!("Storefront server stopped.");
  Ok(())
}
