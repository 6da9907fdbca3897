//! # Membership Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, seeds
//! default data, starts the scheduler and the dashboard API, and runs the
//! Telegram bot dispatcher.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod database;
mod services;
mod utils;

use crate::bot::handlers::{BotContext, BotHandler};
use crate::bot::replies::PendingReplies;
use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::database::models::{Admin, TextTemplate};
use crate::services::api::ApiService;
use crate::services::notifier::{Notifier, TelegramNotifier};
use crate::services::registration::RegistrationFlow;
use crate::services::scheduler::SchedulerService;
use crate::services::session::{InMemorySessionStore, SessionStore};
use crate::services::workflow::ApprovalWorkflow;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "membership_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Membership Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}",
        config.database_url, config.http_port
    );

    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new_or_degraded(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);

    TextTemplate::seed_defaults(&db_arc.pool).await?;
    if let Some(admin_id) = &config.default_admin_id {
        Admin::ensure_default(&db_arc.pool, admin_id).await?;
    }
    std::fs::create_dir_all(&config.uploads_dir)?;
    info!("Database initialized successfully");

    info!("Initializing Telegram bot...");
    let telegram_bot = Bot::new(&config.telegram_bot_token);
    let notifier: Arc<dyn Notifier> =
        Arc::new(TelegramNotifier::new(telegram_bot.clone(), config.group_id));
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let flow = RegistrationFlow::new(db_arc.pool.clone(), sessions, notifier.clone());
    let workflow = Arc::new(ApprovalWorkflow::new(db_arc.pool.clone(), notifier.clone()));

    let ctx = Arc::new(BotContext {
        db: db_arc.as_ref().clone(),
        flow,
        workflow: workflow.clone(),
        pending: PendingReplies::new(),
        uploads_dir: config.uploads_dir.clone(),
        membership_fee: config.membership_fee,
    });
    let handler = BotHandler::new(ctx);
    info!("Telegram bot initialized successfully");

    info!("Initializing scheduler...");
    let mut scheduler =
        SchedulerService::new(db_arc.clone(), notifier.clone(), workflow.clone()).await?;
    if let Err(e) = scheduler.start().await {
        tracing::error!("Failed to start scheduler: {}", e);
    }

    let api_service = ApiService::new(db_arc.clone(), workflow.clone(), config.membership_fee);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Dashboard API starting on port {}", config.http_port);

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(telegram_bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let api_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, api_service.router).await {
            tracing::error!("API server error: {}", e);
        }
    });

    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = api_task => {
            if let Err(e) = result {
                tracing::error!("API task error: {}", e);
            }
        }
    }

    if let Err(e) = scheduler.stop().await {
        tracing::warn!("Error stopping scheduler: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
