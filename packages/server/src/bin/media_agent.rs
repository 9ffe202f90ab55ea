//! Media agent process
//!
//! `run` keeps the scheduler alive until Ctrl-C, `scan` performs one scan and
//! prints the report, `migrate` applies migrations, `action` dispatches one
//! inbound chat action.

use std::sync::Arc;
use std::time::Duration;

use agent_core::common::{Actor, ApproverRole};
use agent_core::config::Config;
use agent_core::domains::approvers::Approver;
use agent_core::domains::classification::{EventClassifier, ScoringRules};
use agent_core::domains::events::actions::run_scan;
use agent_core::domains::members::User;
use agent_core::kernel::database;
use agent_core::kernel::scheduled_tasks::start_scheduler;
use agent_core::kernel::{
    create_ai, dispatch, resolve_actor, BaseMessenger, HttpFetcher, Intent, PipelineSettings, ServerDeps,
    TelegramAdapter,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use telegram::{TelegramOptions, TelegramService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "media-agent")]
#[command(about = "Event sourcing, moderation and admission agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scheduled tasks until Ctrl-C
    Run,

    /// Scan all active sources once and print the report
    Scan {
        /// Comma-separated keyword filter
        #[arg(long)]
        keywords: Option<String>,
    },

    /// Apply database migrations and exit
    Migrate,

    /// Dispatch one inbound action (callback data such as `ev_ok:12`)
    Action {
        #[arg(long)]
        chat_id: i64,
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agent_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    if let Commands::Migrate = cli.command {
        tracing::info!("Migrations applied");
        return Ok(());
    }

    bootstrap_owner(&config, &pool).await?;
    let deps = build_deps(&config, pool)?;

    match cli.command {
        Commands::Run => {
            let mut scheduler = start_scheduler(deps, config.scan_schedule.as_deref()).await?;
            tracing::info!("Media agent running, press Ctrl-C to stop");
            tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Shutting down");
            scheduler.shutdown().await?;
        }
        Commands::Scan { keywords } => {
            let keywords = keywords.map(|k| agent_core::config::split_list(&k));
            let report = run_scan(&Actor::system(), keywords.as_deref(), &deps).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Action { chat_id, data } => {
            let intent: Intent = data.parse()?;
            let actor = resolve_actor(chat_id, &deps).await?;
            let reply = dispatch(&actor, intent, &deps).await;
            deps.messenger
                .send_text(reply.chat_id, &reply.text, &reply.actions)
                .await
                .context("Failed to send reply")?;
        }
        Commands::Migrate => {}
    }

    Ok(())
}

fn build_deps(config: &Config, pool: SqlitePool) -> Result<ServerDeps> {
    let mut options = TelegramOptions::new(config.telegram_bot_token.clone());
    if let Some(api_base) = &config.telegram_api_base {
        options.api_base = api_base.clone();
    }
    let messenger = TelegramAdapter::new(Arc::new(TelegramService::new(options)));

    let fetcher = HttpFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
        .context("Failed to build HTTP client")?;

    let rules = ScoringRules::with_overrides(
        config.premium_organizers.as_deref(),
        config.target_region_tokens.as_deref(),
    );

    let settings = PipelineSettings::from_config(config);
    let classifier = EventClassifier::new(
        create_ai(config),
        rules,
        settings.classifier_timeout,
        settings.classifier_concurrency,
    );

    Ok(ServerDeps::new(
        pool,
        Arc::new(fetcher),
        Arc::new(classifier),
        Arc::new(messenger),
        settings,
    ))
}

/// The owner chat always has full access and an approved account.
async fn bootstrap_owner(config: &Config, pool: &SqlitePool) -> Result<()> {
    let Some(chat_id) = config.owner_chat_id else {
        return Ok(());
    };

    Approver::upsert(chat_id, "owner", ApproverRole::TechSupport, pool)
        .await
        .context("Failed to bootstrap owner approver")?;
    User::upsert_approved(chat_id, "Owner", pool)
        .await
        .context("Failed to bootstrap owner account")?;
    tracing::info!(chat_id, "Owner bootstrapped");
    Ok(())
}
