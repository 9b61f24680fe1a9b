//! `jobly` CLI entry-point.
//!
//! Available sub-commands:
//! - `migrate`: run pending database migrations.
//! - `companies`: list / get / create / update / remove companies.
//! - `jobs`: list / get / create / update / remove jobs.
//!
//! Results are printed to stdout as pretty JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use db::models::{CompanyUpdate, JobUpdate, NewCompany, NewJob};
use db::repository::{companies, jobs};
use db::{CompanyFilter, DbPool, JobFilter};

#[derive(Parser)]
#[command(name = "jobly", about = "Companies and jobs database tool", version)]
struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Connection pool ceiling.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run pending database migrations.
    Migrate,
    /// Manage companies.
    Companies {
        #[command(subcommand)]
        action: CompanyAction,
    },
    /// Manage jobs.
    Jobs {
        #[command(subcommand)]
        action: JobAction,
    },
}

#[derive(Subcommand)]
enum CompanyAction {
    /// List companies, e.g. `--filter nameLike=net --filter minEmployees=10`.
    List {
        #[arg(long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,
    },
    Get { handle: String },
    /// Create from a JSON object.
    Create { json: String },
    /// Partially update from a JSON object.
    Update { handle: String, json: String },
    Remove { handle: String },
}

#[derive(Subcommand)]
enum JobAction {
    /// List jobs, e.g. `--filter titleLike=eng --filter hasEquity=true`.
    List {
        #[arg(long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,
    },
    Get { id: i32 },
    /// Create from a JSON object.
    Create { json: String },
    /// Partially update from a JSON object.
    Update { id: i32, json: String },
    Remove { id: i32 },
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

fn parse_json(raw: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(raw).context("payload is not valid JSON")
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_companies(pool: &DbPool, action: CompanyAction) -> anyhow::Result<()> {
    match action {
        CompanyAction::List { filters } => {
            let filter = CompanyFilter::from_params(filters)?;
            print(&companies::find_all(pool, &filter).await?)
        }
        CompanyAction::Get { handle } => print(&companies::get(pool, &handle).await?),
        CompanyAction::Create { json } => {
            let company = NewCompany::from_json(parse_json(&json)?)?;
            print(&companies::create(pool, company).await?)
        }
        CompanyAction::Update { handle, json } => {
            let data = CompanyUpdate::from_json(parse_json(&json)?)?;
            print(&companies::update(pool, &handle, data).await?)
        }
        CompanyAction::Remove { handle } => {
            companies::remove(pool, &handle).await?;
            print(&serde_json::json!({ "deleted": handle }))
        }
    }
}

async fn run_jobs(pool: &DbPool, action: JobAction) -> anyhow::Result<()> {
    match action {
        JobAction::List { filters } => {
            let filter = JobFilter::from_params(filters)?;
            print(&jobs::find_all(pool, &filter).await?)
        }
        JobAction::Get { id } => print(&jobs::get(pool, id).await?),
        JobAction::Create { json } => {
            let job = NewJob::from_json(parse_json(&json)?)?;
            print(&jobs::create(pool, job).await?)
        }
        JobAction::Update { id, json } => {
            let data = JobUpdate::from_json(parse_json(&json)?)?;
            print(&jobs::update(pool, id, data).await?)
        }
        JobAction::Remove { id } => {
            jobs::remove(pool, id).await?;
            print(&serde_json::json!({ "deleted": id }))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let pool = db::pool::create_pool(&cli.database_url, cli.max_connections)
        .await
        .context("failed to connect to database")?;

    match cli.command {
        Command::Migrate => {
            db::pool::run_migrations(&pool)
                .await
                .context("migration failed")?;
            info!("migrations applied successfully");
            Ok(())
        }
        Command::Companies { action } => run_companies(&pool, action).await,
        Command::Jobs { action } => run_jobs(&pool, action).await,
    }
}
