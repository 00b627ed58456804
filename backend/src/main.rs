//! Backend entry-point: configuration, migrations, and server bootstrap.

use clap::Parser;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use machtrack::inbound::http::session_config::{session_settings, BuildMode, SessionEnv};
use machtrack::outbound::persistence::{DbPool, PoolConfig};
use machtrack::server::{create_server, Cli, ServerConfig};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run pending migrations over a short-lived synchronous connection.
fn run_migrations(database_url: &str) -> std::io::Result<()> {
    use diesel::pg::PgConnection;
    use diesel::Connection;

    let mut conn = PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();

    let session = session_settings(&SessionEnv::from_process(), BuildMode::from_debug_assertions())
        .map_err(|e| std::io::Error::other(format!("session configuration failed: {e}")))?;

    run_migrations(&cli.database_url)?;

    let pool = DbPool::new(PoolConfig::new(&cli.database_url).with_max_size(cli.db_max_connections))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool construction failed: {e}")))?;

    info!(bind_addr = %cli.bind_addr, "starting server");
    create_server(ServerConfig::new(session, cli.bind_addr, pool))?.await
}
