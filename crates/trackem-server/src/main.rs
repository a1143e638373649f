//! TrackEm Server — Application entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trackem_db::{DbManager, SurrealMembershipStore};
use trackem_server::{App, ServerArgs, ServerResult};

#[tokio::main]
async fn main() -> ServerResult<()> {
    let args = ServerArgs::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trackem=info"));
    if args.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!("Starting TrackEm server...");

    let db_config = args.db_config();
    let auth_config = args.auth_config()?;
    let groups_config = args.groups_config()?;

    let manager = DbManager::connect(&db_config).await?;
    trackem_db::run_migrations(manager.client()).await?;

    let app = App::new(
        SurrealMembershipStore::new(manager.client().clone()),
        &auth_config,
        groups_config,
    );
    if let Some(email) = args.bootstrap_admin.as_deref() {
        app.bootstrap_admin(email).await?;
    }

    tracing::info!("TrackEm server ready");
    tokio::signal::ctrl_c().await?;

    tracing::info!("TrackEm server stopped.");
    Ok(())
}
