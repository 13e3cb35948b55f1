use std::sync::Arc;

use tracing::{error, info};

use shelfsense_api::{app, config, db, events, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let pool = db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        db::run_migrations(&pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }

    let db_arc = Arc::new(pool);
    let (event_sender, event_rx) = events::channel(1024);
    tokio::spawn(events::process_events(event_rx));

    let state = AppState::new(db_arc, cfg.clone(), event_sender);
    let router = app(state);

    let addr = format!("{}:{}", cfg.host, cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, environment = %cfg.environment, "shelfsense-api listening");
    axum::serve(listener, router).await?;

    Ok(())
}
