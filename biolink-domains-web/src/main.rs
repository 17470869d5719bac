//! Biolink custom domain API server

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;

use biolink_domains_app::{AppConfig, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(None).context("failed to load configuration")?;
    biolink_domains_web::logging::init(&config.logging)?;

    tracing::info!(
        app_domain = %config.domains.app_domain,
        cname_target = %config.domains.cname_target,
        database = %config.database.path.display(),
        "Starting Biolink custom domain API"
    );

    let state = AppState::from_config(&config)
        .await
        .context("failed to initialize application state")?;
    let state = web::Data::new(state);

    tracing::info!(bind = %config.server.bind, "Listening");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(biolink_domains_web::configure)
    })
    .bind(&config.server.bind)
    .with_context(|| format!("failed to bind {}", config.server.bind))?
    .run()
    .await
    .context("server error")
}
