use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use inkpost::auth::IdentityProvider;
use inkpost::config::Config;
use inkpost::core::db::seed_demo_data;
use inkpost::AppState;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_json);

    if !config.jwt_secret_from_env {
        warn!("BLOG_JWT_SECRET not set, using a random secret; credentials will not survive a restart");
    }

    let identity = IdentityProvider::new(&config.jwt_secret, config.token_expiration_hours);
    let state = AppState::in_memory(identity);

    if config.seed_demo {
        seed_demo_data(state.posts.as_ref(), state.users.as_ref()).context("seeding demo data")?;
    }

    info!(addr = %config.bind_addr, "server listening");

    let data = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(inkpost::configure)
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("binding {}", config.bind_addr))?
    .run()
    .await
    .context("server terminated")
}
