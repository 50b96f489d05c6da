use std::{env, sync::Arc};

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use redis::Client as RedisClient;
use skirmish_server::{
    broadcast::{Broadcaster, RedisFeed},
    cache, config,
    db::{pg::PgStore, GameStore},
    game::session::{self, SessionRegistry},
    http::{self, play::PlayState},
    metrics,
};
use sqlx::postgres::PgPoolOptions;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Configuration: fixed before anything can act
    if config::init(config::Settings::from_env()).is_err() {
        log::warn!("settings were already initialised");
    }
    let settings = config::settings().clone();
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".into());
    let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());

    // Catalogs, narrative tables and encounters
    let content = cache::warm_all().context("loading game content")?;

    // Postgres pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(settings.store_timeout)
        .connect(&database_url)
        .await
        .context("failed to create Postgres pool")?;
    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("running migrations")?;

    // Redis client
    let redis_client = RedisClient::open(redis_url.as_str()).context("invalid REDIS_URL")?;

    let prometheus = metrics::build()?;
    let sessions = Arc::new(SessionRegistry::new());
    session::start_sweeper(sessions.clone(), settings.session_window);

    let store: Arc<dyn GameStore> = Arc::new(PgStore::new(db_pool));
    let feed: Arc<dyn Broadcaster> = Arc::new(RedisFeed::new(
        redis_client.clone(),
        settings.feed_channel.clone(),
    ));
    let state = PlayState {
        store,
        feed,
        content,
        sessions,
        settings,
    };

    log::info!("serving on {server_addr}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(redis_client.clone()))
            .configure(http::routes::init_routes)
    })
    .bind(&server_addr)?
    .run()
    .await?;
    Ok(())
}
