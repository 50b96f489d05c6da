//! Simple liveness / readiness probe

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use redis::{AsyncCommands, Client as RedisClient};

use crate::http::play::PlayState;

#[get("/healthz")]
pub async fn healthz(req: HttpRequest, state: web::Data<PlayState>) -> impl Responder {
    // Check the game store
    match state.store.begin().await {
        Ok(tx) => {
            if let Err(e) = tx.rollback().await {
                log::warn!("healthz rollback failed: {e}");
            }
        }
        Err(_) => return HttpResponse::ServiceUnavailable().body("store"),
    }

    // Check Redis, when the feed runs on it
    if let Some(redis) = req.app_data::<web::Data<RedisClient>>() {
        let mut conn = match redis.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(_) => return HttpResponse::ServiceUnavailable().body("redis"),
        };
        if conn.ping::<String>().await.is_err() {
            return HttpResponse::ServiceUnavailable().body("redis");
        }
    }

    HttpResponse::Ok().body("ok")
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthz);
}
