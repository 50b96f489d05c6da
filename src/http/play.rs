//! Play endpoints: open a session, act through it, browse the armory.

use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Serialize;
use uuid::Uuid;

use crate::broadcast::Broadcaster;
use crate::cache::GameContent;
use crate::config::Settings;
use crate::db::GameStore;
use crate::error::AbortReason;
use crate::game::{
    actions::{perform, PlayAction},
    session::SessionRegistry,
    types::Player,
};
use crate::http::auth::JwtAuth;
use crate::protocol::ActionToken;

/// Shared handles for every play request.
#[derive(Clone)]
pub struct PlayState {
    pub store: Arc<dyn GameStore>,
    pub feed: Arc<dyn Broadcaster>,
    pub content: Arc<GameContent>,
    pub sessions: Arc<SessionRegistry>,
    pub settings: Settings,
}

impl PlayState {
    fn action(&self, player_id: Uuid, token: ActionToken) -> PlayAction {
        PlayAction::new(player_id, token, self.content.clone())
            .with_queue_ttl(self.settings.queue_ttl)
    }
}

#[derive(Serialize)]
pub struct SessionOpened {
    pub session_id: Uuid,
    pub expires_in: u64,
    pub message: String,
    pub player: Player,
}

/// POST /api/play/session
#[post("/play/session")]
async fn open_session(
    auth: JwtAuth,
    state: web::Data<PlayState>,
) -> Result<HttpResponse, AbortReason> {
    if !state.settings.game_started {
        return Err(AbortReason::GameNotStarted);
    }
    let reply = perform(
        state.store.as_ref(),
        state.feed.clone(),
        state.action(auth.player_id, ActionToken::Status),
    )
    .await?;

    let session = state.sessions.open(auth.player_id);
    log::info!("play session {} opened for {}", session.id, auth.player_id);
    Ok(HttpResponse::Created().json(SessionOpened {
        session_id: session.id,
        expires_in: state.settings.session_window.as_secs(),
        message: reply.message,
        player: reply.player,
    }))
}

/// POST /api/play/{session_id}/action
#[post("/play/{session_id}/action")]
async fn act(
    auth: JwtAuth,
    path: web::Path<Uuid>,
    token: web::Json<ActionToken>,
    state: web::Data<PlayState>,
) -> Result<HttpResponse, AbortReason> {
    let session_id = path.into_inner();
    let Some(session) =
        state
            .sessions
            .authorize(session_id, auth.player_id, state.settings.session_window)?
    else {
        log::debug!("ignoring action on unknown or expired session {session_id}");
        return Ok(HttpResponse::NoContent().finish());
    };

    let reply = perform(
        state.store.as_ref(),
        state.feed.clone(),
        state.action(session.owner, token.into_inner()),
    )
    .await?;
    Ok(HttpResponse::Ok().json(reply))
}

/// GET /api/play/catalog
#[get("/play/catalog")]
async fn catalog(state: web::Data<PlayState>) -> impl Responder {
    HttpResponse::Ok().json(&state.content.catalog)
}

/// Mount
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(open_session).service(act).service(catalog);
}
