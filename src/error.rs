//! Why a game action did not commit.
//!
//! Every variant except `Store*` is local and expected: it aborts only the
//! current transaction and becomes a user-visible message.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbortReason {
    #[error("You are already in the battle queue!")]
    AlreadyQueued,

    #[error("You do not have enough energy points!")]
    InsufficientEnergy,

    #[error("You have died. You cannot play anymore.")]
    PlayerDead,

    #[error("You are not allowed to act in this session!")]
    UnauthorizedActor,

    /// The effect vocabulary names an item the catalog does not carry.
    #[error("unknown item `{0}`")]
    UnknownItem(String),

    #[error("the game store timed out, try again")]
    StoreTimeout,

    #[error("You are not registered!")]
    PlayerNotFound,

    #[error("You do not have enough credits!")]
    NotEnoughGold,

    #[error("You already have one equipped. Sell it first to buy another one!")]
    AlreadyEquipped,

    #[error("You have nothing to sell!")]
    NothingToSell,

    #[error("malformed effect clause `{0}`")]
    MalformedEffect(String),

    #[error("The game has not started yet!")]
    GameNotStarted,

    #[error("store failure: {0}")]
    Store(String),
}

impl AbortReason {
    /// Only a timeout may be retried, and only by the caller re-issuing the action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AbortReason::StoreTimeout)
    }

    /// Failures of the store itself rather than of the game rules.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AbortReason::StoreTimeout | AbortReason::Store(_))
    }

    /// Short machine-readable tag, also used as a metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            AbortReason::AlreadyQueued => "already_queued",
            AbortReason::InsufficientEnergy => "insufficient_energy",
            AbortReason::PlayerDead => "player_dead",
            AbortReason::UnauthorizedActor => "unauthorized_actor",
            AbortReason::UnknownItem(_) => "unknown_item",
            AbortReason::StoreTimeout => "store_timeout",
            AbortReason::PlayerNotFound => "player_not_found",
            AbortReason::NotEnoughGold => "not_enough_gold",
            AbortReason::AlreadyEquipped => "already_equipped",
            AbortReason::NothingToSell => "nothing_to_sell",
            AbortReason::MalformedEffect(_) => "malformed_effect",
            AbortReason::GameNotStarted => "game_not_started",
            AbortReason::Store(_) => "store",
        }
    }
}

impl From<sqlx::Error> for AbortReason {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => AbortReason::StoreTimeout,
            sqlx::Error::Io(ref io) if io.kind() == std::io::ErrorKind::TimedOut => {
                AbortReason::StoreTimeout
            }
            other => AbortReason::Store(other.to_string()),
        }
    }
}

impl ResponseError for AbortReason {
    fn status_code(&self) -> StatusCode {
        match self {
            AbortReason::AlreadyQueued
            | AbortReason::InsufficientEnergy
            | AbortReason::AlreadyEquipped
            | AbortReason::NothingToSell
            | AbortReason::NotEnoughGold => StatusCode::CONFLICT,
            AbortReason::PlayerDead | AbortReason::UnauthorizedActor => StatusCode::FORBIDDEN,
            AbortReason::PlayerNotFound => StatusCode::NOT_FOUND,
            AbortReason::GameNotStarted => StatusCode::UNPROCESSABLE_ENTITY,
            AbortReason::StoreTimeout => StatusCode::SERVICE_UNAVAILABLE,
            AbortReason::UnknownItem(_)
            | AbortReason::MalformedEffect(_)
            | AbortReason::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.code(),
            "message": self.to_string(),
            "retryable": self.is_retryable(),
        }))
    }
}
