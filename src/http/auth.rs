//! Bearer-JWT authentication. The token's subject is the acting player.

use actix_web::{
    dev::Payload, error::ErrorUnauthorized, web, FromRequest, HttpRequest, Result as ActixResult,
};
use chrono::{Duration, Utc};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // player_id
    pub exp: usize,
}

/// Signing secret registered as app data; without it `JWT_SECRET` is read.
#[derive(Clone)]
pub struct JwtSecret(pub String);

/// Mint an access token for `player_id`, valid for `ttl`.
pub fn issue_token(
    player_id: Uuid,
    secret: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: player_id.to_string(),
        exp: (Utc::now() + ttl).timestamp().max(0) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Extracts and validates a Bearer-JWT, exposing the player UUID.
#[derive(Debug, Clone, Copy)]
pub struct JwtAuth {
    pub player_id: Uuid,
}

impl FromRequest for JwtAuth {
    type Error = actix_web::Error;
    type Future = Ready<ActixResult<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
        let res = (|| {
            // Expect:  Authorization: Bearer <JWT>
            let hdr = req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| ErrorUnauthorized("missing Authorization header"))?;

            let token = hdr
                .strip_prefix("Bearer ")
                .ok_or_else(|| ErrorUnauthorized("malformed Authorization header"))?;

            let secret = match req.app_data::<web::Data<JwtSecret>>() {
                Some(s) => s.0.clone(),
                None => env::var("JWT_SECRET").map_err(|_| ErrorUnauthorized("server mis-config"))?,
            };
            let data = decode::<Claims>(
                token,
                &DecodingKey::from_secret(secret.as_bytes()),
                &Validation::default(),
            )
            .map_err(|_| ErrorUnauthorized("invalid / expired token"))?;

            let player_id =
                Uuid::parse_str(&data.claims.sub).map_err(|_| ErrorUnauthorized("bad sub"))?;

            Ok(JwtAuth { player_id })
        })();

        ready(res)
    }
}
