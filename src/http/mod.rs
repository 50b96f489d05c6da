pub mod auth;
pub mod health;
pub mod play;
pub mod routes;
