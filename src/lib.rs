//! Skirmish: a persistent duel & encounter game served over HTTP.

pub mod broadcast;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod game;
pub mod http;
pub mod matchmaking;
pub mod metrics;
pub mod protocol;
