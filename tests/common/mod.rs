//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use serde_json::{json, Value};
use skirmish_server::{
    cache::GameContent,
    db::memory::MemoryStore,
    game::{actions::PlayAction, types::Player},
    protocol::ActionToken,
};
use uuid::Uuid;

pub fn content() -> Arc<GameContent> {
    Arc::new(GameContent::bundled().expect("bundled content"))
}

/// Bundled content with the encounter table replaced.
pub fn content_with_encounters(encounters: Value) -> Arc<GameContent> {
    let mut v: Value =
        serde_json::from_str(include_str!("../../data/content.json")).expect("bundled json");
    v["encounters"] = encounters;
    Arc::new(GameContent::from_json(&v.to_string()).expect("content"))
}

pub fn effects_encounter(outcome: &str) -> Value {
    json!({
        "scenario": "A crate sits in the road.",
        "bits": "You pry it open.",
        "feed": "{player} opened a crate.",
        "kind": "effects",
        "outcome": outcome,
    })
}

pub fn battle_encounter() -> Value {
    json!({
        "scenario": "Footsteps behind you.",
        "bits": "Someone has been following you.",
        "feed": "{player} heard footsteps.",
        "kind": "battle",
    })
}

pub fn narrative_encounter() -> Value {
    json!({
        "scenario": "Rain on tin roofs.",
        "bits": "Nothing happens, and that is fine.",
        "feed": "{player} watched the rain.",
        "kind": "narrative",
    })
}

pub fn player() -> Player {
    Player::new(Uuid::new_v4())
}

pub async fn store_with(players: &[Player]) -> MemoryStore {
    let store = MemoryStore::new();
    for p in players {
        store.insert_player(p.clone()).await;
    }
    store
}

pub fn action(player_id: Uuid, token: ActionToken, content: Arc<GameContent>, seed: u64) -> PlayAction {
    PlayAction::new(player_id, token, content)
        .with_rng(StdRng::seed_from_u64(seed))
        .with_queue_ttl(None)
}
