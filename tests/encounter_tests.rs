//! Random encounters through `perform`, one table entry at a time.

mod common;

use std::sync::Arc;

use serde_json::json;
use skirmish_server::{
    broadcast::{NullFeed, RecordingFeed},
    error::AbortReason,
    game::{actions::perform, narrative::mention, types::{DeathCause, QueueEntry}},
    protocol::{ActionToken, DuelStanding},
};

#[tokio::test]
async fn effects_encounter_costs_energy_and_applies_the_script() {
    let content = common::content_with_encounters(json!([common::effects_encounter(
        "lost 10 hp, earned 30 credits"
    )]));
    let p = common::player();
    let store = common::store_with(&[p.clone()]).await;
    let feed = Arc::new(RecordingFeed::new());

    let reply = perform(
        &store,
        feed.clone(),
        common::action(p.id, ActionToken::RandomEncounter, content, 7),
    )
    .await
    .unwrap();

    assert_eq!(reply.player.health_points, 90);
    assert_eq!(reply.player.gold, 30);
    assert_eq!(reply.player.energy_points, 2);
    assert_eq!(reply.delta.health_points, -10);
    assert!(reply.message.starts_with("*A crate sits in the road.*"));
    assert!(reply.message.contains("You have lost 10 health points."));

    let events = feed.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].text.contains(&mention(p.id)));
    assert!(events[0].text.contains("has earned 30 credits"));
}

#[tokio::test]
async fn encounter_elimination_is_logged_and_clears_the_ticket() {
    let content = common::content_with_encounters(json!([common::effects_encounter("eliminated")]));
    let p = common::player();
    let store = common::store_with(&[p.clone()]).await;
    store.insert_queue_entry(QueueEntry::now(p.id)).await;

    let reply = perform(
        &store,
        Arc::new(NullFeed),
        common::action(p.id, ActionToken::RandomEncounter, content.clone(), 7),
    )
    .await
    .unwrap();
    assert!(reply.player.is_dead());

    let deaths = store.deaths().await;
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].cause, DeathCause::Encounter);
    assert!(store.queue().await.is_empty());

    let err = perform(
        &store,
        Arc::new(NullFeed),
        common::action(p.id, ActionToken::RandomEncounter, content, 8),
    )
    .await
    .unwrap_err();
    assert_eq!(err, AbortReason::PlayerDead);
}

#[tokio::test]
async fn no_energy_no_encounter() {
    let content = common::content_with_encounters(json!([common::effects_encounter("earned 5 credits")]));
    let mut p = common::player();
    p.energy_points = 0;
    let store = common::store_with(&[p.clone()]).await;

    let err = perform(
        &store,
        Arc::new(NullFeed),
        common::action(p.id, ActionToken::RandomEncounter, content, 7),
    )
    .await
    .unwrap_err();
    assert_eq!(err, AbortReason::InsufficientEnergy);
    assert_eq!(store.player(p.id).await.unwrap(), p);
}

#[tokio::test]
async fn narrative_encounter_only_tells_a_story() {
    let content = common::content_with_encounters(json!([common::narrative_encounter()]));
    let p = common::player();
    let store = common::store_with(&[p.clone()]).await;

    let reply = perform(
        &store,
        Arc::new(NullFeed),
        common::action(p.id, ActionToken::RandomEncounter, content, 7),
    )
    .await
    .unwrap();
    assert_eq!(reply.delta.energy_points, -1);
    assert_eq!(reply.delta.health_points, 0);
    assert!(reply.duel.is_none());
    assert!(reply.feed.unwrap().contains("watched the rain"));
}

#[tokio::test]
async fn battle_with_an_empty_queue_is_flavour_only() {
    let content = common::content_with_encounters(json!([common::battle_encounter()]));
    let p = common::player();
    let store = common::store_with(&[p.clone()]).await;

    let reply = perform(
        &store,
        Arc::new(NullFeed),
        common::action(p.id, ActionToken::RandomEncounter, content, 7),
    )
    .await
    .unwrap();
    assert!(reply.duel.is_none());
    assert!(store.queue().await.is_empty());
    assert_eq!(reply.player.energy_points, 2);
}

#[tokio::test]
async fn battle_escalates_against_a_waiting_opponent_without_a_second_charge() {
    let content = common::content_with_encounters(json!([common::battle_encounter()]));
    let (p, waiting) = (common::player(), common::player());
    let store = common::store_with(&[p.clone(), waiting.clone()]).await;
    store.insert_queue_entry(QueueEntry::now(waiting.id)).await;

    let reply = perform(
        &store,
        Arc::new(NullFeed),
        common::action(p.id, ActionToken::RandomEncounter, content, 11),
    )
    .await
    .unwrap();

    let duel = reply.duel.unwrap();
    assert_ne!(duel.standing, DuelStanding::Queued);
    assert_eq!(duel.opponent, Some(waiting.id));
    assert!(store.queue().await.is_empty());
    // the encounter's point pays for the fight
    assert_eq!(store.player(p.id).await.unwrap().energy_points, 2);
    assert_eq!(store.player(waiting.id).await.unwrap().energy_points, 3);
}

#[tokio::test]
async fn battle_on_the_last_energy_point_stays_flavour_only() {
    let content = common::content_with_encounters(json!([common::battle_encounter()]));
    let (mut p, waiting) = (common::player(), common::player());
    p.energy_points = 1;
    let store = common::store_with(&[p.clone(), waiting.clone()]).await;
    store.insert_queue_entry(QueueEntry::now(waiting.id)).await;

    let reply = perform(
        &store,
        Arc::new(NullFeed),
        common::action(p.id, ActionToken::RandomEncounter, content, 11),
    )
    .await
    .unwrap();

    assert!(reply.duel.is_none());
    assert_eq!(reply.player.energy_points, 0);
    assert_eq!(reply.player.health_points, p.health_points);
    let queue = store.queue().await;
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].player_id, waiting.id);
}
