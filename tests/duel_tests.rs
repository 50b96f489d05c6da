//! Duels end to end: queueing, fighting, energy and the death log.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use skirmish_server::{
    broadcast::{BroadcastError, Broadcaster, NullFeed, RecordingFeed},
    db::StoreTx,
    error::AbortReason,
    game::{
        actions::{fight, load_live_player, perform, QUEUED_TEXT},
        combat::DuelDraws,
        mutator::{run, GameAction},
        narrative::Perspective,
        types::{DeathCause, QueueEntry},
    },
    matchmaking::EnergyCharge,
    protocol::{ActionToken, DuelStanding, DuelSummary, FeedEvent},
};
use uuid::Uuid;

/// Fight two stored players with fixed rolls.
struct FixedFight {
    instigator: Uuid,
    opponent: Uuid,
    roll_instigator: f64,
    roll_opponent: f64,
}

#[async_trait]
impl GameAction for FixedFight {
    type Output = DuelSummary;

    fn name(&self) -> &'static str {
        "fixed_fight"
    }

    async fn execute(self, tx: &mut dyn StoreTx) -> Result<DuelSummary, AbortReason> {
        let content = common::content();
        let a = load_live_player(tx, self.instigator).await?;
        let b = load_live_player(tx, self.opponent).await?;
        let draws = DuelDraws {
            roll_a: self.roll_instigator,
            roll_b: self.roll_opponent,
            perspective: Perspective::GettingDamage,
            armor_variant: 1,
            prefer_armor_line: false,
        };
        let (_, summary) = fight(tx, &a, &b, &draws, &content, EnergyCharge::OnEnqueue).await?;
        Ok(summary)
    }
}

#[tokio::test]
async fn first_duel_request_queues() {
    let a = common::player();
    let store = common::store_with(&[a.clone()]).await;

    let reply = perform(
        &store,
        Arc::new(NullFeed),
        common::action(a.id, ActionToken::Duel, common::content(), 1),
    )
    .await
    .unwrap();
    assert_eq!(reply.message, QUEUED_TEXT);
    assert_eq!(reply.delta.energy_points, -1);
    assert_eq!(reply.duel.unwrap().standing, DuelStanding::Queued);
    assert!(reply.feed.is_none());
}

#[tokio::test]
async fn second_request_fights_and_charges_only_the_instigator() {
    let (a, b) = (common::player(), common::player());
    let store = common::store_with(&[a.clone(), b.clone()]).await;
    let content = common::content();
    let feed = Arc::new(RecordingFeed::new());

    perform(&store, feed.clone(), common::action(a.id, ActionToken::Duel, content.clone(), 1))
        .await
        .unwrap();
    let reply = perform(&store, feed.clone(), common::action(b.id, ActionToken::Duel, content, 2))
        .await
        .unwrap();

    let duel = reply.duel.unwrap();
    assert_ne!(duel.standing, DuelStanding::Queued);
    assert_eq!(duel.opponent, Some(a.id));
    assert!(store.queue().await.is_empty());
    assert_eq!(store.player(a.id).await.unwrap().energy_points, 2);
    assert_eq!(store.player(b.id).await.unwrap().energy_points, 2);

    // only the fight reaches the feed
    let events = feed.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].player_id, b.id);
    assert_eq!(Some(events[0].text.clone()), reply.feed);
}

#[tokio::test]
async fn elimination_writes_a_death_record() {
    let a = common::player();
    let mut b = common::player();
    b.health_points = 5;
    b.gold = 12;
    let store = common::store_with(&[a.clone(), b.clone()]).await;
    store.insert_queue_entry(QueueEntry::now(b.id)).await;

    let summary = run(
        &store,
        FixedFight {
            instigator: a.id,
            opponent: b.id,
            roll_instigator: 0.8,
            roll_opponent: 0.1,
        },
    )
    .await
    .unwrap();
    assert_eq!(summary.standing, DuelStanding::Won);
    assert!(summary.eliminated);
    assert_eq!(summary.reward, 12);

    let deaths = store.deaths().await;
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].player_id, b.id);
    assert_eq!(deaths[0].cause, DeathCause::Duel);
    assert!(store.queue().await.is_empty());

    let winner = store.player(a.id).await.unwrap();
    assert_eq!(winner.gold, 12);
    assert_eq!(winner.energy_points, 2);
    assert!(store.player(b.id).await.unwrap().is_dead());
}

#[tokio::test]
async fn a_tie_still_costs_the_instigator() {
    let (a, b) = (common::player(), common::player());
    let store = common::store_with(&[a.clone(), b.clone()]).await;

    let summary = run(
        &store,
        FixedFight {
            instigator: a.id,
            opponent: b.id,
            roll_instigator: 0.5,
            roll_opponent: 0.5,
        },
    )
    .await
    .unwrap();
    assert_eq!(summary.standing, DuelStanding::Tie);
    assert_eq!(store.player(a.id).await.unwrap().energy_points, 2);
    let b_after = store.player(b.id).await.unwrap();
    assert_eq!(b_after, b);
    assert!(store.deaths().await.is_empty());
}

#[tokio::test]
async fn the_dead_cannot_act() {
    let mut a = common::player();
    a.health_points = 0;
    let store = common::store_with(&[a.clone()]).await;

    let err = perform(
        &store,
        Arc::new(NullFeed),
        common::action(a.id, ActionToken::Duel, common::content(), 3),
    )
    .await
    .unwrap_err();
    assert_eq!(err, AbortReason::PlayerDead);
    assert!(store.queue().await.is_empty());
}

#[tokio::test]
async fn a_failing_feed_does_not_undo_the_action() {
    let (a, b) = (common::player(), common::player());
    let store = common::store_with(&[a.clone(), b.clone()]).await;
    let content = common::content();
    let feed = Arc::new(RecordingFeed::failing());

    perform(&store, feed.clone(), common::action(a.id, ActionToken::Duel, content.clone(), 4))
        .await
        .unwrap();
    let reply = perform(&store, feed.clone(), common::action(b.id, ActionToken::Duel, content, 5))
        .await
        .unwrap();
    assert!(reply.feed.is_some());
    assert!(feed.events().is_empty());
    assert!(store.queue().await.is_empty());
}

/// A feed whose sends never complete.
struct HungFeed;

#[async_trait]
impl Broadcaster for HungFeed {
    async fn send(&self, _event: &FeedEvent) -> Result<(), BroadcastError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn a_hung_feed_does_not_hold_the_reply() {
    let a = common::player();
    let store = common::store_with(&[a.clone()]).await;

    let reply = tokio::time::timeout(
        Duration::from_secs(5),
        perform(
            &store,
            Arc::new(HungFeed),
            common::action(a.id, ActionToken::Duel, common::content(), 4),
        ),
    )
    .await
    .expect("reply held by the feed")
    .unwrap();
    assert_eq!(reply.duel.map(|d| d.standing), Some(DuelStanding::Queued));
    assert_eq!(store.player(a.id).await.unwrap().energy_points, 2);
}
