//! All-or-nothing transactions over the in-memory store.

mod common;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skirmish_server::{
    db::{memory::MemoryStore, GameStore, StoreResult, StoreTx},
    error::AbortReason,
    game::{
        actions::load_live_player,
        effects::apply_str,
        mutator::{run, run_with_timeout, GameAction},
        types::{DeathCause, DeathRecord, Player, QueueEntry},
    },
};
use uuid::Uuid;

/// Writes first, then fails when told to.
struct GrantThenMaybeFail {
    player_id: Uuid,
    fail: bool,
}

#[async_trait]
impl GameAction for GrantThenMaybeFail {
    type Output = i64;

    fn name(&self) -> &'static str {
        "grant"
    }

    async fn execute(self, tx: &mut dyn StoreTx) -> Result<i64, AbortReason> {
        let mut p = load_live_player(tx, self.player_id).await?;
        p.gold += 999;
        tx.save_player(&p).await?;
        tx.record_death(&DeathRecord::now(p.id, DeathCause::Encounter))
            .await?;
        if self.fail {
            return Err(AbortReason::NotEnoughGold);
        }
        Ok(p.gold)
    }
}

/// An encounter whose script names an item the catalog lacks.
struct BadEncounter {
    player_id: Uuid,
}

#[async_trait]
impl GameAction for BadEncounter {
    type Output = ();

    fn name(&self) -> &'static str {
        "bad_encounter"
    }

    async fn execute(self, tx: &mut dyn StoreTx) -> Result<(), AbortReason> {
        let content = common::content();
        if !tx.debit_energy(self.player_id).await? {
            return Err(AbortReason::InsufficientEnergy);
        }
        let p = load_live_player(tx, self.player_id).await?;
        let out = apply_str(
            "earned 50 credits, acquired Laser Sword (weapon)",
            &p,
            &content.catalog,
        )?;
        tx.save_player(&out.player).await
    }
}

struct Slow;

#[async_trait]
impl GameAction for Slow {
    type Output = ();

    fn name(&self) -> &'static str {
        "slow"
    }

    async fn execute(self, _tx: &mut dyn StoreTx) -> Result<(), AbortReason> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(())
    }
}

/// Memory store whose commits take longer than any test deadline.
struct SlowCommitStore(MemoryStore);

struct SlowCommitTx(Box<dyn StoreTx>);

#[async_trait]
impl GameStore for SlowCommitStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        Ok(Box::new(SlowCommitTx(self.0.begin().await?)))
    }
}

#[async_trait]
impl StoreTx for SlowCommitTx {
    async fn find_player(&mut self, id: Uuid) -> StoreResult<Option<Player>> {
        self.0.find_player(id).await
    }
    async fn save_player(&mut self, player: &Player) -> StoreResult<()> {
        self.0.save_player(player).await
    }
    async fn debit_energy(&mut self, id: Uuid) -> StoreResult<bool> {
        self.0.debit_energy(id).await
    }
    async fn has_queue_entry(&mut self, id: Uuid) -> StoreResult<bool> {
        self.0.has_queue_entry(id).await
    }
    async fn take_oldest_opponent(&mut self, excluding: Uuid) -> StoreResult<Option<QueueEntry>> {
        self.0.take_oldest_opponent(excluding).await
    }
    async fn peek_oldest_opponent(&mut self, excluding: Uuid) -> StoreResult<Option<QueueEntry>> {
        self.0.peek_oldest_opponent(excluding).await
    }
    async fn insert_queue_entry(&mut self, entry: &QueueEntry) -> StoreResult<bool> {
        self.0.insert_queue_entry(entry).await
    }
    async fn remove_queue_entries(&mut self, ids: &[Uuid]) -> StoreResult<()> {
        self.0.remove_queue_entries(ids).await
    }
    async fn purge_queue_before(&mut self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        self.0.purge_queue_before(cutoff).await
    }
    async fn record_death(&mut self, record: &DeathRecord) -> StoreResult<bool> {
        self.0.record_death(record).await
    }
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.0.commit().await
    }
    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.0.rollback().await
    }
}

#[tokio::test]
async fn ok_commits_every_write() {
    let p = common::player();
    let store = common::store_with(&[p.clone()]).await;

    let gold = run(&store, GrantThenMaybeFail { player_id: p.id, fail: false })
        .await
        .unwrap();
    assert_eq!(gold, 999);
    assert_eq!(store.player(p.id).await.unwrap().gold, 999);
    assert_eq!(store.deaths().await.len(), 1);
}

#[tokio::test]
async fn abort_discards_every_write() {
    let p = common::player();
    let store = common::store_with(&[p.clone()]).await;

    let err = run(&store, GrantThenMaybeFail { player_id: p.id, fail: true })
        .await
        .unwrap_err();
    assert_eq!(err, AbortReason::NotEnoughGold);
    assert_eq!(store.player(p.id).await.unwrap(), p);
    assert!(store.deaths().await.is_empty());
}

#[tokio::test]
async fn unknown_item_leaves_the_store_untouched() {
    let p = common::player();
    let store = common::store_with(&[p.clone()]).await;

    let err = run(&store, BadEncounter { player_id: p.id }).await.unwrap_err();
    assert_eq!(err, AbortReason::UnknownItem("Laser Sword".into()));
    // neither the energy debit nor the credits survived
    assert_eq!(store.player(p.id).await.unwrap(), p);
}

#[tokio::test]
async fn missing_player_aborts() {
    let store = common::store_with(&[]).await;
    let err = run(&store, GrantThenMaybeFail { player_id: Uuid::new_v4(), fail: false })
        .await
        .unwrap_err();
    assert_eq!(err, AbortReason::PlayerNotFound);
}

#[tokio::test]
async fn slow_transactions_time_out_and_release_the_store() {
    let p = common::player();
    let store = common::store_with(&[p.clone()]).await;

    let err = run_with_timeout(&store, Slow, Duration::from_millis(20))
        .await
        .unwrap_err();
    assert_eq!(err, AbortReason::StoreTimeout);
    assert!(err.is_retryable());

    // the dropped transaction no longer holds the store
    let tx = store.begin().await.unwrap();
    tx.rollback().await.unwrap();
    assert_eq!(store.player(p.id).await.unwrap(), p);
}

#[tokio::test]
async fn a_started_commit_is_reported_as_it_ends() {
    let p = common::player();
    let store = common::store_with(&[p.clone()]).await;
    let slow = SlowCommitStore(store.clone());

    let gold = run_with_timeout(
        &slow,
        GrantThenMaybeFail { player_id: p.id, fail: false },
        Duration::from_millis(20),
    )
    .await
    .unwrap();
    assert_eq!(gold, 999);
    assert_eq!(store.player(p.id).await.unwrap().gold, 999);
}

#[test]
fn only_timeouts_are_retryable() {
    assert!(AbortReason::StoreTimeout.is_retryable());
    assert!(!AbortReason::AlreadyQueued.is_retryable());
    assert!(!AbortReason::Store("boom".into()).is_retryable());
    assert!(AbortReason::Store("boom".into()).is_store_failure());
}
