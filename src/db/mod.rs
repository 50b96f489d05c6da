//! Store contracts the game rules run against.
//!
//! A [`GameStore`] hands out transactions; every read and write the rules
//! perform goes through one [`StoreTx`], and nothing is visible to other
//! transactions until [`StoreTx::commit`].

pub mod memory;
pub mod models;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AbortReason;
use crate::game::types::{DeathRecord, Player, QueueEntry};

pub type StoreResult<T> = Result<T, AbortReason>;

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;
}

/// One isolated unit of work against players, the duel queue and the death log.
#[async_trait]
pub trait StoreTx: Send {
    /// Read (and lock, where the store supports it) one player.
    async fn find_player(&mut self, id: Uuid) -> StoreResult<Option<Player>>;

    /// Overwrite every attribute of an existing player.
    async fn save_player(&mut self, player: &Player) -> StoreResult<()>;

    /// Take one energy point only if the stored value is still positive.
    /// Returns whether the decrement applied.
    async fn debit_energy(&mut self, id: Uuid) -> StoreResult<bool>;

    async fn has_queue_entry(&mut self, id: Uuid) -> StoreResult<bool>;

    /// Atomically remove and return the oldest entry not owned by `excluding`.
    /// Two concurrent callers never receive the same entry.
    async fn take_oldest_opponent(&mut self, excluding: Uuid) -> StoreResult<Option<QueueEntry>>;

    /// Oldest entry not owned by `excluding`, left in place.
    async fn peek_oldest_opponent(&mut self, excluding: Uuid) -> StoreResult<Option<QueueEntry>>;

    /// Insert a ticket; `false` if the player already holds one.
    async fn insert_queue_entry(&mut self, entry: &QueueEntry) -> StoreResult<bool>;

    async fn remove_queue_entries(&mut self, ids: &[Uuid]) -> StoreResult<()>;

    /// Drop tickets created before `cutoff`; returns how many went.
    async fn purge_queue_before(&mut self, cutoff: DateTime<Utc>) -> StoreResult<u64>;

    /// Append to the death log; `false` if the player already has a record.
    async fn record_death(&mut self, record: &DeathRecord) -> StoreResult<bool>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
