//! In-process store with the same contract as the Postgres one.
//!
//! A transaction holds the store's async mutex from `begin` to
//! `commit`/`rollback` and works on a private draft, so transactions are
//! serialisable and a dropped or rolled-back one leaves nothing behind.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::db::{GameStore, StoreResult, StoreTx};
use crate::game::types::{DeathRecord, Player, QueueEntry};

#[derive(Debug, Default, Clone)]
struct Tables {
    players: HashMap<Uuid, Player>,
    /// Insertion order breaks `created_at` ties.
    queue: Vec<QueueEntry>,
    deaths: Vec<DeathRecord>,
}

impl Tables {
    fn oldest_opponent(&self, excluding: Uuid) -> Option<usize> {
        self.queue
            .iter()
            .enumerate()
            .filter(|(_, e)| e.player_id != excluding)
            .min_by_key(|(_, e)| e.created_at)
            .map(|(i, _)| i)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or overwrite) a player outside any game transaction.
    pub async fn insert_player(&self, player: Player) {
        self.inner.lock().await.players.insert(player.id, player);
    }

    /// Put a ticket straight into the queue, bypassing game rules.
    pub async fn insert_queue_entry(&self, entry: QueueEntry) {
        let mut t = self.inner.lock().await;
        if !t.queue.iter().any(|e| e.player_id == entry.player_id) {
            t.queue.push(entry);
        }
    }

    pub async fn player(&self, id: Uuid) -> Option<Player> {
        self.inner.lock().await.players.get(&id).cloned()
    }

    pub async fn queue(&self) -> Vec<QueueEntry> {
        self.inner.lock().await.queue.clone()
    }

    pub async fn deaths(&self) -> Vec<DeathRecord> {
        self.inner.lock().await.deaths.clone()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.inner.clone().lock_owned().await;
        let draft = guard.clone();
        Ok(Box::new(MemoryTx { guard, draft }))
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    draft: Tables,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_player(&mut self, id: Uuid) -> StoreResult<Option<Player>> {
        Ok(self.draft.players.get(&id).cloned())
    }

    async fn save_player(&mut self, player: &Player) -> StoreResult<()> {
        if let Some(slot) = self.draft.players.get_mut(&player.id) {
            *slot = player.clone();
        }
        Ok(())
    }

    async fn debit_energy(&mut self, id: Uuid) -> StoreResult<bool> {
        match self.draft.players.get_mut(&id) {
            Some(p) if p.energy_points > 0 => {
                p.energy_points -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn has_queue_entry(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(self.draft.queue.iter().any(|e| e.player_id == id))
    }

    async fn take_oldest_opponent(&mut self, excluding: Uuid) -> StoreResult<Option<QueueEntry>> {
        Ok(self
            .draft
            .oldest_opponent(excluding)
            .map(|i| self.draft.queue.remove(i)))
    }

    async fn peek_oldest_opponent(&mut self, excluding: Uuid) -> StoreResult<Option<QueueEntry>> {
        Ok(self
            .draft
            .oldest_opponent(excluding)
            .map(|i| self.draft.queue[i].clone()))
    }

    async fn insert_queue_entry(&mut self, entry: &QueueEntry) -> StoreResult<bool> {
        if self.draft.queue.iter().any(|e| e.player_id == entry.player_id) {
            return Ok(false);
        }
        self.draft.queue.push(entry.clone());
        Ok(true)
    }

    async fn remove_queue_entries(&mut self, ids: &[Uuid]) -> StoreResult<()> {
        self.draft.queue.retain(|e| !ids.contains(&e.player_id));
        Ok(())
    }

    async fn purge_queue_before(&mut self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let before = self.draft.queue.len();
        self.draft.queue.retain(|e| e.created_at >= cutoff);
        Ok((before - self.draft.queue.len()) as u64)
    }

    async fn record_death(&mut self, record: &DeathRecord) -> StoreResult<bool> {
        if self
            .draft
            .deaths
            .iter()
            .any(|d| d.player_id == record.player_id)
        {
            return Ok(false);
        }
        self.draft.deaths.push(record.clone());
        Ok(true)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, draft } = *self;
        *guard = draft;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
