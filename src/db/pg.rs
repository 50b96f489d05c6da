//! Postgres-backed store. Every mutual-exclusion guarantee lives in SQL:
//! row locks for players, a delete-returning take for the queue, and
//! conditional updates / inserts for energy, tickets and deaths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::db::{
    models::{PlayerRow, QueueRow},
    GameStore, StoreResult, StoreTx,
};
use crate::game::types::{DeathRecord, Player, QueueEntry};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl GameStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn find_player(&mut self, id: Uuid) -> StoreResult<Option<Player>> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"SELECT id, health_points, attack_power, energy_points, gold,
                      weapon, armor, health_potion_cost
                 FROM players
                WHERE id = $1
                  FOR UPDATE"#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Player::from))
    }

    async fn save_player(&mut self, p: &Player) -> StoreResult<()> {
        sqlx::query(
            r#"UPDATE players
                  SET health_points      = $2,
                      attack_power       = $3,
                      energy_points      = $4,
                      gold               = $5,
                      weapon             = $6,
                      armor              = $7,
                      health_potion_cost = $8
                WHERE id = $1"#,
        )
        .bind(p.id)
        .bind(p.health_points)
        .bind(p.attack_power)
        .bind(p.energy_points)
        .bind(p.gold)
        .bind(p.weapon.as_deref())
        .bind(p.armor.as_deref())
        .bind(p.health_potion_cost)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn debit_energy(&mut self, id: Uuid) -> StoreResult<bool> {
        let applied = sqlx::query(
            "UPDATE players SET energy_points = energy_points - 1 WHERE id = $1 AND energy_points > 0",
        )
        .bind(id)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();
        Ok(applied == 1)
    }

    async fn has_queue_entry(&mut self, id: Uuid) -> StoreResult<bool> {
        let (exists,) = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS(SELECT 1 FROM duel_queue WHERE player_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn take_oldest_opponent(&mut self, excluding: Uuid) -> StoreResult<Option<QueueEntry>> {
        // single statement: locked rows are skipped, so a ticket has one taker
        let row = sqlx::query_as::<_, QueueRow>(
            r#"DELETE FROM duel_queue
                WHERE player_id = (
                      SELECT player_id
                        FROM duel_queue
                       WHERE player_id <> $1
                       ORDER BY created_at
                       LIMIT 1
                         FOR UPDATE SKIP LOCKED)
            RETURNING player_id, created_at"#,
        )
        .bind(excluding)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(QueueEntry::from))
    }

    async fn peek_oldest_opponent(&mut self, excluding: Uuid) -> StoreResult<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, QueueRow>(
            r#"SELECT player_id, created_at
                 FROM duel_queue
                WHERE player_id <> $1
                ORDER BY created_at
                LIMIT 1"#,
        )
        .bind(excluding)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(QueueEntry::from))
    }

    async fn insert_queue_entry(&mut self, entry: &QueueEntry) -> StoreResult<bool> {
        let inserted = sqlx::query(
            r#"INSERT INTO duel_queue (player_id, created_at)
               VALUES ($1, $2)
               ON CONFLICT (player_id) DO NOTHING"#,
        )
        .bind(entry.player_id)
        .bind(entry.created_at)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();
        Ok(inserted == 1)
    }

    async fn remove_queue_entries(&mut self, ids: &[Uuid]) -> StoreResult<()> {
        sqlx::query("DELETE FROM duel_queue WHERE player_id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn purge_queue_before(&mut self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let purged = sqlx::query("DELETE FROM duel_queue WHERE created_at < $1")
            .bind(cutoff)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();
        Ok(purged)
    }

    async fn record_death(&mut self, record: &DeathRecord) -> StoreResult<bool> {
        let inserted = sqlx::query(
            r#"INSERT INTO deaths (player_id, cause, died_at)
               VALUES ($1, $2, $3)
               ON CONFLICT (player_id) DO NOTHING"#,
        )
        .bind(record.player_id)
        .bind(record.cause.as_str())
        .bind(record.died_at)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();
        Ok(inserted == 1)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
