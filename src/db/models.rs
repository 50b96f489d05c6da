use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::game::types::{Player, QueueEntry};

#[derive(Debug, FromRow)]
pub struct PlayerRow {
    pub id: Uuid,
    pub health_points: i32,
    pub attack_power: f64,
    pub energy_points: i32,
    pub gold: i64,
    pub weapon: Option<String>,
    pub armor: Option<String>,
    pub health_potion_cost: i64,
}

impl From<PlayerRow> for Player {
    fn from(r: PlayerRow) -> Self {
        Player {
            id: r.id,
            health_points: r.health_points,
            attack_power: r.attack_power,
            energy_points: r.energy_points,
            gold: r.gold,
            weapon: r.weapon,
            armor: r.armor,
            health_potion_cost: r.health_potion_cost,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct QueueRow {
    pub player_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<QueueRow> for QueueEntry {
    fn from(r: QueueRow) -> Self {
        QueueEntry {
            player_id: r.player_id,
            created_at: r.created_at,
        }
    }
}
