use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_HEALTH: i32 = 100;
pub const MAX_ENERGY: i32 = 3;

/// Durable combat attributes of one player.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Player {
    pub id: Uuid,
    /// 0–100; `<= 0` means eliminated for good.
    pub health_points: i32,
    /// Base power plus the equipped weapon's bonus.
    pub attack_power: f64,
    /// 0–3 action budget.
    pub energy_points: i32,
    pub gold: i64,
    /// Catalog key of the equipped weapon.
    pub weapon: Option<String>,
    /// Catalog key of the equipped armor.
    pub armor: Option<String>,
    /// Price of the next repair kit; doubles on each purchase.
    pub health_potion_cost: i64,
}

impl Player {
    /// A freshly registered player.
    pub fn new(id: Uuid) -> Self {
        Player {
            id,
            health_points: MAX_HEALTH,
            attack_power: 10.0,
            energy_points: MAX_ENERGY,
            gold: 0,
            weapon: None,
            armor: None,
            health_potion_cost: 10,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health_points <= 0
    }
}

/// One waiting-duel ticket.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub player_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn now(player_id: Uuid) -> Self {
        QueueEntry {
            player_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Duel,
    Encounter,
}

impl DeathCause {
    pub fn as_str(self) -> &'static str {
        match self {
            DeathCause::Duel => "duel",
            DeathCause::Encounter => "encounter",
        }
    }
}

/// Append-only elimination log entry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DeathRecord {
    pub player_id: Uuid,
    pub cause: DeathCause,
    pub died_at: DateTime<Utc>,
}

impl DeathRecord {
    pub fn now(player_id: Uuid, cause: DeathCause) -> Self {
        DeathRecord {
            player_id,
            cause,
            died_at: Utc::now(),
        }
    }
}

/// What an action changed on the acting player.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct PlayerDelta {
    pub health_points: i32,
    pub attack_power: f64,
    pub energy_points: i32,
    pub gold: i64,
    pub health_potion_cost: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armor: Option<Option<String>>,
}

impl PlayerDelta {
    pub fn between(before: &Player, after: &Player) -> Self {
        PlayerDelta {
            health_points: after.health_points - before.health_points,
            attack_power: after.attack_power - before.attack_power,
            energy_points: after.energy_points - before.energy_points,
            gold: after.gold - before.gold,
            health_potion_cost: after.health_potion_cost - before.health_potion_cost,
            weapon: (before.weapon != after.weapon).then(|| after.weapon.clone()),
            armor: (before.armor != after.armor).then(|| after.armor.clone()),
        }
    }
}
