//! Wire protocol shared by the HTTP front-end and the game actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::types::{Player, PlayerDelta};

// ---------- client → server ----------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionToken {
    Status,
    Duel,
    RandomEncounter,
    BuyWeapon { weapon: String },
    SellWeapon,
    BuyArmor { armor: String },
    SellArmor,
    BuyRepairKit,
}

impl ActionToken {
    pub fn name(&self) -> &'static str {
        match self {
            ActionToken::Status => "status",
            ActionToken::Duel => "duel",
            ActionToken::RandomEncounter => "random_encounter",
            ActionToken::BuyWeapon { .. } => "buy_weapon",
            ActionToken::SellWeapon => "sell_weapon",
            ActionToken::BuyArmor { .. } => "buy_armor",
            ActionToken::SellArmor => "sell_armor",
            ActionToken::BuyRepairKit => "buy_repair_kit",
        }
    }
}

// ---------- server → client ----------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelStanding {
    Queued,
    Tie,
    Won,
    Lost,
}

/// The acting player's view of a duel that happened during the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelSummary {
    pub standing: DuelStanding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<Uuid>,
    /// Health taken from the loser.
    pub health_lost: i32,
    /// Gold credited to the winner.
    pub reward: i64,
    pub eliminated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReply {
    pub action: String,
    /// Private text for the acting player.
    pub message: String,
    /// State after the commit.
    pub player: Player,
    pub delta: PlayerDelta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duel: Option<DuelSummary>,
    /// Public text sent to the feed, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<String>,
}

// ---------- server → feed ----------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub player_id: Uuid,
    pub action: String,
    pub text: String,
    pub ts: DateTime<Utc>,
}
