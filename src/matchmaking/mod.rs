//! Duel queue: pair the caller with the oldest waiting opponent, or leave a
//! ticket for the next one.
//
//  Store tables
//  ------------
//  duel_queue  – one row per waiting player (PK player_id), ordered by created_at
//  players     – energy_points debited with a conditional decrement

use std::time::Duration;

use chrono::Utc;

use crate::db::StoreTx;
use crate::error::AbortReason;
use crate::game::types::{Player, QueueEntry};

#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// No opponent was waiting; the caller now holds a ticket.
    Enqueued,
    /// The opponent's ticket was consumed; fight now.
    MatchedWith(Player),
}

/// Who pays the energy point for a duel attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyCharge {
    /// A direct duel request: paid when enqueued, or by the instigator after the fight.
    OnEnqueue,
    /// An escalated encounter that already paid its point. The caller must
    /// still have energy left, but nothing more is debited.
    Prepaid,
}

/// Enqueue `player` or take the oldest ticket of someone else.
///
/// The take is a single remove-and-return on the store, so a waiting ticket
/// is consumed by at most one concurrent caller.
pub async fn enqueue_or_match(
    tx: &mut dyn StoreTx,
    player: &Player,
    charge: EnergyCharge,
    queue_ttl: Option<Duration>,
) -> Result<MatchResult, AbortReason> {
    if let Some(ttl) = queue_ttl {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|_| AbortReason::Store("queue ttl out of range".into()))?;
        let purged = tx.purge_queue_before(Utc::now() - ttl).await?;
        if purged > 0 {
            log::info!("purged {purged} expired duel tickets");
        }
    }

    if tx.has_queue_entry(player.id).await? {
        return Err(AbortReason::AlreadyQueued);
    }
    // A prepaid caller still needs energy left after paying for what led here.
    if player.energy_points <= 0 {
        return Err(AbortReason::InsufficientEnergy);
    }

    loop {
        let Some(entry) = tx.take_oldest_opponent(player.id).await? else {
            if !tx.insert_queue_entry(&QueueEntry::now(player.id)).await? {
                return Err(AbortReason::AlreadyQueued);
            }
            if charge == EnergyCharge::OnEnqueue && !tx.debit_energy(player.id).await? {
                return Err(AbortReason::InsufficientEnergy);
            }
            return Ok(MatchResult::Enqueued);
        };

        match tx.find_player(entry.player_id).await? {
            Some(opponent) if !opponent.is_dead() => return Ok(MatchResult::MatchedWith(opponent)),
            _ => log::warn!("discarding stale duel ticket of {}", entry.player_id),
        }
    }
}
