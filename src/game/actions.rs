//! Transaction bodies of every player action, and the `perform` entry point
//! used by the front-end.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use uuid::Uuid;

use crate::broadcast::{self, Broadcaster};
use crate::cache::GameContent;
use crate::config::settings;
use crate::db::{GameStore, StoreTx};
use crate::error::AbortReason;
use crate::game::{
    combat::{self, CombatOutcome, DuelDraws, TIE_TEXT},
    effects,
    encounter::{self, Encounter, EncounterKind},
    mutator::{self, GameAction},
    shop,
    types::{DeathCause, DeathRecord, Player, PlayerDelta},
};
use crate::matchmaking::{enqueue_or_match, EnergyCharge, MatchResult};
use crate::protocol::{ActionReply, ActionToken, DuelStanding, DuelSummary, FeedEvent};

pub const QUEUED_TEXT: &str = "You have been added to battle queue!";

/// What one committed action did to the acting player.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub before: Player,
    pub after: Player,
    pub message: String,
    pub feed: Option<String>,
    pub duel: Option<DuelSummary>,
}

/// One player action bound to the content and randomness it will use.
pub struct PlayAction {
    pub player_id: Uuid,
    pub token: ActionToken,
    content: Arc<GameContent>,
    rng: StdRng,
    queue_ttl: Option<Duration>,
}

impl PlayAction {
    pub fn new(player_id: Uuid, token: ActionToken, content: Arc<GameContent>) -> Self {
        PlayAction {
            player_id,
            token,
            content,
            rng: StdRng::from_os_rng(),
            queue_ttl: settings().queue_ttl,
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_queue_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.queue_ttl = ttl;
        self
    }
}

#[async_trait]
impl GameAction for PlayAction {
    type Output = ActionOutcome;

    fn name(&self) -> &'static str {
        self.token.name()
    }

    async fn execute(mut self, tx: &mut dyn StoreTx) -> Result<ActionOutcome, AbortReason> {
        let before = load_live_player(tx, self.player_id).await?;
        let catalog = &self.content.catalog;

        let (message, feed, duel) = match &self.token {
            ActionToken::Status => (status_text(&before), None, None),
            ActionToken::Duel => {
                let draws = DuelDraws::sample(&mut self.rng);
                duel_request(tx, &before, draws, &self.content, self.queue_ttl).await?
            }
            ActionToken::RandomEncounter => {
                let picked = encounter::pick(&self.content.encounters, &mut self.rng)
                    .ok_or_else(|| AbortReason::Store("encounter table is empty".into()))?;
                let draws = DuelDraws::sample(&mut self.rng);
                run_encounter(tx, &before, picked, draws, &self.content, self.queue_ttl).await?
            }
            ActionToken::BuyWeapon { weapon } => {
                tx.save_player(&shop::buy_weapon(&before, catalog, weapon)?)
                    .await?;
                ("You have bought a weapon!".to_string(), None, None)
            }
            ActionToken::SellWeapon => {
                let (after, refund) = shop::sell_weapon(&before, catalog)?;
                tx.save_player(&after).await?;
                (
                    format!("You have sold your weapon for {refund} credits, half of its price!"),
                    None,
                    None,
                )
            }
            ActionToken::BuyArmor { armor } => {
                tx.save_player(&shop::buy_armor(&before, catalog, armor)?)
                    .await?;
                ("You have bought an armor!".to_string(), None, None)
            }
            ActionToken::SellArmor => {
                let (after, refund) = shop::sell_armor(&before, catalog)?;
                tx.save_player(&after).await?;
                (
                    format!("You have sold your armor for {refund} credits, half of its price!"),
                    None,
                    None,
                )
            }
            ActionToken::BuyRepairKit => {
                tx.save_player(&shop::buy_repair_kit(&before)?).await?;
                ("You have bought and used a repair kit!".to_string(), None, None)
            }
        };

        let after = tx
            .find_player(self.player_id)
            .await?
            .ok_or(AbortReason::PlayerNotFound)?;
        Ok(ActionOutcome {
            before,
            after,
            message,
            feed,
            duel,
        })
    }
}

type Rendered = (String, Option<String>, Option<DuelSummary>);

/// Load the player and refuse the action if they are gone or dead.
pub async fn load_live_player(tx: &mut dyn StoreTx, id: Uuid) -> Result<Player, AbortReason> {
    let player = tx.find_player(id).await?.ok_or(AbortReason::PlayerNotFound)?;
    if player.is_dead() {
        return Err(AbortReason::PlayerDead);
    }
    Ok(player)
}

fn status_text(p: &Player) -> String {
    format!(
        "Health: {}\nAttack: {}\nEnergy: {}\nCredits: {}\nWeapon: {}\nArmor: {}",
        p.health_points,
        p.attack_power,
        p.energy_points,
        p.gold,
        p.weapon.as_deref().unwrap_or("none"),
        p.armor.as_deref().unwrap_or("none"),
    )
}

async fn duel_request(
    tx: &mut dyn StoreTx,
    player: &Player,
    draws: DuelDraws,
    content: &GameContent,
    queue_ttl: Option<Duration>,
) -> Result<Rendered, AbortReason> {
    match enqueue_or_match(tx, player, EnergyCharge::OnEnqueue, queue_ttl).await? {
        MatchResult::Enqueued => Ok((
            QUEUED_TEXT.to_string(),
            None,
            Some(DuelSummary {
                standing: DuelStanding::Queued,
                opponent: None,
                health_lost: 0,
                reward: 0,
                eliminated: false,
            }),
        )),
        MatchResult::MatchedWith(opponent) => {
            let (text, summary) =
                fight(tx, player, &opponent, &draws, content, EnergyCharge::OnEnqueue).await?;
            Ok((text.clone(), Some(text), Some(summary)))
        }
    }
}

/// Resolve a duel between the instigator and a matched opponent and persist
/// everything it changed: both players, both tickets, the death record and,
/// unless prepaid, the instigator's energy point.
pub async fn fight(
    tx: &mut dyn StoreTx,
    instigator: &Player,
    opponent: &Player,
    draws: &DuelDraws,
    content: &GameContent,
    charge: EnergyCharge,
) -> Result<(String, DuelSummary), AbortReason> {
    let outcome = combat::resolve(instigator, opponent, draws, content);
    tx.remove_queue_entries(&[instigator.id, opponent.id]).await?;

    let (text, summary) = match outcome {
        CombatOutcome::Tie { .. } => (
            TIE_TEXT.to_string(),
            DuelSummary {
                standing: DuelStanding::Tie,
                opponent: Some(opponent.id),
                health_lost: 0,
                reward: 0,
                eliminated: false,
            },
        ),
        CombatOutcome::Decisive(report) => {
            tx.save_player(&report.winner).await?;
            tx.save_player(&report.loser).await?;
            if report.eliminated {
                let recorded = tx
                    .record_death(&DeathRecord::now(report.loser.id, DeathCause::Duel))
                    .await?;
                if !recorded {
                    log::warn!("{} already had a death record", report.loser.id);
                }
            }
            let won = report.winner.id == instigator.id;
            let summary = DuelSummary {
                standing: if won {
                    DuelStanding::Won
                } else {
                    DuelStanding::Lost
                },
                opponent: Some(opponent.id),
                health_lost: report.health_lost,
                reward: report.reward,
                eliminated: report.eliminated,
            };
            (report.narrative, summary)
        }
    };

    if charge == EnergyCharge::OnEnqueue && !tx.debit_energy(instigator.id).await? {
        return Err(AbortReason::InsufficientEnergy);
    }
    Ok((text, summary))
}

async fn run_encounter(
    tx: &mut dyn StoreTx,
    player: &Player,
    picked: &Encounter,
    draws: DuelDraws,
    content: &GameContent,
    queue_ttl: Option<Duration>,
) -> Result<Rendered, AbortReason> {
    if !tx.debit_energy(player.id).await? {
        return Err(AbortReason::InsufficientEnergy);
    }
    let player = tx
        .find_player(player.id)
        .await?
        .ok_or(AbortReason::PlayerNotFound)?;

    let flavour_only = || (picked.prelude(), Some(picked.feed_for(player.id)), None);

    match &picked.kind {
        EncounterKind::Effects(script) => {
            let outcome = effects::apply(script, &player, &content.catalog)?;
            tx.save_player(&outcome.player).await?;
            if outcome.player.is_dead() {
                tx.record_death(&DeathRecord::now(player.id, DeathCause::Encounter))
                    .await?;
                tx.remove_queue_entries(&[player.id]).await?;
            }
            Ok((
                format!("{}\n\n{}", picked.prelude(), outcome.private_text()),
                Some(format!(
                    "{}\n{}",
                    picked.feed_for(player.id),
                    outcome.feed_text()
                )),
                None,
            ))
        }
        EncounterKind::Narrative => Ok(flavour_only()),
        EncounterKind::Battle => {
            if tx.peek_oldest_opponent(player.id).await?.is_none() {
                return Ok(flavour_only());
            }
            match enqueue_or_match(tx, &player, EnergyCharge::Prepaid, queue_ttl).await {
                Ok(MatchResult::MatchedWith(opponent)) => {
                    let (text, summary) =
                        fight(tx, &player, &opponent, &draws, content, EnergyCharge::Prepaid)
                            .await?;
                    Ok((
                        format!("{}\n\n{text}", picked.prelude()),
                        Some(format!("{}\n{text}", picked.feed_for(player.id))),
                        Some(summary),
                    ))
                }
                Ok(MatchResult::Enqueued) => {
                    let (message, feed, _) = flavour_only();
                    Ok((
                        format!("{message}\n\n{QUEUED_TEXT}"),
                        feed,
                        Some(DuelSummary {
                            standing: DuelStanding::Queued,
                            opponent: None,
                            health_lost: 0,
                            reward: 0,
                            eliminated: false,
                        }),
                    ))
                }
                Err(AbortReason::AlreadyQueued | AbortReason::InsufficientEnergy) => {
                    Ok(flavour_only())
                }
                Err(e) => Err(e),
            }
        }
    }
}

/// Run one action, then publish its feed line once the commit is durable.
pub async fn perform(
    store: &dyn GameStore,
    feed: Arc<dyn Broadcaster>,
    action: PlayAction,
) -> Result<ActionReply, AbortReason> {
    let player_id = action.player_id;
    let name = action.token.name();
    let outcome = mutator::run(store, action).await?;

    if let Some(text) = &outcome.feed {
        broadcast::deliver(
            feed,
            FeedEvent {
                player_id,
                action: name.to_string(),
                text: text.clone(),
                ts: Utc::now(),
            },
            settings().feed_timeout,
        )
        .await;
    }

    Ok(ActionReply {
        action: name.to_string(),
        message: outcome.message,
        delta: PlayerDelta::between(&outcome.before, &outcome.after),
        player: outcome.after,
        duel: outcome.duel,
        feed: outcome.feed,
    })
}
