//! Duel resolution: two combatants plus pre-drawn randomness in, a winner,
//! a loser and the damage out. No I/O happens here.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cache::GameContent;
use crate::game::{
    narrative::{mention, Perspective, Tier},
    types::Player,
};

/// Every random value a duel consumes, drawn up front so resolution is reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuelDraws {
    /// Uniform [0,1) roll of the first combatant.
    pub roll_a: f64,
    /// Uniform [0,1) roll of the second combatant.
    pub roll_b: f64,
    pub perspective: Perspective,
    /// Which of the loser's armor lines to use.
    pub armor_variant: usize,
    /// Armor line over weapon line when both exist.
    pub prefer_armor_line: bool,
}

impl DuelDraws {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        DuelDraws {
            roll_a: rng.random(),
            roll_b: rng.random(),
            perspective: if rng.random_bool(0.5) {
                Perspective::Damaging
            } else {
                Perspective::GettingDamage
            },
            armor_variant: rng.random_range(0..2),
            prefer_armor_line: rng.random_bool(0.5),
        }
    }

    /// Same draws with the combatants' rolls exchanged.
    pub fn swapped(&self) -> Self {
        DuelDraws {
            roll_a: self.roll_b,
            roll_b: self.roll_a,
            ..*self
        }
    }
}

/// Result of a duel that produced a winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelReport {
    /// Winner after the reward was credited.
    pub winner: Player,
    /// Loser after damage (and, if alive, the gold debit).
    pub loser: Player,
    pub winner_roll: f64,
    pub loser_roll: f64,
    /// Unrounded damage dealt.
    pub damage: f64,
    /// Health actually taken from the loser.
    pub health_lost: i32,
    /// Gold moved to the winner.
    pub reward: i64,
    pub eliminated: bool,
    /// Narrative tier; `Elimination` whenever the loser died.
    pub tier: Tier,
    /// Flavour text with both players mentioned.
    pub narrative: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CombatOutcome {
    /// Equal rolls: nobody is hurt and no gold moves.
    Tie { roll_a: f64, roll_b: f64 },
    Decisive(Box<DuelReport>),
}

pub const TIE_TEXT: &str = "It is a tie!";

/// `roll * attack_power`, rounded to two decimals.
pub fn damage_roll(roll: f64, attack_power: f64) -> f64 {
    (roll * attack_power * 100.0).round() / 100.0
}

/// Damage dealt to the loser before rounding.
pub fn duel_damage(base_damage: f64, winner_roll: f64, loser_roll: f64, mitigation: f64) -> f64 {
    base_damage + (winner_roll - loser_roll).abs() * (1.0 - mitigation) * 10.0
}

/// Resolve a duel between `a` and `b`. `draws.roll_a` belongs to `a`.
pub fn resolve(a: &Player, b: &Player, draws: &DuelDraws, content: &GameContent) -> CombatOutcome {
    let roll_a = damage_roll(draws.roll_a, a.attack_power);
    let roll_b = damage_roll(draws.roll_b, b.attack_power);

    if roll_a == roll_b {
        return CombatOutcome::Tie { roll_a, roll_b };
    }

    let (mut winner, mut loser, winner_roll, loser_roll) = if roll_a > roll_b {
        (a.clone(), b.clone(), roll_a, roll_b)
    } else {
        (b.clone(), a.clone(), roll_b, roll_a)
    };

    let mitigation = content.catalog.mitigation_of(loser.armor.as_deref());
    let damage = duel_damage(content.base_damage, winner_roll, loser_roll, mitigation);
    let health_lost = damage.round() as i32;
    loser.health_points -= health_lost;
    let eliminated = loser.is_dead();

    let reward = if eliminated {
        // looting: everything the loser carried
        loser.gold
            + content
                .catalog
                .equipment_value(loser.weapon.as_deref(), loser.armor.as_deref())
    } else {
        let half = loser.gold / 2;
        loser.gold -= half;
        half
    };
    winner.gold += reward;

    let numeric_tier = content.narrative.tier_for(damage);
    let tier = if eliminated {
        Tier::Elimination
    } else {
        numeric_tier
    };
    let narrative = narrate(&winner, &loser, numeric_tier, eliminated, draws, content);

    CombatOutcome::Decisive(Box::new(DuelReport {
        winner,
        loser,
        winner_roll,
        loser_roll,
        damage,
        health_lost,
        reward,
        eliminated,
        tier,
        narrative,
    }))
}

fn narrate(
    winner: &Player,
    loser: &Player,
    numeric_tier: Tier,
    eliminated: bool,
    draws: &DuelDraws,
    content: &GameContent,
) -> String {
    let tables = &content.narrative;

    let armor_text = loser
        .armor
        .as_deref()
        .and_then(|k| tables.armor_line(k, draws.armor_variant, numeric_tier));
    let weapon_text = winner
        .weapon
        .as_deref()
        .and_then(|k| tables.weapon_line(k, numeric_tier));
    let armory = match (armor_text, weapon_text) {
        (Some(a), Some(w)) => Some(if draws.prefer_armor_line { a } else { w }),
        (a, w) => a.or(w),
    };

    let tier = if eliminated {
        Tier::Elimination
    } else {
        numeric_tier
    };
    let line = tables.duel_line(tier, draws.perspective);

    let text = match armory {
        Some(extra) if eliminated => format!("{extra}\n{line}"),
        Some(extra) => format!("{line}\n{extra}"),
        None => line.to_string(),
    };

    text.replace("{winner}", &mention(winner.id))
        .replace("{loser}", &mention(loser.id))
}
