//! Encounter effect language.
//!
//! An effect script is a comma-separated list of clauses such as
//! `"lost 10 hp, earned 25 credits, acquired Rail Pistol (weapon)"`. Scripts are
//! parsed once into [`Effect`] variants when content is warmed; applying a
//! script only walks the typed clauses.

use serde::{Deserialize, Serialize};

use crate::error::AbortReason;
use crate::game::{
    catalog::Catalog,
    narrative::mention,
    shop::{equip_armor, equip_weapon},
    types::{Player, MAX_ENERGY, MAX_HEALTH},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyAmount {
    One,
    Two,
    All,
}

impl EnergyAmount {
    fn words(self) -> &'static str {
        match self {
            EnergyAmount::One => "an energy point",
            EnergyAmount::Two => "two energy points",
            EnergyAmount::All => "all energy points",
        }
    }
}

/// One clause of the vocabulary with its typed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "value", rename_all = "snake_case")]
pub enum Effect {
    LoseHealth(i32),
    LoseEnergy(EnergyAmount),
    LoseCredits(i64),
    /// Clears the armor, or costs the embedded credits when there is none.
    LoseArmor { fallback_credits: i64 },
    /// Clears the weapon, or costs the embedded credits when there is none.
    LoseWeapon { fallback_credits: i64 },
    ReplaceArmor(String),
    ReplaceWeapon(String),
    Eliminated,
    EarnCredits(i64),
    GainHealth(i32),
    RegenerateEnergy(EnergyAmount),
    UpgradeArmor(String),
    UpgradeWeapon(String),
    AcquireArmor(String),
    AcquireWeapon(String),
}

/// A parsed effect description; clauses keep their textual order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectScript {
    clauses: Vec<Effect>,
}

impl EffectScript {
    pub fn parse(text: &str) -> Result<Self, AbortReason> {
        let clauses = text
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(parse_clause)
            .collect::<Result<Vec<_>, _>>()?;
        if clauses.is_empty() {
            return Err(AbortReason::MalformedEffect(text.to_string()));
        }
        Ok(EffectScript { clauses })
    }

    pub fn clauses(&self) -> &[Effect] {
        &self.clauses
    }

    /// Every item name the script refers to, as `(is_armor, name)`.
    pub fn item_names(&self) -> impl Iterator<Item = (bool, &str)> {
        self.clauses.iter().filter_map(|c| match c {
            Effect::ReplaceArmor(n) | Effect::UpgradeArmor(n) | Effect::AcquireArmor(n) => {
                Some((true, n.as_str()))
            }
            Effect::ReplaceWeapon(n) | Effect::UpgradeWeapon(n) | Effect::AcquireWeapon(n) => {
                Some((false, n.as_str()))
            }
            _ => None,
        })
    }
}

impl std::str::FromStr for EffectScript {
    type Err = AbortReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectScript::parse(s)
    }
}

fn parse_clause(raw: &str) -> Result<Effect, AbortReason> {
    let text = raw.trim().trim_end_matches('.').trim();
    // ASCII lowering keeps byte offsets aligned with `text`
    let lower = text.to_ascii_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let malformed = || AbortReason::MalformedEffect(raw.trim().to_string());
    let named = |from: usize, to: usize| -> Result<String, AbortReason> {
        let name = text[from..to].trim();
        if name.is_empty() {
            Err(malformed())
        } else {
            Ok(name.to_string())
        }
    };

    if let Some(at) = lower.find("replaced by a ") {
        let name = named(at + "replaced by a ".len(), text.len())?;
        let subject = &lower[..at];
        return if subject.contains("armor") {
            Ok(Effect::ReplaceArmor(name))
        } else if subject.contains("weapon") {
            Ok(Effect::ReplaceWeapon(name))
        } else {
            Err(malformed())
        };
    }
    if let Some(rest) = lower.strip_prefix("upgraded your armor to ") {
        return Ok(Effect::UpgradeArmor(named(text.len() - rest.len(), text.len())?));
    }
    if let Some(rest) = lower.strip_prefix("upgraded your weapon to ") {
        return Ok(Effect::UpgradeWeapon(named(text.len() - rest.len(), text.len())?));
    }
    if lower.starts_with("acquired ") {
        let start = "acquired ".len();
        if lower.ends_with("(armor)") {
            return Ok(Effect::AcquireArmor(named(start, text.len() - "(armor)".len())?));
        }
        if lower.ends_with("(weapon)") {
            return Ok(Effect::AcquireWeapon(named(start, text.len() - "(weapon)".len())?));
        }
        return Err(malformed());
    }

    let amount = |idx: usize| -> Result<i64, AbortReason> {
        words
            .get(idx)
            .and_then(|w| w.parse::<i64>().ok())
            .filter(|n| *n >= 0)
            .ok_or_else(malformed)
    };
    let first_amount = || -> Result<i64, AbortReason> {
        words
            .iter()
            .find_map(|w| w.parse::<i64>().ok())
            .filter(|n| *n >= 0)
            .ok_or_else(malformed)
    };
    let energy = || {
        if lower.contains("an ep") {
            Some(EnergyAmount::One)
        } else if lower.contains("two eps") {
            Some(EnergyAmount::Two)
        } else if lower.contains("all ep") {
            Some(EnergyAmount::All)
        } else {
            None
        }
    };
    let has_word = |w: &str| words.contains(&w);

    match words.first().copied() {
        Some("lost") => {
            if has_word("hp") {
                Ok(Effect::LoseHealth(amount(1)? as i32))
            } else if let Some(e) = energy() {
                Ok(Effect::LoseEnergy(e))
            } else if has_word("armor") {
                Ok(Effect::LoseArmor {
                    fallback_credits: first_amount()?,
                })
            } else if has_word("weapon") {
                Ok(Effect::LoseWeapon {
                    fallback_credits: first_amount()?,
                })
            } else if has_word("credits") {
                Ok(Effect::LoseCredits(amount(1)?))
            } else {
                Err(malformed())
            }
        }
        Some("eliminated") => Ok(Effect::Eliminated),
        Some("earned") if has_word("credits") => Ok(Effect::EarnCredits(amount(1)?)),
        Some("gained") if has_word("hp") => Ok(Effect::GainHealth(amount(1)? as i32)),
        Some("regenerated") => energy().map(Effect::RegenerateEnergy).ok_or_else(malformed),
        _ => Err(malformed()),
    }
}

/// Mutated draft plus the two narrative renderings of what happened.
#[derive(Debug, Clone)]
pub struct EffectOutcome {
    pub player: Player,
    /// Second person, for the acting player.
    pub private_lines: Vec<String>,
    /// Third person with a mention, for the shared feed.
    pub feed_lines: Vec<String>,
}

impl EffectOutcome {
    pub fn private_text(&self) -> String {
        self.private_lines.join("\n")
    }

    pub fn feed_text(&self) -> String {
        self.feed_lines.join("\n")
    }
}

/// Apply the clauses, in order, to a copy of `player`, stopping after the
/// clause that eliminates them.
///
/// Nothing is written anywhere: on `Err` the caller still holds the untouched
/// player, on `Ok` the draft is persisted once by the enclosing action.
pub fn apply(
    script: &EffectScript,
    player: &Player,
    catalog: &Catalog,
) -> Result<EffectOutcome, AbortReason> {
    let mut draft = player.clone();
    let who = mention(player.id);
    let mut private_lines = Vec::with_capacity(script.clauses.len());
    let mut feed_lines = Vec::with_capacity(script.clauses.len());

    for clause in &script.clauses {
        let (private, feed) = match clause {
            Effect::LoseHealth(n) => {
                draft.health_points -= n;
                let eliminated = if draft.is_dead() { " and eliminated" } else { "" };
                (
                    format!("You have lost {n} health points{eliminated}."),
                    format!("{who} has lost {n} health points{eliminated}."),
                )
            }
            Effect::LoseEnergy(amount) => {
                draft.energy_points = match amount {
                    EnergyAmount::One => (draft.energy_points - 1).max(0),
                    EnergyAmount::Two => (draft.energy_points - 2).max(0),
                    EnergyAmount::All => 0,
                };
                (
                    format!("You have lost {}.", amount.words()),
                    format!("{who} has lost {}.", amount.words()),
                )
            }
            Effect::LoseCredits(n) => {
                draft.gold = (draft.gold - n).max(0);
                (
                    format!("You have lost {n} credits."),
                    format!("{who} has lost {n} credits."),
                )
            }
            Effect::LoseArmor { fallback_credits } => {
                if draft.armor.is_some() {
                    equip_armor(&mut draft, None);
                    (
                        "You have lost your armor.".to_string(),
                        format!("{who} has lost their armor."),
                    )
                } else {
                    draft.gold = (draft.gold - fallback_credits).max(0);
                    (
                        format!(
                            "You have lost {fallback_credits} credits because you don't have an armor."
                        ),
                        format!(
                            "{who} has lost {fallback_credits} credits because they don't have an armor."
                        ),
                    )
                }
            }
            Effect::LoseWeapon { fallback_credits } => {
                if draft.weapon.is_some() {
                    equip_weapon(&mut draft, catalog, None);
                    (
                        "You have lost your weapon.".to_string(),
                        format!("{who} has lost their weapon."),
                    )
                } else {
                    draft.gold = (draft.gold - fallback_credits).max(0);
                    (
                        format!(
                            "You have lost {fallback_credits} credits because you don't have a weapon."
                        ),
                        format!(
                            "{who} has lost {fallback_credits} credits because they don't have a weapon."
                        ),
                    )
                }
            }
            Effect::ReplaceArmor(name) => {
                let armor = find_armor(catalog, name)?;
                equip_armor(&mut draft, Some(&armor.key));
                (
                    format!("Your armor has been replaced by a {}.", armor.name),
                    format!("{who}’s armor has been replaced by a {}.", armor.name),
                )
            }
            Effect::ReplaceWeapon(name) => {
                let weapon = find_weapon(catalog, name)?;
                equip_weapon(&mut draft, catalog, Some(&weapon.key));
                (
                    format!("Your weapon has been replaced by a {}.", weapon.name),
                    format!("{who}’s weapon has been replaced by a {}.", weapon.name),
                )
            }
            Effect::Eliminated => {
                draft.health_points = 0;
                (
                    "You have been eliminated.".to_string(),
                    format!("{who} has been eliminated."),
                )
            }
            Effect::EarnCredits(n) => {
                draft.gold += n;
                (
                    format!("You have earned {n} credits."),
                    format!("{who} has earned {n} credits."),
                )
            }
            Effect::GainHealth(n) => {
                draft.health_points = (draft.health_points + n).min(MAX_HEALTH);
                (
                    format!("You have gained {n} health points."),
                    format!("{who} has gained {n} health points."),
                )
            }
            Effect::RegenerateEnergy(amount) => {
                draft.energy_points = match amount {
                    EnergyAmount::One => (draft.energy_points + 1).min(MAX_ENERGY),
                    EnergyAmount::Two => (draft.energy_points + 2).min(MAX_ENERGY),
                    EnergyAmount::All => MAX_ENERGY,
                };
                (
                    format!("You have regenerated {}.", amount.words()),
                    format!("{who} has regenerated {}.", amount.words()),
                )
            }
            Effect::UpgradeArmor(name) => {
                let armor = find_armor(catalog, name)?;
                equip_armor(&mut draft, Some(&armor.key));
                (
                    format!("Your armor has been upgraded to {}.", armor.name),
                    format!("{who}’s armor has been upgraded to {}.", armor.name),
                )
            }
            Effect::UpgradeWeapon(name) => {
                let weapon = find_weapon(catalog, name)?;
                equip_weapon(&mut draft, catalog, Some(&weapon.key));
                (
                    format!("Your weapon has been upgraded to {}.", weapon.name),
                    format!("{who}’s weapon has been upgraded to {}.", weapon.name),
                )
            }
            Effect::AcquireArmor(name) => {
                let armor = find_armor(catalog, name)?;
                equip_armor(&mut draft, Some(&armor.key));
                (
                    format!("You have acquired {} (armor).", armor.name),
                    format!("{who} has acquired {} (armor).", armor.name),
                )
            }
            Effect::AcquireWeapon(name) => {
                let weapon = find_weapon(catalog, name)?;
                equip_weapon(&mut draft, catalog, Some(&weapon.key));
                (
                    format!("You have acquired {} (weapon).", weapon.name),
                    format!("{who} has acquired {} (weapon).", weapon.name),
                )
            }
        };
        private_lines.push(private);
        feed_lines.push(feed);
        if draft.is_dead() {
            // Elimination is final: later clauses cannot heal or restore.
            break;
        }
    }

    Ok(EffectOutcome {
        player: draft,
        private_lines,
        feed_lines,
    })
}

/// Parse then apply, for callers holding free text.
pub fn apply_str(
    effect_spec: &str,
    player: &Player,
    catalog: &Catalog,
) -> Result<EffectOutcome, AbortReason> {
    apply(&EffectScript::parse(effect_spec)?, player, catalog)
}

fn find_armor<'c>(
    catalog: &'c Catalog,
    name: &str,
) -> Result<&'c crate::game::catalog::Armor, AbortReason> {
    catalog
        .armor_by_name(name)
        .ok_or_else(|| AbortReason::UnknownItem(name.to_string()))
}

fn find_weapon<'c>(
    catalog: &'c Catalog,
    name: &str,
) -> Result<&'c crate::game::catalog::Weapon, AbortReason> {
    catalog
        .weapon_by_name(name)
        .ok_or_else(|| AbortReason::UnknownItem(name.to_string()))
}
