//! Armory: equip / unequip and the repair kit. Each function takes the current
//! record and returns the updated copy; the caller persists it.

use crate::error::AbortReason;
use crate::game::{
    catalog::Catalog,
    types::{Player, MAX_HEALTH},
};

/// Health restored by one repair kit.
pub const REPAIR_KIT_HEAL: i32 = 33;

/// Swap the equipped weapon, keeping `attack_power = base + bonus`.
pub fn equip_weapon(player: &mut Player, catalog: &Catalog, weapon: Option<&str>) {
    let old_bonus = catalog.weapon_bonus(player.weapon.as_deref());
    let new_bonus = catalog.weapon_bonus(weapon);
    player.attack_power = (player.attack_power - old_bonus + new_bonus).max(0.0);
    player.weapon = weapon.map(str::to_string);
}

pub fn equip_armor(player: &mut Player, armor: Option<&str>) {
    player.armor = armor.map(str::to_string);
}

pub fn buy_weapon(player: &Player, catalog: &Catalog, key: &str) -> Result<Player, AbortReason> {
    if player.weapon.is_some() {
        return Err(AbortReason::AlreadyEquipped);
    }
    let weapon = catalog
        .weapon(key)
        .ok_or_else(|| AbortReason::UnknownItem(key.to_string()))?;
    if player.gold < weapon.cost {
        return Err(AbortReason::NotEnoughGold);
    }
    let mut p = player.clone();
    p.gold -= weapon.cost;
    equip_weapon(&mut p, catalog, Some(&weapon.key));
    Ok(p)
}

/// Sell the equipped weapon for half its price.
pub fn sell_weapon(player: &Player, catalog: &Catalog) -> Result<(Player, i64), AbortReason> {
    let key = player.weapon.as_deref().ok_or(AbortReason::NothingToSell)?;
    let weapon = catalog
        .weapon(key)
        .ok_or_else(|| AbortReason::UnknownItem(key.to_string()))?;
    let refund = weapon.cost / 2;
    let mut p = player.clone();
    p.gold += refund;
    equip_weapon(&mut p, catalog, None);
    Ok((p, refund))
}

pub fn buy_armor(player: &Player, catalog: &Catalog, key: &str) -> Result<Player, AbortReason> {
    if player.armor.is_some() {
        return Err(AbortReason::AlreadyEquipped);
    }
    let armor = catalog
        .armor(key)
        .ok_or_else(|| AbortReason::UnknownItem(key.to_string()))?;
    if player.gold < armor.cost {
        return Err(AbortReason::NotEnoughGold);
    }
    let mut p = player.clone();
    p.gold -= armor.cost;
    equip_armor(&mut p, Some(&armor.key));
    Ok(p)
}

/// Sell the equipped armor for half its price.
pub fn sell_armor(player: &Player, catalog: &Catalog) -> Result<(Player, i64), AbortReason> {
    let key = player.armor.as_deref().ok_or(AbortReason::NothingToSell)?;
    let armor = catalog
        .armor(key)
        .ok_or_else(|| AbortReason::UnknownItem(key.to_string()))?;
    let refund = armor.cost / 2;
    let mut p = player.clone();
    p.gold += refund;
    equip_armor(&mut p, None);
    Ok((p, refund))
}

/// Buy and immediately use a repair kit; the next one costs twice as much.
pub fn buy_repair_kit(player: &Player) -> Result<Player, AbortReason> {
    if player.gold < player.health_potion_cost {
        return Err(AbortReason::NotEnoughGold);
    }
    let mut p = player.clone();
    p.gold -= p.health_potion_cost;
    p.health_points = (p.health_points + REPAIR_KIT_HEAL).min(MAX_HEALTH);
    p.health_potion_cost *= 2;
    Ok(p)
}
