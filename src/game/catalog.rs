//! Static weapon & armor catalogs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Weapon {
    pub key: String,
    pub name: String,
    /// Added to the wielder's attack power while equipped.
    pub attack_power: f64,
    pub cost: i64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Armor {
    pub key: String,
    pub name: String,
    /// Fraction (0–1) of the roll difference the armor absorbs.
    pub mitigation: f64,
    pub cost: i64,
    pub description: String,
}

/// Read-only lookup tables, in the order the shop lists them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub weapons: Vec<Weapon>,
    pub armors: Vec<Armor>,
}

impl Catalog {
    pub fn weapon(&self, key: &str) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.key == key)
    }

    pub fn armor(&self, key: &str) -> Option<&Armor> {
        self.armors.iter().find(|a| a.key == key)
    }

    /// Case-insensitive lookup by display name.
    pub fn weapon_by_name(&self, name: &str) -> Option<&Weapon> {
        let name = name.trim().to_lowercase();
        self.weapons.iter().find(|w| w.name.to_lowercase() == name)
    }

    /// Case-insensitive lookup by display name.
    pub fn armor_by_name(&self, name: &str) -> Option<&Armor> {
        let name = name.trim().to_lowercase();
        self.armors.iter().find(|a| a.name.to_lowercase() == name)
    }

    /// Mitigation of an equipped armor key; unarmored (or unknown) is 0.
    pub fn mitigation_of(&self, armor: Option<&str>) -> f64 {
        armor.and_then(|k| self.armor(k)).map_or(0.0, |a| a.mitigation)
    }

    /// Combined price of whatever the player carries, used as loot on elimination.
    pub fn equipment_value(&self, weapon: Option<&str>, armor: Option<&str>) -> i64 {
        let w = weapon.and_then(|k| self.weapon(k)).map_or(0, |w| w.cost);
        let a = armor.and_then(|k| self.armor(k)).map_or(0, |a| a.cost);
        w + a
    }

    pub fn weapon_bonus(&self, weapon: Option<&str>) -> f64 {
        weapon
            .and_then(|k| self.weapon(k))
            .map_or(0.0, |w| w.attack_power)
    }
}
