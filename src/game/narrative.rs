//! Combat flavour text, keyed by damage tier and perspective.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Damage-magnitude bracket. `Elimination` is never matched by numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Scratch,
    Wound,
    Gash,
    Carnage,
    Elimination,
}

/// Whose viewpoint a duel line is told from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    Damaging,
    GettingDamage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageBound {
    pub tier: Tier,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerspectiveLines {
    pub damaging: String,
    pub getting_damage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelLines {
    pub scratch: PerspectiveLines,
    pub wound: PerspectiveLines,
    pub gash: PerspectiveLines,
    pub carnage: PerspectiveLines,
    pub elimination: PerspectiveLines,
}

/// One line per numeric tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierLines {
    pub scratch: String,
    pub wound: String,
    pub gash: String,
    pub carnage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmorLines {
    pub armor: String,
    pub lines: TierLines,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponLines {
    pub weapon: String,
    pub lines: TierLines,
}

/// Serialized form, as shipped in the content bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeData {
    pub bounds: Vec<DamageBound>,
    pub duel: DuelLines,
    #[serde(default)]
    pub armor: Vec<ArmorLines>,
    #[serde(default)]
    pub weapon: Vec<WeaponLines>,
}

/// Immutable lookup tables built once at warm-up.
#[derive(Debug, Clone)]
pub struct NarrativeTables {
    bounds: Vec<DamageBound>,
    duel: HashMap<(Tier, Perspective), String>,
    armor: HashMap<String, Vec<HashMap<Tier, String>>>,
    weapon: HashMap<String, HashMap<Tier, String>>,
}

fn tier_map(lines: TierLines) -> HashMap<Tier, String> {
    HashMap::from([
        (Tier::Scratch, lines.scratch),
        (Tier::Wound, lines.wound),
        (Tier::Gash, lines.gash),
        (Tier::Carnage, lines.carnage),
    ])
}

impl NarrativeTables {
    pub fn from_data(data: NarrativeData) -> Result<Self, String> {
        if data.bounds.is_empty() {
            return Err("no damage bounds".into());
        }
        if data.bounds.iter().any(|b| b.tier == Tier::Elimination) {
            return Err("elimination is not a numeric tier".into());
        }

        let mut duel = HashMap::new();
        let d = data.duel;
        for (tier, lines) in [
            (Tier::Scratch, d.scratch),
            (Tier::Wound, d.wound),
            (Tier::Gash, d.gash),
            (Tier::Carnage, d.carnage),
            (Tier::Elimination, d.elimination),
        ] {
            duel.insert((tier, Perspective::Damaging), lines.damaging);
            duel.insert((tier, Perspective::GettingDamage), lines.getting_damage);
        }

        let mut armor: HashMap<String, Vec<HashMap<Tier, String>>> = HashMap::new();
        for a in data.armor {
            armor.entry(a.armor).or_default().push(tier_map(a.lines));
        }

        let weapon = data
            .weapon
            .into_iter()
            .map(|w| (w.weapon, tier_map(w.lines)))
            .collect();

        Ok(NarrativeTables {
            bounds: data.bounds,
            duel,
            armor,
            weapon,
        })
    }

    /// Bracket a damage value; anything past the last upper bound stays in the last tier.
    pub fn tier_for(&self, damage: f64) -> Tier {
        self.bounds
            .iter()
            .find(|b| damage >= b.lower_bound && damage < b.upper_bound)
            .or_else(|| self.bounds.last())
            .map_or(Tier::Carnage, |b| b.tier)
    }

    pub fn duel_line(&self, tier: Tier, perspective: Perspective) -> &str {
        self.duel
            .get(&(tier, perspective))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Number of alternative lines written for an armor.
    pub fn armor_variants(&self, armor: &str) -> usize {
        self.armor.get(armor).map_or(0, Vec::len)
    }

    pub fn armor_line(&self, armor: &str, variant: usize, tier: Tier) -> Option<&str> {
        let variants = self.armor.get(armor)?;
        if variants.is_empty() {
            return None;
        }
        variants[variant % variants.len()]
            .get(&tier)
            .map(String::as_str)
    }

    pub fn weapon_line(&self, weapon: &str, tier: Tier) -> Option<&str> {
        self.weapon.get(weapon)?.get(&tier).map(String::as_str)
    }
}

/// How a player is referenced in narrative text.
pub fn mention(id: Uuid) -> String {
    format!("<@{id}>")
}
