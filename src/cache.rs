//! Warm-once game content: catalogs, narrative tables and the encounter table.
//!
//! Loaded at start-up (from `CONTENT_PATH` or the bundled `data/content.json`),
//! validated, and then shared read-only for the lifetime of the process.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use thiserror::Error;

use crate::game::{
    catalog::{Armor, Catalog, Weapon},
    encounter::{Encounter, EncounterData, EncounterKind},
    narrative::{NarrativeData, NarrativeTables},
};

const BUNDLED: &str = include_str!("../data/content.json");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("reading content file: {0}")]
    Io(#[from] std::io::Error),

    #[error("content JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid content: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct ContentData {
    base_damage: f64,
    weapons: Vec<Weapon>,
    armors: Vec<Armor>,
    narrative: NarrativeData,
    encounters: Vec<EncounterData>,
}

/// Everything the rules read but never write.
#[derive(Debug, Clone)]
pub struct GameContent {
    pub base_damage: f64,
    pub catalog: Catalog,
    pub narrative: NarrativeTables,
    pub encounters: Vec<Encounter>,
}

impl GameContent {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let data: ContentData = serde_json::from_str(json)?;

        let catalog = Catalog {
            weapons: data.weapons,
            armors: data.armors,
        };
        for a in &data.narrative.armor {
            if catalog.armor(&a.armor).is_none() {
                return Err(ContentError::Invalid(format!(
                    "armor text for unknown armor `{}`",
                    a.armor
                )));
            }
        }
        for w in &data.narrative.weapon {
            if catalog.weapon(&w.weapon).is_none() {
                return Err(ContentError::Invalid(format!(
                    "weapon text for unknown weapon `{}`",
                    w.weapon
                )));
            }
        }
        let narrative =
            NarrativeTables::from_data(data.narrative).map_err(ContentError::Invalid)?;

        let encounters = data
            .encounters
            .into_iter()
            .map(Encounter::from_data)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ContentError::Invalid(e.to_string()))?;
        if encounters.is_empty() {
            return Err(ContentError::Invalid("encounter table is empty".into()));
        }

        // effect vocabulary and catalog must agree before anyone plays
        for enc in &encounters {
            if let EncounterKind::Effects(script) = &enc.kind {
                for (is_armor, name) in script.item_names() {
                    let known = if is_armor {
                        catalog.armor_by_name(name).is_some()
                    } else {
                        catalog.weapon_by_name(name).is_some()
                    };
                    if !known {
                        return Err(ContentError::Invalid(format!(
                            "encounter `{}` names unknown item `{name}`",
                            enc.scenario
                        )));
                    }
                }
            }
        }

        Ok(GameContent {
            base_damage: data.base_damage,
            catalog,
            narrative,
            encounters,
        })
    }

    pub fn bundled() -> Result<Self, ContentError> {
        Self::from_json(BUNDLED)
    }
}

static CONTENT: OnceCell<Arc<GameContent>> = OnceCell::new();

/// Load and validate content once. Later calls return the first result.
pub fn warm_all() -> Result<Arc<GameContent>, ContentError> {
    CONTENT
        .get_or_try_init(|| {
            let content = match std::env::var("CONTENT_PATH") {
                Ok(path) => GameContent::from_json(&std::fs::read_to_string(&path)?)?,
                Err(_) => GameContent::bundled()?,
            };
            log::info!(
                "content warmed: {} weapons, {} armors, {} encounters",
                content.catalog.weapons.len(),
                content.catalog.armors.len(),
                content.encounters.len()
            );
            Ok(Arc::new(content))
        })
        .cloned()
}
