//! Random encounter table.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AbortReason;
use crate::game::{effects::EffectScript, narrative::mention};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterKindTag {
    Effects,
    Narrative,
    Battle,
}

/// Serialized form, as shipped in the content bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterData {
    pub scenario: String,
    pub bits: String,
    /// Feed text; `{player}` is replaced by the acting player's mention.
    pub feed: String,
    pub kind: EncounterKindTag,
    #[serde(default)]
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EncounterKind {
    /// Scripted state mutations.
    Effects(EffectScript),
    /// Flavour only.
    Narrative,
    /// Escalates into a duel when someone is waiting in the queue.
    Battle,
}

#[derive(Debug, Clone)]
pub struct Encounter {
    pub scenario: String,
    pub bits: String,
    pub feed: String,
    pub kind: EncounterKind,
}

impl Encounter {
    pub fn from_data(data: EncounterData) -> Result<Self, AbortReason> {
        let kind = match (data.kind, data.outcome.as_deref()) {
            (EncounterKindTag::Effects, Some(outcome)) => {
                EncounterKind::Effects(EffectScript::parse(outcome)?)
            }
            (EncounterKindTag::Effects, None) => {
                return Err(AbortReason::MalformedEffect(format!(
                    "encounter `{}` has no outcome",
                    data.scenario
                )))
            }
            (EncounterKindTag::Narrative, _) => EncounterKind::Narrative,
            (EncounterKindTag::Battle, _) => EncounterKind::Battle,
        };
        Ok(Encounter {
            scenario: data.scenario,
            bits: data.bits,
            feed: data.feed,
            kind,
        })
    }

    /// Text shown to the acting player before any outcome lines.
    pub fn prelude(&self) -> String {
        format!("*{}*\n\n{}", self.scenario, self.bits)
    }

    pub fn feed_for(&self, player: Uuid) -> String {
        self.feed.replace("{player}", &mention(player))
    }
}

/// Uniform pick over the table.
pub fn pick<'e, R: Rng + ?Sized>(encounters: &'e [Encounter], rng: &mut R) -> Option<&'e Encounter> {
    if encounters.is_empty() {
        return None;
    }
    encounters.get(rng.random_range(0..encounters.len()))
}
