//! Ability definitions and loadout selection.

use crate::dice::RandomSource;
use serde::{Deserialize, Serialize};

/// Maximum abilities a combatant carries into battle.
pub const MAX_ABILITIES: usize = 5;

fn default_attacks() -> u32 {
    1
}

/// A named action a combatant can take, supplied by the embedding
/// application as a plain tagged record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ability {
    Attack {
        name: String,
        /// Damage dice notation, e.g. `"2d6+1"`.
        damage_dice: String,
        /// Informational: whether the ability calls for an attack roll.
        #[serde(default)]
        attack_roll: bool,
        /// Number of swings per use. At least 1.
        #[serde(default = "default_attacks")]
        attacks: u32,
        /// Extra dice stacked on every swing (sneak-attack style).
        #[serde(default)]
        bonus_damage_dice: Option<String>,
        #[serde(default)]
        description: String,
    },
    Healing {
        name: String,
        /// Healing dice notation.
        healing_dice: String,
        #[serde(default)]
        description: String,
    },
}

impl Ability {
    pub fn name(&self) -> &str {
        match self {
            Ability::Attack { name, .. } | Ability::Healing { name, .. } => name,
        }
    }

    pub fn is_attack(&self) -> bool {
        matches!(self, Ability::Attack { .. })
    }

    pub fn is_healing(&self) -> bool {
        matches!(self, Ability::Healing { .. })
    }
}

/// Select a balanced loadout of up to [`MAX_ABILITIES`] abilities.
///
/// Whenever the pool contains attack abilities the result holds exactly one
/// slot picked for attack first; whenever it contains healing abilities the
/// result holds at least one of those too. Remaining slots are drawn
/// uniformly without replacement, so no pool entry appears twice. An empty
/// pool yields an empty loadout.
pub fn select_random_abilities(pool: &[Ability], rng: &mut dyn RandomSource) -> Vec<Ability> {
    if pool.is_empty() {
        return Vec::new();
    }

    let attack_indices: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_attack())
        .map(|(i, _)| i)
        .collect();
    let healing_indices: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_healing())
        .map(|(i, _)| i)
        .collect();

    let mut selected: Vec<usize> = Vec::new();

    // One attack, uniformly chosen, so the loadout can always deal damage.
    if !attack_indices.is_empty() {
        let pick =
            rng.next_in_range(0, attack_indices.len() as u32 - 1, "attack ability pick") as usize;
        selected.push(attack_indices[pick]);
    }

    // One healing ability alongside it.
    if !healing_indices.is_empty() && !selected.iter().any(|&i| pool[i].is_healing()) {
        let pick =
            rng.next_in_range(0, healing_indices.len() as u32 - 1, "healing ability pick") as usize;
        let incoming = healing_indices[pick];
        if selected.len() < MAX_ABILITIES {
            selected.push(incoming);
        } else {
            replace_non_attack_or_last(pool, &mut selected, incoming);
        }
    }

    // Fill the remaining slots without replacement.
    let mut remaining: Vec<usize> = (0..pool.len()).filter(|i| !selected.contains(i)).collect();
    while selected.len() < MAX_ABILITIES && !remaining.is_empty() {
        let pick = rng.next_in_range(0, remaining.len() as u32 - 1, "loadout fill pick") as usize;
        selected.push(remaining.swap_remove(pick));
    }

    // Guarantee pass: pool shapes that dodged the healing step above still
    // end up with a healing ability in the final cut.
    if !healing_indices.is_empty() && !selected.iter().any(|&i| pool[i].is_healing()) {
        let pick =
            rng.next_in_range(0, healing_indices.len() as u32 - 1, "forced healing pick") as usize;
        replace_non_attack_or_last(pool, &mut selected, healing_indices[pick]);
    }

    selected.into_iter().map(|i| pool[i].clone()).collect()
}

/// Swap `incoming` over the first non-attack selection when one exists,
/// else over the last slot. The step-one attack sits at the front, so the
/// last slot is never the only attack.
fn replace_non_attack_or_last(pool: &[Ability], selected: &mut Vec<usize>, incoming: usize) {
    if let Some(pos) = selected.iter().position(|&i| !pool[i].is_attack()) {
        selected[pos] = incoming;
    } else if let Some(last) = selected.last_mut() {
        *last = incoming;
    } else {
        selected.push(incoming);
    }
}
