//! Damage and healing magnitude resolution.
//!
//! The resolver only computes magnitudes and classification for an
//! already-decided hit. Whether an attack lands at all comes from the
//! injected [`HitDecider`] strategy, so the comparison rule stays under
//! the embedding application's control.

use crate::combatant::Combatant;
use crate::dice::{parse_dice_notation, roll_dice, roll_with_notation, RandomSource};
use serde::{Deserialize, Serialize};

/// Damage worth at least this share of max hit points is surprising.
const SURPRISE_MAX_HP_SHARE: f64 = 0.30;
/// Damage worth at least this share of current hit points is surprising.
const SURPRISE_CURRENT_HP_SHARE: f64 = 0.50;

/// One rolled die with the notation it came from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DieRoll {
    /// Normalized dice part of the notation, e.g. `"1d8"`.
    pub dice_type: String,
    /// Roll result including the notation's modifier.
    pub result: i32,
}

/// A resolved damage roll: base die plus any bonus die, with the total.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DamageRoll {
    pub dice: Vec<DieRoll>,
    pub total: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Melee,
    Ranged,
}

fn roll_notation_entry(notation: &str, rng: &mut dyn RandomSource) -> DieRoll {
    let parsed = parse_dice_notation(notation);
    let result = roll_dice(&parsed.dice, rng) + parsed.modifier;
    DieRoll { dice_type: parsed.dice, result }
}

/// Roll a base damage die plus an optional stacking bonus die.
pub fn resolve_damage(
    base_die: &str,
    bonus_die: Option<&str>,
    rng: &mut dyn RandomSource,
) -> DamageRoll {
    let mut dice = Vec::with_capacity(2);
    dice.push(roll_notation_entry(base_die, rng));
    if let Some(bonus) = bonus_die {
        dice.push(roll_notation_entry(bonus, rng));
    }
    let total = dice.iter().map(|d| d.result).sum();
    DamageRoll { dice, total }
}

/// Pick the damage die for an attack.
///
/// An explicit weapon request wins when that die exists. A combatant with
/// exactly one specialized die uses it regardless of the request.
/// Everything else falls back to the basic damage die.
pub fn select_damage_die(combatant: &Combatant, requested: Option<WeaponKind>) -> &str {
    let melee = combatant.melee_damage_die.as_deref();
    let ranged = combatant.ranged_damage_die.as_deref();

    if let Some(kind) = requested {
        let requested_die = match kind {
            WeaponKind::Melee => melee,
            WeaponKind::Ranged => ranged,
        };
        if let Some(die) = requested_die {
            return die;
        }
    }

    match (melee, ranged) {
        (Some(die), None) | (None, Some(die)) => die,
        _ => &combatant.damage_die,
    }
}

/// Classify damage as narratively significant, scaling with both starting
/// and current vitality: at least 30% of max hit points, or at least 50%
/// of what the defender has left.
pub fn is_surprising_damage(damage: u16, defender: &Combatant) -> bool {
    let damage = damage as f64;
    if damage / defender.max_hit_points as f64 >= SURPRISE_MAX_HP_SHARE {
        return true;
    }
    defender.hit_points > 0
        && damage / defender.hit_points as f64 >= SURPRISE_CURRENT_HP_SHARE
}

/// Roll a healing die. Never negative; clamping to max hit points is the
/// caller's job.
pub fn resolve_heal(heal_die: &str, rng: &mut dyn RandomSource) -> i32 {
    roll_with_notation(heal_die, rng).max(0)
}

/// Strategy deciding whether an attack lands. The core never guesses the
/// comparison rule; the embedding application injects one.
pub trait HitDecider: Send {
    fn decide_hit(
        &mut self,
        attacker: &Combatant,
        defender: &Combatant,
        rng: &mut dyn RandomSource,
    ) -> bool;
}

/// Every attack lands. For demos and deterministic tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysHit;

impl HitDecider for AlwaysHit {
    fn decide_hit(
        &mut self,
        _attacker: &Combatant,
        _defender: &Combatant,
        _rng: &mut dyn RandomSource,
    ) -> bool {
        true
    }
}

/// Classic d20 attack roll against armor class. A natural 20 always hits
/// and a natural 1 always misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct D20AttackRoll;

impl HitDecider for D20AttackRoll {
    fn decide_hit(
        &mut self,
        attacker: &Combatant,
        defender: &Combatant,
        rng: &mut dyn RandomSource,
    ) -> bool {
        let roll = rng.next_in_range(1, 20, "attack roll");
        match roll {
            20 => true,
            1 => false,
            _ => roll as i32 + attacker.attack_bonus >= defender.armor_class,
        }
    }
}
