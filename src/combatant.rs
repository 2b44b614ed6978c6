//! Combatant stats and battle-time hit point bookkeeping.

use crate::abilities::{Ability, MAX_ABILITIES};
use serde::{Deserialize, Serialize};

/// One side's battle-relevant stats and ability loadout.
///
/// Definitions arrive from the embedding application as plain records.
/// During a battle only the turn controller touches `hit_points`;
/// everything else stays as created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Combatant {
    pub name: String,
    pub hit_points: u16,
    pub max_hit_points: u16,
    pub armor_class: i32,
    pub attack_bonus: i32,
    /// Basic damage die notation, e.g. `"1d6"`.
    pub damage_die: String,
    /// Overrides the basic die for melee attacks when present.
    #[serde(default)]
    pub melee_damage_die: Option<String>,
    /// Overrides the basic die for ranged attacks when present.
    #[serde(default)]
    pub ranged_damage_die: Option<String>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

impl Combatant {
    /// Create a combatant at full hit points.
    pub fn new(
        name: impl Into<String>,
        max_hit_points: u16,
        armor_class: i32,
        attack_bonus: i32,
        damage_die: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            hit_points: max_hit_points,
            max_hit_points,
            armor_class,
            attack_bonus,
            damage_die: damage_die.into(),
            melee_damage_die: None,
            ranged_damage_die: None,
            abilities: Vec::new(),
        }
    }

    pub fn with_melee_damage_die(mut self, die: impl Into<String>) -> Self {
        self.melee_damage_die = Some(die.into());
        self
    }

    pub fn with_ranged_damage_die(mut self, die: impl Into<String>) -> Self {
        self.ranged_damage_die = Some(die.into());
        self
    }

    /// Start the battle at less than full hit points.
    pub fn with_hit_points(mut self, hit_points: u16) -> Self {
        self.hit_points = hit_points.min(self.max_hit_points);
        self
    }

    pub fn is_defeated(&self) -> bool {
        self.hit_points == 0
    }

    /// Apply damage, clamping at zero. Returns true when this defeats the
    /// combatant.
    pub fn take_damage(&mut self, amount: u16) -> bool {
        self.hit_points = self.hit_points.saturating_sub(amount);
        self.is_defeated()
    }

    /// Heal up to the hit point maximum. Returns the amount actually
    /// restored.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let restored = amount.min(self.max_hit_points - self.hit_points);
        self.hit_points += restored;
        restored
    }

    /// Install a battle loadout, truncating to the ability cap.
    pub fn assign_abilities(&mut self, mut abilities: Vec<Ability>) {
        abilities.truncate(MAX_ABILITIES);
        self.abilities = abilities;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut combatant = Combatant::new("Goblin", 20, 12, 2, "1d6");
        assert!(!combatant.take_damage(15));
        assert_eq!(combatant.hit_points, 5);

        assert!(combatant.take_damage(50));
        assert_eq!(combatant.hit_points, 0);
        assert!(combatant.is_defeated());
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut combatant = Combatant::new("Cleric", 30, 14, 3, "1d8").with_hit_points(25);
        assert_eq!(combatant.heal(3), 3);
        assert_eq!(combatant.hit_points, 28);

        // Only 2 HP of headroom left.
        assert_eq!(combatant.heal(10), 2);
        assert_eq!(combatant.hit_points, 30);
    }

    #[test]
    fn test_plain_record_with_omitted_optionals() {
        let combatant: Combatant = serde_json::from_str(
            r#"{
                "name": "Archer",
                "hit_points": 18,
                "max_hit_points": 18,
                "armor_class": 13,
                "attack_bonus": 4,
                "damage_die": "1d6"
            }"#,
        )
        .expect("combatant record should deserialize");
        assert_eq!(combatant.melee_damage_die, None);
        assert_eq!(combatant.ranged_damage_die, None);
        assert!(combatant.abilities.is_empty());
    }

    #[test]
    fn test_assign_abilities_respects_cap() {
        let mut combatant = Combatant::new("Mage", 16, 11, 1, "1d4");
        let abilities: Vec<_> = (0..8)
            .map(|i| crate::abilities::Ability::Healing {
                name: format!("heal-{}", i),
                healing_dice: "1d4".to_string(),
                description: String::new(),
            })
            .collect();
        combatant.assign_abilities(abilities);
        assert_eq!(combatant.abilities.len(), MAX_ABILITIES);
    }
}
