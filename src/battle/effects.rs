//! Visual-effect descriptors for the presentation layer.
//!
//! A resolved action maps to an ordered list of renderer-agnostic
//! descriptors. The core knows nothing about animation timing or
//! amplitude curves; intensity is a unitless number.

use crate::battle::controller::Side;
use crate::battle::resolver::is_surprising_damage;
use crate::combatant::Combatant;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Hit,
    Shake,
    Miss,
    Sparkle,
    Surprise,
}

/// One transient effect descriptor, produced once per resolved action and
/// handed to the presentation layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PendingVisualEffect {
    pub kind: EffectKind,
    pub side: Side,
    pub intensity: Option<u16>,
}

impl PendingVisualEffect {
    fn new(kind: EffectKind, side: Side) -> Self {
        Self { kind, side, intensity: None }
    }

    fn with_intensity(mut self, intensity: u16) -> Self {
        self.intensity = Some(intensity);
        self
    }
}

/// Effects for a landed attack: hit flash on the attacker, then a shake on
/// the defender scaled by the damage, then a surprise marker when the blow
/// is narratively significant. List order is part of the contract.
///
/// `defender_before` is the defender as it stood before the damage was
/// applied; the surprise classification uses that snapshot.
pub fn on_hit(
    attacker: Side,
    defender: Side,
    damage: u16,
    defender_before: &Combatant,
) -> Vec<PendingVisualEffect> {
    let mut effects = vec![
        PendingVisualEffect::new(EffectKind::Hit, attacker),
        PendingVisualEffect::new(EffectKind::Shake, defender).with_intensity(damage),
    ];
    if is_surprising_damage(damage, defender_before) {
        effects.push(PendingVisualEffect::new(EffectKind::Surprise, defender));
    }
    effects
}

/// Effects for a missed attack.
pub fn on_miss(attacker: Side) -> Vec<PendingVisualEffect> {
    vec![PendingVisualEffect::new(EffectKind::Miss, attacker)]
}

/// Effects for a heal, with the applied amount as intensity.
pub fn on_heal(target: Side, amount: u16) -> Vec<PendingVisualEffect> {
    vec![PendingVisualEffect::new(EffectKind::Sparkle, target).with_intensity(amount)]
}
