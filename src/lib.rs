//! Card Battle Engine
//!
//! A turn-based combat resolver for two-combatant card battles: dice
//! notation parsing and rolling, balanced ability loadout selection,
//! attack/heal magnitude resolution, visual-effect descriptor emission,
//! and a two-player turn state machine with round-boundary narrative
//! batching. Rendering, persistence, and networking live in the embedding
//! application; the core manipulates in-memory battle state only.

// --- MODULE DECLARATIONS ---
pub mod abilities;
pub mod battle;
pub mod combatant;
pub mod dice;
pub mod errors;

// --- PUBLIC API RE-EXPORTS ---
// The most important types, importable directly from the crate root.

// Dice engine.
pub use dice::{
    parse_dice_notation, parse_dice_spec, roll_dice, roll_with_notation, DiceSpec, ParsedNotation,
    RandomSource, ScriptedRandom, ThreadRandom,
};

// Ability model and loadout selection.
pub use abilities::{select_random_abilities, Ability, MAX_ABILITIES};

// Combatant data model.
pub use combatant::Combatant;

// Combat resolution and hit strategies.
pub use battle::resolver::{
    is_surprising_damage, resolve_damage, resolve_heal, select_damage_die, AlwaysHit,
    D20AttackRoll, DamageRoll, DieRoll, HitDecider, WeaponKind,
};

// Visual-effect descriptors.
pub use battle::effects::{on_heal, on_hit, on_miss, EffectKind, PendingVisualEffect};

// Turn state machine.
pub use battle::controller::{
    BattleState, GameState, LogEntry, LogKind, NarrativeEvent, NarrativeSink, NullSink, Side,
    TurnAction, TurnController,
};

// Crate-specific error and result types.
pub use errors::{TurnError, TurnResult};
