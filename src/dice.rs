//! Dice notation parsing and rolling.
//!
//! Notation follows the usual tabletop form: `2d6+3`, `d8`, `1d20-1`.
//! Malformed notation never aborts a battle. Parsing falls back to a
//! harmless sentinel spec, and rolling falls back to a total of zero,
//! which callers can tell apart from any real roll.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static DICE_NOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)?d(\d+)([+-]\d+)?$").expect("dice notation regex"));

/// Source of uniform random draws.
///
/// Dice rolling and ability selection both go through this trait so a
/// battle can be replayed deterministically in tests.
pub trait RandomSource {
    /// Return a uniform value in `[min, max]`, both bounds inclusive.
    /// The reason string names what the draw is for.
    fn next_in_range(&mut self, min: u32, max: u32, reason: &str) -> u32;
}

/// Production source backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_in_range(&mut self, min: u32, max: u32, _reason: &str) -> u32 {
        use rand::Rng;
        rand::rng().random_range(min..=max)
    }
}

/// Deterministic source fed from a pre-scripted outcome list.
///
/// Scripted values are clamped into the requested range, so a test can
/// write the desired die face directly.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    outcomes: Vec<u32>,
    index: usize,
}

impl ScriptedRandom {
    pub fn new(outcomes: Vec<u32>) -> Self {
        Self { outcomes, index: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_in_range(&mut self, min: u32, max: u32, reason: &str) -> u32 {
        if self.index >= self.outcomes.len() {
            panic!(
                "ScriptedRandom exhausted! Tried to get a value for: '{}'. Need more scripted values.",
                reason
            );
        }
        let outcome = self.outcomes[self.index];
        self.index += 1;
        outcome.clamp(min, max)
    }
}

/// A structured dice specification derived from notation. Never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DiceSpec {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceSpec {
    /// Minimum possible total.
    pub fn min(&self) -> i32 {
        self.count as i32 + self.modifier
    }

    /// Maximum possible total.
    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.modifier
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Notation split into its dice part and trailing modifier.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ParsedNotation {
    /// Normalized `"<count>d<sides>"` string, e.g. `"1d6"` for input `"d6"`.
    pub dice: String,
    pub modifier: i32,
}

/// Structured parse of dice notation. `None` when the input does not match
/// the grammar.
pub fn parse_dice_spec(input: &str) -> Option<DiceSpec> {
    let caps = DICE_NOTATION.captures(input)?;
    let count = match caps.get(1) {
        Some(m) => m.as_str().parse().ok()?,
        None => 1,
    };
    let sides = caps.get(2)?.as_str().parse().ok()?;
    let modifier = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    Some(DiceSpec { count, sides, modifier })
}

/// Parse notation into its dice part and modifier.
///
/// Unparseable input yields the `{dice: "d6", modifier: 0}` sentinel
/// instead of an error, so one malformed ability definition cannot take
/// down a battle.
pub fn parse_dice_notation(input: &str) -> ParsedNotation {
    match parse_dice_spec(input) {
        Some(spec) => ParsedNotation {
            dice: format!("{}d{}", spec.count, spec.sides),
            modifier: spec.modifier,
        },
        None => ParsedNotation {
            dice: "d6".to_string(),
            modifier: 0,
        },
    }
}

/// Sum `count` uniform rolls in `[1, sides]`. The modifier is NOT applied.
/// Unparseable input rolls a total of zero.
pub fn roll_dice(notation: &str, rng: &mut dyn RandomSource) -> i32 {
    let Some(spec) = parse_dice_spec(notation) else {
        return 0;
    };
    if spec.sides == 0 {
        return 0;
    }
    let mut total = 0i32;
    for _ in 0..spec.count {
        total += rng.next_in_range(1, spec.sides, "die roll") as i32;
    }
    total
}

/// Roll a full notation string: dice total plus the modifier, applied
/// exactly once after summing.
pub fn roll_with_notation(notation: &str, rng: &mut dyn RandomSource) -> i32 {
    let parsed = parse_dice_notation(notation);
    roll_dice(&parsed.dice, rng) + parsed.modifier
}
