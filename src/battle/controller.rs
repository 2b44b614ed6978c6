//! Two-combatant turn state machine.
//!
//! One [`TurnController`] owns one [`BattleState`]. Actions flow through
//! [`TurnController::take_turn`]: magnitude resolution, effect emission,
//! hit point mutation, defeat detection, and the turn switch with its
//! round-boundary narrative flush.

use crate::abilities::Ability;
use crate::battle::effects::{self, PendingVisualEffect};
use crate::battle::resolver::{self, HitDecider, WeaponKind};
use crate::combatant::Combatant;
use crate::dice::RandomSource;
use crate::errors::{TurnError, TurnResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Battle side. Fixed at battle start.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn to_index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    InProgress,
    SideAWin,
    SideBWin,
    Draw,
}

impl GameState {
    pub fn is_over(self) -> bool {
        !matches!(self, GameState::InProgress)
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            GameState::SideAWin => Some(Side::A),
            GameState::SideBWin => Some(Side::B),
            GameState::InProgress | GameState::Draw => None,
        }
    }

    fn win_for(side: Side) -> GameState {
        match side {
            Side::A => GameState::SideAWin,
            Side::B => GameState::SideBWin,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Attack,
    Heal,
    Miss,
    Defeat,
    Round,
    System,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// One round-summary item queued for the narrative generator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NarrativeEvent {
    pub round: u32,
    pub message: String,
}

/// Player-chosen action for one turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAction {
    /// Swing with the basic damage die, or the requested melee/ranged die
    /// when the combatant carries one.
    BasicAttack { weapon: Option<WeaponKind> },
    /// Use an ability from the acting combatant's loadout.
    UseAbility { index: usize },
}

/// Round-boundary narrative collaborator.
///
/// Invoked once per completed round with the drained narrative queue. The
/// flush is awaited before the next turn starts; failure is logged and
/// otherwise ignored, since narrative is an enrichment, not a correctness
/// input.
#[async_trait]
pub trait NarrativeSink: Send + Sync {
    async fn flush_round(&self, events: Vec<NarrativeEvent>) -> Result<(), String>;
}

/// Sink that drops everything. For embeddings without a narrative layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl NarrativeSink for NullSink {
    async fn flush_round(&self, _events: Vec<NarrativeEvent>) -> Result<(), String> {
        Ok(())
    }
}

/// All mutable state of one battle. Owned exclusively by one
/// [`TurnController`]; never shared across battles.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleState {
    pub combatants: [Combatant; 2],
    pub current_turn: Side,
    /// True from action start until its resolution, including any awaited
    /// round flush. Gates new actions.
    pub move_in_progress: bool,
    /// 1-based round counter. A round ends once both sides have acted.
    pub round: u32,
    pub moves_this_round: u8,
    pub narrative_queue: Vec<NarrativeEvent>,
    pub log: Vec<LogEntry>,
    pub game_state: GameState,
}

impl BattleState {
    pub fn new(side_a: Combatant, side_b: Combatant, first: Side) -> Self {
        Self {
            combatants: [side_a, side_b],
            current_turn: first,
            move_in_progress: false,
            round: 1,
            moves_this_round: 0,
            narrative_queue: Vec::new(),
            log: Vec::new(),
            game_state: GameState::InProgress,
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.to_index()]
    }

    fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        &mut self.combatants[side.to_index()]
    }

    fn push_log(&mut self, kind: LogKind, message: String) {
        self.log.push(LogEntry { kind, message, timestamp: Utc::now() });
    }

    fn queue_narrative(&mut self, message: String) {
        let round = self.round;
        self.narrative_queue.push(NarrativeEvent { round, message });
    }
}

/// The battle state machine driver.
pub struct TurnController {
    battle: Option<BattleState>,
    sink: Box<dyn NarrativeSink>,
    hit_decider: Box<dyn HitDecider>,
}

impl TurnController {
    pub fn new(sink: Box<dyn NarrativeSink>, hit_decider: Box<dyn HitDecider>) -> Self {
        Self { battle: None, sink, hit_decider }
    }

    /// Begin a battle. Combatants arrive with whatever hit points the
    /// embedding application set; `first` takes the opening turn.
    pub fn start_battle(&mut self, side_a: Combatant, side_b: Combatant, first: Side) {
        self.battle = Some(BattleState::new(side_a, side_b, first));
    }

    pub fn state(&self) -> Option<&BattleState> {
        self.battle.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.battle.as_ref().is_some_and(|b| b.game_state.is_over())
    }

    pub fn winner(&self) -> Option<Side> {
        self.battle.as_ref().and_then(|b| b.game_state.winner())
    }

    /// Drop the battle entirely, back to the unstarted state. This is the
    /// only cancellation primitive: an in-flight narrative flush is
    /// abandoned by dropping its future, never awaited.
    pub fn reset(&mut self) {
        self.battle = None;
    }

    /// Apply one player action and return the effect descriptors for the
    /// presentation layer.
    ///
    /// Rejected actions (`TurnError`) leave the state untouched. The future
    /// resolves only after any round-boundary narrative flush has settled,
    /// so the next turn never starts before the round's narrative does.
    pub async fn take_turn(
        &mut self,
        side: Side,
        action: TurnAction,
        rng: &mut dyn RandomSource,
    ) -> TurnResult<Vec<PendingVisualEffect>> {
        let Some(battle) = self.battle.as_mut() else {
            return Err(TurnError::BattleNotStarted);
        };
        if battle.game_state.is_over() {
            return Err(TurnError::BattleOver);
        }
        if battle.move_in_progress {
            return Err(TurnError::MoveInProgress);
        }
        if battle.current_turn != side {
            return Err(TurnError::NotYourTurn(side));
        }

        let hit_decider = self.hit_decider.as_mut();
        let (effects, defeated) = match action {
            TurnAction::BasicAttack { weapon } => {
                battle.move_in_progress = true;
                Self::resolve_basic_attack(battle, hit_decider, side, weapon, rng)
            }
            TurnAction::UseAbility { index } => {
                let ability = battle
                    .combatant(side)
                    .abilities
                    .get(index)
                    .cloned()
                    .ok_or(TurnError::InvalidAbility(index))?;
                battle.move_in_progress = true;
                match ability {
                    Ability::Attack {
                        name,
                        damage_dice,
                        attacks,
                        bonus_damage_dice,
                        ..
                    } => Self::resolve_attack_ability(
                        battle,
                        hit_decider,
                        side,
                        &name,
                        &damage_dice,
                        attacks,
                        bonus_damage_dice.as_deref(),
                        rng,
                    ),
                    Ability::Healing { name, healing_dice, .. } => {
                        Self::resolve_healing_ability(battle, side, &name, &healing_dice, rng)
                    }
                }
            }
        };

        self.switch_turn(side, defeated).await;
        Ok(effects)
    }

    /// Commit the turn switch after an action.
    ///
    /// A defeat of the incoming side ends the battle without changing
    /// `current_turn`. Otherwise a completed round drains the narrative
    /// queue and awaits the sink before the switch is committed. Always
    /// clears `move_in_progress` on completion.
    pub async fn switch_turn(&mut self, acting: Side, defeated: Option<Side>) {
        let Some(battle) = self.battle.as_mut() else {
            return;
        };

        battle.moves_this_round += 1;
        let next = acting.opponent();

        if defeated == Some(next) {
            battle.game_state = GameState::win_for(acting);
            battle.push_log(
                LogKind::System,
                format!("Battle over: side {} wins", acting),
            );
            battle.move_in_progress = false;
            return;
        }

        if battle.moves_this_round >= 2 {
            let round = battle.round;
            let events = std::mem::take(&mut battle.narrative_queue);
            battle.push_log(LogKind::Round, format!("Round {} complete", round));
            if let Err(err) = self.sink.flush_round(events).await {
                battle.push_log(
                    LogKind::System,
                    format!("Narrative flush for round {} failed: {}", round, err),
                );
            }
            battle.round += 1;
            battle.moves_this_round = 0;
        }

        battle.current_turn = next;
        battle.move_in_progress = false;
    }

    fn resolve_basic_attack(
        battle: &mut BattleState,
        hit_decider: &mut dyn HitDecider,
        side: Side,
        weapon: Option<WeaponKind>,
        rng: &mut dyn RandomSource,
    ) -> (Vec<PendingVisualEffect>, Option<Side>) {
        let defender_side = side.opponent();
        let hit =
            hit_decider.decide_hit(battle.combatant(side), battle.combatant(defender_side), rng);
        if !hit {
            return (Self::record_miss(battle, side, defender_side), None);
        }

        let die = resolver::select_damage_die(battle.combatant(side), weapon).to_string();
        let damage_roll = resolver::resolve_damage(&die, None, rng);
        Self::apply_damage(battle, side, defender_side, damage_roll.total)
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_attack_ability(
        battle: &mut BattleState,
        hit_decider: &mut dyn HitDecider,
        side: Side,
        name: &str,
        damage_dice: &str,
        attacks: u32,
        bonus_damage_dice: Option<&str>,
        rng: &mut dyn RandomSource,
    ) -> (Vec<PendingVisualEffect>, Option<Side>) {
        let defender_side = side.opponent();
        let mut all_effects = Vec::new();

        let attacker = battle.combatant(side).name.clone();
        battle.queue_narrative(format!("{} uses {}", attacker, name));

        for _swing in 0..attacks.max(1) {
            let hit = hit_decider.decide_hit(
                battle.combatant(side),
                battle.combatant(defender_side),
                rng,
            );
            if !hit {
                all_effects.extend(Self::record_miss(battle, side, defender_side));
                continue;
            }

            let damage_roll = resolver::resolve_damage(damage_dice, bonus_damage_dice, rng);
            let (effects, defeated) =
                Self::apply_damage(battle, side, defender_side, damage_roll.total);
            all_effects.extend(effects);
            if defeated.is_some() {
                // No swinging at a downed defender.
                return (all_effects, defeated);
            }
        }

        (all_effects, None)
    }

    fn resolve_healing_ability(
        battle: &mut BattleState,
        side: Side,
        name: &str,
        healing_dice: &str,
        rng: &mut dyn RandomSource,
    ) -> (Vec<PendingVisualEffect>, Option<Side>) {
        let rolled = resolver::resolve_heal(healing_dice, rng);
        let applied = battle.combatant_mut(side).heal(rolled as u16);
        let healer = battle.combatant(side).name.clone();
        let remaining = battle.combatant(side).hit_points;

        battle.push_log(
            LogKind::Heal,
            format!("{} heals {} HP with {} ({} HP)", healer, applied, name, remaining),
        );
        battle.queue_narrative(format!("{} recovered {} hit points", healer, applied));

        (effects::on_heal(side, applied), None)
    }

    /// Apply a resolved damage total to the defender and build its effects.
    /// Effect intensity carries the same value used for the mutation.
    fn apply_damage(
        battle: &mut BattleState,
        attacker_side: Side,
        defender_side: Side,
        total: i32,
    ) -> (Vec<PendingVisualEffect>, Option<Side>) {
        let damage = total.max(0) as u16;
        let defender_before = battle.combatant(defender_side).clone();
        let effects = effects::on_hit(attacker_side, defender_side, damage, &defender_before);

        let fell = battle.combatant_mut(defender_side).take_damage(damage);
        let attacker = battle.combatant(attacker_side).name.clone();
        let defender = battle.combatant(defender_side).name.clone();
        let remaining = battle.combatant(defender_side).hit_points;

        battle.push_log(
            LogKind::Attack,
            format!("{} hits {} for {} ({} HP left)", attacker, defender, damage, remaining),
        );
        battle.queue_narrative(format!("{} struck {} for {} damage", attacker, defender, damage));

        if fell {
            battle.push_log(LogKind::Defeat, format!("{} is defeated", defender));
            battle.queue_narrative(format!("{} fell in battle", defender));
            (effects, Some(defender_side))
        } else {
            (effects, None)
        }
    }

    fn record_miss(
        battle: &mut BattleState,
        side: Side,
        defender_side: Side,
    ) -> Vec<PendingVisualEffect> {
        let attacker = battle.combatant(side).name.clone();
        let defender = battle.combatant(defender_side).name.clone();
        battle.push_log(LogKind::Miss, format!("{} misses {}", attacker, defender));
        battle.queue_narrative(format!("{} swung at {} and missed", attacker, defender));
        effects::on_miss(side)
    }
}
