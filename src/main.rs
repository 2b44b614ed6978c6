//! Demo: run a scripted battle between two combatant definitions.

use async_trait::async_trait;
use card_battle::{
    select_random_abilities, Combatant, D20AttackRoll, NarrativeEvent, NarrativeSink, Side,
    ThreadRandom, TurnAction, TurnController,
};

const KNIGHT_JSON: &str = r#"{
    "name": "Ser Aldric",
    "hit_points": 30,
    "max_hit_points": 30,
    "armor_class": 16,
    "attack_bonus": 5,
    "damage_die": "1d8+3",
    "melee_damage_die": "1d10+3",
    "abilities": [
        {"kind": "attack", "name": "Shield Bash", "damage_dice": "1d6+2", "attack_roll": true},
        {"kind": "attack", "name": "Flurry", "damage_dice": "1d6", "attacks": 2},
        {"kind": "healing", "name": "Second Wind", "healing_dice": "1d10+2"}
    ]
}"#;

const ROGUE_JSON: &str = r#"{
    "name": "Vex",
    "hit_points": 24,
    "max_hit_points": 24,
    "armor_class": 14,
    "attack_bonus": 6,
    "damage_die": "1d6+3",
    "ranged_damage_die": "1d8+3",
    "abilities": [
        {"kind": "attack", "name": "Sneak Attack", "damage_dice": "1d6+3", "attack_roll": true, "bonus_damage_dice": "2d6"},
        {"kind": "healing", "name": "Bandage", "healing_dice": "1d6+1"}
    ]
}"#;

struct PrintSink;

#[async_trait]
impl NarrativeSink for PrintSink {
    async fn flush_round(&self, events: Vec<NarrativeEvent>) -> Result<(), String> {
        for event in &events {
            println!("  [round {}] {}", event.round, event.message);
        }
        Ok(())
    }
}

fn load_combatant(json: &str) -> Option<Combatant> {
    match serde_json::from_str(json) {
        Ok(combatant) => Some(combatant),
        Err(err) => {
            println!("Error parsing combatant definition: {}", err);
            None
        }
    }
}

/// Heal when wounded below a third and a healing ability is available,
/// otherwise use the first attack ability, otherwise swing the basic die.
fn choose_action(combatant: &Combatant) -> TurnAction {
    if combatant.hit_points < combatant.max_hit_points / 3 {
        if let Some(index) = combatant.abilities.iter().position(|a| a.is_healing()) {
            return TurnAction::UseAbility { index };
        }
    }
    match combatant.abilities.iter().position(|a| a.is_attack()) {
        Some(index) => TurnAction::UseAbility { index },
        None => TurnAction::BasicAttack { weapon: None },
    }
}

#[tokio::main]
async fn main() {
    let mut rng = ThreadRandom;

    let (Some(mut knight), Some(mut rogue)) =
        (load_combatant(KNIGHT_JSON), load_combatant(ROGUE_JSON))
    else {
        return;
    };

    // Each combatant enters with a balanced loadout drawn from its pool.
    let knight_pool = knight.abilities.clone();
    knight.assign_abilities(select_random_abilities(&knight_pool, &mut rng));
    let rogue_pool = rogue.abilities.clone();
    rogue.assign_abilities(select_random_abilities(&rogue_pool, &mut rng));

    println!("{} vs {}", knight.name, rogue.name);

    let mut controller = TurnController::new(Box::new(PrintSink), Box::new(D20AttackRoll));
    controller.start_battle(knight, rogue, Side::A);

    for _ in 0..100 {
        if controller.is_over() {
            break;
        }
        let Some(state) = controller.state() else {
            break;
        };
        let side = state.current_turn;
        let action = choose_action(state.combatant(side));

        match controller.take_turn(side, action, &mut rng).await {
            Ok(effects) => {
                for effect in &effects {
                    println!("  effect: {:?}", effect);
                }
            }
            Err(err) => {
                println!("Turn rejected: {}", err);
                break;
            }
        }
    }

    match (controller.winner(), controller.state()) {
        (Some(side), Some(state)) => {
            println!("Winner: side {} ({})", side, state.combatant(side).name);
        }
        _ => println!("No winner decided."),
    }

    if let Some(state) = controller.state() {
        println!("\nBattle log:");
        for entry in &state.log {
            println!("  [{:?}] {}", entry.kind, entry.message);
        }
    }
}
