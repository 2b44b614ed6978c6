#[cfg(test)]
mod tests {
    use crate::battle::controller::{LogKind, Side, TurnAction};
    use crate::battle::tests::common::{
        always_hit_controller, test_combatant, FailingSink, RecordingSink, StallingSink,
    };
    use crate::dice::ScriptedRandom;
    use crate::errors::TurnError;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn basic_attack() -> TurnAction {
        TurnAction::BasicAttack { weapon: None }
    }

    #[tokio::test]
    async fn test_narrative_flushes_once_per_round_not_per_move() {
        let sink = RecordingSink::new();
        let mut controller = always_hit_controller(sink.clone());
        controller.start_battle(test_combatant("Knight"), test_combatant("Rogue"), Side::A);
        let mut rng = ScriptedRandom::new(vec![2, 2, 2, 2]);

        // First move of the round: no flush.
        controller
            .take_turn(Side::A, basic_attack(), &mut rng)
            .await
            .expect("turn should resolve");
        assert_eq!(sink.flush_count(), 0);
        {
            let state = controller.state().expect("battle in progress");
            assert_eq!(state.round, 1);
            assert!(!state.narrative_queue.is_empty());
        }

        // Second move completes the round: exactly one flush, carrying the
        // whole round's queue.
        controller
            .take_turn(Side::B, basic_attack(), &mut rng)
            .await
            .expect("turn should resolve");
        assert_eq!(sink.flush_count(), 1);

        let flushes = sink.flushed_events();
        assert!(!flushes[0].is_empty());
        assert!(flushes[0].iter().all(|event| event.round == 1));

        let state = controller.state().expect("battle in progress");
        assert_eq!(state.round, 2);
        assert_eq!(state.moves_this_round, 0);
        assert!(state.narrative_queue.is_empty());
        assert_eq!(state.current_turn, Side::A);
        assert!(state.log.iter().any(|e| e.kind == LogKind::Round));
    }

    #[tokio::test]
    async fn test_flush_is_awaited_before_the_turn_commits() {
        let mut controller = always_hit_controller(StallingSink);
        controller.start_battle(test_combatant("Knight"), test_combatant("Rogue"), Side::A);
        let mut rng = ScriptedRandom::new(vec![2, 2, 2]);

        // Move 1 does not touch the sink.
        controller
            .take_turn(Side::A, basic_attack(), &mut rng)
            .await
            .expect("turn should resolve");

        // Move 2 completes the round; the hung flush must hold the turn
        // switch hostage.
        let pending = controller.take_turn(Side::B, basic_attack(), &mut rng);
        let timed_out = tokio::time::timeout(Duration::from_millis(50), pending).await;
        assert!(timed_out.is_err(), "a hung sink must stall turn progression");

        let state = controller.state().expect("battle in progress");
        assert_eq!(state.current_turn, Side::B, "turn must not switch before the flush settles");
        assert_eq!(state.round, 1);
        assert!(state.move_in_progress);

        // With the abandoned move still marked in progress, new actions
        // are rejected rather than corrupting state.
        let err = controller
            .take_turn(Side::A, basic_attack(), &mut rng)
            .await
            .expect_err("move still in progress");
        assert_eq!(err, TurnError::MoveInProgress);

        // Reset is the only cancellation primitive.
        controller.reset();
        assert!(controller.state().is_none());
        controller.start_battle(test_combatant("Knight"), test_combatant("Rogue"), Side::A);
        let mut rng = ScriptedRandom::new(vec![2]);
        assert!(controller.take_turn(Side::A, basic_attack(), &mut rng).await.is_ok());
    }

    #[tokio::test]
    async fn test_sink_failure_is_logged_and_battle_proceeds() {
        let mut controller = always_hit_controller(FailingSink);
        controller.start_battle(test_combatant("Knight"), test_combatant("Rogue"), Side::A);
        let mut rng = ScriptedRandom::new(vec![2, 2]);

        controller
            .take_turn(Side::A, basic_attack(), &mut rng)
            .await
            .expect("turn should resolve");
        controller
            .take_turn(Side::B, basic_attack(), &mut rng)
            .await
            .expect("a failing sink must not block the state machine");

        let state = controller.state().expect("battle in progress");
        assert_eq!(state.current_turn, Side::A);
        assert_eq!(state.round, 2);
        assert!(!state.move_in_progress);
        assert!(state
            .log
            .iter()
            .any(|e| e.kind == LogKind::System && e.message.contains("failed")));
    }

    #[tokio::test]
    async fn test_defeat_on_round_closing_move_skips_the_flush() {
        let sink = RecordingSink::new();
        let mut controller = always_hit_controller(sink.clone());
        let knight = test_combatant("Knight").with_hit_points(3);
        controller.start_battle(knight, test_combatant("Rogue"), Side::A);
        let mut rng = ScriptedRandom::new(vec![2, 2]);

        controller
            .take_turn(Side::A, basic_attack(), &mut rng)
            .await
            .expect("turn should resolve");
        // B's answer defeats A on what would close the round.
        controller
            .take_turn(Side::B, basic_attack(), &mut rng)
            .await
            .expect("turn should resolve");

        assert!(controller.is_over());
        assert_eq!(controller.winner(), Some(Side::B));
        // The battle ended instead of flushing; the queue is left as-is.
        assert_eq!(sink.flush_count(), 0);
        let state = controller.state().expect("battle state remains readable");
        assert!(!state.narrative_queue.is_empty());
    }
}
