#[cfg(test)]
mod tests {
    use crate::battle::ai::{AiState, AiTraits, Assumption};
    use crate::battle::engine::{
        collect_ai_actions, prepare_turn, resolve_turn, start_battle, submit_action,
    };
    use crate::battle::runner::{BattleRunner, MatchOutcome, MoveRequester, NullPresenter};
    use crate::battle::state::{BattleState, TurnRng};
    use crate::battle::tests::common::{
        create_ai_battle, create_test_battle, predictable_rng, slot_of, TestCreatureBuilder,
    };
    use crate::player::{MoveChoice, PlayerType};
    use pretty_assertions::assert_eq;

    struct NoHumans;

    impl MoveRequester for NoHumans {
        fn request_move(&mut self, player_index: usize, _battle_state: &BattleState) -> MoveChoice {
            panic!("player {} is an AI and should never be asked", player_index)
        }
    }

    fn traits_of(state: &BattleState, player_index: usize) -> AiTraits {
        match &state.players[player_index].player_type {
            PlayerType::Ai(ai) => ai.traits,
            PlayerType::Human => panic!("player {} is not an AI", player_index),
        }
    }

    #[test]
    fn test_low_level_ai_starts_handicapped() {
        let mut state = create_ai_battle(&["FRAGONIRE"], &["SCHONIPS"], 0, 5);
        let registry = state.registry.clone();

        start_battle(&mut state);

        // ceil(0.04 * 60 * 4) = 10
        let fragonire = state.players[0].active();
        assert_eq!(fragonire.health(), 50);
        assert_eq!(fragonire.aim_modifier(&registry), -15);
        assert_eq!(fragonire.defense_modifier(&registry), -15);

        let schonips = state.players[1].active();
        assert_eq!(schonips.health(), 52);
        assert!(schonips.statuses.is_empty());
    }

    #[test]
    fn test_level_four_keeps_health_but_not_aim() {
        let mut state = create_ai_battle(&["PSAWARCA"], &["SCHONIPS"], 4, 5);
        let registry = state.registry.clone();

        start_battle(&mut state);

        let psawarca = state.players[0].active();
        assert_eq!(psawarca.health(), 64);
        assert_eq!(psawarca.aim_modifier(&registry), -3);
    }

    #[test]
    fn test_ai_players_queue_legal_moves() {
        let mut state = create_ai_battle(&["SHIGOWI"], &["PSAWARCA"], 3, 1);
        prepare_turn(&mut state, &mut predictable_rng());

        collect_ai_actions(&mut state, &mut TurnRng::from_seed(17));

        for player_index in 0..2 {
            let Some(MoveChoice::UseMove { move_index }) = state.action_queue[player_index] else {
                panic!("player {} queued nothing", player_index);
            };
            let creature = state.players[player_index].active();
            assert!(creature.check_move_ready(&state.registry, move_index).is_ok());
            assert!(state.players[player_index].pending_assumption.is_some());
        }
    }

    /// Level 5 AI against a human: the first draw is the AI's risk roll.
    fn punishing_ai_battle() -> (BattleState, TurnRng, usize) {
        let mut state = create_test_battle(&["FRAGONIRE", "PSAWARCA"], &["SCHONIPS", "SHIGOWI"]);
        let traits = AiTraits {
            risk_aversion: 0.5,
            blunder_assumption: 0.3,
        };
        let move_count = state.players[0].active().moves.len();
        state.players[0].player_type = PlayerType::Ai(AiState::with_traits(5, traits, move_count));

        let mut draws = vec![99];
        draws.extend(vec![50; 100]);
        let mut rng = TurnRng::new_for_test(draws);
        prepare_turn(&mut state, &mut rng);
        collect_ai_actions(&mut state, &mut rng);

        let Some(Assumption::Punish { predicted }) = state.players[0].pending_assumption else {
            panic!("a 0.99 risk roll should punish");
        };
        (state, rng, predicted)
    }

    #[test]
    fn test_correct_prediction_lowers_risk_aversion() {
        let (mut state, mut rng, predicted) = punishing_ai_battle();
        submit_action(&mut state, 1, MoveChoice::UseMove { move_index: predicted })
            .expect("the predicted move is legal");

        resolve_turn(&mut state, &mut rng);

        assert!((traits_of(&state, 0).risk_aversion - 0.4).abs() < 1e-9);
        assert_eq!(state.players[0].pending_assumption, None);
    }

    #[test]
    fn test_wrong_prediction_raises_risk_aversion() {
        let (mut state, mut rng, predicted) = punishing_ai_battle();
        let registry = state.registry.clone();
        let other = state.players[1]
            .active()
            .legal_moves(&registry)
            .into_iter()
            .find(|slot| *slot != predicted)
            .expect("SCHONIPS has several ready moves");
        submit_action(&mut state, 1, MoveChoice::UseMove { move_index: other })
            .expect("a ready move is legal");

        resolve_turn(&mut state, &mut rng);

        assert!((traits_of(&state, 0).risk_aversion - 0.7).abs() < 1e-9);
        assert!((traits_of(&state, 0).blunder_assumption - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_is_not_judged_when_opponent_faints_first() {
        // Arrange: SNAKE BITE outspeeds TAIL SLAP and knocks PSAWARCA out
        let mut state = create_test_battle(&["SCHONIPS"], &["PSAWARCA"]);
        let registry = state.registry.clone();
        state.players[1].roster[0] = TestCreatureBuilder::new("PSAWARCA")
            .with_health(3)
            .build(&registry);
        let traits = AiTraits {
            risk_aversion: 0.5,
            blunder_assumption: 0.3,
        };
        let move_count = state.players[0].active().moves.len();
        state.players[0].player_type = PlayerType::Ai(AiState::with_traits(5, traits, move_count));

        let bite = slot_of(&registry, state.players[0].active(), "SNAKE BITE");
        let slap = slot_of(&registry, state.players[1].active(), "TAIL SLAP");
        state.players[0].pending_assumption = Some(Assumption::Punish { predicted: slap });
        state.action_queue = [
            Some(MoveChoice::UseMove { move_index: bite }),
            Some(MoveChoice::UseMove { move_index: slap }),
        ];

        // Act
        resolve_turn(&mut state, &mut TurnRng::new_for_test(vec![50, 0]));

        // Assert
        assert_eq!(state.players[1].active().move_uses[slap], 0);
        assert_eq!(traits_of(&state, 0), traits);
        assert_eq!(state.players[0].pending_assumption, None);
    }

    #[test]
    fn test_random_ais_finish_a_match() {
        let state = create_ai_battle(&["SCHONIPS", "PSAWARCA"], &["SHIGOWI", "FRAGONIRE"], 0, 0);
        let mut runner = BattleRunner::new(state, TurnRng::from_seed(99));

        let summary = runner
            .run_to_completion(&mut NullPresenter, &mut NoHumans, 1000)
            .expect("AI players never make illegal choices");

        assert_ne!(summary.outcome, MatchOutcome::Unfinished);
        assert_eq!(summary.players.len(), 2);
        assert_eq!(summary.players[1].creatures[0].name, "SHIGOWI");
    }
}
